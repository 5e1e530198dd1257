// ============================================================================
// Chargement des comptes
// ============================================================================
// AccountLoader : loadAccounts() et ses trois déclencheurs
// - montage (une seule fois, dans mount())
// - notification "compte ajouté" (via la Subscription injectée)
// - rafraîchissement manuel (ignoré pendant un chargement)
//
// CONCEPTS RUST :
// 1. tokio::spawn via un Handle : la requête tourne sur le runtime, la boucle
//    UI ne bloque jamais
// 2. Channel mpsc : les tâches renvoient (ticket, résultat) à la boucle, seule
//    propriétaire du ViewState
// 3. Generics + trait bound : S: AccountSource (HTTP en prod, fausse source
//    en test)
// ============================================================================

use std::sync::Arc;

use anyhow::Result;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::AccountSource;
use crate::app::{LoadTicket, ViewState};
use crate::models::Account;
use crate::notify::{AccountNotifier, Subscription};

/// Résultat d'un chargement, renvoyé par la tâche de fond
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<Vec<Account>>,
}

/// Pilote les chargements de la liste des comptes
///
/// Tant que le loader est vivant, il est abonné aux notifications
/// "compte ajouté". Le détruire (démontage) libère l'abonnement.
pub struct AccountLoader<S> {
    source: Arc<S>,
    runtime: Handle,
    outcome_tx: mpsc::UnboundedSender<LoadOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<LoadOutcome>,
    subscription: Subscription,
    requests_issued: u64,
}

impl<S: AccountSource> AccountLoader<S> {
    /// Monte la vue : abonnement aux notifications puis premier chargement
    pub fn mount(source: S, runtime: Handle, notifier: &AccountNotifier, view: &mut ViewState) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let mut loader = Self {
            source: Arc::new(source),
            runtime,
            outcome_tx,
            outcome_rx,
            subscription: notifier.subscribe(),
            requests_issued: 0,
        };

        info!(endpoint = %loader.endpoint(), "Account list mounted");
        loader.load_accounts(view);
        loader
    }

    /// URL interrogée
    pub fn endpoint(&self) -> &str {
        self.source.endpoint()
    }

    /// Nombre de requêtes émises depuis le montage
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Lance un chargement et retourne immédiatement
    ///
    /// Les chargements ne sont ni dédupliqués ni annulés ; c'est le ticket
    /// qui décide quelle réponse est appliquée.
    pub fn load_accounts(&mut self, view: &mut ViewState) -> LoadTicket {
        let ticket = view.begin_load();
        self.requests_issued += 1;
        debug!(ticket = ticket.value(), "Issuing account list request");

        let source = Arc::clone(&self.source);
        let outcome_tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let result = source.fetch_accounts().await;
            // La boucle peut être déjà démontée : rien à faire dans ce cas
            let _ = outcome_tx.send(LoadOutcome { ticket, result });
        });

        ticket
    }

    /// Rafraîchissement manuel : sans effet pendant un chargement
    pub fn refresh(&mut self, view: &mut ViewState) -> Option<LoadTicket> {
        if view.is_loading() {
            debug!("Refresh ignored while a load is in progress");
            return None;
        }
        info!("Manual refresh requested");
        Some(self.load_accounts(view))
    }

    /// Traite sans bloquer les notifications et les réponses en attente
    ///
    /// Retourne true si une réponse a modifié l'état.
    pub fn poll(&mut self, view: &mut ViewState) -> bool {
        while self.subscription.try_next() {
            info!("Account added, reloading account list");
            self.load_accounts(view);
        }

        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            changed |= view.finish_load(outcome.ticket, outcome.result);
        }
        changed
    }

    /// Attend la prochaine réponse et l'applique
    ///
    /// Retourne true si elle a été appliquée, false si elle était périmée.
    #[cfg(test)]
    pub async fn next_outcome(&mut self, view: &mut ViewState) -> bool {
        match self.outcome_rx.recv().await {
            Some(outcome) => view.finish_load(outcome.ticket, outcome.result),
            // Impossible tant que self détient outcome_tx
            None => false,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
