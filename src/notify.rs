// ============================================================================
// Notification "compte ajouté"
// ============================================================================
// Observateur explicite, créé par le propriétaire de la vue et passé à la vue
// (injection de dépendance) plutôt qu'un bus d'événements global.
//
// CONCEPTS RUST :
// 1. Arc<Mutex<...>> : registre des abonnés partagé entre clones
// 2. RAII : Subscription se désinscrit toute seule dans Drop
// 3. Weak : l'abonnement ne garde pas le registre en vie
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<()>>,
}

/// Émetteur de l'événement "compte ajouté"
///
/// Clonable : tous les clones partagent les mêmes abonnés.
#[derive(Debug, Clone, Default)]
pub struct AccountNotifier {
    listeners: Arc<Mutex<Listeners>>,
}

impl AccountNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre un nouvel abonné
    ///
    /// L'abonné reste inscrit tant que la Subscription retournée est vivante.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.senders.insert(id, tx);
        debug!(listener = id, "Subscribed to account-added notifications");

        Subscription {
            id,
            registry: Arc::downgrade(&self.listeners),
            rx,
        }
    }

    /// Signale qu'un compte a été ajouté ; retourne le nombre d'abonnés notifiés
    pub fn notify_account_added(&self) -> usize {
        let mut listeners = lock(&self.listeners);
        listeners.senders.retain(|_, tx| tx.send(()).is_ok());
        let delivered = listeners.senders.len();
        debug!(delivered, "Account-added notification dispatched");
        delivered
    }

    /// Nombre d'abonnés actuellement inscrits
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).senders.len()
    }
}

/// Abonnement aux notifications "compte ajouté"
///
/// CONCEPT : Scoped acquisition
/// - acquis par AccountNotifier::subscribe()
/// - libéré automatiquement quand il sort du scope (Drop)
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Listeners>>,
    rx: mpsc::UnboundedReceiver<()>,
}

impl Subscription {
    /// Consomme une notification en attente, sans bloquer
    pub fn try_next(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).senders.remove(&self.id);
            debug!(listener = self.id, "Unsubscribed from account-added notifications");
        }
    }
}

/// Un panic pendant qu'on tient le verrou ne rend pas le registre inutilisable
fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
