// ============================================================================
// État de l'application
// ============================================================================
// ViewState : état éphémère de la liste (chargement / erreur / données)
// App       : ViewState + état du terminal (quit, sélection, URL affichée)
//
// CONCEPTS RUST :
// 1. State Management : toutes les modifications passent par des méthodes
// 2. Newtype (LoadTicket) : un numéro de requête qu'on ne confond pas avec
//    un simple u64
// 3. Enum avec références (Body<'a>) : ce que le rendu doit afficher
// ============================================================================

use anyhow::Result;
use tracing::{debug, error, info};

use crate::config::BACKEND_PORT;
use crate::models::Account;

/// Message affiché quand le chargement échoue, quelle que soit la cause
pub fn load_error_message() -> String {
    format!(
        "Impossible de charger les comptes. Vérifiez que le backend est démarré sur le port {}.",
        BACKEND_PORT
    )
}

/// Numéro de séquence d'un chargement
///
/// Chaque appel à ViewState::begin_load() émet un ticket strictement plus
/// grand que le précédent. Seule la réponse portant le dernier ticket est
/// appliquée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Ce que le corps de la vue doit afficher (première branche qui matche)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Table(&'a [Account]),
}

/// État éphémère de la liste des comptes
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    accounts: Vec<Account>,
    is_loading: bool,
    error_message: Option<String>,
    generation: u64,
}

impl ViewState {
    /// État au montage : liste vide, chargement en cours, pas d'erreur
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            is_loading: true,
            error_message: None,
            generation: 0,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Démarre un chargement : loading=true, erreur effacée
    ///
    /// Les comptes précédents sont conservés ; l'indicateur de chargement
    /// passe devant eux au rendu.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.is_loading = true;
        self.error_message = None;
        LoadTicket(self.generation)
    }

    /// Applique le résultat d'un chargement
    ///
    /// Retourne false (état inchangé) si une requête plus récente a été émise
    /// depuis : sa réponse fera foi.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<Account>>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                latest = self.generation,
                "Ignoring stale account list response"
            );
            return false;
        }

        match result {
            Ok(accounts) => {
                info!(ticket = ticket.0, accounts = accounts.len(), "Account list loaded");
                self.accounts = accounts;
                self.error_message = None;
            }
            Err(e) => {
                // L'erreur technique va dans les logs, l'utilisateur voit le message fixe
                error!(ticket = ticket.0, error = ?e, "Erreur lors du chargement des comptes");
                self.error_message = Some(load_error_message());
            }
        }

        self.is_loading = false;
        true
    }

    /// Branche de rendu active
    pub fn body(&self) -> Body<'_> {
        if self.is_loading {
            Body::Loading
        } else if let Some(message) = &self.error_message {
            Body::Error(message)
        } else if self.accounts.is_empty() {
            Body::Empty
        } else {
            Body::Table(&self.accounts)
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' arme la confirmation
    pub confirm_quit: bool,

    /// Ligne sélectionnée dans le tableau
    pub selected_index: usize,

    /// URL tentée ({base}/comptes), affichée dans le panneau d'erreur
    pub endpoint: String,

    /// État de la liste des comptes
    pub view: ViewState,
}

impl App {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            selected_index: 0,
            endpoint: endpoint.into(),
            view: ViewState::new(),
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Le bouton "Rafraîchir" est désactivé pendant un chargement
    pub fn can_refresh(&self) -> bool {
        !self.view.is_loading()
    }

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.view.accounts().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Ramène la sélection dans les bornes après un rechargement
    pub fn clamp_selection(&mut self) {
        let max_index = self.view.accounts().len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountId;

    fn account(id: i64, balance: Option<f64>, kind: &str) -> Account {
        Account {
            id: id.into(),
            balance,
            creation_date: None,
            account_type: Some(kind.to_string()),
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let view = ViewState::new();
        assert!(view.is_loading());
        assert!(view.accounts().is_empty());
        assert_eq!(view.error_message(), None);
        assert_eq!(view.body(), Body::Loading);
    }

    #[test]
    fn test_success_sets_accounts() {
        let mut view = ViewState::new();
        let ticket = view.begin_load();
        let accounts = vec![account(2, Some(1.0), "A"), account(1, None, "B")];

        assert!(view.finish_load(ticket, Ok(accounts.clone())));
        assert!(!view.is_loading());
        assert_eq!(view.body(), Body::Table(&accounts));
    }

    #[test]
    fn test_empty_collection() {
        let mut view = ViewState::new();
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(Vec::new()));
        assert_eq!(view.body(), Body::Empty);
    }

    #[test]
    fn test_failure_sets_fixed_message() {
        let mut view = ViewState::new();
        let ticket = view.begin_load();
        view.finish_load(ticket, Err(anyhow::anyhow!("connection refused")));

        assert!(!view.is_loading());
        let message = view.error_message().unwrap();
        assert!(message.contains("8082"));
        assert!(!message.contains("connection refused"));
        assert!(matches!(view.body(), Body::Error(_)));
    }

    #[test]
    fn test_begin_load_clears_error_and_shows_loading() {
        let mut view = ViewState::new();
        let ticket = view.begin_load();
        view.finish_load(ticket, Err(anyhow::anyhow!("boom")));

        view.begin_load();
        assert!(view.is_loading());
        assert_eq!(view.error_message(), None);
        assert_eq!(view.body(), Body::Loading);
    }

    #[test]
    fn test_loading_takes_precedence_over_stale_table() {
        let mut view = ViewState::new();
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(vec![account(1, Some(5.0), "A")]));

        view.begin_load();
        assert_eq!(view.accounts().len(), 1);
        assert_eq!(view.body(), Body::Loading);
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut view = ViewState::new();
        let first = view.begin_load();
        let second = view.begin_load();
        assert!(second > first);

        // La réponse la plus récente arrive d'abord
        assert!(view.finish_load(second, Ok(vec![account(2, None, "NEW")])));
        // L'ancienne arrive ensuite : ignorée
        assert!(!view.finish_load(first, Ok(vec![account(1, None, "OLD")])));

        assert_eq!(view.accounts()[0].id, AccountId::Number(2));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_stale_response_does_not_end_loading() {
        let mut view = ViewState::new();
        let first = view.begin_load();
        let _second = view.begin_load();

        assert!(!view.finish_load(first, Err(anyhow::anyhow!("late"))));
        assert!(view.is_loading());
        assert_eq!(view.error_message(), None);
    }

    #[test]
    fn test_refresh_disabled_while_loading() {
        let mut app = App::new("http://localhost:8082/comptes");
        assert!(!app.can_refresh());

        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, Ok(Vec::new()));
        assert!(app.can_refresh());
    }

    #[test]
    fn test_navigation_and_clamp() {
        let mut app = App::new("http://localhost:8082/comptes");
        let ticket = app.view.begin_load();
        app.view.finish_load(
            ticket,
            Ok(vec![account(1, None, "A"), account(2, None, "B"), account(3, None, "C")]),
        );

        app.navigate_down();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);
        assert_eq!(app.view.accounts()[app.selected_index].id, AccountId::Number(3));

        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, Ok(vec![account(9, None, "Z")]));
        app.clamp_selection();
        assert_eq!(app.selected_index, 0);

        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new("http://localhost:8082/comptes");
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }
}
