// ============================================================================
// Module : models
// ============================================================================
// Structures de données échangées avec le service de comptes
// ============================================================================

pub mod account; // Compte bancaire (account.rs)

// Re-export pour simplifier les imports
// Au lieu de : use comptes::models::account::Account;
// On peut faire : use comptes::models::Account;
pub use account::{Account, AccountId, CreationDate};
