// ============================================================================
// Module : api
// ============================================================================
// Client du service de comptes (backend HTTP)
// ============================================================================

pub mod comptes; // GET {API_BASE_URL}/comptes

// Re-export des éléments principaux
pub use comptes::{AccountSource, HttpAccountSource};
