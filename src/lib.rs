// ============================================================================
// Comptes - Library
// ============================================================================
// Liste des comptes d'un backend HTTP, affichée dans le terminal
// ============================================================================

pub mod api;     // Client du service de comptes
pub mod app;     // État de l'application (ViewState, App)
pub mod config;  // Configuration (URL du backend, logs)
pub mod loader;  // Chargements et déclencheurs
pub mod models;  // Structures de données
pub mod notify;  // Notification "compte ajouté"
pub mod ui;      // Interface utilisateur
