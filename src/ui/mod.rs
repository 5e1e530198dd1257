// ============================================================================
// Module : ui
// ============================================================================
// Interface terminal : rendu de la liste et événements clavier
// ============================================================================

pub mod events; // Gestion des événements clavier
pub mod view;   // Rendu de la liste des comptes

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use view::render;
