// ============================================================================
// Configuration
// ============================================================================
// Lit la configuration depuis l'environnement :
// - API_BASE_URL    : racine du backend (défaut http://localhost:8082)
// - COMPTES_LOG_DIR : répertoire des logs
//
// Le filtre de logs (RUST_LOG) est lu directement par tracing-subscriber.
// ============================================================================

use std::path::PathBuf;

/// Port sur lequel le backend est censé tourner (repris dans le message d'erreur)
pub const BACKEND_PORT: u16 = 8082;

/// URL par défaut du backend
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8082";

/// Chemin de la ressource listant les comptes
pub const COMPTES_PATH: &str = "/comptes";

/// Variable d'environnement de l'URL du backend
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";

/// Variable d'environnement du répertoire de logs
pub const LOG_DIR_VAR: &str = "COMPTES_LOG_DIR";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Racine du backend, sans '/' final
    pub api_base_url: String,

    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,
}

impl Config {
    /// Construit la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let api_base_url = std::env::var(API_BASE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let log_dir = std::env::var_os(LOG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        Self::with_base_url(api_base_url).with_log_dir(log_dir)
    }

    /// Configuration pointant sur une URL donnée (logs au défaut)
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into();
        Self {
            api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
            log_dir: default_log_dir(),
        }
    }

    /// Remplace le répertoire de logs
    pub fn with_log_dir(mut self, log_dir: PathBuf) -> Self {
        self.log_dir = log_dir;
        self
    }

    /// URL complète de la liste des comptes ({base}/comptes)
    pub fn comptes_url(&self) -> String {
        format!("{}{}", self.api_base_url, COMPTES_PATH)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }
}

/// ~/.local/share/comptes/logs sur Linux, ./logs si introuvable
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("comptes").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}
