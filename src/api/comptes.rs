// ============================================================================
// API Client : service de comptes
// ============================================================================
// Récupère la collection complète des comptes depuis le backend
//
// CONCEPTS RUST :
// 1. Trait avec méthode async (impl Future) : permet d'injecter une fausse
//    source dans les tests et la vraie source HTTP dans le binaire
// 2. anyhow::Context : chaque étape qui peut échouer ajoute son contexte
// 3. #[instrument] : span tracing avec l'URL appelée
// ============================================================================

use std::future::Future;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::models::Account;

/// Source de comptes : tout ce qui sait produire la liste des comptes
///
/// CONCEPT RUST : impl Future + Send dans un trait
/// - Le futur retourné doit être Send pour être lancé avec tokio::spawn
/// - 'static : la source est partagée via Arc avec les tâches de chargement
pub trait AccountSource: Send + Sync + 'static {
    /// URL tentée, affichée dans le panneau d'erreur
    fn endpoint(&self) -> &str;

    /// Récupère la collection complète, dans l'ordre du serveur
    fn fetch_accounts(&self) -> impl Future<Output = Result<Vec<Account>>> + Send;
}

/// Source HTTP : GET {API_BASE_URL}/comptes
#[derive(Debug, Clone)]
pub struct HttpAccountSource {
    client: reqwest::Client,
    url: String,
}

impl HttpAccountSource {
    /// Crée le client HTTP pour la configuration donnée
    ///
    /// Aucun timeout n'est imposé ici : on garde les défauts de reqwest.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("comptes/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            url: config.comptes_url(),
        })
    }
}

impl AccountSource for HttpAccountSource {
    fn endpoint(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_accounts(&self) -> Result<Vec<Account>> {
        debug!("Sending HTTP request to account service");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Échec de la requête HTTP vers le service de comptes")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Tout statut hors 2xx est un échec de chargement
        if !status.is_success() {
            error!(status = %status, "Account service returned error status");
            anyhow::bail!("Le service de comptes a retourné une erreur : HTTP {}", status);
        }

        let accounts: Vec<Account> = response
            .json()
            .await
            .context("Échec du parsing JSON de la liste des comptes")?;

        info!(accounts = accounts.len(), "Successfully fetched accounts");
        Ok(accounts)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Un petit serveur HTTP tokio répond une seule fois avec une réponse figée :
// pas d'appel réseau externe, pas de dépendance de mock.
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountId;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Lance un serveur qui répond une fois ; retourne l'URL de base et la
    /// requête reçue (via le JoinHandle)
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{}", addr), handle)
    }

    fn source_for(base_url: &str) -> HttpAccountSource {
        HttpAccountSource::new(&Config::with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_accounts_success() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":1,"solde":100.5,"dateCreation":"2024-01-02","type":"EPARGNE"},{"id":2,"solde":null,"dateCreation":"2024-02-03","type":"COURANT"}]"#,
        )
        .await;

        let source = source_for(&base);
        assert_eq!(source.endpoint(), format!("{}/comptes", base));

        let accounts = source.fetch_accounts().await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, AccountId::Number(1));
        assert_eq!(accounts[1].balance, None);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /comptes HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_fetch_accounts_empty() {
        let (base, _server) = serve_once("200 OK", "[]").await;
        let accounts = source_for(&base).fetch_accounts().await.unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_accounts_server_error() {
        let (base, _server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let err = source_for(&base).fetch_accounts().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_accounts_malformed_body() {
        let (base, _server) = serve_once("200 OK", r#"{"not":"an array"}"#).await;
        let result = source_for(&base).fetch_accounts().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_accounts_connection_refused() {
        // Réserve un port puis le libère : plus personne n'écoute dessus
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = source_for(&format!("http://{}", addr)).fetch_accounts().await;
        assert!(result.is_err());
    }
}
