//! Couche d'accès à l'API Web Spotify
//!
//! Ce module fournit une interface bas-niveau pour communiquer avec l'API.
//! Le token est fourni déjà émis : le flux d'autorisation OAuth est géré
//! hors de cette crate.

pub mod catalog;
pub mod library;

use crate::error::{Result, SpotifyError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// URL de base de l'API Web Spotify
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Client API bas-niveau
#[derive(Debug, Clone)]
pub struct SpotifyApi {
    /// Client HTTP
    client: Client,
    /// URL de base (surchargée dans les tests)
    base_url: String,
    /// Token d'accès utilisateur
    access_token: String,
}

impl SpotifyApi {
    /// Crée une nouvelle instance de l'API
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(API_BASE_URL, access_token)
    }

    /// Crée une instance pointant vers une autre URL de base
    pub fn with_base_url(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("shuflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Crée un client depuis la configuration
    pub fn from_config(config: &shuflowconfig::Config) -> Result<Self> {
        let token = config.get_spotify_access_token()?;
        Self::with_base_url(config.get_spotify_api_base(), token)
    }

    /// Retourne l'URL de base
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Effectue une requête GET à l'API
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("GET {} with {} params", url, params.len());

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Traite la réponse HTTP
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let status_code = status.as_u16();

        debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|json| {
                    json.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(error_text);
            warn!("API error ({}): {}", status_code, message);
            return Err(SpotifyError::from_status_code(status_code, message));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            SpotifyError::JsonParse(e)
        })
    }
}
