//! Client-credentials token acquisition for the ARM session.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use fwsync_provider::ProviderError;

/// Service principal credentials.
#[derive(Debug, Clone)]
pub struct AzureCredentials {
    /// Directory (tenant) id.
    pub tenant_id: String,
    /// Subscription holding the resource group.
    pub subscription_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Application key.
    pub client_secret: String,
}

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Fallback lifetime when the token endpoint omits `expires_in`.
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Fetches and caches bearer tokens for the management scope.
pub(crate) struct TokenProvider {
    http: reqwest::Client,
    credentials: AzureCredentials,
    token_url: String,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl TokenProvider {
    pub(crate) fn new(
        http: reqwest::Client,
        credentials: AzureCredentials,
        login_endpoint: &str,
        management_endpoint: &str,
    ) -> Self {
        let token_url = format!(
            "{login_endpoint}/{}/oauth2/v2.0/token",
            credentials.tenant_id
        );
        Self {
            http,
            credentials,
            token_url,
            scope: format!("{management_endpoint}/.default"),
            cached: RwLock::new(None),
        }
    }

    /// Returns a valid bearer token, fetching a fresh one when the cached
    /// token is absent or within [`EXPIRY_MARGIN`] of expiry.
    pub(crate) async fn token(&self) -> Result<String, ProviderError> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(cached.token.clone());
            }
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];
        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                crate::provider::excerpt(&body)
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::auth(format!("malformed token response: {e}")))?;

        let lifetime = parsed
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LIFETIME);
        tracing::debug!(lifetime_secs = lifetime.as_secs(), "access token acquired");

        *self.cached.write().await = Some(CachedToken {
            token: parsed.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(parsed.access_token)
    }
}
