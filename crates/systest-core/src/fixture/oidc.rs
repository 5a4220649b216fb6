//! OpenID Connect password-grant login

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::error::{FixtureError, FixtureResult};
use super::settings::OidcSettings;

/// Tokens obtained from the token endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: String,
    /// Providers may omit the ID token
    pub id_token: Option<String>,
}

impl std::fmt::Debug for Tokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &format!("[{} chars]", self.access_token.len()))
            .field("id_token", &self.id_token.as_ref().map(|t| format!("[{} chars]", t.len())))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    id_token: Option<String>,
}

/// Parse a token endpoint JSON body
///
/// A missing access token is an error; a missing ID token is only logged.
pub fn parse_token_response(uri: &str, body: &str) -> FixtureResult<Tokens> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| FixtureError::login(uri, format!("invalid JSON response: {}", e)))?;

    let access_token = response.access_token.ok_or_else(|| {
        FixtureError::login(uri, "expected authentication provider to return access token but got none")
    })?;
    info!(length = access_token.len(), "got access token");

    match &response.id_token {
        Some(token) => info!(length = token.len(), "got ID token"),
        None => warn!("expected authentication provider to return ID token but got none"),
    }

    Ok(Tokens {
        access_token,
        id_token: response.id_token,
    })
}

/// Performs the password grant against a token endpoint
#[derive(Debug, Clone)]
pub struct OidcTokenClient {
    client: Client,
}

impl OidcTokenClient {
    /// Create a client with relaxed TLS validation
    pub fn new() -> FixtureResult<Self> {
        let client = Client::builder().danger_accept_invalid_certs(true).build()?;
        Ok(Self { client })
    }

    /// Create a client sharing an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Log in with the configured user and return the tokens
    pub fn login(&self, settings: &OidcSettings) -> FixtureResult<Tokens> {
        let uri = settings.access_token_uri.as_str();
        let params = [
            ("scope", "openid"),
            ("grant_type", "password"),
            ("username", settings.user.as_str()),
            ("password", settings.password.as_str()),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
        ];

        info!(uri, user = %settings.user, "requesting tokens");
        let response = self.client.post(uri).form(&params).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(FixtureError::login(uri, format!("token endpoint returned {}", status)));
        }
        parse_token_response(uri, &body)
    }
}
