//! System test fixture
//!
//! Prepares a test run against a deployed service:
//! - resolves the target route and probe/login settings from configuration
//! - logs in at the OpenID Connect provider (password grant)
//! - waits for the service readiness probe
//!
//! ```rust,no_run
//! use systest_core::fixture::SystemTestFixture;
//!
//! let mut fixture = SystemTestFixture::new()?;
//! fixture.on_before()?;
//! let token = fixture.access_token();
//! # Ok::<(), systest_core::fixture::FixtureError>(())
//! ```

mod error;
mod settings;
mod readiness;
mod oidc;

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, ConfigProvider};

pub use error::{FixtureError, FixtureResult};
pub use settings::{
    OidcSettings, ReadinessSettings, TestSettings, DEFAULT_READINESS_PATH,
    TARGET_ROUTE, TEST_TARGET_ROUTE,
    READINESS_SKIP, READINESS_PATH, READINESS_INITIAL_DELAY, READINESS_FAILURE_THRESHOLD,
    READINESS_PERIOD, READINESS_TIMEOUT,
    OIDC_SKIP, OIDC_CLIENT_ID, OIDC_CLIENT_SECRET, OIDC_ACCESS_TOKEN_URI, OIDC_USER,
    OIDC_PASSWORD,
};
pub use readiness::{
    HttpReadinessProbe, ReadinessProbe, Sleeper, ThreadSleeper, probe_url, wait_for_readiness,
};
pub use oidc::{OidcTokenClient, Tokens, parse_token_response};

/// Obtains tokens for the configured test user
pub trait TokenSource: Send + Sync {
    fn fetch_tokens(&self, settings: &OidcSettings) -> FixtureResult<Tokens>;
}

impl TokenSource for OidcTokenClient {
    fn fetch_tokens(&self, settings: &OidcSettings) -> FixtureResult<Tokens> {
        self.login(settings)
    }
}

/// Per-suite fixture state
///
/// Settings and tokens are resolved once and reused by later
/// `on_before` calls until `on_after` resets them.
#[derive(Debug)]
pub struct SystemTestFixture {
    config: Arc<Config>,
    settings: Option<TestSettings>,
    tokens: Option<Tokens>,
}

impl SystemTestFixture {
    /// Fixture over the process-wide config of the implicit loading context
    pub fn new() -> FixtureResult<Self> {
        Ok(Self::with_config(ConfigProvider::get_config()?))
    }

    /// Fixture over an explicit config
    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            settings: None,
            tokens: None,
        }
    }

    /// Resolve settings, log in and wait for readiness using HTTP
    pub fn on_before(&mut self) -> FixtureResult<()> {
        let login = OidcTokenClient::new()?;
        let probe = HttpReadinessProbe::new()?;
        self.on_before_with(&login, &probe, &ThreadSleeper)
    }

    /// Same as `on_before`, with caller-supplied collaborators
    pub fn on_before_with(
        &mut self,
        login: &dyn TokenSource,
        probe: &dyn ReadinessProbe,
        sleeper: &dyn Sleeper,
    ) -> FixtureResult<()> {
        let settings = self.ensure_settings()?;

        if self.tokens.is_none() {
            if let Some(oidc) = &settings.oidc {
                self.tokens = Some(login.fetch_tokens(oidc)?);
            }
        }

        wait_for_readiness(&settings.readiness, &settings.target_route, probe, sleeper)?;
        info!(target_route = %settings.target_route, "system test fixture ready");
        Ok(())
    }

    /// Forget resolved settings and tokens
    pub fn on_after(&mut self) {
        self.settings = None;
        self.tokens = None;
    }

    fn ensure_settings(&mut self) -> FixtureResult<TestSettings> {
        if let Some(settings) = &self.settings {
            return Ok(settings.clone());
        }
        let settings = TestSettings::from_config(&self.config)?;
        self.settings = Some(settings.clone());
        Ok(settings)
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Settings resolved by the last `on_before`
    pub fn settings(&self) -> Option<&TestSettings> {
        self.settings.as_ref()
    }

    pub fn target_route(&self) -> Option<&str> {
        self.settings.as_ref().map(|s| s.target_route.as_str())
    }

    /// Access token from the login, if one was performed
    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access_token.as_str())
    }

    /// ID token from the login, if the provider returned one
    pub fn id_token(&self) -> Option<&str> {
        self.tokens.as_ref().and_then(|t| t.id_token.as_deref())
    }
}
