//! Typed view of the keys a system test fixture reads

use std::time::Duration;

use tracing::info;

use crate::config::{Config, ConfigResult};

pub const TARGET_ROUTE: &str = "target.route";
pub const TEST_TARGET_ROUTE: &str = "test.target.route";

pub const READINESS_SKIP: &str = "test.target.readinessProbe.skip";
pub const READINESS_PATH: &str = "test.target.readinessProbe.path";
pub const READINESS_INITIAL_DELAY: &str = "test.target.readinessProbe.initialDelaySeconds";
pub const READINESS_FAILURE_THRESHOLD: &str = "test.target.readinessProbe.failureThreshold";
pub const READINESS_PERIOD: &str = "test.target.readinessProbe.periodSeconds";
pub const READINESS_TIMEOUT: &str = "test.target.readinessProbe.timeoutSeconds";

pub const OIDC_SKIP: &str = "test.oidc.skip";
pub const OIDC_CLIENT_ID: &str = "test.oidc.client.clientId";
pub const OIDC_CLIENT_SECRET: &str = "test.oidc.client.clientSecret";
pub const OIDC_ACCESS_TOKEN_URI: &str = "test.oidc.client.accessTokenUri";
pub const OIDC_USER: &str = "test.oidc.client.user";
pub const OIDC_PASSWORD: &str = "test.oidc.client.password";

pub const DEFAULT_READINESS_PATH: &str = "api/v1/probes/readiness";

/// How to wait for the target service to become ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessSettings {
    pub skip: bool,
    /// Path relative to the target route
    pub path: String,
    pub initial_delay: Duration,
    /// Maximum number of probe attempts
    pub failure_threshold: u32,
    pub period: Duration,
    /// Per-attempt HTTP timeout; zero leaves attempts unbounded
    pub timeout: Duration,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            skip: false,
            path: DEFAULT_READINESS_PATH.to_string(),
            initial_delay: Duration::from_secs(10),
            failure_threshold: 3,
            period: Duration::from_secs(10),
            timeout: Duration::from_secs(1),
        }
    }
}

impl ReadinessSettings {
    /// Read readiness settings, falling back to defaults per key
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            skip: config.get_optional_value(READINESS_SKIP)?.unwrap_or(defaults.skip),
            path: config.get_optional_value(READINESS_PATH)?.unwrap_or(defaults.path),
            initial_delay: seconds(config, READINESS_INITIAL_DELAY)?.unwrap_or(defaults.initial_delay),
            failure_threshold: config
                .get_optional_value(READINESS_FAILURE_THRESHOLD)?
                .unwrap_or(defaults.failure_threshold),
            period: seconds(config, READINESS_PERIOD)?.unwrap_or(defaults.period),
            timeout: seconds(config, READINESS_TIMEOUT)?.unwrap_or(defaults.timeout),
        })
    }
}

/// Whole seconds, with negative values read as zero
fn seconds(config: &Config, key: &str) -> ConfigResult<Option<Duration>> {
    let value: Option<i64> = config.get_optional_value(key)?;
    Ok(value.map(|secs| Duration::from_secs(u64::try_from(secs).unwrap_or(0))))
}

/// Client credentials for the password grant
#[derive(Clone, PartialEq, Eq)]
pub struct OidcSettings {
    pub client_id: String,
    pub client_secret: String,
    pub access_token_uri: String,
    pub user: String,
    pub password: String,
}

impl OidcSettings {
    /// Read the credentials; every key is required
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        Ok(Self {
            client_id: config.get_value(OIDC_CLIENT_ID)?,
            client_secret: config.get_value(OIDC_CLIENT_SECRET)?,
            access_token_uri: config.get_value(OIDC_ACCESS_TOKEN_URI)?,
            user: config.get_value(OIDC_USER)?,
            password: config.get_value(OIDC_PASSWORD)?,
        })
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for OidcSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("access_token_uri", &self.access_token_uri)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Everything a fixture needs before tests run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSettings {
    /// Base URL of the service under test
    pub target_route: String,
    pub readiness: ReadinessSettings,
    /// `None` when the login is skipped
    pub oidc: Option<OidcSettings>,
}

impl TestSettings {
    /// Resolve settings from a config
    ///
    /// `target.route` takes precedence over the required
    /// `test.target.route`. OIDC credentials are only required when
    /// `test.oidc.skip` is not `true`.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let target_route = match config.get_optional_value::<String>(TARGET_ROUTE)? {
            Some(route) => route,
            None => config.get_value(TEST_TARGET_ROUTE)?,
        };

        let readiness = ReadinessSettings::from_config(config)?;
        info!(skip_readiness_probe = readiness.skip, "readiness settings");

        let skip_oidc = config.get_optional_value(OIDC_SKIP)?.unwrap_or(false);
        info!(skip_openid_connect_login = skip_oidc, "login settings");
        let oidc = if skip_oidc {
            None
        } else {
            Some(OidcSettings::from_config(config)?)
        };

        Ok(Self {
            target_route,
            readiness,
            oidc,
        })
    }
}
