//! Systest Core
//!
//! Helpers for end-to-end system tests against a deployed service.
//!
//! ## Configuration
//!
//! The `config` module resolves keys across layered sources:
//! - system properties (process-level overrides, ordinal 400)
//! - environment variables (ordinal 300)
//! - `META-INF/test-config.properties` resources (defaults, ordinal 100)
//!
//! ```rust,no_run
//! use systest_core::ConfigProvider;
//!
//! let config = ConfigProvider::get_config()?;
//! let route: String = config.get_value("test.target.route")?;
//! let skip: bool = config.get_optional_value("test.oidc.skip")?.unwrap_or(false);
//! # Ok::<(), systest_core::ConfigError>(())
//! ```
//!
//! ## Fixture
//!
//! The `fixture` module logs in at an OpenID Connect provider and waits
//! for the target's readiness probe before tests run.

pub mod config;
pub mod fixture;
pub mod logging;

// Re-export commonly used types
pub use config::{
    Config, ConfigError, ConfigResult, ConfigSource, ConfigSourceProvider,
    ConfigProvider, ConfigProviderResolver, LoadingContext,
    EnvConfigSource, MemoryConfigSource, PropertiesConfigSource, SystemPropertiesConfigSource,
    Converter, ConversionError, FromConfigValue,
    set_system_property, get_system_property, remove_system_property,
};

pub use fixture::{
    SystemTestFixture, TestSettings, ReadinessSettings, OidcSettings, Tokens,
    FixtureError, FixtureResult,
};
