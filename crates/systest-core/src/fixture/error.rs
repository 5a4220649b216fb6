//! Fixture error types

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while preparing a system test run
#[derive(Error, Debug)]
pub enum FixtureError {
    /// Configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client or transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token endpoint returned something unusable
    #[error("Login at {uri} failed: {message}")]
    Login { uri: String, message: String },

    /// Readiness probe never reported ready
    #[error("Readiness check at {url} failed after {attempts} attempt(s)")]
    ReadinessFailed { url: String, attempts: u32 },
}

impl FixtureError {
    /// Create a login error
    pub fn login(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Login {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

pub type FixtureResult<T> = Result<T, FixtureError>;
