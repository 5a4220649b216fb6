//! Configuration source traits and errors

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use super::context::LoadingContext;

/// Errors that can occur while discovering or reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No source defines the requested key
    #[error("No configuration value found for key '{key}'")]
    NoSuchElement { key: String },

    /// The value exists but cannot be converted to the requested type
    #[error("Cannot convert value '{value}' of key '{key}' to {target}: {reason}")]
    Conversion {
        key: String,
        value: String,
        target: &'static str,
        reason: String,
    },

    /// A configuration resource exists but cannot be read
    #[error("Failed to read configuration resource {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration resource could be read but not parsed
    #[error("Malformed configuration resource {}:{line}: {message}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A source declared an ordinal that is not an integer
    #[error("Invalid ordinal '{value}' declared by config source {source_name}")]
    InvalidOrdinal { source_name: String, value: String },
}

impl ConfigError {
    /// Create a missing value error
    pub fn no_such_element(key: impl Into<String>) -> Self {
        Self::NoSuchElement { key: key.into() }
    }

    /// Whether this error reports a missing key rather than a bad value
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. })
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A single layer of configuration
///
/// Implementations:
/// - `SystemPropertiesConfigSource`: process-level overrides (ordinal 400)
/// - `EnvConfigSource`: process environment (ordinal 300)
/// - `PropertiesConfigSource`: `META-INF/test-config.properties` defaults (ordinal 100)
/// - `MemoryConfigSource`: fixed map with a chosen ordinal
///
/// Sources are snapshots: whatever they return is fixed at construction.
pub trait ConfigSource: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Priority of this source, higher wins on key collision
    fn ordinal(&self) -> i32;

    /// Look up a single key
    fn get_value(&self, key: &str) -> Option<String>;

    /// All properties known to this source
    fn properties(&self) -> HashMap<String, String>;

    /// Keys known to this source
    fn property_names(&self) -> Vec<String> {
        self.properties().into_keys().collect()
    }
}

/// Type alias for a shared config source
pub type SharedConfigSource = Arc<dyn ConfigSource>;

/// Discovers the config sources visible to a loading context
///
/// Return one source per discovered resource, or an empty list if there
/// is none. Absent resources are skipped; resources that exist but
/// cannot be read are reported as errors.
pub trait ConfigSourceProvider: Send + Sync {
    /// Name used in log output
    fn name(&self) -> &str;

    /// Materialize the sources for `context`, in discovery order
    fn config_sources(&self, context: &LoadingContext) -> ConfigResult<Vec<SharedConfigSource>>;
}
