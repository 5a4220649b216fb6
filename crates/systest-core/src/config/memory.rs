//! In-memory configuration source

use std::collections::HashMap;

use super::traits::ConfigSource;

/// Configuration source backed by a fixed map
///
/// Useful for tests and for programmatic defaults registered through a
/// custom `ConfigSourceProvider`.
///
/// # Example
///
/// ```
/// use systest_core::config::{ConfigSource, MemoryConfigSource};
///
/// let source = MemoryConfigSource::new("defaults", 50)
///     .with_value("test.oidc.skip", "true");
/// assert_eq!(source.get_value("test.oidc.skip"), Some("true".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryConfigSource {
    name: String,
    ordinal: i32,
    properties: HashMap<String, String>,
}

impl MemoryConfigSource {
    /// Create an empty source
    pub fn new(name: impl Into<String>, ordinal: i32) -> Self {
        Self {
            name: name.into(),
            ordinal,
            properties: HashMap::new(),
        }
    }

    /// Create a source with initial values
    pub fn with_properties(
        name: impl Into<String>,
        ordinal: i32,
        properties: HashMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            ordinal,
            properties,
        }
    }

    /// Add a value, builder style
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Number of properties in this source
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the source is empty
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl ConfigSource for MemoryConfigSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn ordinal(&self) -> i32 {
        self.ordinal
    }

    fn get_value(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn properties(&self) -> HashMap<String, String> {
        self.properties.clone()
    }
}
