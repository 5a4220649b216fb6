//! Resolution of keys across ordered config sources

use std::collections::BTreeSet;
use std::fmt;

use tracing::trace;

use super::convert::{BuiltinConverter, Converter, FromConfigValue};
use super::traits::{ConfigError, ConfigResult, SharedConfigSource};

/// A raw value together with the source that provided it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub value: String,
    /// Name of the winning source
    pub source: String,
    /// Ordinal of the winning source
    pub ordinal: i32,
}

/// Immutable view over all config sources of a loading context
///
/// Sources are ordered by descending ordinal when the `Config` is built.
/// Sources with equal ordinals keep the order they were discovered in.
/// A lookup returns the value of the first source that defines the key;
/// values are never merged across sources.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use systest_core::config::{Config, MemoryConfigSource};
///
/// let defaults = MemoryConfigSource::new("defaults", 100)
///     .with_value("test.target.readinessProbe.periodSeconds", "7");
/// let config = Config::new(vec![Arc::new(defaults)]);
///
/// let period: Option<i32> = config
///     .get_optional_value("test.target.readinessProbe.periodSeconds")
///     .unwrap();
/// assert_eq!(period, Some(7));
/// ```
pub struct Config {
    sources: Vec<SharedConfigSource>,
}

impl Config {
    /// Build a config from sources in discovery order
    pub fn new(mut sources: Vec<SharedConfigSource>) -> Self {
        // Stable sort keeps discovery order among equal ordinals
        sources.sort_by(|a, b| b.ordinal().cmp(&a.ordinal()));
        Self { sources }
    }

    /// Get a required value converted to `T`
    pub fn get_value<T: FromConfigValue>(&self, key: &str) -> ConfigResult<T> {
        self.get_value_with(key, &BuiltinConverter)
    }

    /// Get an optional value converted to `T`
    ///
    /// A missing key yields `Ok(None)`. A present value that fails to
    /// convert is still an error.
    pub fn get_optional_value<T: FromConfigValue>(&self, key: &str) -> ConfigResult<Option<T>> {
        self.get_optional_value_with(key, &BuiltinConverter)
    }

    /// Get a required value using a custom converter
    pub fn get_value_with<T, C>(&self, key: &str, converter: &C) -> ConfigResult<T>
    where
        C: Converter<T> + ?Sized,
    {
        self.get_optional_value_with(key, converter)?
            .ok_or_else(|| ConfigError::no_such_element(key))
    }

    /// Get an optional value using a custom converter
    pub fn get_optional_value_with<T, C>(&self, key: &str, converter: &C) -> ConfigResult<Option<T>>
    where
        C: Converter<T> + ?Sized,
    {
        let Some(raw) = self.get_raw(key) else {
            return Ok(None);
        };
        converter
            .convert(&raw.value)
            .map(Some)
            .map_err(|e| ConfigError::Conversion {
                key: key.to_string(),
                value: raw.value,
                target: e.target,
                reason: e.reason,
            })
    }

    /// Get the unconverted value and the source that provided it
    pub fn get_raw(&self, key: &str) -> Option<RawValue> {
        self.sources.iter().find_map(|source| {
            source.get_value(key).map(|value| {
                trace!(key, source = source.name(), "resolved config key");
                RawValue {
                    value,
                    source: source.name().to_string(),
                    ordinal: source.ordinal(),
                }
            })
        })
    }

    /// Sources in resolution order
    pub fn config_sources(&self) -> &[SharedConfigSource] {
        &self.sources
    }

    /// All keys known to any source, sorted
    pub fn property_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .flat_map(|source| source.property_names())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<_> = self
            .sources
            .iter()
            .map(|s| format!("{}({})", s.name(), s.ordinal()))
            .collect();
        f.debug_struct("Config").field("sources", &sources).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::convert::ConversionError;
    use crate::config::{EnvConfigSource, MemoryConfigSource, PropertiesConfigSource};
    use std::sync::Arc;

    fn memory(name: &str, ordinal: i32, pairs: &[(&str, &str)]) -> SharedConfigSource {
        let mut source = MemoryConfigSource::new(name, ordinal);
        for (k, v) in pairs {
            source = source.with_value(*k, *v);
        }
        Arc::new(source)
    }

    #[test]
    fn test_single_source_value() {
        let config = Config::new(vec![memory("a", 100, &[("test.target.route", "http://x")])]);
        let route: String = config.get_value("test.target.route").unwrap();
        assert_eq!(route, "http://x");
    }

    #[test]
    fn test_higher_ordinal_wins() {
        let config = Config::new(vec![
            memory("low", 100, &[("k", "low")]),
            memory("high", 300, &[("k", "high")]),
            memory("mid", 200, &[("k", "mid"), ("only.mid", "m")]),
        ]);

        assert_eq!(config.get_value::<String>("k").unwrap(), "high");
        assert_eq!(config.get_value::<String>("only.mid").unwrap(), "m");

        let names: Vec<_> = config.config_sources().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_ordinal_first_discovered_wins() {
        let config = Config::new(vec![
            memory("first", 100, &[("k", "first")]),
            memory("second", 100, &[("k", "second")]),
        ]);
        let raw = config.get_raw("k").unwrap();
        assert_eq!(raw.value, "first");
        assert_eq!(raw.source, "first");
        assert_eq!(raw.ordinal, 100);
    }

    #[test]
    fn test_env_overrides_properties_file() {
        let file = PropertiesConfigSource::parse("file", "test.target.route=http://file\n").unwrap();
        let env = EnvConfigSource::from_vars([("TEST_TARGET_ROUTE", "http://env")]);
        let config = Config::new(vec![Arc::new(file), Arc::new(env)]);

        assert_eq!(config.get_value::<String>("test.target.route").unwrap(), "http://env");
    }

    #[test]
    fn test_plain_file_key_not_shadowed_by_upper_case_env() {
        let file = PropertiesConfigSource::parse("file", "home=/from/file\n").unwrap();
        let env = EnvConfigSource::from_vars([("HOME", "/root-from-env")]);
        let config = Config::new(vec![Arc::new(file), Arc::new(env)]);

        assert_eq!(config.get_value::<String>("home").unwrap(), "/from/file");
        assert_eq!(config.get_raw("home").unwrap().ordinal, 100);
    }

    #[test]
    fn test_missing_key() {
        let config = Config::new(vec![memory("a", 100, &[])]);

        assert_eq!(config.get_optional_value::<String>("absent").unwrap(), None);
        let err = config.get_value::<String>("absent").unwrap_err();
        assert!(matches!(err, ConfigError::NoSuchElement { ref key } if key == "absent"));
    }

    #[test]
    fn test_conversion_errors_propagate() {
        let config = Config::new(vec![memory(
            "a",
            100,
            &[("test.oidc.skip", "maybe"), ("test.target.readinessProbe.periodSeconds", "abc")],
        )]);

        let err = config.get_value::<bool>("test.oidc.skip").unwrap_err();
        match err {
            ConfigError::Conversion { key, value, target, .. } => {
                assert_eq!(key, "test.oidc.skip");
                assert_eq!(value, "maybe");
                assert_eq!(target, "bool");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(
            config.get_optional_value::<i32>("test.target.readinessProbe.periodSeconds"),
            Err(ConfigError::Conversion { .. })
        ));
    }

    #[test]
    fn test_no_sources() {
        let config = Config::new(Vec::new());
        assert!(config.config_sources().is_empty());
        assert!(config.property_names().is_empty());
        assert!(config.get_value::<i32>("x").unwrap_err().is_missing());
    }

    #[test]
    fn test_custom_converter() {
        let config = Config::new(vec![memory("a", 1, &[("list", "a,b,c")])]);
        let split = |value: &str| -> Result<Vec<String>, ConversionError> {
            Ok(value.split(',').map(str::to_string).collect())
        };

        let items = config.get_value_with("list", &split).unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(config.get_optional_value_with("nope", &split).unwrap(), None);
    }

    #[test]
    fn test_property_names_union() {
        let config = Config::new(vec![
            memory("a", 1, &[("x", "1"), ("y", "2")]),
            memory("b", 2, &[("y", "3"), ("z", "4")]),
        ]);
        assert_eq!(config.property_names(), vec!["x", "y", "z"]);
    }
}
