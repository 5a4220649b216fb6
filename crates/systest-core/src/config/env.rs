//! Environment variable configuration source

use std::collections::HashMap;
use std::env;

use super::traits::ConfigSource;

/// Default ordinal of the environment source
pub const ENV_ORDINAL: i32 = 300;

/// Configuration source that reads the process environment
///
/// The environment is captured once when the source is created; later
/// changes to the process environment are not observed.
///
/// # Key Mapping
///
/// Keys are matched case-sensitively against variable names. A key that
/// is not a valid variable name (`target.route`) also matches its mapped
/// forms, first match wins:
/// - the key as-is (`target.route`)
/// - characters outside `[A-Za-z0-9_]` replaced by `_` (`target_route`)
/// - the replaced form upper-cased (`TARGET_ROUTE`)
///
/// Plain names like `home` only ever match `home`, never `HOME`.
/// [`properties`](ConfigSource::properties) lists variable names; mapped
/// keys resolve to the same entries.
///
/// # Example
///
/// ```
/// use systest_core::config::{ConfigSource, EnvConfigSource};
///
/// let source = EnvConfigSource::new();
/// // source.get_value("target.route") will check TARGET_ROUTE
/// assert_eq!(source.ordinal(), 300);
/// ```
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    vars: HashMap<String, String>,
}

impl Default for EnvConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvConfigSource {
    /// Snapshot the current process environment
    pub fn new() -> Self {
        // Variables that are not valid unicode cannot be keys or values here
        let vars = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a source from an explicit variable set
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// The sanitized variable name for a key (`a.b-c` -> `a_b_c`)
    pub fn sanitize(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }

    /// Whether `key` is subject to the name mapping
    pub fn is_mapped_key(key: &str) -> bool {
        key.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_')
    }
}

impl ConfigSource for EnvConfigSource {
    fn name(&self) -> &str {
        "env"
    }

    fn ordinal(&self) -> i32 {
        ENV_ORDINAL
    }

    fn get_value(&self, key: &str) -> Option<String> {
        if let Some(value) = self.vars.get(key) {
            return Some(value.clone());
        }
        if !Self::is_mapped_key(key) {
            return None;
        }

        let sanitized = Self::sanitize(key);
        if let Some(value) = self.vars.get(&sanitized) {
            return Some(value.clone());
        }

        self.vars.get(&sanitized.to_uppercase()).cloned()
    }

    fn properties(&self) -> HashMap<String, String> {
        self.vars.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_env_source_name_and_ordinal() {
        let source = EnvConfigSource::from_vars(Vec::<(String, String)>::new());
        assert_eq!(source.name(), "env");
        assert_eq!(source.ordinal(), 300);
    }

    #[test]
    fn test_env_source_name_mapping() {
        let source = EnvConfigSource::from_vars([
            ("TARGET_ROUTE", "http://upper"),
            ("test_oidc_skip", "true"),
            ("exact.key", "exact"),
        ]);

        assert_eq!(source.get_value("target.route"), Some("http://upper".to_string()));
        assert_eq!(source.get_value("test.oidc.skip"), Some("true".to_string()));
        assert_eq!(source.get_value("exact.key"), Some("exact".to_string()));
        assert_eq!(source.get_value("missing.key"), None);
    }

    #[test]
    fn test_env_source_exact_match_wins() {
        let source = EnvConfigSource::from_vars([
            ("target.route", "exact"),
            ("TARGET_ROUTE", "mapped"),
        ]);
        assert_eq!(source.get_value("target.route"), Some("exact".to_string()));
    }

    #[test]
    fn test_env_source_plain_keys_match_exactly() {
        let source = EnvConfigSource::from_vars([("HOME", "/root"), ("user_name", "u")]);

        assert_eq!(source.get_value("home"), None);
        assert_eq!(source.get_value("HOME"), Some("/root".to_string()));
        assert_eq!(source.get_value("USER_NAME"), None);
        assert_eq!(source.get_value("user_name"), Some("u".to_string()));
    }

    #[test]
    fn test_mapped_keys_resolve_to_listed_variables() {
        let source = EnvConfigSource::from_vars([("TARGET_ROUTE", "http://upper")]);
        let names = source.property_names();

        assert_eq!(names, vec!["TARGET_ROUTE".to_string()]);
        assert_eq!(source.get_value("target.route"), source.get_value(&names[0]));
    }

    #[test]
    fn test_is_mapped_key() {
        assert!(EnvConfigSource::is_mapped_key("target.route"));
        assert!(EnvConfigSource::is_mapped_key("a-b"));
        assert!(!EnvConfigSource::is_mapped_key("home"));
        assert!(!EnvConfigSource::is_mapped_key("user_name"));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(
            EnvConfigSource::sanitize("test.target.readinessProbe.path"),
            "test_target_readinessProbe_path"
        );
        assert_eq!(EnvConfigSource::sanitize("a-b/c"), "a_b_c");
    }

    #[test]
    #[serial]
    fn test_env_source_is_a_snapshot() {
        env::set_var("SYSTEST_SNAPSHOT_VAR", "before");
        let source = EnvConfigSource::new();
        env::set_var("SYSTEST_SNAPSHOT_VAR", "after");

        assert_eq!(
            source.get_value("SYSTEST_SNAPSHOT_VAR"),
            Some("before".to_string())
        );

        // Clean up
        env::remove_var("SYSTEST_SNAPSHOT_VAR");
    }
}
