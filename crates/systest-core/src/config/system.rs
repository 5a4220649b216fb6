//! Process-level "system property" overrides
//!
//! Tests and harnesses can set key/value overrides for the whole process,
//! either programmatically or from `-Dkey=value` style arguments. They
//! outrank both environment variables and properties files.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::traits::ConfigSource;

/// Default ordinal of the system property source
pub const SYSTEM_PROPERTIES_ORDINAL: i32 = 400;

/// Store for process-level property overrides
#[derive(Debug, Default)]
pub struct SystemProperties {
    properties: RwLock<HashMap<String, String>>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self {
            properties: RwLock::new(HashMap::new()),
        }
    }

    /// Set a property, returning the previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.write().insert(key.into(), value.into())
    }

    /// Get a property
    pub fn get(&self, key: &str) -> Option<String> {
        self.properties.read().get(key).cloned()
    }

    /// Remove a property, returning its value
    pub fn remove(&self, key: &str) -> Option<String> {
        self.properties.write().remove(key)
    }

    /// Copy of all properties
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.properties.read().clone()
    }

    /// Apply every `-Dkey=value` argument, ignoring anything else
    ///
    /// A bare `-Dkey` sets an empty value. Returns the number of
    /// properties applied.
    pub fn load_from_args<I, S>(&self, args: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut applied = 0;
        let mut properties = self.properties.write();
        for arg in args {
            if let Some((key, value)) = parse_define(arg.as_ref()) {
                properties.insert(key.to_string(), value.to_string());
                applied += 1;
            }
        }
        applied
    }
}

fn parse_define(arg: &str) -> Option<(&str, &str)> {
    let define = arg.strip_prefix("-D")?;
    let (key, value) = define.split_once('=').unwrap_or((define, ""));
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

// Global store instance
static GLOBAL_PROPERTIES: Lazy<SystemProperties> = Lazy::new(SystemProperties::new);

/// The process-wide system property store
pub fn system_properties() -> &'static SystemProperties {
    &GLOBAL_PROPERTIES
}

/// Set a process-wide system property
pub fn set_system_property(key: impl Into<String>, value: impl Into<String>) -> Option<String> {
    GLOBAL_PROPERTIES.set(key, value)
}

/// Get a process-wide system property
pub fn get_system_property(key: &str) -> Option<String> {
    GLOBAL_PROPERTIES.get(key)
}

/// Remove a process-wide system property
pub fn remove_system_property(key: &str) -> Option<String> {
    GLOBAL_PROPERTIES.remove(key)
}

/// Configuration source over a snapshot of the system properties
#[derive(Debug, Clone)]
pub struct SystemPropertiesConfigSource {
    properties: HashMap<String, String>,
}

impl SystemPropertiesConfigSource {
    /// Snapshot the process-wide store
    pub fn new() -> Self {
        Self::from_store(system_properties())
    }

    /// Snapshot a specific store
    pub fn from_store(store: &SystemProperties) -> Self {
        Self {
            properties: store.snapshot(),
        }
    }
}

impl Default for SystemPropertiesConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for SystemPropertiesConfigSource {
    fn name(&self) -> &str {
        "system-properties"
    }

    fn ordinal(&self) -> i32 {
        SYSTEM_PROPERTIES_ORDINAL
    }

    fn get_value(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn properties(&self) -> HashMap<String, String> {
        self.properties.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_store_crud() {
        let store = SystemProperties::new();
        assert_eq!(store.get("target.route"), None);

        assert_eq!(store.set("target.route", "http://a"), None);
        assert_eq!(store.set("target.route", "http://b"), Some("http://a".to_string()));
        assert_eq!(store.get("target.route"), Some("http://b".to_string()));

        assert_eq!(store.remove("target.route"), Some("http://b".to_string()));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_load_from_args() {
        let store = SystemProperties::new();
        let applied = store.load_from_args([
            "--nocapture",
            "-Dtarget.route=http://localhost:8080",
            "-Dtest.oidc.skip",
            "-Dkey=a=b",
            "-D",
            "-D=value",
            "plain",
        ]);

        assert_eq!(applied, 3);
        assert_eq!(store.get("target.route"), Some("http://localhost:8080".to_string()));
        assert_eq!(store.get("test.oidc.skip"), Some(String::new()));
        assert_eq!(store.get("key"), Some("a=b".to_string()));
        assert_eq!(store.snapshot().len(), 3);
    }

    #[test]
    fn test_source_snapshots_store() {
        let store = SystemProperties::new();
        store.set("a", "1");

        let source = SystemPropertiesConfigSource::from_store(&store);
        store.set("a", "2");

        assert_eq!(source.name(), "system-properties");
        assert_eq!(source.ordinal(), 400);
        assert_eq!(source.get_value("a"), Some("1".to_string()));
    }

    #[test]
    #[serial]
    fn test_global_store() {
        set_system_property("systest.global.probe", "yes");
        assert_eq!(get_system_property("systest.global.probe"), Some("yes".to_string()));

        let source = SystemPropertiesConfigSource::new();
        assert_eq!(source.get_value("systest.global.probe"), Some("yes".to_string()));

        // Clean up
        remove_system_property("systest.global.probe");
        assert_eq!(get_system_property("systest.global.probe"), None);
    }
}
