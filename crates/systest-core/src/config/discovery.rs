//! Built-in config source providers

use std::sync::Arc;

use tracing::debug;

use super::context::LoadingContext;
use super::env::EnvConfigSource;
use super::file::PropertiesConfigSource;
use super::system::SystemPropertiesConfigSource;
use super::traits::{ConfigResult, ConfigSourceProvider, SharedConfigSource};

/// Resource holding per-project test configuration defaults
pub const TEST_CONFIG_RESOURCE: &str = "META-INF/test-config.properties";

/// Provides the process-level sources: system properties and environment
///
/// These do not depend on the loading context.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessConfigSourceProvider;

impl ConfigSourceProvider for ProcessConfigSourceProvider {
    fn name(&self) -> &str {
        "process"
    }

    fn config_sources(&self, _context: &LoadingContext) -> ConfigResult<Vec<SharedConfigSource>> {
        let sources: Vec<SharedConfigSource> = vec![
            Arc::new(SystemPropertiesConfigSource::new()),
            Arc::new(EnvConfigSource::new()),
        ];
        Ok(sources)
    }
}

/// Provides one properties source per matching resource under the context roots
///
/// Roots without the resource are skipped. A resource that exists but
/// cannot be read or parsed fails discovery.
#[derive(Debug, Clone)]
pub struct PropertiesResourceProvider {
    resource: String,
}

impl PropertiesResourceProvider {
    /// Provider for an arbitrary resource name
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
        }
    }

    /// Resource name this provider searches for
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl Default for PropertiesResourceProvider {
    fn default() -> Self {
        Self::new(TEST_CONFIG_RESOURCE)
    }
}

impl ConfigSourceProvider for PropertiesResourceProvider {
    fn name(&self) -> &str {
        "properties-resource"
    }

    fn config_sources(&self, context: &LoadingContext) -> ConfigResult<Vec<SharedConfigSource>> {
        let mut sources: Vec<SharedConfigSource> = Vec::new();
        for path in context.resource_candidates(&self.resource) {
            match PropertiesConfigSource::load_if_exists(&path)? {
                Some(source) => sources.push(Arc::new(source)),
                None => debug!(path = %path.display(), "no config resource"),
            }
        }
        Ok(sources)
    }
}

/// The providers every resolver starts with
pub fn default_providers() -> Vec<Arc<dyn ConfigSourceProvider>> {
    let providers: Vec<Arc<dyn ConfigSourceProvider>> = vec![
        Arc::new(ProcessConfigSourceProvider),
        Arc::new(PropertiesResourceProvider::default()),
    ];
    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    fn write_resource(root: &std::path::Path, content: &str) {
        let dir = root.join("META-INF");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("test-config.properties"), content).unwrap();
    }

    #[test]
    fn test_resource_provider_discovers_in_root_order() {
        let first = tempdir().unwrap();
        let missing = tempdir().unwrap();
        let second = tempdir().unwrap();
        write_resource(first.path(), "k=first\n");
        write_resource(second.path(), "k=second\n");

        let ctx = LoadingContext::new([first.path(), missing.path(), second.path()]);
        let sources = PropertiesResourceProvider::default().config_sources(&ctx).unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].get_value("k"), Some("first".to_string()));
        assert_eq!(sources[1].get_value("k"), Some("second".to_string()));
    }

    #[test]
    fn test_resource_provider_empty_context() {
        let sources = PropertiesResourceProvider::default()
            .config_sources(&LoadingContext::empty())
            .unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_resource_provider_reports_malformed_resource() {
        let root = tempdir().unwrap();
        write_resource(root.path(), "bad=\\uZZZZ\n");

        let ctx = LoadingContext::new([root.path()]);
        let err = PropertiesResourceProvider::default().config_sources(&ctx).err().unwrap();
        assert!(matches!(err, ConfigError::Malformed { line: 1, .. }));
    }

    #[test]
    #[serial]
    fn test_process_provider() {
        let sources = ProcessConfigSourceProvider
            .config_sources(&LoadingContext::empty())
            .unwrap();
        let ordinals: Vec<_> = sources.iter().map(|s| s.ordinal()).collect();
        assert_eq!(ordinals, vec![400, 300]);
    }

    #[test]
    fn test_custom_resource_name() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("extra.properties"), "x=1\n").unwrap();

        let provider = PropertiesResourceProvider::new("extra.properties");
        assert_eq!(provider.resource(), "extra.properties");

        let sources = provider.config_sources(&LoadingContext::new([root.path()])).unwrap();
        assert_eq!(sources.len(), 1);
    }
}
