//! Per-context `Config` registry
//!
//! There is exactly one `Config` per loading context for the life of a
//! resolver. The process-wide default resolver backs [`ConfigProvider`].

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::context::LoadingContext;
use super::discovery::default_providers;
use super::resolved::Config;
use super::traits::{ConfigResult, ConfigSourceProvider, SharedConfigSource};

type ConfigCell = Arc<OnceCell<Arc<Config>>>;

/// Builds and caches one `Config` per loading context
///
/// # Thread Safety
///
/// Concurrent first calls for the same context run discovery once and
/// all observe the same instance. Discovery for different contexts does
/// not block each other. A failed build is not cached, so a later call
/// retries it.
pub struct ConfigProviderResolver {
    providers: RwLock<Vec<Arc<dyn ConfigSourceProvider>>>,
    configs: Mutex<HashMap<LoadingContext, ConfigCell>>,
}

impl ConfigProviderResolver {
    /// Resolver with the built-in providers
    pub fn new() -> Self {
        Self::with_providers(default_providers())
    }

    /// Resolver with an explicit provider list, consulted in order
    pub fn with_providers(providers: Vec<Arc<dyn ConfigSourceProvider>>) -> Self {
        Self {
            providers: RwLock::new(providers),
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// Add a provider for configs built after this call
    ///
    /// Configs that are already cached are not rebuilt.
    pub fn register_provider(&self, provider: Arc<dyn ConfigSourceProvider>) {
        debug!(provider = provider.name(), "registered config source provider");
        self.providers.write().push(provider);
    }

    /// Config for the implicit context of the calling process
    pub fn get_config(&self) -> ConfigResult<Arc<Config>> {
        self.get_config_for(&LoadingContext::current())
    }

    /// Config for an explicit context, built on first use
    pub fn get_config_for(&self, context: &LoadingContext) -> ConfigResult<Arc<Config>> {
        // Only the map lookup is done under the registry lock
        let cell = {
            let mut configs = self.configs.lock();
            configs.entry(context.clone()).or_default().clone()
        };
        cell.get_or_try_init(|| self.build_config(context).map(Arc::new))
            .cloned()
    }

    /// Run discovery for `context` without caching the result
    pub fn build_config(&self, context: &LoadingContext) -> ConfigResult<Config> {
        let providers = self.providers.read().clone();
        let mut sources: Vec<SharedConfigSource> = Vec::new();
        for provider in &providers {
            let discovered = provider.config_sources(context)?;
            debug!(
                provider = provider.name(),
                count = discovered.len(),
                "discovered config sources"
            );
            sources.extend(discovered);
        }

        let config = Config::new(sources);
        info!(roots = ?context.roots(), config = ?config, "built configuration");
        Ok(config)
    }

    /// Contexts with a successfully built config
    pub fn cached_contexts(&self) -> Vec<LoadingContext> {
        self.configs
            .lock()
            .iter()
            .filter(|(_, cell)| cell.get().is_some())
            .map(|(ctx, _)| ctx.clone())
            .collect()
    }
}

impl Default for ConfigProviderResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigProviderResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<String> = self
            .providers
            .read()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        f.debug_struct("ConfigProviderResolver")
            .field("providers", &providers)
            .field("contexts", &self.configs.lock().len())
            .finish()
    }
}

// Global resolver instance
static DEFAULT_RESOLVER: Lazy<ConfigProviderResolver> = Lazy::new(ConfigProviderResolver::new);

/// The process-wide resolver
pub fn default_resolver() -> &'static ConfigProviderResolver {
    &DEFAULT_RESOLVER
}

/// Entry point to the process-wide resolver
///
/// # Example
///
/// ```no_run
/// use systest_core::config::ConfigProvider;
///
/// let config = ConfigProvider::get_config().expect("configuration should load");
/// let route: String = config.get_value("test.target.route").expect("route is required");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConfigProvider;

impl ConfigProvider {
    /// Config for the implicit loading context
    pub fn get_config() -> ConfigResult<Arc<Config>> {
        DEFAULT_RESOLVER.get_config()
    }

    /// Config for an explicit loading context
    pub fn get_config_for(context: &LoadingContext) -> ConfigResult<Arc<Config>> {
        DEFAULT_RESOLVER.get_config_for(context)
    }
}
