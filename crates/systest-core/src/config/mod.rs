//! Layered configuration
//!
//! Sources, highest priority first:
//! - `SystemPropertiesConfigSource`: process-level overrides (ordinal 400)
//! - `EnvConfigSource`: environment variables (ordinal 300)
//! - `PropertiesConfigSource`: `META-INF/test-config.properties` defaults (ordinal 100)
//!
//! `ConfigProvider` caches one `Config` per `LoadingContext`.

mod traits;
mod context;
mod convert;
mod memory;
mod env;
mod system;
mod file;
mod discovery;
mod resolved;
mod registry;

pub use traits::{ConfigError, ConfigResult, ConfigSource, ConfigSourceProvider, SharedConfigSource};
pub use context::{LoadingContext, RESOURCE_PATH_ENV};
pub use convert::{BuiltinConverter, ConversionError, Converter, FromConfigValue};
pub use memory::MemoryConfigSource;
pub use env::{EnvConfigSource, ENV_ORDINAL};
pub use system::{
    SystemProperties, SystemPropertiesConfigSource, SYSTEM_PROPERTIES_ORDINAL,
    system_properties, set_system_property, get_system_property, remove_system_property,
};
pub use file::{
    PropertiesConfigSource, PropertiesParseError, parse_properties,
    PROPERTIES_ORDINAL, CONFIG_ORDINAL_KEY,
};
pub use discovery::{
    ProcessConfigSourceProvider, PropertiesResourceProvider, default_providers,
    TEST_CONFIG_RESOURCE,
};
pub use resolved::{Config, RawValue};
pub use registry::{ConfigProvider, ConfigProviderResolver, default_resolver};
