// Configuration management for the Rivet container

pub mod container_config;
pub mod error;
pub mod loader;
pub mod validation;

pub use container_config::{ContainerConfig, ScalarValue, TypeConfig};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use rivet_core::ContainerBuilder;
use std::path::Path;

/// Load a configuration file (format from its extension) and apply it
pub fn configure_from_file(
    builder: ContainerBuilder,
    path: impl AsRef<Path>,
) -> Result<ContainerBuilder> {
    let path = path.as_ref();
    let config = ConfigLoader::auto(path)?.load_container_config(path)?;
    config.apply(builder)
}

/// Parse configuration text and apply it
pub fn configure_from_str(
    builder: ContainerBuilder,
    content: &str,
    format: FileFormat,
) -> Result<ContainerBuilder> {
    let value = ConfigLoader::new(format).parse(content)?;
    ContainerConfig::from_value(value)?.apply(builder)
}
