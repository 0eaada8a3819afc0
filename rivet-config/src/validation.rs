// Configuration validation

use crate::container_config::ContainerConfig;
use crate::{ConfigError, Result};
use rivet_core::{DiError, TypeRegistry};

/// Marker for the class of a global preference in error reports
pub const GLOBAL_SCOPE: &str = "*";

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for ContainerConfig {
    /// Registry-independent checks
    fn validate(&self) -> Result<()> {
        if let Some(suffix) = &self.interface_suffix {
            ConfigValidator::not_empty(suffix, "interface_suffix")?;
        }
        for (id, overrides) in &self.types {
            ConfigValidator::not_empty(id, "type identifier")?;
            for parameter in overrides.parameters.keys() {
                ConfigValidator::not_empty(parameter, &format!("parameter name of {}", id))?;
            }
        }
        Ok(())
    }
}

/// Checks a configuration against the types it refers to
pub struct ConfigValidator<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> ConfigValidator<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Every configured type must be registered, and every preferred
    /// implementation must be registered and satisfy its declared type.
    pub fn validate(&self, config: &ContainerConfig) -> Result<()> {
        Validate::validate(config)?;

        for (declared, implementation) in &config.preferences {
            self.check_preference(GLOBAL_SCOPE, declared, implementation)?;
        }

        for (id, overrides) in &config.types {
            if !self.registry.contains(id) {
                return Err(ConfigError::UnknownType(id.clone()));
            }
            for (declared, implementation) in &overrides.preferences {
                self.check_preference(id, declared, implementation)?;
            }
        }
        Ok(())
    }

    fn check_preference(&self, class: &str, declared: &str, implementation: &str) -> Result<()> {
        if !self.registry.contains(implementation) {
            return Err(ConfigError::UnknownType(implementation.to_string()));
        }
        if !self.registry.satisfies(implementation, declared) {
            return Err(DiError::MisconfiguredPreference {
                class: class.to_string(),
                parameter: GLOBAL_SCOPE.to_string(),
                required: declared.to_string(),
                preferred: implementation.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container_config::TypeConfig;
    use rivet_core::TypeDescriptor;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::interface("CacheInterface"));
        registry.register(
            TypeDescriptor::concrete("RedisCache")
                .implements("CacheInterface")
                .constructor(|_| Ok(())),
        );
        registry.register(TypeDescriptor::concrete("Service").constructor(|_| Ok(())));
        registry
    }

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
    }

    #[test]
    fn test_valid_preference() {
        let registry = registry();
        let mut config = ContainerConfig::default();
        config
            .preferences
            .insert("CacheInterface".to_string(), "RedisCache".to_string());

        assert!(ConfigValidator::new(&registry).validate(&config).is_ok());
    }

    #[test]
    fn test_unsatisfied_preference() {
        let registry = registry();
        let mut config = ContainerConfig::default();
        config
            .preferences
            .insert("CacheInterface".to_string(), "Service".to_string());

        match ConfigValidator::new(&registry).validate(&config) {
            Err(ConfigError::Container(DiError::MisconfiguredPreference {
                class, preferred, ..
            })) => {
                assert_eq!(class, GLOBAL_SCOPE);
                assert_eq!(preferred, "Service");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_types() {
        let registry = registry();

        let mut config = ContainerConfig::default();
        config.types.insert("Ghost".to_string(), TypeConfig::default());
        assert!(matches!(
            ConfigValidator::new(&registry).validate(&config),
            Err(ConfigError::UnknownType(id)) if id == "Ghost"
        ));

        let mut config = ContainerConfig::default();
        config
            .preferences
            .insert("CacheInterface".to_string(), "MemcachedCache".to_string());
        assert!(matches!(
            ConfigValidator::new(&registry).validate(&config),
            Err(ConfigError::UnknownType(id)) if id == "MemcachedCache"
        ));
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let config = ContainerConfig {
            interface_suffix: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            Validate::validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
