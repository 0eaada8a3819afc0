//! Declarative container configuration.
//!
//! A [`ContainerConfig`] overlays registered descriptors at bootstrap: shared
//! and lazy flags, class-level preferences and scalar parameter bindings.
//! Global preferences reach every registered type that declares none of its
//! own for the same declared type; per-type preferences win over both.
//!
//! Scalar bindings arrive in constructors as `bool`, `i64`, `f64` or `String`.

use crate::validation::ConfigValidator;
use crate::{ConfigError, Result};
use rivet_core::logging::debug;
use rivet_core::{ContainerBuilder, Instance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    pub interface_suffix: Option<String>,
    /// Declared type -> implementation, for every registered type
    pub preferences: BTreeMap<String, String>,
    pub types: BTreeMap<String, TypeConfig>,
}

/// Overrides for one registered type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeConfig {
    pub shared: Option<bool>,
    pub lazy: Option<bool>,
    pub preferences: BTreeMap<String, String>,
    pub parameters: BTreeMap<String, ScalarValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ScalarValue {
    pub fn into_instance(self) -> Instance {
        match self {
            ScalarValue::Bool(value) => Arc::new(value),
            ScalarValue::Int(value) => Arc::new(value),
            ScalarValue::Float(value) => Arc::new(value),
            ScalarValue::String(value) => Arc::new(value),
        }
    }
}

impl ContainerConfig {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Validate against the builder's registry, then apply every override
    pub fn apply(&self, builder: ContainerBuilder) -> Result<ContainerBuilder> {
        ConfigValidator::new(builder.types()).validate(self)?;

        let mut builder = match &self.interface_suffix {
            Some(suffix) => builder.interface_suffix(suffix.clone()),
            None => builder,
        };

        if !self.preferences.is_empty() {
            let registry = builder.registry_mut();
            let ids: Vec<String> = registry.ids().map(String::from).collect();
            for id in ids {
                registry.update(&id, |descriptor| {
                    for (declared, implementation) in &self.preferences {
                        if descriptor.preference_for(declared).is_none() {
                            descriptor.insert_preference(declared.clone(), implementation.clone());
                        }
                    }
                });
            }
        }

        for (id, overrides) in &self.types {
            builder.registry_mut().update(id, |descriptor| {
                descriptor.set_shared_flag(overrides.shared);
                if let Some(lazy) = overrides.lazy {
                    descriptor.set_lazy(lazy);
                }
                for (declared, implementation) in &overrides.preferences {
                    descriptor.insert_preference(declared.clone(), implementation.clone());
                }
            });

            for (parameter, value) in &overrides.parameters {
                builder = builder.bind_parameter(id.clone(), parameter.clone(), value.clone().into_instance());
            }
            debug!(id = %id, "Applied configuration overrides");
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_values_deserialize_by_shape() {
        let config: TypeConfig = serde_json::from_value(serde_json::json!({
            "parameters": { "debug": true, "retries": 3, "ratio": 0.5, "dsn": "sqlite::memory:" }
        }))
        .unwrap();

        assert_eq!(config.parameters["debug"], ScalarValue::Bool(true));
        assert_eq!(config.parameters["retries"], ScalarValue::Int(3));
        assert_eq!(config.parameters["ratio"], ScalarValue::Float(0.5));
        assert_eq!(
            config.parameters["dsn"],
            ScalarValue::String("sqlite::memory:".to_string())
        );
    }

    #[test]
    fn test_scalar_instance_types() {
        let instance = ScalarValue::Int(3).into_instance();
        assert_eq!(instance.downcast_ref::<i64>(), Some(&3));

        let instance = ScalarValue::String("x".to_string()).into_instance();
        assert_eq!(instance.downcast_ref::<String>().map(String::as_str), Some("x"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = ContainerConfig::from_value(serde_json::json!({ "singletons": ["A"] }));
        assert!(matches!(result, Err(ConfigError::DeserializationError(_))));
    }

    #[test]
    fn test_empty_config() {
        let config = ContainerConfig::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config, ContainerConfig::default());
    }
}
