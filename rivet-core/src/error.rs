// Error types for the Rivet container

use thiserror::Error;

/// Boxed error returned by user constructors and injection hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum DiError {
    #[error("Not found: {id} ({reason})")]
    NotFound { id: String, reason: String },

    #[error("Cannot resolve parameter ${parameter} of type {declared} in {class}")]
    UnresolvableParameter {
        class: String,
        parameter: String,
        declared: String,
        #[source]
        cause: Option<Box<DiError>>,
    },

    #[error("Circular dependency detected while resolving {id}: {}", .trail.join(" -> "))]
    CircularDependency { id: String, trail: Vec<String> },

    #[error("Failed to construct {type_id}: {source}")]
    Construction {
        type_id: String,
        #[source]
        source: BoxError,
    },

    #[error(
        "Misconfigured preference for {class}::${parameter}: {preferred} does not satisfy {required}"
    )]
    MisconfiguredPreference {
        class: String,
        parameter: String,
        required: String,
        preferred: String,
    },

    #[error("Injection into {class}::{method}(${parameter}) failed: {reason}")]
    Injector {
        class: String,
        method: String,
        parameter: String,
        reason: String,
        #[source]
        cause: Option<Box<DiError>>,
    },

    #[error("Injection method {class}::{method} failed: {source}")]
    InjectionMethod {
        class: String,
        method: String,
        #[source]
        source: BoxError,
    },

    #[error("The container was dropped")]
    ContainerDropped,

    #[error("No factory found for {0}")]
    NoFactory(String),

    #[error("No handler in the {0} chain produced a result")]
    NoHandler(&'static str),

    #[error("Argument #{index} missing when constructing {class}")]
    MissingArgument { class: String, index: usize },

    #[error("Type mismatch for {id}: expected {expected}")]
    TypeMismatch { id: String, expected: &'static str },

    #[error("Lazy initialization of {id} failed: {cause}")]
    LazyInitialization {
        id: String,
        #[source]
        cause: Box<DiError>,
    },
}

impl DiError {
    /// Shorthand for a [`DiError::NotFound`].
    pub fn not_found(id: impl Into<String>, reason: impl Into<String>) -> Self {
        DiError::NotFound {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True for the "nothing can satisfy this identifier" family.
    ///
    /// This is the only classification the direct-type resolver treats as
    /// recoverable; every other kind aborts the current resolution.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DiError::NotFound { .. } | DiError::UnresolvableParameter { .. }
        )
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, DiError::CircularDependency { .. })
    }
}

pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_circular_message_contains_trail() {
        let err = DiError::CircularDependency {
            id: "A".into(),
            trail: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(
            err.to_string(),
            "Circular dependency detected while resolving A: A -> B -> A"
        );
        assert!(err.is_circular());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_unresolvable_parameter_is_not_found() {
        let err = DiError::UnresolvableParameter {
            class: "Service".into(),
            parameter: "l".into(),
            declared: "LoggerInterface".into(),
            cause: Some(Box::new(DiError::not_found("LoggerInterface", "no type registered"))),
        };
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("$l"));
        assert!(msg.contains("LoggerInterface"));
        assert!(msg.contains("Service"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_construction_keeps_cause() {
        let err = DiError::Construction {
            type_id: "Db".into(),
            source: "connection refused".into(),
        };
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("connection refused".to_string())
        );
    }
}
