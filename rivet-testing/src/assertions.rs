// Test assertions for container resolutions

use crate::spy::ConstructionSpy;
use rivet_core::{DiError, Result};
use std::sync::Arc;

/// Assert that two handles point at the same instance
pub fn assert_same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) {
    assert!(
        Arc::ptr_eq(a, b),
        "Expected the same instance, got two distinct ones"
    );
}

/// Assert that two handles point at different instances
pub fn assert_distinct_instances<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) {
    assert!(
        !Arc::ptr_eq(a, b),
        "Expected distinct instances, got the same one twice"
    );
}

/// Assert that a resolution failed because something could not be found
pub fn assert_not_found<T>(result: &Result<T>) {
    match result {
        Err(err) => assert!(
            err.is_not_found(),
            "Expected a not-found error, got: {}",
            err
        ),
        Ok(_) => panic!("Expected a not-found error, but resolution succeeded"),
    }
}

/// Assert a circular dependency error and return its trail
pub fn assert_circular<T>(result: &Result<T>) -> Vec<String> {
    match result {
        Err(DiError::CircularDependency { trail, .. }) => trail.clone(),
        Err(err) => panic!("Expected a circular dependency, got: {}", err),
        Ok(_) => panic!("Expected a circular dependency, but resolution succeeded"),
    }
}

/// Assert how many times the constructor of `id` ran
pub fn assert_constructed(spy: &ConstructionSpy, id: &str, expected: usize) {
    let actual = spy.count(id);
    assert_eq!(
        actual, expected,
        "Expected {} to be constructed {} time(s), got {}",
        id, expected, actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_identity() {
        let a = Arc::new(1);
        assert_same_instance(&a, &a.clone());
        assert_distinct_instances(&a, &Arc::new(1));
    }

    #[test]
    fn test_error_assertions() {
        let missing: Result<()> = Err(DiError::not_found("Ghost", "no type registered"));
        assert_not_found(&missing);

        let cycle: Result<()> = Err(DiError::CircularDependency {
            id: "A".to_string(),
            trail: vec!["A".to_string(), "A".to_string()],
        });
        assert_eq!(assert_circular(&cycle), vec!["A", "A"]);
    }

    #[test]
    #[should_panic(expected = "Expected a not-found error")]
    fn test_not_found_rejects_success() {
        assert_not_found(&Ok(()));
    }
}
