//! Testing utilities for code wired through the Rivet container.
//!
//! ## Features
//!
//! - 🧪 **TestContainer** - Container with construction tracking and mock shortcuts
//! - 👁️ **ConstructionSpy** - Per-identifier constructor call counts
//! - ✅ **Assertions** - Instance identity and resolution error checks
//!
//! ## Quick Start
//!
//! ```
//! use rivet_core::TypeDescriptor;
//! use rivet_testing::*;
//!
//! struct Config;
//!
//! let container = TestContainer::new();
//! container.register(TypeDescriptor::concrete("Config").constructor(|_| Ok(Config)).shared());
//!
//! let a = container.get("Config").unwrap();
//! let b = container.get("Config").unwrap();
//! assert_same_instance(&a, &b);
//! assert_constructed(container.spy(), "Config", 1);
//!
//! assert_not_found(&container.get("Missing"));
//! ```
//!
//! ## Mocks
//!
//! ```
//! use rivet_testing::TestContainer;
//!
//! struct FakeMailer;
//!
//! let container = TestContainer::new();
//! let mock = container.register_mock("Mailer", FakeMailer);
//! let resolved = container.get_as::<FakeMailer>("Mailer").unwrap();
//! assert!(std::sync::Arc::ptr_eq(&mock, &resolved));
//! ```

mod assertions;
mod spy;
mod test_container;

pub use assertions::{
    assert_circular, assert_constructed, assert_distinct_instances, assert_not_found,
    assert_same_instance,
};
pub use spy::ConstructionSpy;
pub use test_container::TestContainer;
