//! Integration tests for common Rivet workflows.
//!
//! These tests wire small applications end to end through the facade crate.

use rivet::prelude::*;
use rivet_testing::{assert_constructed, assert_same_instance, TestContainer};
use std::sync::Arc;
use std::sync::Mutex;

// =============================================================================
// Application wiring
// =============================================================================

trait Logger: Send + Sync {
    fn log(&self, line: &str);
    fn lines(&self) -> Vec<String>;
}

#[derive(Default)]
struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl Logger for MemoryLogger {
    fn log(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

struct UserRepository {
    logger: Arc<dyn Logger>,
    table: String,
}

impl UserRepository {
    fn find(&self, id: u32) -> String {
        self.logger.log(&format!("select {} from {}", id, self.table));
        format!("user-{}", id)
    }
}

struct UserService {
    repo: Arc<UserRepository>,
    audit: Option<Arc<dyn Logger>>,
}

fn application() -> ContainerBuilder {
    Container::builder()
        .register_type(TypeDescriptor::interface("LoggerInterface"))
        .register_type(
            TypeDescriptor::concrete("MemoryLogger")
                .implements("LoggerInterface")
                .constructor(|_| Ok(Arc::new(MemoryLogger::default()) as Arc<dyn Logger>))
                .shared(),
        )
        .register_type(
            TypeDescriptor::concrete("UserRepository")
                .parameter(Parameter::service("logger", "LoggerInterface"))
                .parameter(Parameter::builtin("table", Builtin::String).with_default("users".to_string()))
                .prefer("LoggerInterface", "MemoryLogger")
                .constructor(|args| {
                    Ok(UserRepository {
                        logger: args.value::<Arc<dyn Logger>>(0)?,
                        table: args.value::<String>(1)?,
                    })
                })
                .shared(),
        )
        .register_type(
            TypeDescriptor::concrete("UserService")
                .parameter(Parameter::service("repo", "UserRepository"))
                .parameter(
                    Parameter::service("audit", "AuditLogger")
                        .with_default::<Option<Arc<dyn Logger>>>(None),
                )
                .constructor(|args| {
                    Ok(UserService {
                        repo: args.get::<UserRepository>(0)?,
                        audit: args.value::<Option<Arc<dyn Logger>>>(1)?,
                    })
                }),
        )
}

#[test]
fn test_application_graph() {
    let container = application().build();

    let service = container.get_as::<UserService>("UserService").unwrap();
    assert!(service.audit.is_none());
    assert_eq!(service.repo.find(7), "user-7");

    let logger = container.get_as::<Arc<dyn Logger>>("MemoryLogger").unwrap();
    assert_eq!(logger.lines(), vec!["select 7 from users"]);
}

#[test]
fn test_services_share_repository() {
    let container = application().build();

    let a = container.get_as::<UserService>("UserService").unwrap();
    let b = container.get_as::<UserService>("UserService").unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_same_instance(&a.repo, &b.repo);
}

#[test]
fn test_bound_table_name() {
    let container = application()
        .bind_value("UserRepository", "table", "accounts".to_string())
        .build();

    let repo = container.get_as::<UserRepository>("UserRepository").unwrap();
    assert_eq!(repo.table, "accounts");
}

#[test]
fn test_swap_logger_with_configuration() {
    let builder = application().register_type(
        TypeDescriptor::concrete("QuietLogger")
            .implements("LoggerInterface")
            .constructor(|_| Ok(Arc::new(MemoryLogger::default()) as Arc<dyn Logger>)),
    );

    let json = r#"{
        "types": {
            "UserRepository": {
                "shared": false,
                "preferences": { "LoggerInterface": "QuietLogger" },
                "parameters": { "table": "people" }
            }
        }
    }"#;
    let container = rivet_config::configure_from_str(builder, json, rivet_config::FileFormat::Json)
        .unwrap()
        .build();

    let a = container.get_as::<UserRepository>("UserRepository").unwrap();
    let b = container.get_as::<UserRepository>("UserRepository").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a.logger, &b.logger));
    assert_eq!(a.table, "people");
}

#[test]
fn test_counting_constructions() {
    let container = TestContainer::from_builder(application());

    for _ in 0..3 {
        container.get("UserService").unwrap();
    }

    assert_constructed(container.spy(), "UserService", 3);
    assert_constructed(container.spy(), "UserRepository", 1);
    assert_constructed(container.spy(), "MemoryLogger", 1);
}

// =============================================================================
// Custom plugins
// =============================================================================

/// Resolves every `*Clock` parameter to a fixed value
struct FixedClock;

impl Plugin<Context, Instance> for FixedClock {
    fn name(&self) -> &'static str {
        "fixed-clock"
    }

    fn handle(&self, ctx: &mut Context, next: Next<'_, Context, Instance>) -> Result<Instance> {
        let parameter = ctx.current_parameter()?;
        match parameter.declared().named() {
            Some(declared) if declared.ends_with("Clock") => Ok(Arc::new(1_700_000_000_u64)),
            _ => next.run(ctx),
        }
    }
}

#[test]
fn test_custom_resolver_plugin() {
    struct Token {
        issued_at: u64,
    }

    let container = Container::builder()
        .register_resolver(FixedClock, rivet::resolver::priority::BOUND_VALUE + 100)
        .register_type(
            TypeDescriptor::concrete("Token")
                .parameter(Parameter::service("clock", "SystemClock"))
                .constructor(|args| {
                    Ok(Token {
                        issued_at: args.value::<u64>(0)?,
                    })
                }),
        )
        .build();

    assert_eq!(
        container.get_as::<Token>("Token").unwrap().issued_at,
        1_700_000_000
    );
}

#[test]
fn test_lifecycle_plugin_sees_every_instance() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    impl Plugin<Context, ()> for Counting {
        fn handle(&self, ctx: &mut Context, next: Next<'_, Context, ()>) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            next.run(ctx)
        }
    }

    let seen = Arc::new(AtomicUsize::new(0));
    let container = application()
        .register_lifecycle(Counting(seen.clone()), 1_000)
        .build();

    container.get("UserService").unwrap();
    container.get("UserService").unwrap();

    // UserService twice; the shared repository and logger once each
    assert_eq!(seen.load(Ordering::SeqCst), 4);
}
