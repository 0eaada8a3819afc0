use rivet_core::{Container, ContainerRef, DiError, Parameter, TypeDescriptor};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Repository {
    name: String,
}

struct Service {
    repo: Arc<Repository>,
}

fn repository() -> TypeDescriptor {
    TypeDescriptor::concrete("Repository").constructor(|_| {
        Ok(Repository {
            name: "default".to_string(),
        })
    })
}

fn service() -> TypeDescriptor {
    TypeDescriptor::concrete("Service")
        .parameter(Parameter::service("r", "Repository"))
        .constructor(|args| {
            Ok(Service {
                repo: args.get::<Repository>(0)?,
            })
        })
}

#[test]
fn test_resolve_with_dependency() {
    let container = Container::builder()
        .register_type(repository())
        .register_type(service())
        .build();

    let resolved = container.get_as::<Service>("Service").unwrap();
    assert_eq!(resolved.repo.name, "default");
}

#[test]
fn test_register_type_at_runtime() {
    let container = Container::new();
    assert!(!container.has("Repository"));

    container.register_type(repository());

    assert!(container.has("Repository"));
    assert!(container.get("Repository").is_ok());
}

#[test]
fn test_resolve_nonexistent() {
    let container = Container::new();
    let err = container.get("Ghost").unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Ghost"));
}

#[test]
fn test_has_does_not_instantiate() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let container = Container::builder()
        .register_type(TypeDescriptor::concrete("Repository").constructor(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Repository {
                name: "counted".to_string(),
            })
        }))
        .build();

    assert!(container.has("Repository"));
    assert!(!container.has("Ghost"));
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn test_has_rejects_interfaces_and_abstracts() {
    let container = Container::builder()
        .register_type(TypeDescriptor::interface("LoggerInterface"))
        .register_type(TypeDescriptor::abstract_type("BaseRepository").constructor(|_| Ok(())))
        .build();

    assert!(!container.has("LoggerInterface"));
    assert!(!container.has("BaseRepository"));
}

#[test]
fn test_has_self_and_shared() {
    let container = Container::new();
    assert!(container.has(Container::SELF_ID));

    container.share_value("Config", 42_u32);
    assert!(container.has("Config"));
}

struct Locator {
    container: Arc<ContainerRef>,
}

fn locator() -> TypeDescriptor {
    TypeDescriptor::concrete("Locator")
        .parameter(Parameter::service("container", Container::SELF_ID))
        .constructor(|args| {
            Ok(Locator {
                container: args.get::<ContainerRef>(0)?,
            })
        })
}

#[test]
fn test_container_resolves_itself_as_dependency() {
    let container = Container::builder()
        .register_type(repository())
        .register_type(locator())
        .build();

    let locator = container.get_as::<Locator>("Locator").unwrap();
    assert!(locator.container.has("Repository"));
    assert!(locator.container.get_as::<Repository>("Repository").is_ok());
}

#[test]
fn test_shared_self_dependent_type_does_not_keep_container_alive() {
    let container = Container::builder()
        .register_type(repository())
        .register_type(locator().shared())
        .build();

    let locator = container.get_as::<Locator>("Locator").unwrap();
    assert_eq!(container.shared_ids(), vec!["Locator"]);

    let handle = container.downgrade();
    drop(container);

    assert!(handle.upgrade().is_none());
    assert!(!locator.container.has("Repository"));
    assert!(matches!(
        locator.container.get("Repository"),
        Err(DiError::ContainerDropped)
    ));
}

#[test]
fn test_share_value_overrides() {
    let container = Container::builder().register_type(repository()).build();

    let custom = container.share_value(
        "Repository",
        Repository {
            name: "custom".to_string(),
        },
    );

    let resolved = container.get_as::<Repository>("Repository").unwrap();
    assert!(Arc::ptr_eq(&resolved, &custom));
    assert_eq!(resolved.name, "custom");
}

#[test]
fn test_forget_clears_shared_entry() {
    let container = Container::builder()
        .register_type(repository().shared())
        .build();

    let first = container.get("Repository").unwrap();
    assert_eq!(container.shared_ids(), vec!["Repository"]);

    let removed = container.forget("Repository").unwrap();
    assert!(Arc::ptr_eq(&removed, &first));
    assert!(container.shared_ids().is_empty());

    let second = container.get("Repository").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_get_as_type_mismatch() {
    let container = Container::builder().register_type(repository()).build();

    match container.get_as::<Service>("Repository") {
        Err(DiError::TypeMismatch { id, .. }) => assert_eq!(id, "Repository"),
        other => panic!("expected type mismatch, got {:?}", other.err()),
    }
}

#[test]
fn test_constructor_failure_is_wrapped() {
    let container = Container::builder()
        .register_type(
            TypeDescriptor::concrete("Database")
                .constructor::<(), _>(|_| Err("connection refused".into())),
        )
        .build();

    let err = container.get("Database").unwrap_err();
    assert!(matches!(err, DiError::Construction { ref type_id, .. } if type_id == "Database"));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn test_registered_ids_sorted() {
    let container = Container::builder()
        .register_type(service())
        .register_type(repository())
        .build();

    assert_eq!(container.registered_ids(), vec!["Repository", "Service"]);
}

#[test]
fn test_clone_shares_state() {
    let container = Container::builder()
        .register_type(repository().shared())
        .build();
    let handle = container.clone();

    let a = container.get("Repository").unwrap();
    let b = handle.get("Repository").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_concurrent_shared_resolution_yields_one_instance() {
    let container = Container::builder()
        .register_type(repository().shared())
        .build();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            std::thread::spawn(move || container.get("Repository").unwrap())
        })
        .collect();

    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
}
