use criterion::{Criterion, criterion_group, criterion_main};
use rivet::{Container, Parameter, TypeDescriptor};
use std::hint::black_box;
use std::sync::Arc;

struct Repository;

#[allow(dead_code)]
struct Service {
    repo: Arc<Repository>,
}

fn container(shared_repo: bool) -> Container {
    let repo = TypeDescriptor::concrete("Repository").constructor(|_| Ok(Repository));
    let repo = if shared_repo { repo.shared() } else { repo };

    Container::builder()
        .register_type(repo)
        .register_type(
            TypeDescriptor::concrete("Service")
                .parameter(Parameter::service("repo", "Repository"))
                .constructor(|args| {
                    Ok(Service {
                        repo: args.get::<Repository>(0)?,
                    })
                }),
        )
        .build()
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    let prototype = container(false);
    group.bench_function("prototype_graph", |b| {
        b.iter(|| prototype.get(black_box("Service")).unwrap())
    });

    let shared = container(true);
    group.bench_function("shared_dependency", |b| {
        b.iter(|| shared.get(black_box("Service")).unwrap())
    });

    shared.get("Repository").unwrap();
    group.bench_function("cache_hit", |b| {
        b.iter(|| shared.get(black_box("Repository")).unwrap())
    });

    group.finish();
}

fn bench_has(c: &mut Criterion) {
    let container = container(false);
    c.bench_function("has", |b| b.iter(|| container.has(black_box("Service"))));
}

criterion_group!(benches, bench_resolution, bench_has);
criterion_main!(benches);
