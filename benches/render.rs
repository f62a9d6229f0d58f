use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use ujquery::prelude::*;

fn catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");
    group.bench_function("describe_all", |b| {
        b.iter(|| catalog::describe_all(black_box("idx"), default_registry()).unwrap())
    });
    group.bench_function("pretty_print", |b| {
        let descs = catalog::describe_all("idx", default_registry()).unwrap();
        b.iter(|| pretty_print_queries(black_box(&descs)))
    });
    group.finish();
}

fn builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder");
    group.bench_function("status_condition", |b| {
        b.iter_batched(
            || {
                UserJourneyQuery::user_journey("idx")
                    .for_api(K8sApiId::new("tekton.dev", "pipelineruns"))
                    .with_predicate(r#"verb=update "objectRef.subresource"="status""#)
                    .with_filter(
                        StatusConditionFilter::new("Succeeded").with_reasons(["Completed", "Failed"]),
                    )
                    .with_event_expr(r#""PipelineRun completed""#)
                    .with_fields(["status_reason", "status_message", "userId"])
            },
            |query| query.render().unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("registry_merge", |b| {
        let api = K8sApiId::new("appstudio.redhat.com", "components");
        b.iter(|| default_registry().merged(black_box(&api), std::iter::empty()))
    });
    group.finish();
}

criterion_group!(benches, catalog, builder);
criterion_main!(benches);
