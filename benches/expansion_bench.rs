use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::path::PathBuf;
use suite_runner::core::collection::{Collection, Facet, FacetConfig};
use suite_runner::core::config::SuiteRun;
use suite_runner::core::dispatch::build_descriptors;
use suite_runner::core::planner::{expand_collection, plan_suite};

/// Four facets of six configs each: 1296 jobs.
fn wide_collection() -> Collection {
    let facets = ["clusters", "fs", "tasks", "workloads"]
        .iter()
        .map(|facet| Facet {
            name: facet.to_string(),
            configs: (0..6)
                .map(|i| FacetConfig {
                    name: format!("{facet}-{i}.yaml"),
                    path: PathBuf::from(format!("/suites/rados/{facet}/{facet}-{i}.yaml")),
                })
                .collect(),
        })
        .collect();
    Collection {
        name: "rados".to_string(),
        path: PathBuf::from("/suites/rados"),
        facets,
    }
}

fn bench_expand_collection(c: &mut Criterion) {
    let collection = wide_collection();

    c.bench_function("expand_collection", |b| {
        b.iter(|| expand_collection(black_box(&collection), 1));
    });
}

fn bench_build_descriptors(c: &mut Criterion) {
    let plan = plan_suite(vec![wide_collection()], 2);
    let suite = SuiteRun {
        override_config_paths: vec![PathBuf::from("/overrides/base.yaml")],
        ..SuiteRun::new("nightly")
    };

    c.bench_function("build_descriptors", |b| {
        b.iter(|| build_descriptors(black_box(&suite), black_box(&plan)));
    });
}

criterion_group!(benches, bench_expand_collection, bench_build_descriptors);
criterion_main!(benches);
