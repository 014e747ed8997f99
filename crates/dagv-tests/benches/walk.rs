use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dagv_store::MemoryBlockStore;
use dagv_tests::{collect_dag, wide};
use dagv_types::ContentId;
use dagv_validator::{CancelToken, Validator, ValidatorConfig};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn tree(rt: &Runtime, leaves: usize) -> (Arc<MemoryBlockStore>, ContentId, Vec<String>) {
    let store = Arc::new(MemoryBlockStore::new());
    let (root, all) = rt.block_on(async {
        let root = wide(&store, leaves, 16).await;
        (root, collect_dag(store.as_ref(), root).await)
    });
    let candidates = all.iter().map(ToString::to_string).collect();
    (store, root, candidates)
}

fn bench_validate_by_size(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("validate_tree");

    for leaves in [16, 256, 4096] {
        let (store, root, candidates) = tree(&rt, leaves);
        let root = root.to_string();
        let validator = Validator::new(store, ValidatorConfig::default());

        group.throughput(Throughput::Elements(candidates.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(leaves), &leaves, |b, _| {
            b.iter(|| {
                rt.block_on(validator.validate(
                    &CancelToken::new(),
                    &root,
                    Some(candidates.as_slice()),
                ))
                .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_walk_concurrency(c: &mut Criterion) {
    let rt = runtime();
    let (store, root, _) = tree(&rt, 4096);
    let root = root.to_string();
    let mut group = c.benchmark_group("walk_concurrency");

    for workers in [1, 4, 16, 64] {
        let config = ValidatorConfig::default().with_max_concurrency(workers);
        let validator = Validator::new(Arc::clone(&store), config);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                rt.block_on(validator.validate::<&str>(&CancelToken::new(), &root, Some(&[][..])))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validate_by_size, bench_walk_concurrency);
criterion_main!(benches);
