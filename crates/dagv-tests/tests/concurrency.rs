//! Concurrency tests: many validations sharing one store, and walks with
//! far more workers than blocks.

use std::sync::Arc;
use std::time::Duration;

use dagv_store::MemoryBlockStore;
use dagv_tests::{CountingStore, SlowStore, collect_dag, diamond, wide};
use dagv_validator::{CancelToken, Validator, ValidatorConfig};
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn ten_thousand_concurrent_validations() {
    let store = Arc::new(MemoryBlockStore::new());
    let d = diamond(&store).await;
    let expected_size = store.total_bytes();

    let validator = Validator::new(Arc::clone(&store), ValidatorConfig::default());
    let complete: Arc<Vec<String>> = Arc::new(d.all().iter().map(ToString::to_string).collect());
    let partial: Arc<Vec<String>> = Arc::new(vec![d.root.to_string(), "junk".to_owned()]);
    let root = Arc::new(d.root.to_string());

    let mut tasks = JoinSet::new();
    for i in 0..10_000 {
        let validator = validator.clone();
        let candidates = if i % 2 == 0 {
            Arc::clone(&complete)
        } else {
            Arc::clone(&partial)
        };
        let root = Arc::clone(&root);
        tasks.spawn(async move {
            let result = validator
                .validate(&CancelToken::new(), &root, Some(candidates.as_slice()))
                .await
                .expect("validate should return a result");
            (i, result)
        });
    }

    let mut seen = 0;
    while let Some(joined) = tasks.join_next().await {
        let (i, result) = joined.expect("validation task panicked");
        assert!(result.is_consistent());
        assert_eq!(result.reachable_size, expected_size);
        if i % 2 == 0 {
            assert!(result.is_complete && result.can_restore);
        } else {
            assert_eq!(result.invalid_blocks, vec!["junk"]);
            assert_eq!(result.missing_blocks.len(), 3);
            assert!(!result.can_restore);
        }
        seen += 1;
    }
    assert_eq!(seen, 10_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn oversubscribed_walk_reads_each_block_once() {
    let inner = MemoryBlockStore::new();
    let root = wide(&inner, 300, 3).await;
    let expected_size = inner.total_bytes();
    let block_count = inner.len();
    let store = Arc::new(CountingStore::new(inner));

    let config = ValidatorConfig::default().with_max_concurrency(1024);
    let result = Validator::new(Arc::clone(&store), config)
        .validate::<&str>(&CancelToken::new(), &root.to_string(), Some(&[][..]))
        .await
        .unwrap();

    assert_eq!(result.reachable_size, expected_size);
    assert_eq!(result.missing_blocks.len(), block_count);
    assert_eq!(store.max_reads(), 1);
    assert_eq!(store.reads_of(&root), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_subtrees_counted_once_under_latency() {
    let inner = MemoryBlockStore::new();
    let d = diamond(&inner).await;
    let expected_size = inner.total_bytes();
    let store = Arc::new(SlowStore::new(inner, Duration::from_millis(5)));
    let all: Vec<String> = collect_dag(store.as_ref(), d.root)
        .await
        .iter()
        .map(ToString::to_string)
        .collect();

    let config = ValidatorConfig::default().with_max_concurrency(64);
    let validator = Validator::new(store, config);
    for _ in 0..20 {
        let result = validator
            .validate(&CancelToken::new(), &d.root.to_string(), Some(all.as_slice()))
            .await
            .unwrap();
        assert!(result.is_complete);
        assert_eq!(result.reachable_size, expected_size);
    }
}

#[tokio::test]
async fn single_worker_matches_many_workers() {
    let store = Arc::new(MemoryBlockStore::new());
    let root = wide(&store, 120, 5).await;
    let all: Vec<String> = collect_dag(store.as_ref(), root)
        .await
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut sizes = Vec::new();
    for workers in [1, 2, 16, 256] {
        let config = ValidatorConfig::default().with_max_concurrency(workers);
        let result = Validator::new(Arc::clone(&store), config)
            .validate(&CancelToken::new(), &root.to_string(), Some(all.as_slice()))
            .await
            .unwrap();
        assert!(result.is_complete, "incomplete with {workers} workers");
        sizes.push(result.reachable_size);
    }
    assert!(sizes.iter().all(|s| *s == store.total_bytes()));
}
