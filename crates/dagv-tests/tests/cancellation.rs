//! Cancellation and timeout behaviour against slow stores.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dagv_store::MemoryBlockStore;
use dagv_tests::{SlowStore, chain, collect_dag};
use dagv_validator::{CancelToken, ValidateError, Validator, ValidatorConfig};

fn strings(ids: impl IntoIterator<Item = impl ToString>) -> Vec<String> {
    ids.into_iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn cancel_during_candidate_checks_is_an_error() {
    let inner = MemoryBlockStore::new();
    let ids = chain(&inner, 50).await;
    let store = Arc::new(SlowStore::new(inner, Duration::from_millis(20)));
    let validator = Validator::new(store, ValidatorConfig::default());

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        trigger.cancel();
    });

    let candidates = strings(&ids);
    let started = Instant::now();
    let err = validator
        .validate(&cancel, &ids[0].to_string(), Some(candidates.as_slice()))
        .await
        .unwrap_err();

    assert!(matches!(err, ValidateError::Cancelled));
    // 51 sequential probes at 20ms each would take over a second.
    assert!(started.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn cancel_during_walk_returns_non_restorable_result() {
    let inner = MemoryBlockStore::new();
    let ids = chain(&inner, 200).await;
    let store = Arc::new(SlowStore::new(inner, Duration::from_millis(10)));
    let validator = Validator::new(store, ValidatorConfig::default());

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    // One candidate keeps the first pass short; the chain walk is strictly
    // sequential and needs about two seconds.
    let result = validator
        .validate(&cancel, &ids[0].to_string(), Some(&[ids[0].to_string()][..]))
        .await
        .expect("cancellation after candidate checks still yields a result");

    assert!(!result.can_restore);
    assert!(result.error_details.iter().any(|e| e == "traversal failed: walk cancelled"));
    assert!(result.reachable_size > 0);
    assert!(result.is_consistent());
}

#[tokio::test]
async fn cancel_token_is_shared_across_calls() {
    let store = Arc::new(MemoryBlockStore::new());
    let ids = chain(&store, 3).await;
    let validator = Validator::new(Arc::clone(&store), ValidatorConfig::default());
    let cancel = CancelToken::new();
    cancel.cancel();

    for _ in 0..3 {
        let err = validator
            .validate(&cancel, &ids[0].to_string(), Some(&strings(&ids)[..]))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidateError::Cancelled));
    }
}

#[tokio::test]
async fn store_timeout_turns_stall_into_defect() {
    let inner = MemoryBlockStore::new();
    let ids = chain(&inner, 2).await;
    let all = strings(collect_dag(&inner, ids[0]).await);
    let store = Arc::new(SlowStore::new(inner, Duration::from_millis(200)));

    let config = ValidatorConfig::default().with_store_timeout(Duration::from_millis(10));
    let result = Validator::new(store, config)
        .validate(&CancelToken::new(), &ids[0].to_string(), Some(all.as_slice()))
        .await
        .unwrap();

    // Every probe times out: nothing is known present, the root cannot be
    // read, so the walk fails and the record is not restorable.
    assert_eq!(result.error_details.len(), all.len() + 1);
    assert!(result.error_details.iter().any(|e| e.contains("timed out")));
    assert!(!result.can_restore);
    assert_eq!(result.reachable_size, 0);
}
