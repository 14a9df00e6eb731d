#![forbid(unsafe_code)]

use std::sync::Arc;

use beacons_kernel_contracts::{FormRecord, SubmissionId};
use beacons_storage::{FormCache, FormCacheConfig, InMemoryFormCache};

fn id(s: &str) -> SubmissionId {
    SubmissionId::new(s).unwrap()
}

fn shared_cache() -> Arc<dyn FormCache> {
    Arc::new(InMemoryFormCache::new(FormCacheConfig::mvp_v1()).unwrap())
}

#[tokio::test]
async fn at_form_cache_wiring_01_entries_are_isolated_per_submission() {
    let cache = shared_cache();
    cache
        .update(&id("s1"), FormRecord::from_pairs([("hexId", "1D0EA08C52FFBFF")]))
        .await
        .unwrap();
    cache
        .update(&id("s2"), FormRecord::from_pairs([("hexId", "ABC")]))
        .await
        .unwrap();

    assert_eq!(
        cache.get(&id("s1")).await.unwrap().get("hexId"),
        Some("1D0EA08C52FFBFF")
    );
    assert_eq!(cache.get(&id("s2")).await.unwrap().get("hexId"), Some("ABC"));

    cache.remove(&id("s1")).await.unwrap();
    assert!(cache.get(&id("s1")).await.unwrap().is_empty());
    assert!(!cache.get(&id("s2")).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn at_form_cache_wiring_02_concurrent_writes_last_one_wins() {
    let cache = shared_cache();
    let mut handles = Vec::new();
    for n in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            cache
                .update(&id("shared"), FormRecord::from_pairs([("n", n.to_string())]))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = cache.get(&id("shared")).await.unwrap();
    assert_eq!(stored.len(), 1);
    let n: u32 = stored.get("n").unwrap().parse().unwrap();
    assert!(n < 8);
}
