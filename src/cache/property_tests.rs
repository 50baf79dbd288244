//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check get-or-compute behaviour across generated keys,
//! values and interleavings.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;

use crate::cache::Cache;

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}"
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,128}"
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // While fresh, the first computed value wins over any later producer.
    #[test]
    fn prop_first_value_wins(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy()
    ) {
        let rt = runtime();
        rt.block_on(async {
            let cache: Cache<String, String> = Cache::new();

            let stored = cache
                .get(key.clone(), || async { Ok::<_, Infallible>(first.clone()) })
                .await
                .unwrap();
            prop_assert_eq!(&stored, &first);

            let again = cache
                .get(key.clone(), || async { Ok::<_, Infallible>(second.clone()) })
                .await
                .unwrap();
            prop_assert_eq!(&again, &first, "Second get should be a cache hit");
            prop_assert_eq!(cache.len().await, 1);

            Ok(())
        })?;
    }

    // A failed producer never leaves anything behind.
    #[test]
    fn prop_failed_producer_writes_nothing(
        keys in prop::collection::hash_set(key_strategy(), 1..20)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let cache: Cache<String, String> = Cache::new();

            for key in &keys {
                let result = cache
                    .get(key.clone(), || async { Err::<String, _>(key.len()) })
                    .await;
                prop_assert_eq!(result, Err(key.len()));
            }
            prop_assert!(cache.is_empty().await);

            Ok(())
        })?;
    }

    // Concurrent gets on distinct keys never lose an update.
    #[test]
    fn prop_concurrent_distinct_keys(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..50)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let cache: Cache<String, String> = Cache::new();

            let mut handles = vec![];
            for (key, value) in entries.clone() {
                let cache = cache.clone();
                handles.push(tokio::spawn(async move {
                    cache
                        .get(key, || async move { Ok::<_, Infallible>(value) })
                        .await
                }));
            }
            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok());
            }

            let entries_view = cache.entries().await;
            let stored: HashMap<String, String> = entries_view
                .iter()
                .map(|(k, e)| (k.clone(), e.value.clone()))
                .collect();
            prop_assert_eq!(stored, entries);

            Ok(())
        })?;
    }

    // Racing producers for one key may all run, but the store settles on
    // exactly one of the values they produced.
    #[test]
    fn prop_same_key_race_settles_on_one_value(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 2..16)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let cache: Cache<String, String> = Cache::new();
            let barrier = Arc::new(tokio::sync::Barrier::new(values.len()));

            let mut handles = vec![];
            for value in values.clone() {
                let cache = cache.clone();
                let key = key.clone();
                let barrier = Arc::clone(&barrier);
                handles.push(tokio::spawn(async move {
                    barrier.wait().await;
                    cache
                        .get(key, || async move { Ok::<_, Infallible>(value) })
                        .await
                }));
            }

            let produced: HashSet<String> = values.into_iter().collect();
            for handle in handles {
                let returned = handle.await.expect("Task should not panic").unwrap();
                prop_assert!(produced.contains(&returned));
            }

            let entries_view = cache.entries().await;
            let stored: Vec<&String> = entries_view.iter().map(|(_, e)| &e.value).collect();
            prop_assert_eq!(stored.len(), 1);
            prop_assert!(produced.contains(stored[0]), "Stored value must be one produced value");

            Ok(())
        })?;
    }
}
