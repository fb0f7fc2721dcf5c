//! Shared facade scenario, run against every store backend.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use typed_cache::cache::{GetOptions, SetOpOutcome, ZRange};
use typed_cache::store::{KeyType, Store};
use typed_cache::{CacheValue, Scalar, TypedCache};

pub const TEST_KEY: &str = "test_key";
pub const TEST_STR: &str = "fdkslfds";

pub fn test_list() -> CacheValue {
    CacheValue::List(vec![
        Scalar::from(4),
        Scalar::from("Fds"),
        Scalar::from(false),
        Scalar::Null,
    ])
}

pub fn test_map() -> CacheValue {
    CacheValue::Map(BTreeMap::from([
        ("a".to_string(), Scalar::from(1)),
        ("b".to_string(), Scalar::from("fds")),
        ("c".to_string(), Scalar::from(false)),
    ]))
}

pub fn test_sorted_set() -> CacheValue {
    CacheValue::SortedMap(vec![
        ("name1".to_string(), 4.0),
        ("name2".to_string(), 3.0),
        ("name3".to_string(), 2.0),
        ("name4".to_string(), 1.0),
    ])
}

pub fn int_set(items: impl IntoIterator<Item = i64>) -> CacheValue {
    CacheValue::Set(items.into_iter().map(Scalar::from).collect())
}

fn names(items: &[&str]) -> Option<CacheValue> {
    Some(CacheValue::List(
        items.iter().map(|item| Scalar::from(*item)).collect(),
    ))
}

fn ints(items: impl IntoIterator<Item = i64>) -> BTreeSet<Scalar> {
    items.into_iter().map(Scalar::from).collect()
}

/// Runs the end-to-end cache scenario on an empty store.
pub async fn run_cache_scenario(cache: &TypedCache) {
    cache.flush().await.unwrap();
    assert_eq!(cache.size(None).await.unwrap(), 0);

    // strings, lists and maps
    let key = format!("{TEST_KEY}_str");
    cache.put(&key, TEST_STR, None).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(CacheValue::from(TEST_STR)));
    assert!(cache.has(&key).await.unwrap());

    let key = format!("{TEST_KEY}_list");
    cache.put(&key, test_list(), None).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(test_list()));
    assert!(cache.has(&key).await.unwrap());

    let key = format!("{TEST_KEY}_dict");
    cache.put(&key, test_map(), None).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(test_map()));
    assert!(cache.has(&key).await.unwrap());

    assert_eq!(cache.size(None).await.unwrap(), 3);

    // member removal
    cache.put("testSet", int_set(1..=5), None).await.unwrap();
    assert_eq!(cache.size(Some("testSet")).await.unwrap(), 5);
    assert!(cache.remove_from("testSet", 3).await.unwrap());
    assert_eq!(cache.size(Some("testSet")).await.unwrap(), 4);

    // union
    cache.put("testSetUnion1", int_set(0..5), None).await.unwrap();
    cache.put("testSetUnion2", int_set(5..10), None).await.unwrap();
    let keys = ["testSetUnion1", "testSetUnion2"];
    assert_eq!(
        cache.union(&keys, false).await.unwrap(),
        SetOpOutcome::Members(ints(0..10))
    );
    let SetOpOutcome::Stored { key, cardinality } = cache.union(&keys, true).await.unwrap() else {
        panic!("in-place union should be stored");
    };
    assert_eq!(cardinality, 10);
    assert_eq!(cache.size(Some(key.as_str())).await.unwrap(), 10);
    assert_eq!(cache.get(&key).await.unwrap(), Some(int_set(0..10)));

    // intersection
    cache.put("testSetInter1", int_set(3..8), None).await.unwrap();
    cache.put("testSetInter2", int_set(5..10), None).await.unwrap();
    let keys = ["testSetInter1", "testSetInter2"];
    assert_eq!(
        cache.inter(&keys, false).await.unwrap(),
        SetOpOutcome::Members(ints([5, 6, 7]))
    );
    let SetOpOutcome::Stored { key, cardinality } = cache.inter(&keys, true).await.unwrap() else {
        panic!("in-place intersection should be stored");
    };
    assert_eq!(cardinality, 3);
    assert_eq!(cache.size(Some(key.as_str())).await.unwrap(), 3);
    assert_eq!(cache.get(&key).await.unwrap(), Some(int_set([5, 6, 7])));

    // sorted sets
    cache.put("testSortedSet", test_sorted_set(), None).await.unwrap();
    assert!(cache.has("testSortedSet").await.unwrap());
    assert_eq!(cache.size(Some("testSortedSet")).await.unwrap(), 4);
    assert_eq!(
        cache.store().key_type("testSortedSet").await.unwrap(),
        KeyType::ZSet
    );
    assert_eq!(
        cache.get("testSortedSet").await.unwrap(),
        names(&["name4", "name3", "name2", "name1"])
    );
    let by_score = GetOptions {
        range: ZRange::Score { min: 2.0, max: 3.0 },
        raw: false,
    };
    assert_eq!(
        cache.get_with("testSortedSet", by_score).await.unwrap(),
        names(&["name3", "name2"])
    );

    // key listing
    for i in 0..10 {
        cache.put(&format!("test_key_unique_{i}"), "1", None).await.unwrap();
    }
    assert_eq!(cache.keys("test_key_unique_*").await.unwrap().len(), 10);

    cache.flush().await.unwrap();
    assert_eq!(cache.size(None).await.unwrap(), 0);
}
