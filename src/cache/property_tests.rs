//! Property-Based Tests for the bucket table

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::BucketTable;

const TEST_MAX_ENTRIES: usize = 100;

// == Strategies ==
fn bucket_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("thumb_user_test".to_string()),
        Just("img_test".to_string()),
        Just("json_test".to_string()),
    ]
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,2}/[0-9]{1,6}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

#[derive(Debug, Clone)]
enum TableOp {
    Set { bucket: String, key: String, value: Vec<u8> },
    Get { bucket: String, key: String },
    Delete { bucket: String, key: String },
    DeleteBucket { bucket: String },
}

fn table_op_strategy() -> impl Strategy<Value = TableOp> {
    prop_oneof![
        (bucket_strategy(), key_strategy(), value_strategy())
            .prop_map(|(bucket, key, value)| TableOp::Set { bucket, key, value }),
        (bucket_strategy(), key_strategy()).prop_map(|(bucket, key)| TableOp::Get { bucket, key }),
        (bucket_strategy(), key_strategy())
            .prop_map(|(bucket, key)| TableOp::Delete { bucket, key }),
        bucket_strategy().prop_map(|bucket| TableOp::DeleteBucket { bucket }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The table behaves like a map of maps as long as no bucket overflows.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(table_op_strategy(), 1..80)) {
        let mut table = BucketTable::new(TEST_MAX_ENTRIES);
        let mut model: HashMap<String, HashMap<String, Vec<u8>>> = HashMap::new();

        for op in ops {
            match op {
                TableOp::Set { bucket, key, value } => {
                    table.set(&bucket, &key, value.clone(), None);
                    model.entry(bucket).or_default().insert(key, value);
                }
                TableOp::Get { bucket, key } => {
                    let expected = model.get(&bucket).and_then(|b| b.get(&key)).cloned();
                    prop_assert_eq!(table.get(&bucket, &key), expected);
                }
                TableOp::Delete { bucket, key } => {
                    let expected = model.get_mut(&bucket).and_then(|b| b.remove(&key)).is_some();
                    prop_assert_eq!(table.delete(&bucket, &key), expected);
                }
                TableOp::DeleteBucket { bucket } => {
                    let expected = model.remove(&bucket).map_or(0, |b| b.len());
                    prop_assert_eq!(table.delete_bucket(&bucket), expected);
                }
            }
        }

        let expected_len: usize = model.values().map(|b| b.len()).sum();
        prop_assert_eq!(table.len(), expected_len);
    }

    // Hits and misses account for every lookup.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(table_op_strategy(), 1..50)) {
        let mut table = BucketTable::new(TEST_MAX_ENTRIES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                TableOp::Set { bucket, key, value } => table.set(&bucket, &key, value, None),
                TableOp::Get { bucket, key } => match table.get(&bucket, &key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                TableOp::Delete { bucket, key } => {
                    table.delete(&bucket, &key);
                }
                TableOp::DeleteBucket { bucket } => {
                    table.delete_bucket(&bucket);
                }
            }
        }

        let stats = table.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, table.len());
    }

    // No bucket ever holds more entries than the ceiling.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((bucket_strategy(), key_strategy()), 1..300)
    ) {
        let max_entries = 20;
        let mut table = BucketTable::new(max_entries);

        for (bucket, key) in entries {
            table.set(&bucket, &key, b"v".to_vec(), None);
            prop_assert!(table.bucket_len(&bucket) <= max_entries);
        }
    }

    // Flushing twice leaves the table empty either way.
    #[test]
    fn prop_flush_idempotent(
        entries in prop::collection::vec((bucket_strategy(), key_strategy(), value_strategy()), 0..40)
    ) {
        let mut table = BucketTable::new(TEST_MAX_ENTRIES);
        for (bucket, key, value) in entries {
            table.set(&bucket, &key, value, None);
        }

        table.flush();
        prop_assert!(table.is_empty());
        table.flush();
        prop_assert!(table.is_empty());
        prop_assert_eq!(table.bucket_count(), 0);
    }
}
