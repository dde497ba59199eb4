//! Tests for Store enumeration
//!
//! These tests verify:
//! - Prefix containment: a key is visited iff it starts with the prefix
//! - Seek: exactly the prefix matches at or after the target, ascending
//! - Empty results, early stop and limits
//! - Full scans in raw byte order
//! - 0xFF-heavy prefixes
//! - Pull-style iteration and snapshot stability
//! - Cancellation and visitor panics

use std::panic::{self, AssertUnwindSafe};

use cursorkv::{Context, Entry, Store, StoreError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::new("test", temp_dir.path().join("scan.db"), 0o600).unwrap();
    (temp_dir, store)
}

/// Deterministic key set mixing buckets, shared prefixes and raw bytes
fn sample_keys() -> Vec<Vec<u8>> {
    let mut keys: Vec<Vec<u8>> = [
        "first:name",
        "first:name2",
        "first:nick",
        "first:",
        "firstborn:name",
        "second:name",
        "a",
        "ab",
        "abc",
        "b",
    ]
    .iter()
    .map(|k| k.as_bytes().to_vec())
    .collect();

    keys.push(vec![0x00]);
    keys.push(vec![0x01, 0xFF]);
    keys.push(vec![0x01, 0xFF, 0x00]);
    keys.push(vec![0x02]);
    keys.push(vec![0xFF]);
    keys.push(vec![0xFF, 0xFF]);
    keys.push(vec![0xFF, 0xFF, 0x01]);

    // A few generated keys from a fixed LCG
    let mut state: u32 = 0x2545_F491;
    for _ in 0..40 {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let len = (state % 4 + 1) as usize;
        let key: Vec<u8> = state.to_be_bytes()[..len].to_vec();
        keys.push(key);
    }
    keys
}

fn seeded_store() -> (TempDir, Store, Vec<Vec<u8>>) {
    let (temp, store) = setup_temp_store();
    let ctx = Context::background();
    let keys = sample_keys();
    store
        .update(&ctx, |txn| {
            for key in &keys {
                txn.put(key.clone(), key.clone());
            }
            Ok(())
        })
        .unwrap();

    let mut unique = keys;
    unique.sort();
    unique.dedup();
    (temp, store, unique)
}

fn collect(op: cursorkv::EnumerateOp<'_>) -> Vec<Vec<u8>> {
    let mut seen = Vec::new();
    op.visit(|entry| {
        seen.push(entry.key.to_vec());
        true
    })
    .unwrap();
    seen
}

fn prefixes() -> Vec<Vec<u8>> {
    vec![
        b"".to_vec(),
        b"first:".to_vec(),
        b"first:n".to_vec(),
        b"first:name".to_vec(),
        b"first".to_vec(),
        b"a".to_vec(),
        b"zzz".to_vec(),
        vec![0x01],
        vec![0x01, 0xFF],
        vec![0xFF],
        vec![0xFF, 0xFF],
    ]
}

// =============================================================================
// Property Tests
// =============================================================================

#[test]
fn test_full_scan_visits_everything_in_order() {
    let (_temp, store, expected) = seeded_store();
    let ctx = Context::background();

    let seen = collect(store.enumerate(&ctx));
    assert_eq!(seen, expected);
}

#[test]
fn test_prefix_containment() {
    let (_temp, store, all) = seeded_store();
    let ctx = Context::background();

    for prefix in prefixes() {
        let expected: Vec<Vec<u8>> = all
            .iter()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        let seen = collect(store.enumerate(&ctx).by_raw_prefix(&prefix));
        assert_eq!(seen, expected, "prefix {:?}", prefix);

        let counted = store.enumerate(&ctx).by_raw_prefix(&prefix).count().unwrap();
        assert_eq!(counted, expected.len(), "count for prefix {:?}", prefix);
    }
}

#[test]
fn test_seek_within_prefix() {
    let (_temp, store, all) = seeded_store();
    let ctx = Context::background();

    let seeks: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"first:name".to_vec(),
        b"first:name2".to_vec(),
        b"first:o".to_vec(),
        b"a".to_vec(),
        b"zzzz".to_vec(),
        vec![0x01, 0xFF, 0x00],
        vec![0xFF, 0xFF],
    ];

    for prefix in prefixes() {
        for seek in &seeks {
            let expected: Vec<Vec<u8>> = all
                .iter()
                .filter(|k| k.starts_with(&prefix) && k.as_slice() >= seek.as_slice())
                .cloned()
                .collect();
            let seen = collect(
                store
                    .enumerate(&ctx)
                    .by_raw_prefix(&prefix)
                    .by_raw_seek(seek),
            );
            assert_eq!(seen, expected, "prefix {:?} seek {:?}", prefix, seek);

            let counted = store
                .enumerate(&ctx)
                .by_raw_prefix(&prefix)
                .by_raw_seek(seek)
                .count()
                .unwrap();
            assert_eq!(counted, expected.len(), "count prefix {:?} seek {:?}", prefix, seek);
        }
    }
}

#[test]
fn test_seek_without_prefix() {
    let (_temp, store, all) = seeded_store();
    let ctx = Context::background();

    let expected: Vec<Vec<u8>> = all
        .iter()
        .filter(|k| k.as_slice() >= b"b".as_slice())
        .cloned()
        .collect();
    let seen = collect(store.enumerate(&ctx).seek("%s", ["b"]));
    assert_eq!(seen, expected);
}

#[test]
fn test_seek_past_prefix_yields_nothing() {
    let (_temp, store, _) = seeded_store();
    let ctx = Context::background();

    let seen = collect(store.enumerate(&ctx).by_prefix("%s:", ["first"]).seek("%s:", ["second"]));
    assert!(seen.is_empty());

    let counted = store
        .enumerate(&ctx)
        .by_prefix("%s:", ["first"])
        .seek("%s:", ["second"])
        .count()
        .unwrap();
    assert_eq!(counted, 0);
}

#[test]
fn test_seek_before_prefix_starts_at_prefix() {
    let (_temp, store, _) = seeded_store();
    let ctx = Context::background();

    let seen = collect(store.enumerate(&ctx).by_prefix("%s:", ["first"]).seek("%s", ["a"]));
    assert_eq!(
        seen,
        vec![
            b"first:".to_vec(),
            b"first:name".to_vec(),
            b"first:name2".to_vec(),
            b"first:nick".to_vec()
        ]
    );
}

#[test]
fn test_empty_store_and_unmatched_prefix() {
    let (_temp, store) = setup_temp_store();
    let ctx = Context::background();

    let mut calls = 0;
    store
        .enumerate(&ctx)
        .visit(|_| {
            calls += 1;
            true
        })
        .unwrap();
    store
        .enumerate(&ctx)
        .by_prefix("%s:nothing", ["first"])
        .visit(|_| {
            calls += 1;
            true
        })
        .unwrap();
    assert_eq!(calls, 0);
}

#[test]
fn test_early_stop_visits_exactly_n() {
    let (_temp, store, all) = seeded_store();
    let ctx = Context::background();
    assert!(all.len() > 10);

    for stop_at in [1usize, 2, 5, 10] {
        let mut visited = 0;
        store
            .enumerate(&ctx)
            .visit(|_| {
                visited += 1;
                visited < stop_at
            })
            .unwrap();
        assert_eq!(visited, stop_at);
    }
}

#[test]
fn test_limit() {
    let (_temp, store, _) = seeded_store();
    let ctx = Context::background();

    let seen = collect(store.enumerate(&ctx).by_prefix("%s:", ["first"]).limit(2));
    assert_eq!(seen, vec![b"first:".to_vec(), b"first:name".to_vec()]);

    let counted = store.enumerate(&ctx).by_prefix("%s:", ["first"]).limit(2).count().unwrap();
    assert_eq!(counted, 2);

    assert!(collect(store.enumerate(&ctx).limit(0)).is_empty());
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iter_is_lazy_and_pull_based() {
    let (_temp, store, _) = seeded_store();
    let ctx = Context::background();

    let mut iter = store.enumerate(&ctx).by_prefix("%s:", ["first"]).iter().unwrap();
    let first: Entry = iter.next().unwrap().unwrap();
    assert_eq!(&first.key[..], b"first:");
    assert_eq!(&first.value[..], b"first:");

    let rest: Vec<Entry> = iter.map(Result::unwrap).collect();
    assert_eq!(rest.len(), 3);
    assert_eq!(&rest[2].key[..], b"first:nick");
}

#[test]
fn test_iter_keeps_its_snapshot() {
    let (_temp, store) = setup_temp_store();
    let ctx = Context::background();

    store.set(&ctx).by_raw_key("k1").string("v1").unwrap();
    store.set(&ctx).by_raw_key("k3").string("v3").unwrap();

    let mut iter = store.enumerate(&ctx).by_raw_prefix("k").iter().unwrap();
    assert_eq!(&iter.next().unwrap().unwrap().key[..], b"k1");

    // Writers are not blocked by the open scan, and the scan does not see them
    store.set(&ctx).by_raw_key("k2").string("v2").unwrap();
    store.set(&ctx).by_raw_key("k3").string("changed").unwrap();
    assert!(store.remove(&ctx).by_raw_key("k1").execute().unwrap());

    let next = iter.next().unwrap().unwrap();
    assert_eq!(&next.key[..], b"k3");
    assert_eq!(&next.value[..], b"v3");
    assert!(iter.next().is_none());

    let now = collect(store.enumerate(&ctx).by_raw_prefix("k"));
    assert_eq!(now, vec![b"k2".to_vec(), b"k3".to_vec()]);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_cancel_mid_scan() {
    let (_temp, store, _) = seeded_store();
    let ctx = Context::background().with_cancel();

    let mut visited = 0;
    let err = store
        .enumerate(&ctx)
        .visit(|_| {
            visited += 1;
            if visited == 3 {
                ctx.cancel();
            }
            true
        })
        .unwrap_err();

    assert!(matches!(err, StoreError::Cancelled));
    assert_eq!(visited, 3);
}

#[test]
fn test_iter_fuses_after_cancellation() {
    let (_temp, store, _) = seeded_store();
    let ctx = Context::background().with_cancel();

    let mut iter = store.enumerate(&ctx).iter().unwrap();
    assert!(iter.next().unwrap().is_ok());
    ctx.cancel();
    assert!(matches!(iter.next(), Some(Err(StoreError::Cancelled))));
    assert!(iter.next().is_none());
}

#[test]
fn test_visitor_panic_releases_transaction() {
    let (_temp, store, _) = seeded_store();
    let ctx = Context::background();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        store
            .enumerate(&ctx)
            .visit(|_| panic!("visitor failed"))
            .unwrap();
    }));
    assert!(result.is_err());

    // Nothing is left holding the store
    store.set(&ctx).by_raw_key("after").string("panic").unwrap();
    assert_eq!(
        store.get(&ctx).by_raw_key("after").string().unwrap().as_deref(),
        Some("panic")
    );
}

#[test]
fn test_malformed_prefix_template() {
    let (_temp, store) = setup_temp_store();
    let ctx = Context::background();

    let err = store.enumerate(&ctx).by_prefix("%s:%s", ["first"]).visit(|_| true).unwrap_err();
    assert!(matches!(err, StoreError::Template(_)));

    let err = store.enumerate(&ctx).seek("%", Vec::<&str>::new()).count().unwrap_err();
    assert!(matches!(err, StoreError::Template(_)));
}
