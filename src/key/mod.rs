//! Key Module
//!
//! Builds raw byte keys from printf-style templates and computes the range
//! covered by a key prefix.
//!
//! ## Responsibilities
//! - Resolve `%s` / `%d` / `%x` / `%%` templates against [`KeyArg`]s
//! - Bucket-qualified keys (`bucket:` + name) with a terminating separator
//! - Prefix upper bounds for range scans
//!
//! Buckets are only a naming convention. `"first:"` selects the bucket
//! `first`; `"first:name"` used as a prefix also matches `"first:name2"`,
//! so callers that want an exact bucket must end the prefix with the
//! separator.

mod prefix;
mod template;

pub use prefix::{prefix_upper_bound, PrefixBound};
pub use template::{format_key, KeyArg};

use crate::error::{Result, StoreError};

/// Separator terminating a bucket name inside a key
pub const BUCKET_SEPARATOR: u8 = b':';

/// `bucket` followed by the separator
///
/// Fails when the bucket is empty or already contains the separator, since
/// either would let one bucket's prefix swallow another's keys.
pub fn bucket_prefix(bucket: &str) -> Result<Vec<u8>> {
    if bucket.is_empty() {
        return Err(StoreError::Template("bucket name must not be empty".into()));
    }
    if bucket.as_bytes().contains(&BUCKET_SEPARATOR) {
        return Err(StoreError::Template(format!(
            "bucket name {:?} contains the separator {:?}",
            bucket, BUCKET_SEPARATOR as char
        )));
    }
    let mut prefix = Vec::with_capacity(bucket.len() + 1);
    prefix.extend_from_slice(bucket.as_bytes());
    prefix.push(BUCKET_SEPARATOR);
    Ok(prefix)
}

/// Full key for `name` inside `bucket`
pub fn bucket_key(bucket: &str, name: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    let mut key = bucket_prefix(bucket)?;
    key.extend_from_slice(name.as_ref());
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_key_is_separated() {
        assert_eq!(bucket_key("first", "name").unwrap(), b"first:name".to_vec());
        assert_eq!(bucket_prefix("first").unwrap(), b"first:".to_vec());
    }

    #[test]
    fn bucket_rejects_separator_and_empty() {
        assert!(matches!(bucket_prefix("a:b"), Err(StoreError::Template(_))));
        assert!(matches!(bucket_prefix(""), Err(StoreError::Template(_))));
    }

    #[test]
    fn sibling_buckets_do_not_overlap() {
        let first = PrefixBound::new(bucket_prefix("first").unwrap());
        assert!(first.contains(b"first:name"));
        assert!(!first.contains(b"firstborn:name"));
    }
}
