//! Deferred key resolution shared by the operation builders

use crate::error::{Result, StoreError};
use crate::key::{format_key, KeyArg};

/// A key as given to a builder: not yet supplied, resolved, or malformed
///
/// Template errors are held until the terminal call so the builder chain
/// stays infallible; they surface before any transaction begins.
#[derive(Debug, Default)]
pub(crate) enum KeySpec {
    #[default]
    Unset,
    Ready(Vec<u8>),
    Invalid(StoreError),
}

impl KeySpec {
    pub(crate) fn template<'a, I, A>(template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<KeyArg<'a>>,
    {
        let args: Vec<KeyArg<'a>> = args.into_iter().map(Into::into).collect();
        match format_key(template, &args) {
            Ok(key) => KeySpec::Ready(key),
            Err(e) => KeySpec::Invalid(e),
        }
    }

    pub(crate) fn raw(key: impl AsRef<[u8]>) -> Self {
        KeySpec::Ready(key.as_ref().to_vec())
    }

    /// The key, or a `Config` error naming the operation that lacks one
    pub(crate) fn required(self, op: &str) -> Result<Vec<u8>> {
        match self.optional()? {
            Some(key) => Ok(key),
            None => Err(StoreError::Config(format!("{} requires a key", op))),
        }
    }

    pub(crate) fn optional(self) -> Result<Option<Vec<u8>>> {
        match self {
            KeySpec::Unset => Ok(None),
            KeySpec::Ready(key) => Ok(Some(key)),
            KeySpec::Invalid(e) => Err(e),
        }
    }
}
