//! Single-key reads

use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::key::KeyArg;
use crate::snapshot::Entry;

use super::key_spec::KeySpec;
use super::Store;

/// A pending `get`: pick a key, then call one typed getter
///
/// Every getter returns `Ok(None)` for a missing key. A present value that
/// cannot be read as the requested type is a `Conversion` error.
#[must_use = "a get does nothing until a typed getter is called"]
pub struct GetOp<'s> {
    store: &'s Store,
    ctx: Context,
    key: KeySpec,
}

impl<'s> GetOp<'s> {
    pub(crate) fn new(store: &'s Store, ctx: Context) -> Self {
        Self {
            store,
            ctx,
            key: KeySpec::Unset,
        }
    }

    /// Key from a template such as `"%s:name"`
    pub fn by_key<'a, I, A>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<KeyArg<'a>>,
    {
        self.key = KeySpec::template(template, args);
        self
    }

    /// Key given as raw bytes
    pub fn by_raw_key(mut self, key: impl AsRef<[u8]>) -> Self {
        self.key = KeySpec::raw(key);
        self
    }

    /// The raw stored value
    pub fn bytes(self) -> Result<Option<Bytes>> {
        let key = self.key.required("get")?;
        let txn = self.store.engine().begin_read(&self.ctx)?;
        txn.get(&key)
    }

    /// Key and value together
    pub fn entry(self) -> Result<Option<Entry>> {
        let key = self.key.required("get")?;
        let txn = self.store.engine().begin_read(&self.ctx)?;
        Ok(txn.get(&key)?.map(|value| Entry::new(key, value)))
    }

    pub fn exists(self) -> Result<bool> {
        Ok(self.bytes()?.is_some())
    }

    pub fn string(self) -> Result<Option<String>> {
        self.bytes()?
            .map(|value| {
                String::from_utf8(value.to_vec()).map_err(|e| StoreError::conversion("string", e))
            })
            .transpose()
    }

    pub fn bool(self) -> Result<Option<bool>> {
        self.bytes()?
            .map(|value| match value.as_ref() {
                b"true" => Ok(true),
                b"false" => Ok(false),
                other => Err(StoreError::conversion(
                    "bool",
                    format!("unexpected value {:?}", String::from_utf8_lossy(other)),
                )),
            })
            .transpose()
    }

    pub fn i64(self) -> Result<Option<i64>> {
        self.parse_text("i64")
    }

    pub fn u64(self) -> Result<Option<u64>> {
        self.parse_text("u64")
    }

    pub fn f64(self) -> Result<Option<f64>> {
        self.parse_text("f64")
    }

    /// A serde value previously stored with `SetOp::serialized`
    pub fn deserialized<T: DeserializeOwned>(self) -> Result<Option<T>> {
        self.bytes()?
            .map(|value| {
                bincode::deserialize(&value)
                    .map_err(|e| StoreError::conversion(std::any::type_name::<T>(), e))
            })
            .transpose()
    }

    fn parse_text<T>(self, target: &'static str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.bytes()?
            .map(|value| {
                let text = std::str::from_utf8(&value)
                    .map_err(|e| StoreError::conversion(target, e))?;
                text.parse::<T>()
                    .map_err(|e| StoreError::conversion(target, e))
            })
            .transpose()
    }
}
