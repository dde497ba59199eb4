//! Single-key writes

use bytes::Bytes;
use serde::Serialize;

use crate::context::Context;
use crate::error::Result;
use crate::key::KeyArg;

use super::key_spec::KeySpec;
use super::Store;

/// A pending `set`: pick a key, then call one typed setter
///
/// Numbers and booleans are stored as their decimal / `true` / `false`
/// text, so they read back through any matching getter, `string` included.
#[must_use = "a set does nothing until a typed setter is called"]
pub struct SetOp<'s> {
    store: &'s Store,
    ctx: Context,
    key: KeySpec,
}

impl<'s> SetOp<'s> {
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

    pub fn bytes(self, value: impl AsRef<[u8]>) -> Result<()> {
        let value = Bytes::copy_from_slice(value.as_ref());
        self.put(value)
    }

    pub fn string(self, value: impl AsRef<str>) -> Result<()> {
        let value = Bytes::copy_from_slice(value.as_ref().as_bytes());
        self.put(value)
    }

    pub fn bool(self, value: bool) -> Result<()> {
        let text: &'static [u8] = if value { b"true" } else { b"false" };
        self.put(Bytes::from_static(text))
    }

    pub fn i64(self, value: i64) -> Result<()> {
        self.put(Bytes::from(value.to_string()))
    }

    pub fn u64(self, value: u64) -> Result<()> {
        self.put(Bytes::from(value.to_string()))
    }

    pub fn f64(self, value: f64) -> Result<()> {
        self.put(Bytes::from(value.to_string()))
    }

    /// Any serde value, encoded with bincode
    pub fn serialized<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        let encoded = bincode::serialize(value)?;
        self.put(Bytes::from(encoded))
    }

    fn put(self, value: Bytes) -> Result<()> {
        let key = self.key.required("set")?;
        let mut txn = self.store.engine().begin_write(&self.ctx)?;
        txn.put(key, value);
        txn.commit()?;
        Ok(())
    }
}
