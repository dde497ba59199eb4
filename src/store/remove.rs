//! Single-key deletes

use crate::context::Context;
use crate::error::Result;
use crate::key::KeyArg;

use super::key_spec::KeySpec;
use super::Store;

/// A pending `remove`
#[must_use = "a remove does nothing until `execute` is called"]
pub struct RemoveOp<'s> {
    store: &'s Store,
    ctx: Context,
    key: KeySpec,
}

impl<'s> RemoveOp<'s> {
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

    /// Delete the key; `true` if it existed
    pub fn execute(self) -> Result<bool> {
        let key = self.key.required("remove")?;
        let mut txn = self.store.engine().begin_write(&self.ctx)?;
        let existed = txn.delete(key);
        if existed {
            txn.commit()?;
        } else {
            txn.rollback();
        }
        Ok(existed)
    }
}
