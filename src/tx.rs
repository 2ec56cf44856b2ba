//! Transaction wrapper for batched writes to the defaults store

use heed::RwTxn;

use crate::db::{get_in, Dbs};
use crate::error::{err, Result};
use crate::provider::RoleDefaults;

/// Transaction wrapper for batched writes
pub struct Tx<'e> {
    txn: RwTxn<'e>,
    dbs: &'e Dbs,
}

impl<'e> Tx<'e> {
    #[inline]
    pub(crate) fn new(txn: RwTxn<'e>, dbs: &'e Dbs) -> Self {
        Tx { txn, dbs }
    }

    #[inline]
    pub(crate) fn commit(self) -> Result<()> {
        self.txn.commit().map_err(err)
    }

    /// Store (or replace) a role's defaults
    pub fn put_defaults(&mut self, defaults: &RoleDefaults) -> Result<()> {
        let raw = serde_json::to_string(defaults).map_err(err)?;
        self.dbs.defaults.put(&mut self.txn, &defaults.role, &raw).map_err(err)
    }

    /// Remove a role's defaults
    pub fn remove_defaults(&mut self, role: &str) -> Result<bool> {
        self.dbs.defaults.delete(&mut self.txn, role).map_err(err)
    }

    /// Read a role's defaults inside the transaction
    pub fn get_defaults(&self, role: &str) -> Result<Option<RoleDefaults>> {
        get_in(self.dbs, &self.txn, role)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.dbs.defaults.clear(&mut self.txn).map_err(err)
    }
}
