//! LMDB-backed PBAC defaults store
//!
//! One named database, `defaults`, maps a role name to its JSON-encoded
//! `RoleDefaults`. The store is an owned handle passed to the resolver; there
//! is no process-wide environment.

use std::path::Path;

use async_trait::async_trait;
use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions, RoTxn};

use crate::error::{err, Result};
use crate::provider::{PbacDefaults, RoleDefaults};
use crate::tx::Tx;

pub type DbStr = Database<Str, Str>;

/// Database handles
#[derive(Debug, Clone, Copy)]
pub struct Dbs {
    pub defaults: DbStr,
}

/// Handle to an opened defaults store. Cheap to clone.
#[derive(Clone)]
pub struct DefaultsStore {
    env: Env,
    dbs: Dbs,
}

impl std::fmt::Debug for DefaultsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultsStore").field("path", &self.env.path()).finish()
    }
}

pub(crate) fn decode(raw: &str) -> Result<RoleDefaults> {
    serde_json::from_str(raw).map_err(err)
}

pub(crate) fn get_in(d: &Dbs, tx: &RoTxn, role: &str) -> Result<Option<RoleDefaults>> {
    d.defaults.get(tx, role).map_err(err)?.map(decode).transpose()
}

impl DefaultsStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(err)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1 << 28)
                .max_dbs(1)
                .open(path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let dbs = Dbs { defaults: env.create_database(&mut tx, Some("defaults")).map_err(err)? };
        tx.commit().map_err(err)?;
        tracing::debug!(path = %path.display(), "opened pbac defaults store");
        Ok(DefaultsStore { env, dbs })
    }

    /// Execute a read-only operation
    #[inline]
    pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(&self.dbs, &self.env.read_txn().map_err(err)?)
    }

    /// Run multiple writes in a single transaction
    pub fn transact<T, F: FnOnce(&mut Tx<'_>) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx::new(self.env.write_txn().map_err(err)?, &self.dbs);
        let r = f(&mut tx)?;
        tx.commit()?;
        Ok(r)
    }

    /// Store (or replace) a role's defaults
    pub fn put_defaults(&self, defaults: &RoleDefaults) -> Result<()> {
        self.transact(|tx| tx.put_defaults(defaults))
    }

    /// Remove a role's defaults
    pub fn remove_defaults(&self, role: &str) -> Result<bool> {
        self.transact(|tx| tx.remove_defaults(role))
    }

    /// Replace the whole store with `roles`
    pub fn seed(&self, roles: &[RoleDefaults]) -> Result<()> {
        self.transact(|tx| {
            tx.clear()?;
            roles.iter().try_for_each(|r| tx.put_defaults(r))
        })?;
        tracing::info!(roles = roles.len(), "seeded pbac defaults");
        Ok(())
    }

    /// Clear all defaults (for testing)
    pub fn clear(&self) -> Result<()> {
        self.transact(|tx| tx.clear())
    }

    pub fn get_role(&self, role: &str) -> Result<Option<RoleDefaults>> {
        self.read(|d, tx| get_in(d, tx, role))
    }

    /// All stored role defaults, ordered by role name
    pub fn list_roles(&self) -> Result<Vec<RoleDefaults>> {
        self.read(|d, tx| {
            let mut r = Vec::new();
            for item in d.defaults.iter(tx).map_err(err)? {
                let (_, v) = item.map_err(err)?;
                r.push(decode(v)?);
            }
            Ok(r)
        })
    }
}

#[async_trait]
impl PbacDefaults for DefaultsStore {
    async fn get_defaults(&self, roles: &[String]) -> Result<Vec<RoleDefaults>> {
        let store = self.clone();
        let roles = roles.to_vec();
        tokio::task::spawn_blocking(move || {
            store.read(|d, tx| {
                let mut r = Vec::with_capacity(roles.len());
                for role in &roles {
                    if let Some(defaults) = get_in(d, tx, role)? {
                        r.push(defaults);
                    }
                }
                Ok(r)
            })
        })
        .await
        .map_err(err)?
    }
}
