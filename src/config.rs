//! Runtime configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::PERMISSIONS;
use crate::error::{Result, ScopeError};
use crate::permission::PermissionSet;
use crate::provider::RoleDefaults;

pub const ENV_DB: &str = "SCOPEGATE_DB";
pub const ENV_ADDR: &str = "SCOPEGATE_ADDR";
pub const ENV_PORT: &str = "PORT";
pub const ENV_PERMISSIONS: &str = "SCOPEGATE_PERMISSIONS";
pub const ENV_DEFAULTS: &str = "SCOPEGATE_DEFAULTS";

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/scopegate.mdb")
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".into()
}

fn default_permissions() -> Vec<String> {
    PERMISSIONS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Permission names accepted by the permission-list filter
    #[serde(default = "default_permissions")]
    pub allowed_permissions: Vec<String>,
    /// JSON file holding a list of role defaults to seed at startup
    #[serde(default)]
    pub defaults_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            allowed_permissions: default_permissions(),
            defaults_file: None,
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let mut c = Config::default();
        if let Some(p) = get(ENV_DB) {
            c.db_path = PathBuf::from(p);
        }
        if let Some(a) = get(ENV_ADDR) {
            c.bind_addr = a;
        } else if let Some(port) = get(ENV_PORT) {
            c.bind_addr = format!("0.0.0.0:{}", port);
        }
        if let Some(list) = get(ENV_PERMISSIONS) {
            c.allowed_permissions = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        c.defaults_file = get(ENV_DEFAULTS).map(PathBuf::from);
        c
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScopeError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| ScopeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::new(self.allowed_permissions.iter().cloned())
    }

    /// Read the configured defaults file, if any
    pub fn load_defaults(&self) -> Result<Vec<RoleDefaults>> {
        let Some(path) = &self.defaults_file else {
            return Ok(Vec::new());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScopeError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| ScopeError::Config(format!("{}: {}", path.display(), e)))
    }
}
