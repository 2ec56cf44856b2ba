//! PBAC defaults: per-role fallback scopes and the provider seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A role's default scope for one permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultPermission {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub scope_values: Vec<String>,
}

impl DefaultPermission {
    pub fn new(id: impl Into<String>, scopes: &[&str], scope_values: &[&str]) -> Self {
        DefaultPermission {
            id: id.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            scope_values: scope_values.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The default permission map for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefaults {
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<DefaultPermission>,
}

impl RoleDefaults {
    pub fn new(role: impl Into<String>, permissions: Vec<DefaultPermission>) -> Self {
        RoleDefaults { role: role.into(), permissions }
    }
}

/// Source of role defaults, injected into the resolver.
///
/// An empty result means the roles have no defaults; resolution then denies.
#[async_trait]
pub trait PbacDefaults: Send + Sync {
    async fn get_defaults(&self, roles: &[String]) -> Result<Vec<RoleDefaults>>;
}

#[async_trait]
impl<T: PbacDefaults + ?Sized> PbacDefaults for std::sync::Arc<T> {
    async fn get_defaults(&self, roles: &[String]) -> Result<Vec<RoleDefaults>> {
        (**self).get_defaults(roles).await
    }
}

/// In-memory defaults, typically loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticDefaults {
    roles: Vec<RoleDefaults>,
}

impl StaticDefaults {
    pub fn new(roles: Vec<RoleDefaults>) -> Self {
        StaticDefaults { roles }
    }

    /// Defaults that grant nothing
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PbacDefaults for StaticDefaults {
    async fn get_defaults(&self, roles: &[String]) -> Result<Vec<RoleDefaults>> {
        Ok(self
            .roles
            .iter()
            .filter(|r| roles.contains(&r.role))
            .cloned()
            .collect())
    }
}
