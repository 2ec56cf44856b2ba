//! Scope resolution: user + permission name -> resolved scope entries

use crate::constants::SCOPE_OWN;
use crate::error::Result;
use crate::permission::{parse, ParsedPermission, PermissionSet};
use crate::provider::PbacDefaults;
use crate::scope::{ScopeEntry, ScopeKind, UserScope};
use crate::user::User;

/// Scopes and values taken from a token or a role default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeOverride {
    pub scopes: Vec<String>,
    pub scope_values: Vec<String>,
}

impl From<&ParsedPermission> for ScopeOverride {
    fn from(p: &ParsedPermission) -> Self {
        ScopeOverride { scopes: p.scopes.clone(), scope_values: p.scope_values.clone() }
    }
}

/// Resolves permission scopes against an injected defaults provider
#[derive(Debug, Clone)]
pub struct ScopeResolver<P> {
    defaults: P,
}

/// Parse a token, treating malformed or non-permission tokens as no match
#[inline]
fn parse_lenient(token: &str) -> Option<ParsedPermission> {
    parse(token).ok().flatten()
}

fn deny() -> Vec<ScopeEntry> {
    vec![ScopeEntry::none()]
}

/// Expand raw scopes into entries. Study and data-commons values always come
/// from the user profile, never from the token.
pub fn format_scopes(user: &User, scopes: &[String], scope_values: &[String]) -> Vec<ScopeEntry> {
    let kinds: Vec<ScopeKind> = scopes.iter().map(|s| ScopeKind::from(s.as_str())).collect();
    let mut out = Vec::with_capacity(kinds.len());
    if kinds.contains(&ScopeKind::Study) {
        out.push(ScopeEntry::new(ScopeKind::Study, user.study_ids()));
    }
    if kinds.contains(&ScopeKind::DataCommons) {
        out.push(ScopeEntry::new(ScopeKind::DataCommons, user.data_commons.clone()));
    }
    out.extend(
        kinds
            .into_iter()
            .filter(|k| !matches!(k, ScopeKind::Study | ScopeKind::DataCommons))
            .map(|k| ScopeEntry::new(k, scope_values.to_vec())),
    );
    out
}

impl<P: PbacDefaults> ScopeResolver<P> {
    pub fn new(defaults: P) -> Self {
        ScopeResolver { defaults }
    }

    pub fn defaults(&self) -> &P {
        &self.defaults
    }

    /// Resolve the scope of `permission` for `user`
    pub async fn resolve(&self, user: Option<&User>, permission: &str) -> Vec<ScopeEntry> {
        self.resolve_with_override(user, permission, None).await
    }

    /// Resolve against `override_scope` instead of the user's stored permission
    /// list when one is given. An override is formatted as-is: it never falls
    /// back to role defaults and does not depend on the user holding anything.
    pub async fn resolve_with_override(
        &self,
        user: Option<&User>,
        permission: &str,
        override_scope: Option<ScopeOverride>,
    ) -> Vec<ScopeEntry> {
        if permission.is_empty() {
            return deny();
        }
        // An override carries its own scope; the stored list is never consulted.
        if let Some(o) = override_scope {
            let profile = user.cloned().unwrap_or_default();
            return format_scopes(&profile, &o.scopes, &o.scope_values);
        }
        let user = match user {
            Some(u) if !u.permissions.is_empty() => u,
            _ => return deny(),
        };

        let winner = match user
            .permissions
            .iter()
            .filter_map(|t| parse_lenient(t))
            .find(|p| p.permission == permission)
        {
            Some(p) => ScopeOverride::from(&p),
            None => {
                tracing::debug!(permission, user = %user.id, "permission not held");
                return deny();
            }
        };

        let resolved = if winner.scopes.is_empty() {
            self.role_default(user, permission).await
        } else {
            winner
        };

        let entries = format_scopes(user, &resolved.scopes, &resolved.scope_values);
        tracing::debug!(permission, user = %user.id, ?entries, "resolved scope");
        entries
    }

    /// Look up the role's default scope. Anything short of a matching default
    /// leaves the provisional `none`.
    async fn role_default(&self, user: &User, permission: &str) -> ScopeOverride {
        let provisional = ScopeOverride { scopes: vec![ScopeKind::None.to_string()], scope_values: Vec::new() };
        let roles = match self.defaults.get_defaults(std::slice::from_ref(&user.role)).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(role = %user.role, error = %e, "pbac defaults unavailable");
                return provisional;
            }
        };
        let Some(role) = roles.into_iter().find(|r| r.role == user.role) else {
            return provisional;
        };
        role.permissions
            .into_iter()
            .find(|d| parse_lenient(&d.id).is_some_and(|p| p.permission == permission))
            .map(|d| ScopeOverride {
                scopes: if d.scopes.is_empty() { vec![SCOPE_OWN.to_string()] } else { d.scopes },
                scope_values: d.scope_values,
            })
            .unwrap_or(provisional)
    }

    /// Resolve and wrap in a `UserScope`
    pub async fn user_scope(&self, user: Option<&User>, permission: &str) -> UserScope {
        UserScope::new(self.resolve(user, permission).await)
    }

    /// Resolve and require the scope to hold one of `supported`
    pub async fn checked_scope(
        &self,
        user: Option<&User>,
        permission: &str,
        supported: &[ScopeKind],
    ) -> Result<UserScope> {
        let scope = self.user_scope(user, permission).await;
        scope.ensure_supported(permission, supported)?;
        Ok(scope)
    }

    /// Keep the candidate tokens whose own scope is valid for this deployment.
    ///
    /// Each candidate is checked against the scope it embeds, not against the
    /// user's stored grant for that permission.
    pub async fn filter_valid(
        &self,
        user: Option<&User>,
        candidates: &[String],
        allowed: &PermissionSet,
    ) -> Vec<String> {
        let mut kept = Vec::new();
        for candidate in candidates.iter().filter(|c| !c.is_empty()) {
            let Some(parsed) = parse_lenient(candidate) else { continue };
            if !allowed.contains(&parsed.permission) || !parsed.has_scopes() {
                continue;
            }
            let entries = self
                .resolve_with_override(user, &parsed.permission, Some(ScopeOverride::from(&parsed)))
                .await;
            if entries.iter().any(|e| e.scope.is_recognized()) {
                kept.push(candidate.clone());
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_orders_study_then_dc_then_rest() {
        let user = User::new("u", "Submitter").with_studies(["s1"]).with_data_commons(["CDS"]);
        let scopes: Vec<String> = ["role", "dc", "own", "study"].iter().map(|s| s.to_string()).collect();
        let entries = format_scopes(&user, &scopes, &["v".to_string()]);
        let kinds: Vec<_> = entries.iter().map(|e| e.scope.clone()).collect();
        assert_eq!(kinds, vec![ScopeKind::Study, ScopeKind::DataCommons, ScopeKind::Role, ScopeKind::Own]);
        assert_eq!(entries[0].scope_values, vec!["s1"]);
        assert_eq!(entries[1].scope_values, vec!["CDS"]);
        assert_eq!(entries[2].scope_values, vec!["v"]);
        assert_eq!(entries[3].scope_values, vec!["v"]);
    }
}
