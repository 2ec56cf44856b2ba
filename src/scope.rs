//! Scope kinds, resolved scope entries and the `UserScope` capability object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ALL_SENTINEL, SCOPE_ALL, SCOPE_DC, SCOPE_NONE, SCOPE_OWN, SCOPE_ROLE, SCOPE_STUDY};
use crate::error::{Result, ScopeError};

/// The dimension a granted permission is restricted along.
///
/// Tokens are caller data, so a kind outside the known set survives parsing as
/// `Unrecognized`. It never satisfies any predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScopeKind {
    None,
    All,
    Own,
    Role,
    Study,
    DataCommons,
    Unrecognized(String),
}

impl ScopeKind {
    /// The full recognized kind set
    pub const RECOGNIZED: [ScopeKind; 6] = [
        ScopeKind::None,
        ScopeKind::All,
        ScopeKind::Own,
        ScopeKind::Role,
        ScopeKind::Study,
        ScopeKind::DataCommons,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ScopeKind::None => SCOPE_NONE,
            ScopeKind::All => SCOPE_ALL,
            ScopeKind::Own => SCOPE_OWN,
            ScopeKind::Role => SCOPE_ROLE,
            ScopeKind::Study => SCOPE_STUDY,
            ScopeKind::DataCommons => SCOPE_DC,
            ScopeKind::Unrecognized(s) => s,
        }
    }

    #[inline]
    pub fn is_recognized(&self) -> bool {
        Self::RECOGNIZED.contains(self)
    }
}

impl From<&str> for ScopeKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            SCOPE_NONE => ScopeKind::None,
            SCOPE_ALL => ScopeKind::All,
            SCOPE_OWN => ScopeKind::Own,
            SCOPE_ROLE => ScopeKind::Role,
            SCOPE_STUDY => ScopeKind::Study,
            SCOPE_DC => ScopeKind::DataCommons,
            other => ScopeKind::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for ScopeKind {
    fn from(s: String) -> Self {
        ScopeKind::from(s.as_str())
    }
}

impl From<ScopeKind> for String {
    fn from(k: ScopeKind) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved `{scope, scopeValues}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeEntry {
    pub scope: ScopeKind,
    #[serde(default)]
    pub scope_values: Vec<String>,
}

impl ScopeEntry {
    pub fn new(scope: ScopeKind, scope_values: Vec<String>) -> Self {
        ScopeEntry { scope, scope_values }
    }

    /// The canonical no-access entry
    pub fn none() -> Self {
        ScopeEntry::new(ScopeKind::None, Vec::new())
    }

    #[inline]
    fn permits(&self, kind: &ScopeKind, value: &str) -> bool {
        &self.scope == kind && self.scope_values.iter().any(|v| v == value)
    }
}

/// The single highest-priority grant a scope list folds to.
///
/// Priority: None, All, Study, DataCommons, Own, Role. Study and data-commons
/// grants outrank Own so that a user holding both gets the broader access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant<'a> {
    None,
    All,
    Study(&'a [String]),
    DataCommons(&'a [String]),
    Own,
    Role(&'a [String]),
}

impl Grant<'_> {
    /// True for `all` and for a study list holding the "All" sentinel. Data
    /// commons names are matched literally, so the sentinel has no meaning there.
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Grant::All => true,
            Grant::Study(v) => v.iter().any(|s| s == ALL_SENTINEL),
            _ => false,
        }
    }
}

/// Immutable capability object over a resolved scope list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserScope {
    entries: Vec<ScopeEntry>,
}

impl UserScope {
    pub fn new(entries: Vec<ScopeEntry>) -> Self {
        UserScope { entries }
    }

    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, kind: &ScopeKind) -> Option<&ScopeEntry> {
        self.entries.iter().find(|e| &e.scope == kind)
    }

    fn has(&self, kind: &ScopeKind) -> bool {
        self.find(kind).is_some()
    }

    fn values(&self, kind: &ScopeKind) -> &[String] {
        self.find(kind).map(|e| e.scope_values.as_slice()).unwrap_or(&[])
    }

    pub fn is_permitted_role(&self, role: &str) -> bool {
        self.entries.iter().any(|e| e.permits(&ScopeKind::Role, role))
    }

    pub fn is_permitted_study(&self, study_id: &str) -> bool {
        self.entries.iter().any(|e| e.permits(&ScopeKind::Study, study_id))
    }

    pub fn is_permitted_data_commons(&self, dc: &str) -> bool {
        self.entries.iter().any(|e| e.permits(&ScopeKind::DataCommons, dc))
    }

    pub fn is_own_scope(&self) -> bool {
        self.has(&ScopeKind::Own)
    }

    pub fn is_all_scope(&self) -> bool {
        self.has(&ScopeKind::All)
    }

    /// True only for a `none` entry with no values. A `none` entry carrying
    /// values is malformed and must not read as a denial.
    pub fn is_none_scope(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.scope == ScopeKind::None && e.scope_values.is_empty())
    }

    pub fn is_role_scope(&self) -> bool {
        self.has(&ScopeKind::Role)
    }

    pub fn is_study_scope(&self) -> bool {
        self.has(&ScopeKind::Study)
    }

    pub fn is_dc_scope(&self) -> bool {
        self.has(&ScopeKind::DataCommons)
    }

    pub fn role_values(&self) -> &[String] {
        self.values(&ScopeKind::Role)
    }

    pub fn study_values(&self) -> &[String] {
        self.values(&ScopeKind::Study)
    }

    pub fn dc_values(&self) -> &[String] {
        self.values(&ScopeKind::DataCommons)
    }

    /// Every grant the entries hold, highest priority first. A canonical `none`
    /// shadows everything else.
    pub fn grants(&self) -> Vec<Grant<'_>> {
        if self.is_none_scope() {
            return vec![Grant::None];
        }
        let mut out = Vec::new();
        if self.is_all_scope() {
            out.push(Grant::All);
        }
        if let Some(e) = self.find(&ScopeKind::Study) {
            out.push(Grant::Study(&e.scope_values));
        }
        if let Some(e) = self.find(&ScopeKind::DataCommons) {
            out.push(Grant::DataCommons(&e.scope_values));
        }
        if self.is_own_scope() {
            out.push(Grant::Own);
        }
        if let Some(e) = self.find(&ScopeKind::Role) {
            out.push(Grant::Role(&e.scope_values));
        }
        out
    }

    /// Fold the entries into the highest-priority grant
    pub fn grant(&self) -> Option<Grant<'_>> {
        self.grants().into_iter().next()
    }

    /// Check that the scope holds at least one of the kinds a caller handles.
    ///
    /// Failing here means configuration and caller disagree, so it is logged.
    pub fn ensure_supported(&self, permission: &str, supported: &[ScopeKind]) -> Result<&Self> {
        let ok = supported.iter().any(|k| match k {
            ScopeKind::None => self.is_none_scope(),
            ScopeKind::Unrecognized(_) => false,
            other => self.has(other),
        });
        if ok {
            return Ok(self);
        }
        tracing::warn!(permission, entries = ?self.entries, "user scope matches no supported kind");
        Err(ScopeError::InvalidUserScope { permission: permission.to_string() })
    }
}

impl From<Vec<ScopeEntry>> for UserScope {
    fn from(entries: Vec<ScopeEntry>) -> Self {
        UserScope::new(entries)
    }
}
