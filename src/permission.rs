//! Permission token parsing.
//!
//! Tokens have the form `entity:action[:scope1+scope2[:value1+value2]]`:
//! - the first two segments form the permission name (exact, case-sensitive)
//! - the third segment lists scope kinds, lower-cased on read
//! - the fourth segment lists scope values, case preserved
//! - anything past the fourth segment is ignored

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{LIST_SEP, PERMISSIONS, SEGMENT_SEP};
use crate::error::{Result, ScopeError};

/// A permission token split into its name, scope kinds and scope values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPermission {
    pub permission: String,
    pub scopes: Vec<String>,
    pub scope_values: Vec<String>,
}

impl ParsedPermission {
    /// True if the token carried a scope segment
    #[inline]
    pub fn has_scopes(&self) -> bool {
        !self.scopes.is_empty()
    }
}

fn split_list<'a>(segment: Option<&'a str>) -> impl Iterator<Item = &'a str> + 'a {
    segment
        .into_iter()
        .flat_map(|s| s.split(LIST_SEP))
        .filter(|s| !s.is_empty())
}

/// Parse a permission token.
///
/// Returns `Ok(None)` for a token with fewer than two segments: it is not a
/// permission and matches nothing. An empty token is an error.
pub fn parse(token: &str) -> Result<Option<ParsedPermission>> {
    if token.is_empty() {
        return Err(ScopeError::InvalidPermissionString("empty token".into()));
    }
    let mut parts = token.split(SEGMENT_SEP);
    let (entity, action) = match (parts.next(), parts.next()) {
        (Some(e), Some(a)) => (e, a),
        _ => return Ok(None),
    };
    let scopes = split_list(parts.next()).map(str::to_lowercase).collect();
    let scope_values = split_list(parts.next()).map(str::to_string).collect();
    Ok(Some(ParsedPermission {
        permission: format!("{}{}{}", entity, SEGMENT_SEP, action),
        scopes,
        scope_values,
    }))
}

/// Parse a raw document value; anything but a string is malformed
pub fn parse_value(value: &serde_json::Value) -> Result<Option<ParsedPermission>> {
    match value {
        serde_json::Value::String(s) => parse(s),
        other => Err(ScopeError::InvalidPermissionString(format!(
            "expected string, got {}",
            other
        ))),
    }
}

/// The set of permission names a deployment accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PermissionSet(names.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PermissionSet {
    fn default() -> Self {
        PermissionSet::new(PERMISSIONS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_token() {
        let p = parse("data:view:Own+STUDY:Val1+val2").unwrap().unwrap();
        assert_eq!(p.permission, "data:view");
        assert_eq!(p.scopes, vec!["own", "study"]);
        assert_eq!(p.scope_values, vec!["Val1", "val2"]);
    }

    #[test]
    fn extra_segments_dropped() {
        let p = parse("data:view:all:x:meta:more").unwrap().unwrap();
        assert_eq!(p.scopes, vec!["all"]);
        assert_eq!(p.scope_values, vec!["x"]);
    }

    #[test]
    fn bare_name() {
        let p = parse("data:view").unwrap().unwrap();
        assert!(!p.has_scopes());
        assert!(p.scope_values.is_empty());
    }

    #[test]
    fn empty_scope_pieces_discarded() {
        assert!(!parse("data:view:").unwrap().unwrap().has_scopes());
        assert_eq!(parse("data:view:all+").unwrap().unwrap().scopes, vec!["all"]);
    }

    #[test]
    fn single_segment_is_no_match() {
        assert_eq!(parse("onlyonesegment").unwrap(), None);
    }

    #[test]
    fn empty_is_error() {
        assert!(matches!(parse(""), Err(ScopeError::InvalidPermissionString(_))));
    }

    #[test]
    fn non_string_values_are_errors() {
        assert!(parse_value(&serde_json::Value::Null).is_err());
        assert!(parse_value(&serde_json::json!(42)).is_err());
        assert!(parse_value(&serde_json::json!("")).is_err());
        assert!(parse_value(&serde_json::json!("a:b")).unwrap().is_some());
    }

    #[test]
    fn default_set_covers_catalogue() {
        let set = PermissionSet::default();
        assert_eq!(set.len(), PERMISSIONS.len());
        assert!(set.contains("data_submission:view"));
        assert!(!set.contains("data_submission:View"));
    }
}
