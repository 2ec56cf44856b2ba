//! Permission token grammar tests
//!
//! These tests pin down the wire format: name segments are exact, scope kinds
//! are case-insensitive, scope values are case-sensitive.

use scopegate::{parse, parse_value, ParsedPermission, ScopeError};
use serde_json::json;

// ============================================================================
// Well-formed Tokens
// ============================================================================

/// Scopes are lower-cased, values are left alone
#[test]
fn scopes_lowercased_values_untouched() {
    let p = parse("entity:action:scopeA+scopeB:val1+Val2").unwrap().unwrap();
    assert_eq!(
        p,
        ParsedPermission {
            permission: "entity:action".into(),
            scopes: vec!["scopea".into(), "scopeb".into()],
            scope_values: vec!["val1".into(), "Val2".into()],
        }
    );
}

/// The permission name keeps its case
#[test]
fn permission_name_is_case_sensitive() {
    let upper = parse("Data:View").unwrap().unwrap();
    let lower = parse("data:view").unwrap().unwrap();
    assert_ne!(upper.permission, lower.permission);
}

/// Scope segment without a values segment
#[test]
fn scopes_without_values() {
    let p = parse("data_submission:view:study+own").unwrap().unwrap();
    assert_eq!(p.scopes, vec!["study", "own"]);
    assert!(p.scope_values.is_empty());
}

/// Segments past the fourth are reserved and ignored
#[test]
fn trailing_segments_ignored() {
    let p = parse("a:b:role:Submitter:future:metadata").unwrap().unwrap();
    assert_eq!(p.permission, "a:b");
    assert_eq!(p.scopes, vec!["role"]);
    assert_eq!(p.scope_values, vec!["Submitter"]);
}

// ============================================================================
// Malformed and Non-permission Tokens
// ============================================================================

/// Empty string fails fast
#[test]
fn empty_token_rejected() {
    let e = parse("").unwrap_err();
    assert!(matches!(e, ScopeError::InvalidPermissionString(_)));
}

/// Null and numbers are not tokens
#[test]
fn non_string_values_rejected() {
    assert!(matches!(parse_value(&json!(null)), Err(ScopeError::InvalidPermissionString(_))));
    assert!(matches!(parse_value(&json!(42)), Err(ScopeError::InvalidPermissionString(_))));
    assert!(matches!(parse_value(&json!("")), Err(ScopeError::InvalidPermissionString(_))));
}

/// A single segment is not an error, just not a permission
#[test]
fn single_segment_is_none() {
    assert_eq!(parse("onlyonesegment").unwrap(), None);
    assert_eq!(parse_value(&json!("onlyonesegment")).unwrap(), None);
}
