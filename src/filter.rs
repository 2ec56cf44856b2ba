//! Scope-to-filter translation.
//!
//! Every resource runs the same decision: none, all, study, data commons, own,
//! then reject. A `Resource` names the fields that carry ownership, study and
//! data-commons membership; `translate` folds a `UserScope` into a `Filter`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, ScopeError};
use crate::scope::{Grant, UserScope};
use crate::user::User;

/// Abstract storage predicate. The storage layer owns execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Matches every record
    Everything,
    /// Matches no record
    Nothing,
    Eq { field: String, value: String },
    In { field: String, values: Vec<String> },
    And { filters: Vec<Filter> },
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq { field: field.into(), value: value.into() }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<String>) -> Self {
        Filter::In { field: field.into(), values }
    }

    /// Conjunction, collapsing trivial operands
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Nothing, _) | (_, Filter::Nothing) => Filter::Nothing,
            (Filter::Everything, f) | (f, Filter::Everything) => f,
            (Filter::And { mut filters }, Filter::And { filters: more }) => {
                filters.extend(more);
                Filter::And { filters }
            }
            (Filter::And { mut filters }, f) => {
                filters.push(f);
                Filter::And { filters }
            }
            (f, Filter::And { mut filters }) => {
                filters.insert(0, f);
                Filter::And { filters }
            }
            (a, b) => Filter::And { filters: vec![a, b] },
        }
    }

    /// Render as a document-store query
    pub fn to_document(&self) -> Value {
        match self {
            Filter::Everything => json!({}),
            Filter::Nothing => json!({ "_id": { "$in": [] } }),
            Filter::Eq { field, value } => single(field, json!(value)),
            Filter::In { field, values } => single(field, json!({ "$in": values })),
            Filter::And { filters } => {
                json!({ "$and": filters.iter().map(Filter::to_document).collect::<Vec<_>>() })
            }
        }
    }
}

fn single(field: &str, value: Value) -> Value {
    let mut doc = serde_json::Map::new();
    doc.insert(field.to_string(), value);
    Value::Object(doc)
}

/// What a resource does when the resolved scope is `none`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonePolicy {
    /// Raise a permission error
    Deny,
    /// Return an empty result
    Empty,
}

/// Field layout of one access-controlled collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub name: &'static str,
    pub owner: Option<&'static str>,
    pub study: Option<&'static str>,
    pub data_commons: Option<&'static str>,
    pub on_none: NonePolicy,
}

pub const SUBMISSIONS: Resource = Resource {
    name: "submissions",
    owner: Some("submitterID"),
    study: Some("studyID"),
    data_commons: Some("dataCommons"),
    on_none: NonePolicy::Empty,
};

pub const APPLICATIONS: Resource = Resource {
    name: "applications",
    owner: Some("applicant.applicantID"),
    study: Some("studyID"),
    data_commons: None,
    on_none: NonePolicy::Empty,
};

pub const QC_RESULTS: Resource = Resource {
    name: "qcResults",
    owner: Some("submitterID"),
    study: Some("studyID"),
    data_commons: Some("dataCommons"),
    on_none: NonePolicy::Deny,
};

pub const RELEASED_NODES: Resource = Resource {
    name: "releasedNodes",
    owner: None,
    study: Some("studyID"),
    data_commons: Some("dataCommons"),
    on_none: NonePolicy::Deny,
};

pub const INSTITUTIONS: Resource = Resource {
    name: "institutions",
    owner: None,
    study: None,
    data_commons: None,
    on_none: NonePolicy::Deny,
};

pub const RESOURCES: &[Resource] = &[SUBMISSIONS, APPLICATIONS, QC_RESULTS, RELEASED_NODES, INSTITUTIONS];

/// Caller parameters that are not part of the scope decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    /// Non-scope predicate such as a name or status search
    pub extra: Filter,
    /// Data commons the caller asked for, if any
    pub data_commons: Option<Vec<String>>,
}

impl Default for FilterRequest {
    fn default() -> Self {
        FilterRequest { extra: Filter::Everything, data_commons: None }
    }
}

impl FilterRequest {
    pub fn new(extra: Filter) -> Self {
        FilterRequest { extra, ..Default::default() }
    }

    pub fn with_data_commons(mut self, dcs: Vec<String>) -> Self {
        self.data_commons = Some(dcs);
        self
    }
}

impl Resource {
    pub fn by_name(name: &str) -> Option<&'static Resource> {
        RESOURCES.iter().find(|r| r.name == name)
    }

    fn not_handled(&self) -> ScopeError {
        tracing::debug!(resource = self.name, "scope kind not handled");
        ScopeError::InvalidPermission { resource: self.name.to_string() }
    }

    /// Whether this resource has a field to express `grant`
    pub fn handles(&self, grant: &Grant<'_>) -> bool {
        match grant {
            Grant::None | Grant::All => true,
            Grant::Study(_) => self.study.is_some(),
            Grant::DataCommons(_) => self.data_commons.is_some(),
            Grant::Own => self.owner.is_some(),
            Grant::Role(_) => false,
        }
    }

    /// Translate a resolved scope into a filter for this resource
    pub fn translate(&self, scope: &UserScope, user: &User, request: FilterRequest) -> Result<Filter> {
        translate(scope, self, user, request)
    }
}

fn intersect(granted: &[String], requested: Option<Vec<String>>) -> Vec<String> {
    match requested {
        Some(req) => granted.iter().filter(|g| req.contains(g)).cloned().collect(),
        None => granted.to_vec(),
    }
}

/// Fold a resolved scope into a storage filter for `resource`.
///
/// Grants are tried in priority order: none, all, study, data commons, own.
/// The first one the resource has a field for wins, so a study or
/// data-commons grant outranks own only where the resource can express it.
pub fn translate(scope: &UserScope, resource: &Resource, user: &User, request: FilterRequest) -> Result<Filter> {
    let FilterRequest { extra, data_commons } = request;
    let grants = scope.grants();
    let Some(grant) = grants.into_iter().find(|g| resource.handles(g)) else {
        return Err(resource.not_handled());
    };
    match grant {
        Grant::None => match resource.on_none {
            NonePolicy::Empty => Ok(Filter::Nothing),
            NonePolicy::Deny => {
                tracing::debug!(resource = resource.name, user = %user.id, "access denied");
                Err(ScopeError::InvalidPermission { resource: resource.name.to_string() })
            }
        },
        Grant::All => Ok(extra),
        g @ Grant::Study(values) => {
            let field = resource.study.ok_or_else(|| resource.not_handled())?;
            if g.is_unrestricted() {
                Ok(extra)
            } else {
                Ok(extra.and(Filter::is_in(field, values.to_vec())))
            }
        }
        Grant::DataCommons(values) => {
            let field = resource.data_commons.ok_or_else(|| resource.not_handled())?;
            Ok(extra.and(Filter::is_in(field, intersect(values, data_commons))))
        }
        Grant::Own => {
            let field = resource.owner.ok_or_else(|| resource.not_handled())?;
            Ok(extra.and(Filter::equals(field, user.id.clone())))
        }
        Grant::Role(_) => Err(resource.not_handled()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_collapses_trivial_operands() {
        let f = Filter::equals("a", "1");
        assert_eq!(Filter::Everything.and(f.clone()), f);
        assert_eq!(f.clone().and(Filter::Nothing), Filter::Nothing);
        let both = f.clone().and(Filter::equals("b", "2")).and(Filter::equals("c", "3"));
        assert!(matches!(both, Filter::And { ref filters } if filters.len() == 3));
    }

    #[test]
    fn document_rendering() {
        let f = Filter::equals("status", "New").and(Filter::is_in("studyID", vec!["s1".into()]));
        assert_eq!(
            f.to_document(),
            json!({ "$and": [ { "status": "New" }, { "studyID": { "$in": ["s1"] } } ] })
        );
        assert_eq!(Filter::Everything.to_document(), json!({}));
    }

    #[test]
    fn dc_intersection() {
        let granted = vec!["CDS".to_string(), "ICDC".to_string()];
        assert_eq!(intersect(&granted, Some(vec!["ICDC".into(), "GC".into()])), vec!["ICDC"]);
        assert_eq!(intersect(&granted, None), granted);
    }
}
