//! Scopegate - permission-scope resolution for data-submission access control
//!
//! A permission token such as `data_submission:view:study+own` grants an action
//! restricted to a scope. Resolution turns a user's tokens (falling back to the
//! role's PBAC defaults) into scope entries; translation turns those entries into
//! a storage filter.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod filter;
pub mod permission;
pub mod provider;
pub mod resolver;
pub mod scope;
pub mod tx;
pub mod user;

pub use config::Config;
pub use constants::*;
pub use db::DefaultsStore;
pub use error::{ScopeError, Result};
pub use filter::{translate, Filter, FilterRequest, NonePolicy, Resource};
pub use filter::{APPLICATIONS, INSTITUTIONS, QC_RESULTS, RELEASED_NODES, RESOURCES, SUBMISSIONS};
pub use permission::{parse, parse_value, ParsedPermission, PermissionSet};
pub use provider::{DefaultPermission, PbacDefaults, RoleDefaults, StaticDefaults};
pub use resolver::{format_scopes, ScopeOverride, ScopeResolver};
pub use scope::{Grant, ScopeEntry, ScopeKind, UserScope};
pub use tx::Tx;
pub use user::{StudyRef, User};
