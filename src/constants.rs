//! Scope kinds, permission names, roles and sentinels

// Scope kind tokens (lower-case wire form)
pub const SCOPE_NONE: &str = "none";
pub const SCOPE_ALL: &str = "all";
pub const SCOPE_OWN: &str = "own";
pub const SCOPE_ROLE: &str = "role";
pub const SCOPE_STUDY: &str = "study";
pub const SCOPE_DC: &str = "dc";

// Token grammar delimiters
pub const SEGMENT_SEP: char = ':';
pub const LIST_SEP: char = '+';

/// Scope value meaning every study / data commons
pub const ALL_SENTINEL: &str = "All";

// Roles
pub const ROLE_USER: &str = "User";
pub const ROLE_SUBMITTER: &str = "Submitter";
pub const ROLE_FEDERAL_LEAD: &str = "Federal Lead";
pub const ROLE_DATA_COMMONS_PERSONNEL: &str = "Data Commons Personnel";
pub const ROLE_ADMIN: &str = "Admin";

pub const ROLES: &[&str] = &[
    ROLE_USER,
    ROLE_SUBMITTER,
    ROLE_FEDERAL_LEAD,
    ROLE_DATA_COMMONS_PERSONNEL,
    ROLE_ADMIN,
];

#[inline]
pub fn is_known_role(role: &str) -> bool {
    ROLES.contains(&role)
}

// Submission requests
pub const SUBMISSION_REQUEST_VIEW: &str = "submission_request:view";
pub const SUBMISSION_REQUEST_CREATE: &str = "submission_request:create";
pub const SUBMISSION_REQUEST_SUBMIT: &str = "submission_request:submit";
pub const SUBMISSION_REQUEST_REVIEW: &str = "submission_request:review";
pub const SUBMISSION_REQUEST_CANCEL: &str = "submission_request:cancel";

// Data submissions
pub const DATA_SUBMISSION_VIEW: &str = "data_submission:view";
pub const DATA_SUBMISSION_CREATE: &str = "data_submission:create";
pub const DATA_SUBMISSION_REVIEW: &str = "data_submission:review";
pub const DATA_SUBMISSION_ADMIN_SUBMIT: &str = "data_submission:admin_submit";
pub const DATA_SUBMISSION_CONFIRM: &str = "data_submission:confirm";
pub const DATA_SUBMISSION_CANCEL: &str = "data_submission:cancel";

// Administration
pub const DASHBOARD_VIEW: &str = "dashboard:view";
pub const ACCESS_REQUEST: &str = "access:request";
pub const USER_MANAGE: &str = "user:manage";
pub const PROGRAM_MANAGE: &str = "program:manage";
pub const STUDY_MANAGE: &str = "study:manage";
pub const INSTITUTION_MANAGE: &str = "institution:manage";

/// Every permission name this deployment recognises
pub const PERMISSIONS: &[&str] = &[
    SUBMISSION_REQUEST_VIEW,
    SUBMISSION_REQUEST_CREATE,
    SUBMISSION_REQUEST_SUBMIT,
    SUBMISSION_REQUEST_REVIEW,
    SUBMISSION_REQUEST_CANCEL,
    DATA_SUBMISSION_VIEW,
    DATA_SUBMISSION_CREATE,
    DATA_SUBMISSION_REVIEW,
    DATA_SUBMISSION_ADMIN_SUBMIT,
    DATA_SUBMISSION_CONFIRM,
    DATA_SUBMISSION_CANCEL,
    DASHBOARD_VIEW,
    ACCESS_REQUEST,
    USER_MANAGE,
    PROGRAM_MANAGE,
    STUDY_MANAGE,
    INSTITUTION_MANAGE,
];
