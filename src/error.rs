//! Error types for scopegate

/// The main error type for scope resolution and translation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// Permission token is empty or not a string
    #[error("invalid permission string: {0}")]
    InvalidPermissionString(String),

    /// Resolved scope matches none of the kinds the caller supports
    #[error("invalid user scope for {permission}")]
    InvalidUserScope { permission: String },

    /// Access legitimately denied, or the scope kind is not handled by the resource
    #[error("permission denied on {resource}")]
    InvalidPermission { resource: String },

    /// Role name outside the deployment's role set
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// LMDB or serialization failure in the defaults store
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for scopegate operations
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Convert any storage-side error to ScopeError
pub fn err<E: std::error::Error>(e: E) -> ScopeError {
    ScopeError::Storage(e.to_string())
}
