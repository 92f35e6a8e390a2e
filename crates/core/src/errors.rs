//! Core error type definitions

/// Result type alias for dyntool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type carried as the source of a failed load. Loaders may
/// fail with any error type; the cache treats the cause as opaque.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for dyntool operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Load requested for a name absent from the registry
    #[error("tool '{name}' is not registered")]
    NotRegistered { name: String },

    /// A registered loader signalled failure; nothing was inserted
    #[error("failed to load tool '{name}'")]
    LoadFailed {
        name: String,
        #[source]
        source: BoxedError,
    },

    /// Unrecognized eviction policy identifier
    #[error("unknown cache policy '{policy}', expected 'recency' or 'frequency'")]
    InvalidPolicy { policy: String },

    /// Capacity value the cache cannot honor
    #[error("invalid cache capacity {requested}: {message}")]
    InvalidCapacity { requested: usize, message: String },

    /// Malformed unit name at registration time
    #[error("invalid tool name: {message}")]
    InvalidName { message: String },
}

impl Error {
    pub fn not_registered(name: impl Into<String>) -> Self {
        Error::NotRegistered { name: name.into() }
    }

    pub fn load_failed(name: impl Into<String>, source: BoxedError) -> Self {
        Error::LoadFailed {
            name: name.into(),
            source,
        }
    }

    pub fn invalid_policy(policy: impl Into<String>) -> Self {
        Error::InvalidPolicy {
            policy: policy.into(),
        }
    }

    pub fn invalid_capacity(requested: usize, message: impl Into<String>) -> Self {
        Error::InvalidCapacity {
            requested,
            message: message.into(),
        }
    }

    pub fn invalid_name(message: impl Into<String>) -> Self {
        Error::InvalidName {
            message: message.into(),
        }
    }

    /// Whether the failure originated inside a loader rather than the cache
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Error::LoadFailed { .. })
    }
}
