use thiserror::Error;

/// Errors that can occur during avatar operations.
///
/// Authorization failures are deliberately not part of this taxonomy; they
/// are access decisions (see [`crate::domain::authorize`]) that degrade to
/// redirects instead of surfacing as errors.
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("avatar or user not found")]
    NotFound,
    #[error("invalid avatar payload: {0}")]
    ValidationFailed(String),
    #[error("unknown avatar type tag: {0}")]
    UnknownAvatarType(String),
    #[error("avatar storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AvatarError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }
}
