//! Errors raised by the emote submission workflow.

use emotes_common::AppError;
use thiserror::Error;

/// Result type for emote operations.
pub type EmoteResult<T> = Result<T, EmoteError>;

/// Fatal outcomes of a submission. Association bookkeeping never produces these.
#[derive(Debug, Error)]
pub enum EmoteError {
    #[error("Invalid canonical name: {0}")]
    InvalidName(String),

    #[error("An emote must have a base image")]
    MissingBaseImage,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("remove_hover cannot be combined with a new hover image")]
    ConflictingHoverOperation,

    #[error("Emote not found: {0}")]
    NotFound(String),

    #[error("Emote already exists: {0}")]
    DuplicateName(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<EmoteError> for AppError {
    fn from(err: EmoteError) -> Self {
        match err {
            EmoteError::InvalidName(_)
            | EmoteError::MissingBaseImage
            | EmoteError::UnsupportedFormat(_)
            | EmoteError::ConflictingHoverOperation => Self::Validation(err.to_string()),
            EmoteError::NotFound(_) => Self::NotFound(err.to_string()),
            EmoteError::DuplicateName(_) => Self::Conflict(err.to_string()),
            EmoteError::Forbidden(_) => Self::Forbidden(err.to_string()),
            EmoteError::App(inner) => inner,
        }
    }
}

impl From<validator::ValidationErrors> for EmoteError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::App(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: EmoteError) -> u16 {
        AppError::from(err).status_code().as_u16()
    }

    #[test]
    fn test_validation_kinds_map_to_unprocessable() {
        assert_eq!(status_of(EmoteError::MissingBaseImage), 422);
        assert_eq!(status_of(EmoteError::ConflictingHoverOperation), 422);
        assert_eq!(status_of(EmoteError::InvalidName("x".to_string())), 422);
        assert_eq!(status_of(EmoteError::UnsupportedFormat("bmp".to_string())), 422);
    }

    #[test]
    fn test_lookup_kinds() {
        assert_eq!(status_of(EmoteError::NotFound("a".to_string())), 404);
        assert_eq!(status_of(EmoteError::DuplicateName("a".to_string())), 409);
        assert_eq!(status_of(EmoteError::Forbidden("a".to_string())), 403);
    }

    #[test]
    fn test_app_error_passes_through() {
        let err: AppError = EmoteError::App(AppError::Storage("disk".to_string())).into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
