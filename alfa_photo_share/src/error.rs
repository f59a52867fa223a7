//! ALFA Photo Share - Error Types

use thiserror::Error;

/// Result type for capture and share operations
pub type ShareResult<T> = Result<T, ShareError>;

/// Share workflow error types
#[derive(Error, Debug)]
pub enum ShareError {
    // ═══════════════════════════════════════════════════════════════
    // CAPTURE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Cannot start capture: {0}")]
    CannotStartCapture(String),

    #[error("A capture is already in progress")]
    CaptureInProgress,

    #[error("No capture is pending")]
    NoPendingCapture,

    #[error("Result for request {got} does not match pending request {expected}")]
    StaleResult { expected: u64, got: u64 },

    #[error("Capture cancelled")]
    CaptureCancelled,

    // ═══════════════════════════════════════════════════════════════
    // PERMISSION ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No permission request is in flight")]
    NoPermissionRequest,

    // ═══════════════════════════════════════════════════════════════
    // REFERENCE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("No shareable reference for: {0}")]
    ReferenceUnavailable(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    // ═══════════════════════════════════════════════════════════════
    // EXPORT ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Nothing to share")]
    NothingToShare,

    #[error("Archive failed: {0}")]
    ArchiveFailed(String),

    #[error("Share failed: {0}")]
    ShareFailed(String),

    // ═══════════════════════════════════════════════════════════════
    // PLATFORM / CONFIG ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ShareError {
    /// The user backed out of an external activity
    pub fn is_user_cancellation(&self) -> bool {
        matches!(
            self,
            ShareError::CaptureCancelled | ShareError::PermissionDenied
        )
    }

    /// Host delivered a result nobody was waiting for
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            ShareError::StaleResult { .. }
                | ShareError::NoPendingCapture
                | ShareError::NoPermissionRequest
        )
    }
}

impl From<zip::result::ZipError> for ShareError {
    fn from(e: zip::result::ZipError) -> Self {
        ShareError::ArchiveFailed(e.to_string())
    }
}

impl From<serde_json::Error> for ShareError {
    fn from(e: serde_json::Error) -> Self {
        ShareError::Config(e.to_string())
    }
}

impl From<image::ImageError> for ShareError {
    fn from(e: image::ImageError) -> Self {
        ShareError::ImageError(e.to_string())
    }
}

#[cfg(feature = "android")]
impl From<jni::errors::Error> for ShareError {
    fn from(e: jni::errors::Error) -> Self {
        ShareError::Platform(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_classification() {
        assert!(ShareError::CaptureCancelled.is_user_cancellation());
        assert!(ShareError::PermissionDenied.is_user_cancellation());
        assert!(!ShareError::NothingToShare.is_user_cancellation());
    }

    #[test]
    fn test_archive_error_text_carries_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "photo gone");
        let err: ShareError = zip::result::ZipError::Io(io).into();
        assert!(err.to_string().contains("photo gone"));
        assert!(!err.is_protocol_violation());
    }
}
