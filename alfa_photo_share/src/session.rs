//! ALFA Photo Share - Capture Session State

use std::path::PathBuf;

use crate::error::{ShareError, ShareResult};
use crate::platform::RequestToken;
use crate::reference::PhotoReference;

/// Camera launch awaiting its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCapture {
    pub token: RequestToken,
    pub reference: PhotoReference,
    pub path: PathBuf,
}

/// One captured photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub reference: PhotoReference,
    pub path: PathBuf,
}

/// Photos captured so far plus the outstanding camera launch, if any
#[derive(Debug, Default)]
pub struct CaptureSession {
    pending: Option<PendingCapture>,
    captured: Vec<CapturedPhoto>,
}

/// Read-only view handed to observers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub photo_count: usize,
    pub capture_pending: bool,
    pub references: Vec<PhotoReference>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&PendingCapture> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn captured(&self) -> &[CapturedPhoto] {
        &self.captured
    }

    pub fn references(&self) -> Vec<PhotoReference> {
        self.captured.iter().map(|p| p.reference.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.captured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// Record a camera launch. Only one may be outstanding.
    pub fn begin(&mut self, pending: PendingCapture) -> ShareResult<()> {
        if self.pending.is_some() {
            return Err(ShareError::CaptureInProgress);
        }
        self.pending = Some(pending);
        Ok(())
    }

    /// Take the pending capture matching `token`. A mismatched token
    /// leaves the pending capture in place.
    pub fn finish(&mut self, token: RequestToken) -> ShareResult<PendingCapture> {
        let expected = self
            .pending
            .as_ref()
            .map(|p| p.token)
            .ok_or(ShareError::NoPendingCapture)?;
        if expected != token {
            return Err(ShareError::StaleResult {
                expected: expected.0,
                got: token.0,
            });
        }
        self.pending.take().ok_or(ShareError::NoPendingCapture)
    }

    pub fn push(&mut self, photo: CapturedPhoto) {
        self.captured.push(photo);
    }

    /// Forget captured photos. A pending capture is untouched.
    pub fn clear_captured(&mut self) {
        self.captured.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            photo_count: self.captured.len(),
            capture_pending: self.pending.is_some(),
            references: self.references(),
        }
    }
}
