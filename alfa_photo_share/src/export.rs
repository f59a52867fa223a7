//! ALFA Photo Share - Export Service
//!
//! Hands captured photos to the share chooser, either as-is or packed
//! into one archive. A successful hand-off resets the session; the
//! chooser outcome itself is never observed.

use crate::archive::{build_archive, ArchiveSummary};
use crate::capture::CaptureController;
use crate::error::{ShareError, ShareResult};
use crate::platform::{ShareHost, ShareRequest};

/// How a batch left the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Direct { photos: usize },
    Archive { photos: usize, summary: ArchiveSummary },
}

impl ExportOutcome {
    pub fn photos(&self) -> usize {
        match self {
            ExportOutcome::Direct { photos } | ExportOutcome::Archive { photos, .. } => *photos,
        }
    }
}

/// Export service (stateless, reads the controller's session)
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Share every captured photo in one multi-item `image/*` request
    pub fn share_direct<H: ShareHost + ?Sized>(
        &self,
        controller: &mut CaptureController,
        host: &mut H,
    ) -> ShareResult<ExportOutcome> {
        Self::check_ready(controller)?;
        let references = controller.session().references();

        let photos = references.len();
        let request = ShareRequest::images(references);
        host.share(&request)?;
        log::info!("Shared {} photo(s) directly", photos);

        // TODO: receivers may still be reading when the cache is wiped;
        // defer reset until the chooser reports back once hosts expose that.
        Self::reset_after_share(controller);
        Ok(ExportOutcome::Direct { photos })
    }

    /// Pack every captured photo into one ZIP and share it as `application/zip`
    pub fn share_archive<H: ShareHost + ?Sized>(
        &self,
        controller: &mut CaptureController,
        host: &mut H,
    ) -> ShareResult<ExportOutcome> {
        Self::check_ready(controller)?;

        let sources: Vec<_> = controller
            .session()
            .captured()
            .iter()
            .map(|p| p.path.clone())
            .collect();
        let photos = sources.len();

        let dest = controller
            .cache_mut()
            .allocate_archive_path()
            .map_err(|e| ShareError::ArchiveFailed(e.to_string()))?;
        let summary = build_archive(&dest, &sources)?;

        let shared = controller
            .provider()
            .reference_for(&summary.path)
            .and_then(|reference| host.share(&ShareRequest::archive(reference)));
        if let Err(e) = shared {
            if let Err(rm) = controller.cache().remove_file(&summary.path) {
                log::warn!("Could not remove archive {}: {}", summary.path.display(), rm);
            }
            return Err(e);
        }
        log::info!("Shared archive of {} photo(s)", photos);

        Self::reset_after_share(controller);
        Ok(ExportOutcome::Archive { photos, summary })
    }

    /// Exports need photos and no capture in flight. The post-share reset
    /// would wipe the pending capture's destination.
    fn check_ready(controller: &CaptureController) -> ShareResult<()> {
        let session = controller.session();
        if session.is_empty() {
            return Err(ShareError::NothingToShare);
        }
        if session.is_pending() {
            return Err(ShareError::CaptureInProgress);
        }
        Ok(())
    }

    /// The share already went out, so a failed wipe is only logged
    fn reset_after_share(controller: &mut CaptureController) {
        if let Err(e) = controller.reset() {
            log::warn!("Cache reset after share failed: {}", e);
        }
    }
}
