//! ALFA Photo Share - Capture Controller
//!
//! Owns the capture session and the private cache. Each camera launch
//! gets a fresh `temp_image_<stamp>.jpg` destination and a token; the
//! result callback must present the same token.

use crate::cache::{detect_mime, CacheDir};
use crate::config::ShareConfig;
use crate::error::{ShareError, ShareResult};
use crate::platform::{CameraHost, RequestToken};
use crate::reference::{CacheProvider, ReferenceProvider};
use crate::session::{CaptureSession, CapturedPhoto, PendingCapture, SessionSnapshot};

/// Capture controller
pub struct CaptureController {
    cache: CacheDir,
    provider: Box<dyn ReferenceProvider + Send>,
    session: CaptureSession,
    next_token: u64,
}

impl CaptureController {
    /// Controller over the configured cache, references from `CacheProvider`
    pub fn new(config: &ShareConfig) -> Self {
        Self::with_provider(CacheDir::new(config), Box::new(CacheProvider::new(config)))
    }

    pub fn with_provider(cache: CacheDir, provider: Box<dyn ReferenceProvider + Send>) -> Self {
        Self {
            cache,
            provider,
            session: CaptureSession::new(),
            next_token: 1,
        }
    }

    /// Fresh correlation token, shared by camera and permission requests
    pub fn issue_token(&mut self) -> RequestToken {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        token
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn cache(&self) -> &CacheDir {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut CacheDir {
        &mut self.cache
    }

    pub fn provider(&self) -> &dyn ReferenceProvider {
        self.provider.as_ref()
    }

    /// Allocate a destination and launch the camera on it
    pub fn start_capture<H: CameraHost + ?Sized>(&mut self, camera: &mut H) -> ShareResult<RequestToken> {
        if self.session.is_pending() {
            return Err(ShareError::CaptureInProgress);
        }

        let path = self
            .cache
            .allocate_image_path()
            .map_err(|e| ShareError::CannotStartCapture(e.to_string()))?;
        let reference = self
            .provider
            .reference_for(&path)
            .map_err(|e| ShareError::CannotStartCapture(e.to_string()))?;

        let token = self.issue_token();
        self.session.begin(PendingCapture {
            token,
            reference: reference.clone(),
            path,
        })?;

        if let Err(e) = camera.launch_camera(token, &reference) {
            // nothing was launched, so no result will ever arrive
            let rolled_back = self.session.finish(token);
            debug_assert!(rolled_back.is_ok(), "pending capture {} vanished", token);
            log::warn!("Camera launch {} failed: {}", token, e);
            return Err(ShareError::CannotStartCapture(e.to_string()));
        }

        log::info!("Capture {} started -> {}", token, reference);
        Ok(token)
    }

    /// Settle the pending capture. Returns the new photo count on success.
    pub fn on_capture_result(&mut self, token: RequestToken, success: bool) -> ShareResult<usize> {
        let pending = self.session.finish(token)?;

        if !success {
            log::info!("Capture {} cancelled", token);
            return Err(ShareError::CaptureCancelled);
        }

        match std::fs::read(&pending.path) {
            Ok(data) => {
                let mime = detect_mime(&data);
                if mime != "image/jpeg" {
                    log::warn!("Capture {} wrote {} ({} bytes)", token, mime, data.len());
                }
            }
            Err(e) => log::warn!("Capture {} reported success but file is unreadable: {}", token, e),
        }

        self.session.push(CapturedPhoto {
            reference: pending.reference,
            path: pending.path,
        });

        let count = self.session.len();
        log::info!("Capture {} stored, {} photo(s) in session", token, count);
        Ok(count)
    }

    /// Wipe the image cache and forget captured photos
    pub fn reset(&mut self) -> ShareResult<usize> {
        let removed = self.cache.clear()?;
        self.session.clear_captured();
        log::debug!("Session reset");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;
    use tempfile::tempdir;

    fn setup(dir: &std::path::Path) -> (CaptureController, FakePlatform) {
        let config = ShareConfig::with_cache_root(dir);
        let controller = CaptureController::new(&config);
        let host = FakePlatform::with_camera(CacheProvider::new(&config));
        (controller, host)
    }

    #[test]
    fn test_n_captures_in_order() {
        let dir = tempdir().unwrap();
        let (mut controller, mut host) = setup(dir.path());

        for n in 1..=4 {
            let token = controller.start_capture(&mut host).unwrap();
            assert!(controller.session().is_pending());
            assert_eq!(controller.on_capture_result(token, true).unwrap(), n);
            assert!(!controller.session().is_pending());
        }

        let launched: Vec<_> = host.camera_launches.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(controller.session().references(), launched);
        assert_eq!(controller.snapshot().photo_count, 4);
    }

    #[test]
    fn test_cancel_keeps_list_and_clears_pending() {
        let dir = tempdir().unwrap();
        let (mut controller, mut host) = setup(dir.path());

        let token = controller.start_capture(&mut host).unwrap();
        controller.on_capture_result(token, true).unwrap();

        let token = controller.start_capture(&mut host).unwrap();
        assert!(matches!(
            controller.on_capture_result(token, false),
            Err(ShareError::CaptureCancelled)
        ));
        assert_eq!(controller.session().len(), 1);
        assert!(!controller.session().is_pending());
    }

    #[test]
    fn test_one_capture_at_a_time() {
        let dir = tempdir().unwrap();
        let (mut controller, mut host) = setup(dir.path());

        controller.start_capture(&mut host).unwrap();
        assert!(matches!(
            controller.start_capture(&mut host),
            Err(ShareError::CaptureInProgress)
        ));
        assert_eq!(host.camera_launches.len(), 1);
    }

    #[test]
    fn test_unresolvable_path_cannot_start() {
        let dir = tempdir().unwrap();
        let cache_config = ShareConfig::with_cache_root(dir.path().join("cache"));
        let elsewhere = ShareConfig::with_cache_root(dir.path().join("elsewhere"));
        let mut controller = CaptureController::with_provider(
            CacheDir::new(&cache_config),
            Box::new(CacheProvider::new(&elsewhere)),
        );
        let mut host = FakePlatform::granted();

        assert!(matches!(
            controller.start_capture(&mut host),
            Err(ShareError::CannotStartCapture(_))
        ));
        assert!(!controller.session().is_pending());
        assert!(host.camera_launches.is_empty());
    }

    #[test]
    fn test_failed_launch_rolls_back_pending() {
        let dir = tempdir().unwrap();
        let (mut controller, mut host) = setup(dir.path());
        host.fail_launch = true;

        assert!(matches!(
            controller.start_capture(&mut host),
            Err(ShareError::CannotStartCapture(_))
        ));
        assert!(!controller.session().is_pending());

        host.fail_launch = false;
        assert!(controller.start_capture(&mut host).is_ok());
    }

    #[test]
    fn test_stale_result_ignored() {
        let dir = tempdir().unwrap();
        let (mut controller, mut host) = setup(dir.path());

        let token = controller.start_capture(&mut host).unwrap();
        let bogus = RequestToken(token.0 + 100);
        assert!(controller.on_capture_result(bogus, true).unwrap_err().is_protocol_violation());
        assert!(controller.session().is_pending());
        assert!(controller.session().is_empty());
    }

    #[test]
    fn test_reset_wipes_cache() {
        let dir = tempdir().unwrap();
        let (mut controller, mut host) = setup(dir.path());

        for _ in 0..3 {
            let token = controller.start_capture(&mut host).unwrap();
            controller.on_capture_result(token, true).unwrap();
        }
        assert_eq!(controller.cache().list_images().unwrap().len(), 3);

        assert_eq!(controller.reset().unwrap(), 3);
        assert!(controller.session().is_empty());
        assert!(controller.cache().stats().unwrap().is_empty());
    }
}
