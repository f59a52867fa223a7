//! ALFA Photo Share - Workflow Entry Point
//!
//! Single object the UI talks to. UI events go in, a `Notice` for the
//! user comes out, and every observer gets the new `UiState`.
//!
//! # Example
//!
//! ```rust,ignore
//! use alfa_photo_share::{PhotoShareApp, ShareConfig, Event};
//!
//! let mut app = PhotoShareApp::start(platform, ShareConfig::default())?;
//! app.subscribe(|ui| println!("{}", ui.status));
//!
//! app.dispatch(Event::TakePhoto);
//! // ... camera activity finishes, host calls back:
//! app.dispatch(Event::CaptureResult { token, success: true });
//!
//! app.dispatch(Event::ShareArchive);
//! ```

use std::fmt;
use serde::Serialize;

use crate::capture::CaptureController;
use crate::config::ShareConfig;
use crate::error::{ShareError, ShareResult};
use crate::export::{ExportOutcome, ExportService};
use crate::permission::{Access, PermissionGate};
use crate::platform::{Platform, RequestToken};
use crate::preview::{describe, PreviewEngine};
use crate::session::SessionSnapshot;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS / NOTICES / UI STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything the UI surface or the host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    TakePhoto,
    PermissionResult { token: RequestToken, granted: bool },
    CaptureResult { token: RequestToken, success: bool },
    ShareDirect,
    ShareArchive,
}

/// User-visible outcome of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PhotoCaptured { count: usize },
    CaptureCancelled,
    CannotStartCapture(String),
    CaptureInProgress,
    PermissionDenied,
    NothingToShare,
    ArchiveFailed(String),
    ShareFailed(String),
    Shared { photos: usize, archive: bool },
}

impl Notice {
    /// Notice for a failed action. Protocol violations stay silent.
    pub fn from_error(err: &ShareError) -> Option<Notice> {
        let notice = match err {
            ShareError::CaptureCancelled => Notice::CaptureCancelled,
            ShareError::CaptureInProgress => Notice::CaptureInProgress,
            ShareError::PermissionDenied => Notice::PermissionDenied,
            ShareError::NothingToShare => Notice::NothingToShare,
            ShareError::CannotStartCapture(msg) => Notice::CannotStartCapture(msg.clone()),
            ShareError::ArchiveFailed(msg) => Notice::ArchiveFailed(msg.clone()),
            ShareError::ShareFailed(msg) => Notice::ShareFailed(msg.clone()),
            e if e.is_protocol_violation() => return None,
            other => Notice::ShareFailed(other.to_string()),
        };
        Some(notice)
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::PhotoCaptured { .. } | Notice::Shared { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PhotoCaptured { count } => write!(f, "Photo saved ({} total)", count),
            Notice::CaptureCancelled => write!(f, "Photo capture cancelled"),
            Notice::CannotStartCapture(msg) => write!(f, "Could not start camera: {}", msg),
            Notice::CaptureInProgress => write!(f, "Camera is already open"),
            Notice::PermissionDenied => write!(f, "Camera permission is required to take photos"),
            Notice::NothingToShare => write!(f, "No photos to share"),
            Notice::ArchiveFailed(msg) => write!(f, "Could not create ZIP: {}", msg),
            Notice::ShareFailed(msg) => write!(f, "Could not share: {}", msg),
            Notice::Shared { photos, archive: true } => {
                write!(f, "Sharing {} photo(s) as ZIP", photos)
            }
            Notice::Shared { photos, archive: false } => write!(f, "Sharing {} photo(s)", photos),
        }
    }
}

/// What the UI surface renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub photo_count: usize,
    pub take_photo_enabled: bool,
    /// Export actions appear once at least one photo exists and the
    /// camera is not out
    pub export_visible: bool,
    pub status: String,
}

impl UiState {
    fn derive(snapshot: &SessionSnapshot, permission_pending: bool) -> Self {
        Self {
            photo_count: snapshot.photo_count,
            take_photo_enabled: !snapshot.capture_pending && !permission_pending,
            export_visible: snapshot.photo_count > 0 && !snapshot.capture_pending,
            status: format!("Photos taken: {}", snapshot.photo_count),
        }
    }
}

type Observer = Box<dyn FnMut(&UiState) + Send>;

// ═══════════════════════════════════════════════════════════════════════════════
// PHOTO SHARE APP
// ═══════════════════════════════════════════════════════════════════════════════

/// Capture-and-share workflow bound to a host platform
pub struct PhotoShareApp<P: Platform> {
    platform: P,
    config: ShareConfig,
    controller: CaptureController,
    gate: PermissionGate,
    export: ExportService,
    preview: PreviewEngine,
    observers: Vec<Observer>,
}

impl<P: Platform> PhotoShareApp<P> {
    /// Build the workflow and wipe leftovers from a previous run
    pub fn start(platform: P, config: ShareConfig) -> ShareResult<Self> {
        config.validate()?;

        let mut app = Self {
            platform,
            controller: CaptureController::new(&config),
            gate: PermissionGate::camera(),
            export: ExportService::new(),
            preview: PreviewEngine::new(config.preview_size),
            observers: Vec::new(),
            config,
        };

        let removed = app.controller.reset()?;
        log::info!(
            "Photo share ready (cache {}, {} stale file(s) removed)",
            app.controller.cache().root().display(),
            removed
        );
        Ok(app)
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn controller(&self) -> &CaptureController {
        &self.controller
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    pub fn view(&self) -> UiState {
        UiState::derive(&self.controller.snapshot(), self.gate.in_flight().is_some())
    }

    /// Observer receives the UI state after every event
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&UiState) + Send + 'static,
    {
        let state = self.view();
        let mut observer: Observer = Box::new(observer);
        observer(&state);
        self.observers.push(observer);
    }

    /// Route one event
    pub fn dispatch(&mut self, event: Event) -> Option<Notice> {
        log::debug!("Event: {:?}", event);

        let result = match event {
            Event::TakePhoto => self.take_photo(),
            Event::PermissionResult { token, granted } => self.permission_result(token, granted),
            Event::CaptureResult { token, success } => self
                .controller
                .on_capture_result(token, success)
                .map(|count| Some(Notice::PhotoCaptured { count })),
            Event::ShareDirect => self
                .export
                .share_direct(&mut self.controller, &mut self.platform)
                .map(|o| Some(Self::shared_notice(&o))),
            Event::ShareArchive => self
                .export
                .share_archive(&mut self.controller, &mut self.platform)
                .map(|o| Some(Self::shared_notice(&o))),
        };

        let notice = match result {
            Ok(notice) => notice,
            Err(e) if e.is_protocol_violation() => {
                log::warn!("Ignoring {:?}: {}", event, e);
                None
            }
            Err(e) => {
                if e.is_user_cancellation() {
                    log::debug!("{:?} declined by user: {}", event, e);
                } else {
                    log::info!("{:?} failed: {}", event, e);
                }
                Notice::from_error(&e)
            }
        };

        self.notify();
        notice
    }

    /// Ask the user for a photo (after the permission check)
    pub fn take_photo(&mut self) -> ShareResult<Option<Notice>> {
        if self.controller.session().is_pending() {
            return Err(ShareError::CaptureInProgress);
        }

        let token = self.controller.issue_token();
        let access = self
            .gate
            .ensure_access(&mut self.platform, token)
            .map_err(|e| ShareError::CannotStartCapture(e.to_string()))?;
        match access {
            Access::Granted => {
                self.controller.start_capture(&mut self.platform)?;
                Ok(None)
            }
            Access::Requested(_) => Ok(None),
        }
    }

    fn permission_result(&mut self, token: RequestToken, granted: bool) -> ShareResult<Option<Notice>> {
        self.gate.on_result(token, granted)?;
        self.controller.start_capture(&mut self.platform)?;
        Ok(None)
    }

    fn shared_notice(outcome: &ExportOutcome) -> Notice {
        Notice::Shared {
            photos: outcome.photos(),
            archive: matches!(outcome, ExportOutcome::Archive { .. }),
        }
    }

    /// Preview of the most recent capture, if any
    pub fn latest_preview(&self) -> ShareResult<Option<Vec<u8>>> {
        let Some(latest) = self.controller.session().captured().last() else {
            return Ok(None);
        };

        match self.preview.from_file(&latest.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) => {
                log::warn!("{}: {}", latest.reference, describe(&e));
                Err(e)
            }
        }
    }

    /// Wipe cache and session outside the normal share flow
    pub fn clear(&mut self) -> ShareResult<usize> {
        let removed = self.controller.reset()?;
        self.notify();
        Ok(removed)
    }

    fn notify(&mut self) {
        let state = self.view();
        for observer in &mut self.observers {
            observer(&state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MIME_IMAGES;
    use crate::reference::CacheProvider;
    use crate::testing::FakePlatform;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn app(dir: &std::path::Path) -> PhotoShareApp<FakePlatform> {
        let config = ShareConfig::with_cache_root(dir);
        let platform = FakePlatform::with_camera(CacheProvider::new(&config));
        PhotoShareApp::start(platform, config).unwrap()
    }

    fn capture(app: &mut PhotoShareApp<FakePlatform>, success: bool) -> Option<Notice> {
        assert_eq!(app.dispatch(Event::TakePhoto), None);
        let token = app.platform().last_launch().unwrap();
        app.dispatch(Event::CaptureResult { token, success })
    }

    #[test]
    fn test_start_wipes_stale_cache() {
        let dir = tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir_all(&images).unwrap();
        std::fs::write(images.join("temp_image_1.jpg"), b"old").unwrap();

        let app = app(dir.path());
        assert!(!images.exists());
        assert_eq!(app.view().photo_count, 0);
        assert!(!app.view().export_visible);
    }

    #[test]
    fn test_capture_three_then_share_direct() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        for n in 1..=3 {
            assert_eq!(capture(&mut app, true), Some(Notice::PhotoCaptured { count: n }));
        }
        assert_eq!(app.view().status, "Photos taken: 3");
        assert!(app.view().export_visible);

        let notice = app.dispatch(Event::ShareDirect);
        assert_eq!(notice, Some(Notice::Shared { photos: 3, archive: false }));

        let request = &app.platform().shares[0];
        assert_eq!(request.references.len(), 3);
        assert_eq!(request.mime_type, MIME_IMAGES);
        assert_eq!(app.view().photo_count, 0);
        assert!(app.controller().cache().list_images().unwrap().is_empty());
    }

    #[test]
    fn test_capture_two_then_share_archive() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        capture(&mut app, true);
        capture(&mut app, true);

        let notice = app.dispatch(Event::ShareArchive);
        assert_eq!(notice, Some(Notice::Shared { photos: 2, archive: true }));
        assert_eq!(app.platform().shares.len(), 1);
        assert_eq!(app.platform().shares[0].references.len(), 1);
        assert_eq!(app.snapshot().photo_count, 0);
    }

    #[test]
    fn test_cancel_does_not_count() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        capture(&mut app, true);
        assert_eq!(capture(&mut app, false), Some(Notice::CaptureCancelled));
        assert_eq!(app.view().photo_count, 1);
        assert!(app.view().take_photo_enabled);
        assert!(!app.snapshot().capture_pending);
    }

    #[test]
    fn test_empty_share_notice() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        assert_eq!(app.dispatch(Event::ShareDirect), Some(Notice::NothingToShare));
        assert_eq!(app.dispatch(Event::ShareArchive), Some(Notice::NothingToShare));
        assert!(app.platform().shares.is_empty());
    }

    #[test]
    fn test_permission_flow() {
        let dir = tempdir().unwrap();
        let config = ShareConfig::with_cache_root(dir.path());
        let mut platform = FakePlatform::with_camera(CacheProvider::new(&config));
        platform.granted = false;
        let mut app = PhotoShareApp::start(platform, config).unwrap();

        assert_eq!(app.dispatch(Event::TakePhoto), None);
        assert!(app.platform().camera_launches.is_empty());
        assert!(!app.view().take_photo_enabled);
        let token = app.platform().permission_requests[0];

        // denied: no capture, no retry
        let notice = app.dispatch(Event::PermissionResult { token, granted: false });
        assert_eq!(notice, Some(Notice::PermissionDenied));
        assert!(app.platform().camera_launches.is_empty());
        assert_eq!(app.platform().permission_requests.len(), 1);

        // user taps again and grants
        app.dispatch(Event::TakePhoto);
        let token = app.platform().permission_requests[1];
        assert_eq!(app.dispatch(Event::PermissionResult { token, granted: true }), None);
        assert_eq!(app.platform().camera_launches.len(), 1);

        let capture_token = app.platform().last_launch().unwrap();
        assert_ne!(capture_token, token);
        assert_eq!(
            app.dispatch(Event::CaptureResult { token: capture_token, success: true }),
            Some(Notice::PhotoCaptured { count: 1 })
        );
    }

    #[test]
    fn test_stale_capture_result_is_silent() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        app.dispatch(Event::TakePhoto);
        let notice = app.dispatch(Event::CaptureResult {
            token: RequestToken(9999),
            success: true,
        });
        assert_eq!(notice, None);
        assert!(app.snapshot().capture_pending);
        assert_eq!(app.dispatch(Event::TakePhoto), Some(Notice::CaptureInProgress));
    }

    #[test]
    fn test_archive_failure_notice_keeps_photos() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        capture(&mut app, true);
        capture(&mut app, true);
        let first = app.controller().session().captured()[0].path.clone();
        std::fs::remove_file(first).unwrap();

        let notice = app.dispatch(Event::ShareArchive).unwrap();
        assert!(matches!(notice, Notice::ArchiveFailed(_)));
        assert!(notice.to_string().contains("photo_1.jpg"));
        assert_eq!(app.view().photo_count, 2);
        assert_eq!(app.controller().cache().stats().unwrap().archives, 0);
    }

    #[test]
    fn test_no_export_while_camera_is_out() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        capture(&mut app, true);
        assert_eq!(app.dispatch(Event::TakePhoto), None);
        let token = app.platform().last_launch().unwrap();
        let pending = app.snapshot();
        assert!(pending.capture_pending);
        assert!(!app.view().export_visible);

        assert_eq!(app.dispatch(Event::ShareDirect), Some(Notice::CaptureInProgress));
        assert_eq!(app.dispatch(Event::ShareArchive), Some(Notice::CaptureInProgress));
        assert!(app.platform().shares.is_empty());

        assert_eq!(
            app.dispatch(Event::CaptureResult { token, success: true }),
            Some(Notice::PhotoCaptured { count: 2 })
        );
        assert!(app.view().export_visible);
        assert_eq!(
            app.dispatch(Event::ShareArchive),
            Some(Notice::Shared { photos: 2, archive: true })
        );
        assert_eq!(app.view().photo_count, 0);
    }

    #[test]
    fn test_observers_follow_state() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        app.subscribe(move |ui| sink.lock().push(ui.photo_count));

        capture(&mut app, true);
        capture(&mut app, true);
        app.dispatch(Event::ShareDirect);

        assert_eq!(*seen.lock(), vec![0, 0, 1, 1, 2, 0]);
    }

    #[test]
    fn test_clear_outside_share() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        capture(&mut app, true);
        capture(&mut app, true);
        assert_eq!(app.clear().unwrap(), 2);
        assert_eq!(app.view().photo_count, 0);
        assert!(!app.view().export_visible);
    }

    #[test]
    fn test_chooser_failure_notice() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        capture(&mut app, true);
        app.platform_mut().fail_share = true;
        assert_eq!(
            app.dispatch(Event::ShareDirect),
            Some(Notice::ShareFailed("no chooser".into()))
        );
        assert_eq!(app.view().photo_count, 1);
    }

    #[test]
    fn test_latest_preview() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        assert!(app.latest_preview().unwrap().is_none());

        capture(&mut app, true);
        // the fake camera writes a JPEG header only
        assert!(matches!(app.latest_preview(), Err(ShareError::ImageError(_))));

        let latest = app.controller().session().captured()[0].path.clone();
        let img = image::DynamicImage::new_rgb8(40, 30);
        img.save_with_format(&latest, image::ImageFormat::Jpeg).unwrap();

        let preview = app.latest_preview().unwrap().unwrap();
        let decoded = image::load_from_memory(&preview).unwrap();
        assert_eq!(image::GenericImageView::dimensions(&decoded), (256, 256));
    }
}
