//! ALFA Photo Share - Desktop Host
//!
//! File-backed stand-in for the phone: the "camera" copies the next
//! queued source image into the destination, and the "share chooser"
//! copies shared files into an outbox directory. Results are queued and
//! drained by the caller, same as activity results on a device.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use clap::ValueEnum;

use crate::app::Event;
use crate::error::ShareResult;
use crate::platform::{
    CameraHost, Permission, PermissionHost, RequestToken, ShareHost, ShareRequest,
};
use crate::reference::{CacheProvider, PhotoReference, ReferenceProvider};

/// How the simulated permission dialog behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PermissionMode {
    /// Already granted, no dialog
    Granted,
    /// Dialog shown, user grants
    Grant,
    /// Dialog shown, user denies
    Deny,
}

/// Desktop host platform
pub struct DesktopPlatform {
    provider: CacheProvider,
    sources: VecDeque<PathBuf>,
    permission: PermissionMode,
    granted: bool,
    outbox: PathBuf,
    results: VecDeque<Event>,
    shared: Vec<ShareRequest>,
}

impl DesktopPlatform {
    pub fn new(provider: CacheProvider, outbox: &Path, permission: PermissionMode) -> Self {
        Self {
            provider,
            sources: VecDeque::new(),
            permission,
            granted: permission == PermissionMode::Granted,
            outbox: outbox.to_path_buf(),
            results: VecDeque::new(),
            shared: Vec::new(),
        }
    }

    /// Queue an image the camera will "take" next
    pub fn queue_photo(&mut self, path: impl Into<PathBuf>) {
        self.sources.push_back(path.into());
    }

    pub fn queued(&self) -> usize {
        self.sources.len()
    }

    /// Next activity result waiting to be dispatched
    pub fn next_result(&mut self) -> Option<Event> {
        self.results.pop_front()
    }

    pub fn shared(&self) -> &[ShareRequest] {
        &self.shared
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }
}

impl PermissionHost for DesktopPlatform {
    fn has_permission(&self, _permission: Permission) -> bool {
        self.granted
    }

    fn request_permission(&mut self, permission: Permission, token: RequestToken) -> ShareResult<()> {
        let granted = self.permission != PermissionMode::Deny;
        log::debug!("Simulated dialog for {}: granted={}", permission.identifier(), granted);
        self.granted = granted;
        self.results.push_back(Event::PermissionResult { token, granted });
        Ok(())
    }
}

impl CameraHost for DesktopPlatform {
    fn launch_camera(&mut self, token: RequestToken, destination: &PhotoReference) -> ShareResult<()> {
        let dest = self.provider.resolve(destination)?;

        // an empty queue behaves like the user backing out of the camera
        let success = match self.sources.pop_front() {
            Some(source) => match fs::copy(&source, &dest) {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("Camera could not read {}: {}", source.display(), e);
                    false
                }
            },
            None => false,
        };

        self.results.push_back(Event::CaptureResult { token, success });
        Ok(())
    }
}

impl ShareHost for DesktopPlatform {
    fn share(&mut self, request: &ShareRequest) -> ShareResult<()> {
        fs::create_dir_all(&self.outbox)?;

        for reference in &request.references {
            let path = self.provider.resolve(reference)?;
            if let Some(name) = path.file_name() {
                fs::copy(&path, self.outbox.join(name))?;
            }
        }

        log::info!(
            "Shared {} item(s) as {} into {}",
            request.references.len(),
            request.mime_type,
            self.outbox.display()
        );
        self.shared.push(request.clone());
        Ok(())
    }
}
