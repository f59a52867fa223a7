//! ALFA Photo Share - Host Platform Seams
//!
//! The camera app, permission dialog and share chooser are external
//! activities. Calls here only launch them; results come back later
//! through `PhotoShareApp` with the same `RequestToken`.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::error::ShareResult;
use crate::reference::PhotoReference;

/// Correlates an asynchronous host result with the request that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Permissions the workflow may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    Camera,
}

impl Permission {
    /// OS identifier for the permission
    pub fn identifier(&self) -> &'static str {
        match self {
            Permission::Camera => "android.permission.CAMERA",
        }
    }
}

/// Media type carried by a share request
pub const MIME_IMAGES: &str = "image/*";
pub const MIME_ZIP: &str = "application/zip";

/// Request handed to the OS share chooser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    pub references: Vec<PhotoReference>,
    pub mime_type: String,
    /// Receiver may read the references
    pub grant_read: bool,
}

impl ShareRequest {
    /// Multi-item share of captured images
    pub fn images(references: Vec<PhotoReference>) -> Self {
        Self {
            references,
            mime_type: MIME_IMAGES.into(),
            grant_read: true,
        }
    }

    /// Single-item share of a batch archive
    pub fn archive(reference: PhotoReference) -> Self {
        Self {
            references: vec![reference],
            mime_type: MIME_ZIP.into(),
            grant_read: true,
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.references.len() > 1
    }
}

/// Permission state and request dialog
pub trait PermissionHost {
    fn has_permission(&self, permission: Permission) -> bool;

    /// Show the OS dialog. The answer arrives later with `token`.
    fn request_permission(&mut self, permission: Permission, token: RequestToken) -> ShareResult<()>;
}

/// External camera activity
pub trait CameraHost {
    /// Launch the camera writing into `destination`. The outcome arrives
    /// later with `token`.
    fn launch_camera(&mut self, token: RequestToken, destination: &PhotoReference) -> ShareResult<()>;
}

/// OS share chooser
pub trait ShareHost {
    /// Hand the request to the chooser. Returns once the chooser is up;
    /// whether the user completes it is not observable.
    fn share(&mut self, request: &ShareRequest) -> ShareResult<()>;
}

/// Everything the workflow needs from the host
pub trait Platform: PermissionHost + CameraHost + ShareHost {}

impl<T: PermissionHost + CameraHost + ShareHost> Platform for T {}
