//! Recording host used by unit tests.

use crate::error::{ShareError, ShareResult};
use crate::platform::{
    CameraHost, Permission, PermissionHost, RequestToken, ShareHost, ShareRequest,
};
use crate::reference::{CacheProvider, PhotoReference, ReferenceProvider};

#[derive(Debug, Default)]
pub struct FakePlatform {
    pub granted: bool,
    pub permission_requests: Vec<RequestToken>,
    pub camera_launches: Vec<(RequestToken, PhotoReference)>,
    pub shares: Vec<ShareRequest>,
    /// Bytes of every shared file, read while the chooser is "open"
    pub shared_payloads: Vec<Vec<Vec<u8>>>,
    pub fail_launch: bool,
    pub fail_share: bool,
    /// When set, the fake camera writes a file at each destination
    pub provider: Option<CacheProvider>,
}

impl FakePlatform {
    pub fn granted() -> Self {
        Self {
            granted: true,
            ..Default::default()
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }

    pub fn with_camera(provider: CacheProvider) -> Self {
        Self {
            granted: true,
            provider: Some(provider),
            ..Default::default()
        }
    }

    pub fn last_launch(&self) -> Option<RequestToken> {
        self.camera_launches.last().map(|(t, _)| *t)
    }

    /// Bytes the fake camera writes for a given request
    pub fn photo_bytes(token: RequestToken) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend_from_slice(format!("photo-{}", token.0).as_bytes());
        bytes
    }
}

impl PermissionHost for FakePlatform {
    fn has_permission(&self, _permission: Permission) -> bool {
        self.granted
    }

    fn request_permission(&mut self, _permission: Permission, token: RequestToken) -> ShareResult<()> {
        self.permission_requests.push(token);
        Ok(())
    }
}

impl CameraHost for FakePlatform {
    fn launch_camera(&mut self, token: RequestToken, destination: &PhotoReference) -> ShareResult<()> {
        if self.fail_launch {
            return Err(ShareError::Platform("no camera app".into()));
        }
        if let Some(provider) = &self.provider {
            let path = provider.resolve(destination)?;
            std::fs::write(path, Self::photo_bytes(token))?;
        }
        self.camera_launches.push((token, destination.clone()));
        Ok(())
    }
}

impl ShareHost for FakePlatform {
    fn share(&mut self, request: &ShareRequest) -> ShareResult<()> {
        if self.fail_share {
            return Err(ShareError::ShareFailed("no chooser".into()));
        }
        if let Some(provider) = &self.provider {
            let mut payload = Vec::new();
            for reference in &request.references {
                payload.push(std::fs::read(provider.resolve(reference)?)?);
            }
            self.shared_payloads.push(payload);
        }
        self.shares.push(request.clone());
        Ok(())
    }
}
