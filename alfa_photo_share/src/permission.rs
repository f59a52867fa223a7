//! ALFA Photo Share - Permission Gate
//!
//! Camera access check before every capture. A denial is final for that
//! attempt; the user has to press "take photo" again.

use crate::error::{ShareError, ShareResult};
use crate::platform::{Permission, PermissionHost, RequestToken};

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Already granted, proceed now
    Granted,
    /// OS dialog is up, answer arrives with this token
    Requested(RequestToken),
}

/// Permission gate for one permission
#[derive(Debug)]
pub struct PermissionGate {
    permission: Permission,
    in_flight: Option<RequestToken>,
}

impl PermissionGate {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            in_flight: None,
        }
    }

    pub fn camera() -> Self {
        Self::new(Permission::Camera)
    }

    pub fn in_flight(&self) -> Option<RequestToken> {
        self.in_flight
    }

    /// Check current state, asking the OS if needed. A second call while
    /// a request is in flight reuses it instead of stacking dialogs.
    pub fn ensure_access<H: PermissionHost + ?Sized>(
        &mut self,
        host: &mut H,
        token: RequestToken,
    ) -> ShareResult<Access> {
        if host.has_permission(self.permission) {
            return Ok(Access::Granted);
        }

        if let Some(existing) = self.in_flight {
            log::debug!("Permission request {} already in flight", existing);
            return Ok(Access::Requested(existing));
        }

        log::info!(
            "Requesting {} (request {})",
            self.permission.identifier(),
            token
        );
        host.request_permission(self.permission, token)?;
        self.in_flight = Some(token);
        Ok(Access::Requested(token))
    }

    /// Settle the in-flight request. `Ok(())` means capture may resume.
    pub fn on_result(&mut self, token: RequestToken, granted: bool) -> ShareResult<()> {
        match self.in_flight {
            None => return Err(ShareError::NoPermissionRequest),
            Some(expected) if expected != token => {
                return Err(ShareError::StaleResult {
                    expected: expected.0,
                    got: token.0,
                })
            }
            Some(_) => self.in_flight = None,
        }

        if granted {
            log::info!("{} granted", self.permission.identifier());
            Ok(())
        } else {
            log::warn!("{} denied", self.permission.identifier());
            Err(ShareError::PermissionDenied)
        }
    }
}
