//! # ALFA Photo Share
//!
//! Take a batch of photos with the system camera and share them in one go,
//! either as individual images or packed into a single ZIP.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ALFA PHOTO SHARE                      │
//! │                                                          │
//! │   UI surface ──Event──▶ PhotoShareApp ──UiState──▶ UI    │
//! │                           │                              │
//! │        ┌──────────────────┼───────────────────┐          │
//! │  ┌─────┴──────┐   ┌───────┴───────┐   ┌───────┴──────┐   │
//! │  │ PERMISSION │   │   CAPTURE     │   │   EXPORT     │   │
//! │  │ GATE       │   │   CONTROLLER  │◀──│   SERVICE    │   │
//! │  └─────┬──────┘   └───────┬───────┘   └───────┬──────┘   │
//! │        │          ┌───────┴───────┐   ┌───────┴──────┐   │
//! │        │          │ CACHE DIR +   │   │ ZIP ARCHIVE  │   │
//! │        │          │ PROVIDER      │   │ photo_N.jpg  │   │
//! │        │          └───────────────┘   └──────────────┘   │
//! │  ┌─────┴──────────────────────────────────────────────┐  │
//! │  │   PLATFORM: permission dialog / camera / chooser   │  │
//! │  │          (Android JNI  or  desktop simulation)     │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! - `PhotoShareApp::start` wipes the private image cache
//! - each camera launch carries a `RequestToken`; only one may be pending
//! - a successful share wipes the cache and empties the session again

pub mod error;
pub mod config;
pub mod cache;
pub mod reference;
pub mod platform;
pub mod permission;
pub mod session;
pub mod capture;
pub mod archive;
pub mod export;
pub mod preview;
pub mod app;
pub mod desktop;

#[cfg(feature = "android")]
pub mod android;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ShareError, ShareResult};
pub use config::ShareConfig;
pub use reference::{CacheProvider, PhotoReference, ReferenceProvider};
pub use platform::{Platform, RequestToken, ShareRequest};
pub use capture::CaptureController;
pub use export::{ExportOutcome, ExportService};
pub use app::{Event, Notice, PhotoShareApp, UiState};
pub use desktop::{DesktopPlatform, PermissionMode};

/// ALFA Photo Share version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
