//! ALFA Photo Share - Configuration
//!
//! Where the private cache lives and how files and references are named.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ShareError, ShareResult};

/// Share configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Private cache root
    pub cache_root: PathBuf,
    /// Subdirectory holding captured images (wiped by reset)
    pub image_dir: String,
    /// Provider authority embedded in every reference
    pub authority: String,
    /// File name prefix for captured images
    pub image_prefix: String,
    /// File name prefix for batch archives
    pub archive_prefix: String,
    /// Edge length of the square capture preview
    pub preview_size: u32,
}

impl Default for ShareConfig {
    fn default() -> Self {
        let cache_root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("alfa_photo_share");

        Self {
            cache_root,
            image_dir: "images".into(),
            authority: "dev.alfa.share.fileprovider".into(),
            image_prefix: "temp_image_".into(),
            archive_prefix: "batch_photos_".into(),
            preview_size: 256,
        }
    }
}

impl ShareConfig {
    /// Default config rooted at the given cache directory
    pub fn with_cache_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            cache_root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> ShareResult<Self> {
        let data = std::fs::read(path.as_ref())?;
        let config: ShareConfig = serde_json::from_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ShareResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject names that would escape the cache root, collide, or need
    /// escaping inside a `content://` reference
    pub fn validate(&self) -> ShareResult<()> {
        if !uri_safe(&self.image_dir) || self.image_dir == "." || self.image_dir == ".." {
            return Err(ShareError::Config(format!(
                "image_dir must be a single URI-safe path component, got {:?}",
                self.image_dir
            )));
        }
        if self.authority.is_empty() || !uri_safe(&self.authority) {
            return Err(ShareError::Config(format!(
                "invalid authority {:?}",
                self.authority
            )));
        }
        for prefix in [&self.image_prefix, &self.archive_prefix] {
            if !prefix.is_empty() && !uri_safe(prefix) {
                return Err(ShareError::Config(format!(
                    "file prefix {:?} may only use letters, digits and -._~",
                    prefix
                )));
            }
        }
        if self.image_prefix == self.archive_prefix {
            return Err(ShareError::Config("image and archive prefixes must differ".into()));
        }
        if self.preview_size == 0 {
            return Err(ShareError::Config("preview_size must be positive".into()));
        }

        Ok(())
    }

    /// Directory holding captured images and transient archives
    pub fn image_root(&self) -> PathBuf {
        self.cache_root.join(&self.image_dir)
    }
}

/// RFC 3986 unreserved characters only
fn uri_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}
