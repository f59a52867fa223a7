//! ALFA Photo Share - Shareable References
//!
//! A `PhotoReference` is an opaque `content://` locator that a receiving
//! app can read through the provider. Paths never leave the crate.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::config::ShareConfig;
use crate::error::{ShareError, ShareResult};

const SCHEME: &str = "content://";

/// Opaque provider-scoped locator for a cache file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoReference(String);

impl PhotoReference {
    /// Wrap a raw URI handed back by the host
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps cache paths to shareable references and back
pub trait ReferenceProvider {
    /// Reference for a file inside the provider's root
    fn reference_for(&self, path: &Path) -> ShareResult<PhotoReference>;

    /// Local path behind a reference issued by this provider
    fn resolve(&self, reference: &PhotoReference) -> ShareResult<PathBuf>;
}

/// File provider scoped to the private cache root
#[derive(Debug, Clone)]
pub struct CacheProvider {
    authority: String,
    root: PathBuf,
}

impl CacheProvider {
    pub fn new(config: &ShareConfig) -> Self {
        Self {
            authority: config.authority.clone(),
            root: config.cache_root.clone(),
        }
    }
}

impl ReferenceProvider for CacheProvider {
    fn reference_for(&self, path: &Path) -> ShareResult<PhotoReference> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| ShareError::ReferenceUnavailable(path.display().to_string()))?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(s) => segments.push(s),
                    None => {
                        return Err(ShareError::ReferenceUnavailable(
                            path.display().to_string(),
                        ))
                    }
                },
                _ => return Err(ShareError::ReferenceUnavailable(path.display().to_string())),
            }
        }

        if segments.is_empty() {
            return Err(ShareError::ReferenceUnavailable(path.display().to_string()));
        }

        Ok(PhotoReference(format!(
            "{}{}/{}",
            SCHEME,
            self.authority,
            segments.join("/")
        )))
    }

    fn resolve(&self, reference: &PhotoReference) -> ShareResult<PathBuf> {
        let invalid = || ShareError::InvalidReference(reference.to_string());

        let rest = reference.as_str().strip_prefix(SCHEME).ok_or_else(invalid)?;
        let (authority, relative) = rest.split_once('/').ok_or_else(invalid)?;
        if authority != self.authority || relative.is_empty() {
            return Err(invalid());
        }

        let mut path = self.root.clone();
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(invalid());
            }
            path.push(segment);
        }

        Ok(path)
    }
}
