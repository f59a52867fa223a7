//! ALFA Photo Share - Private Cache Directory
//!
//! Holds camera output and transient archives. Only the capture
//! controller writes here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use chrono::Utc;
use walkdir::WalkDir;

use crate::config::ShareConfig;
use crate::error::ShareResult;

/// Private cache directory handler
#[derive(Debug)]
pub struct CacheDir {
    /// Image directory (wiped on reset)
    root: PathBuf,
    image_prefix: String,
    archive_prefix: String,
    /// Last stamp handed out, keeps names strictly increasing
    last_stamp: i64,
}

/// Snapshot of what the cache currently holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub images: usize,
    pub archives: usize,
    pub other: usize,
    pub total_bytes: u64,
}

impl CacheStats {
    pub fn is_empty(&self) -> bool {
        self.images + self.archives + self.other == 0
    }
}

impl CacheDir {
    /// Create handler for the configured image directory
    pub fn new(config: &ShareConfig) -> Self {
        Self {
            root: config.image_root(),
            image_prefix: config.image_prefix.clone(),
            archive_prefix: config.archive_prefix.clone(),
            last_stamp: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if missing
    pub fn ensure(&self) -> ShareResult<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Millisecond timestamp, bumped so two allocations never share one
    fn next_stamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }

    /// New unique path for a camera capture
    pub fn allocate_image_path(&mut self) -> ShareResult<PathBuf> {
        self.ensure()?;
        let stamp = self.next_stamp();
        Ok(self.root.join(format!("{}{}.jpg", self.image_prefix, stamp)))
    }

    /// New unique path for a batch archive
    pub fn allocate_archive_path(&mut self) -> ShareResult<PathBuf> {
        self.ensure()?;
        let stamp = self.next_stamp();
        Ok(self.root.join(format!("{}{}.zip", self.archive_prefix, stamp)))
    }

    /// Delete the whole directory tree. Returns number of files removed.
    pub fn clear(&self) -> ShareResult<usize> {
        let removed = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count();

        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        }

        log::info!("Cache cleared: {} file(s) removed from {}", removed, self.root.display());
        Ok(removed)
    }

    /// Remove a single file, missing files are fine
    pub fn remove_file(&self, path: &Path) -> ShareResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Captured image files currently on disk, sorted by name
    pub fn list_images(&self) -> ShareResult<Vec<PathBuf>> {
        let mut images: Vec<PathBuf> = WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.is_image_name(&e.file_name().to_string_lossy()))
            .map(|e| e.into_path())
            .collect();

        images.sort();
        Ok(images)
    }

    /// Count and size cache contents
    pub fn stats(&self) -> ShareResult<CacheStats> {
        let mut stats = CacheStats::default();

        if !self.root.exists() {
            return Ok(stats);
        }

        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if self.is_image_name(&name) {
                stats.images += 1;
            } else if name.starts_with(&self.archive_prefix) && name.ends_with(".zip") {
                stats.archives += 1;
            } else {
                stats.other += 1;
            }
            stats.total_bytes += entry.metadata().map_err(io::Error::from)?.len();
        }

        Ok(stats)
    }

    fn is_image_name(&self, name: &str) -> bool {
        name.starts_with(&self.image_prefix) && name.ends_with(".jpg")
    }
}

/// Detect MIME type from file content
pub fn detect_mime(data: &[u8]) -> &'static str {
    if data.len() < 8 {
        return "application/octet-stream";
    }

    match &data[0..8] {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, ..] if data.len() > 12 && &data[8..12] == b"WEBP" => "image/webp",
        _ if data.len() > 12 && &data[4..8] == b"ftyp" => match &data[8..12] {
            b"heic" | b"heix" => "image/heic",
            b"mif1" => "image/heif",
            _ => "application/octet-stream",
        },
        _ => "application/octet-stream",
    }
}
