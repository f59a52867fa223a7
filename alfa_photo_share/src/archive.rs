//! ALFA Photo Share - Batch Archive
//!
//! One ZIP per archive share. Entries are `photo_1.jpg` .. `photo_N.jpg`
//! in capture order. Any failure removes the partial file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ShareError, ShareResult};

/// Entry name for the photo at zero-based `index`
pub fn entry_name(index: usize) -> String {
    format!("photo_{}.jpg", index + 1)
}

/// What ended up in a finished archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: usize,
    /// Uncompressed payload bytes
    pub payload_bytes: u64,
}

/// Write `sources` into a new archive at `dest`
pub fn build_archive(dest: &Path, sources: &[PathBuf]) -> ShareResult<ArchiveSummary> {
    match write_entries(dest, sources) {
        Ok(summary) => {
            log::info!(
                "Archive {} written: {} entries, {} bytes",
                dest.display(),
                summary.entries,
                summary.payload_bytes
            );
            Ok(summary)
        }
        Err(e) => {
            match std::fs::remove_file(dest) {
                Ok(()) => {}
                Err(rm) if rm.kind() == io::ErrorKind::NotFound => {}
                Err(rm) => log::warn!("Could not remove partial archive {}: {}", dest.display(), rm),
            }
            log::warn!("Archive {} aborted: {}", dest.display(), e);
            Err(match e {
                ShareError::ArchiveFailed(msg) => ShareError::ArchiveFailed(msg),
                other => ShareError::ArchiveFailed(other.to_string()),
            })
        }
    }
}

fn write_entries(dest: &Path, sources: &[PathBuf]) -> ShareResult<ArchiveSummary> {
    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut payload_bytes = 0;
    for (index, source) in sources.iter().enumerate() {
        let name = entry_name(index);
        let mut input = File::open(source).map_err(|e| {
            ShareError::ArchiveFailed(format!("{} ({}): {}", name, source.display(), e))
        })?;

        zip.start_file(name.as_str(), options)?;
        payload_bytes += io::copy(&mut input, &mut zip)
            .map_err(|e| ShareError::ArchiveFailed(format!("{}: {}", name, e)))?;
    }

    let mut file = zip.finish()?;
    file.flush()?;
    file.sync_all()?;

    Ok(ArchiveSummary {
        path: dest.to_path_buf(),
        entries: sources.len(),
        payload_bytes,
    })
}

#[cfg(test)]
pub(crate) fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (entry.name().to_string(), data)
        })
        .collect()
}
