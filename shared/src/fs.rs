//! Filesystem helpers shared by the cooker and archive readers.

use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed size of a single source asset read into memory.
pub const MAX_SOURCE_BYTES: u64 = 256 * 1024 * 1024; // 256 MiB
/// Maximum allowed size of a cooked archive read into memory.
pub const MAX_ARCHIVE_BYTES: u64 = 1024 * 1024 * 1024; // 1 GiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
