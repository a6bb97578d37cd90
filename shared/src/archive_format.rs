//! Cooked archive format constants.
//!
//! `ArchiveFormat` is the single source of truth for the magic bytes, format
//! version and default file name of the packed asset archive.
//!
//! # Example
//!
//! ```
//! use cook_shared::COOKED_ARCHIVE_FORMAT;
//!
//! assert_eq!(COOKED_ARCHIVE_FORMAT.magic, b"fasf");
//! assert_eq!(COOKED_ARCHIVE_FORMAT.magic_value(), 0x6673_6166);
//! ```

/// Archive format description.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveFormat {
    /// Magic bytes at start of the archive (4 bytes)
    pub magic: &'static [u8; 4],

    /// Format version for backward compatibility
    pub version: u32,

    /// Archive file name used when a manifest doesn't name one
    pub default_name: &'static str,
}

impl ArchiveFormat {
    pub const fn new(magic: &'static [u8; 4], version: u32, default_name: &'static str) -> Self {
        Self {
            magic,
            version,
            default_name,
        }
    }

    /// Magic bytes read as a little-endian `u32`, the way the game's loader checks them.
    pub const fn magic_value(&self) -> u32 {
        u32::from_le_bytes(*self.magic)
    }
}

/// Cooked asset archive: magic `fasf` (0x66736166), version 1.
pub const COOKED_ARCHIVE_FORMAT: ArchiveFormat = ArchiveFormat::new(b"fasf", 1, "cooked_assets");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_magic() {
        assert_eq!(COOKED_ARCHIVE_FORMAT.magic, b"fasf");
        assert_eq!(COOKED_ARCHIVE_FORMAT.magic.len(), 4);
    }

    #[test]
    fn test_magic_matches_loader_value() {
        assert_eq!(COOKED_ARCHIVE_FORMAT.magic_value(), 0x6673_6166);
    }

    #[test]
    fn test_archive_version() {
        assert_eq!(COOKED_ARCHIVE_FORMAT.version, 1);
    }

    #[test]
    fn test_default_name() {
        assert_eq!(COOKED_ARCHIVE_FORMAT.default_name, "cooked_assets");
    }
}
