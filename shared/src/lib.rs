//! Shared types for the asset cooking pipeline.
//!
//! Holds what both the cooker and the game-side loader need to agree on:
//! asset categories and their id prefixes, texture color encodings, and the
//! cooked archive container.

pub mod archive_format;
pub mod category;
pub mod formats;
pub mod fs;

pub use archive_format::{ArchiveFormat, COOKED_ARCHIVE_FORMAT};
pub use category::{AssetCategory, AssetId, TextureFormat};
pub use formats::{ArchiveEntry, CookedArchive, EntryKind, SourceBlob};
pub use fs::{read_file_with_limit, MAX_ARCHIVE_BYTES, MAX_SOURCE_BYTES};
