//! Cooked asset archive (`cooked_assets`)
//!
//! One archive per cooking session, written when the session closes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Header (4 bytes)                                           │
//! │  └── Magic: "fasf" (0x66736166 little-endian)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CookedArchive (bitcode serialized)                         │
//! │  ├── version: u32                                           │
//! │  ├── created_at / tool_version                              │
//! │  ├── entries: Vec<ArchiveEntry>   ← in cook order           │
//! │  └── blobs: Vec<SourceBlob>       ← deduplicated payloads   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Several entries may point at the same blob: meshes cut from one shared
//! `.glb` store the file once.

use bitcode::{Decode, Encode};
use xxhash_rust::xxh3::xxh3_64;

use crate::{AssetCategory, AssetId, TextureFormat, COOKED_ARCHIVE_FORMAT};

/// Category-specific metadata of a cooked entry.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum EntryKind {
    Mesh { node: String },
    Texture { format: TextureFormat },
    Skeleton { node: String },
    Animation { animation: String },
    Audio,
    Font,
}

impl EntryKind {
    pub fn category(&self) -> AssetCategory {
        match self {
            EntryKind::Mesh { .. } => AssetCategory::Mesh,
            EntryKind::Texture { .. } => AssetCategory::Texture,
            EntryKind::Skeleton { .. } => AssetCategory::Skeleton,
            EntryKind::Animation { .. } => AssetCategory::Animation,
            EntryKind::Audio => AssetCategory::Sound,
            EntryKind::Font => AssetCategory::Font,
        }
    }

    /// Named node or clip inside the source file, if the category has one.
    pub fn sub_asset(&self) -> Option<&str> {
        match self {
            EntryKind::Mesh { node } | EntryKind::Skeleton { node } => Some(node.as_str()),
            EntryKind::Animation { animation } => Some(animation.as_str()),
            EntryKind::Texture { .. } | EntryKind::Audio | EntryKind::Font => None,
        }
    }
}

/// One cooked asset.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ArchiveEntry {
    pub id: AssetId,
    /// Source filename as written in the cook manifest
    pub source: String,
    pub kind: EntryKind,
    /// Index into [`CookedArchive::blobs`]
    pub blob: u32,
}

impl ArchiveEntry {
    pub fn category(&self) -> AssetCategory {
        self.kind.category()
    }
}

/// Deduplicated source payload.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SourceBlob {
    /// xxh3-64 of `data`
    pub hash: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct CookedArchive {
    /// Archive format version (currently 1)
    pub version: u32,

    /// RFC 3339 timestamp of when the archive was cooked
    pub created_at: String,

    /// Version of the tool that cooked the archive
    pub tool_version: String,

    pub entries: Vec<ArchiveEntry>,

    pub blobs: Vec<SourceBlob>,
}

impl CookedArchive {
    pub fn new(tool_version: impl Into<String>) -> Self {
        Self {
            version: COOKED_ARCHIVE_FORMAT.version,
            created_at: chrono::Utc::now().to_rfc3339(),
            tool_version: tool_version.into(),
            entries: Vec::new(),
            blobs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, category: AssetCategory, id: AssetId) -> Option<&ArchiveEntry> {
        self.entries
            .iter()
            .find(|e| e.category() == category && e.id == id)
    }

    pub fn contains(&self, category: AssetCategory, id: AssetId) -> bool {
        self.entry(category, id).is_some()
    }

    /// Payload bytes of an entry
    pub fn blob(&self, entry: &ArchiveEntry) -> Option<&[u8]> {
        self.blobs.get(entry.blob as usize).map(|b| b.data.as_slice())
    }

    /// Append an entry, storing `data` only if an identical payload isn't already present.
    pub fn push(
        &mut self,
        id: AssetId,
        source: impl Into<String>,
        kind: EntryKind,
        data: Vec<u8>,
    ) -> &ArchiveEntry {
        let hash = xxh3_64(&data);
        let blob = match self
            .blobs
            .iter()
            .position(|b| b.hash == hash && b.data == data)
        {
            Some(index) => index,
            None => {
                self.blobs.push(SourceBlob { hash, data });
                self.blobs.len() - 1
            }
        };

        self.entries.push(ArchiveEntry {
            id,
            source: source.into(),
            kind,
            blob: blob as u32,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Total size of all stored payloads
    pub fn payload_bytes(&self) -> u64 {
        self.blobs.iter().map(|b| b.data.len() as u64).sum()
    }

    /// Serialize archive to bytes with magic header
    ///
    /// The output format is:
    /// - 4 bytes: Magic bytes "fasf"
    /// - Remaining bytes: Bitcode-encoded CookedArchive struct
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let mut bytes = COOKED_ARCHIVE_FORMAT.magic.to_vec();
        bytes.extend(bitcode::encode(self));
        Ok(bytes)
    }

    /// Deserialize archive from bytes and validate
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < 4 || &bytes[0..4] != COOKED_ARCHIVE_FORMAT.magic {
            anyhow::bail!(
                "Invalid archive magic bytes (expected: {:?})",
                std::str::from_utf8(COOKED_ARCHIVE_FORMAT.magic).unwrap_or("fasf")
            );
        }

        let archive: CookedArchive = bitcode::decode(&bytes[4..])
            .map_err(|e| anyhow::anyhow!("Failed to decode cooked archive: {}", e))?;

        archive.validate()?;

        Ok(archive)
    }

    /// Validate archive structure
    ///
    /// Checks:
    /// - Version is supported
    /// - Every entry points at an existing blob
    /// - No (category, id) pair is cooked twice
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version > COOKED_ARCHIVE_FORMAT.version {
            anyhow::bail!(
                "Unsupported archive version: {} (max supported: {})",
                self.version,
                COOKED_ARCHIVE_FORMAT.version
            );
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.blob as usize >= self.blobs.len() {
                anyhow::bail!(
                    "Entry {} ({} {}) points at missing blob {} ({} blobs)",
                    i,
                    entry.category(),
                    entry.id,
                    entry.blob,
                    self.blobs.len()
                );
            }
            let first = self
                .entries
                .iter()
                .position(|e| e.category() == entry.category() && e.id == entry.id);
            if first != Some(i) {
                anyhow::bail!("Duplicate entry for {} {}", entry.category(), entry.id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_archive() -> CookedArchive {
        let mut archive = CookedArchive::new("0.1.0");
        archive.push(
            AssetId(0),
            "scenery.glb",
            EntryKind::Mesh {
                node: "small_pot".to_string(),
            },
            b"glTF-scenery".to_vec(),
        );
        archive.push(
            AssetId(1),
            "scenery.glb",
            EntryKind::Mesh {
                node: "big_pot".to_string(),
            },
            b"glTF-scenery".to_vec(),
        );
        archive.push(
            AssetId(0),
            "ground.png",
            EntryKind::Texture {
                format: TextureFormat::U8Srgb,
            },
            b"\x89PNG".to_vec(),
        );
        archive
    }

    #[test]
    fn test_archive_roundtrip() {
        let archive = create_test_archive();
        let bytes = archive.to_bytes().unwrap();
        let decoded = CookedArchive::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.version, archive.version);
        assert_eq!(decoded.tool_version, "0.1.0");
        assert_eq!(decoded.entries, archive.entries);
        assert_eq!(decoded.blobs, archive.blobs);
    }

    #[test]
    fn test_magic_bytes() {
        let bytes = create_test_archive().to_bytes().unwrap();
        assert_eq!(&bytes[0..4], COOKED_ARCHIVE_FORMAT.magic);
    }

    #[test]
    fn test_invalid_magic_bytes() {
        let result = CookedArchive::from_bytes(b"BADMAGIC");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid archive magic bytes")
        );
    }

    #[test]
    fn test_shared_source_stored_once() {
        let archive = create_test_archive();
        assert_eq!(archive.entries.len(), 3);
        assert_eq!(archive.blobs.len(), 2);
        assert_eq!(archive.entries[0].blob, archive.entries[1].blob);
        assert_eq!(archive.payload_bytes(), 12 + 4);
    }

    #[test]
    fn test_entry_lookup() {
        let archive = create_test_archive();

        let big_pot = archive.entry(AssetCategory::Mesh, AssetId(1)).unwrap();
        assert_eq!(big_pot.kind.sub_asset(), Some("big_pot"));
        assert_eq!(archive.blob(big_pot), Some(&b"glTF-scenery"[..]));

        let ground = archive.entry(AssetCategory::Texture, AssetId(0)).unwrap();
        assert_eq!(ground.source, "ground.png");
        assert!(!archive.contains(AssetCategory::Texture, AssetId(1)));
        assert!(!archive.contains(AssetCategory::Font, AssetId(0)));
    }

    #[test]
    fn test_validation_missing_blob() {
        let mut archive = create_test_archive();
        archive.entries[2].blob = 9;

        let result = archive.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing blob 9"));
    }

    #[test]
    fn test_validation_duplicate_entry() {
        let mut archive = create_test_archive();
        archive.entries[1].id = AssetId(0);

        let result = archive.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Duplicate entry for mesh 0")
        );
    }

    #[test]
    fn test_validation_future_version() {
        let mut archive = create_test_archive();
        archive.version = COOKED_ARCHIVE_FORMAT.version + 1;
        assert!(archive.validate().is_err());
    }

    #[test]
    fn test_entry_kind_category() {
        assert_eq!(EntryKind::Audio.category(), AssetCategory::Sound);
        assert_eq!(EntryKind::Font.category(), AssetCategory::Font);
        assert_eq!(
            EntryKind::Animation {
                animation: "Idle".to_string()
            }
            .category(),
            AssetCategory::Animation
        );
        assert_eq!(EntryKind::Audio.sub_asset(), None);
    }
}
