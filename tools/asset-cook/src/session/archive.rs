//! Archive backend: packs source files into a `cooked_assets` archive.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cook_shared::{
    read_file_with_limit, AssetCategory, AssetId, CookedArchive, EntryKind, TextureFormat,
    MAX_SOURCE_BYTES,
};
use tracing::{debug, info};

use super::{CloseSummary, CookBackend, CookError, CookSession};

/// Opens [`ArchiveSession`]s that read sources from `assets_dir`.
#[derive(Debug, Clone)]
pub struct ArchiveBackend {
    assets_dir: PathBuf,
    source_limit: u64,
}

impl ArchiveBackend {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            source_limit: MAX_SOURCE_BYTES,
        }
    }

    /// Cap on the size of a single source file.
    pub fn with_source_limit(mut self, max_bytes: u64) -> Self {
        self.source_limit = max_bytes;
        self
    }
}

impl CookBackend for ArchiveBackend {
    type Session = ArchiveSession;

    fn open(&self, output: &Path) -> Result<ArchiveSession, CookError> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CookError::Open {
                path: output.to_path_buf(),
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }

        // Created up front so an unwritable output fails before any cook call
        let file = File::create(output).map_err(|e| CookError::Open {
            path: output.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Opened {}", output.display());

        Ok(ArchiveSession {
            output: output.to_path_buf(),
            writer: BufWriter::new(file),
            assets_dir: self.assets_dir.clone(),
            source_limit: self.source_limit,
            archive: CookedArchive::new(env!("CARGO_PKG_VERSION")),
        })
    }
}

/// Session accumulating a [`CookedArchive`] in memory until close.
pub struct ArchiveSession {
    output: PathBuf,
    writer: BufWriter<File>,
    assets_dir: PathBuf,
    source_limit: u64,
    archive: CookedArchive,
}

impl ArchiveSession {
    /// Entries cooked so far
    pub fn archive(&self) -> &CookedArchive {
        &self.archive
    }

    fn add(&mut self, id: AssetId, file: &str, kind: EntryKind) -> Result<(), CookError> {
        let category = kind.category();
        if self.archive.contains(category, id) {
            return Err(CookError::item(category, id, file, "already cooked in this session"));
        }

        let path = self.assets_dir.join(file);
        let data = read_file_with_limit(&path, self.source_limit)
            .map_err(|e| CookError::item(category, id, file, format!("{:#}", e)))?;

        let blobs_before = self.archive.blobs.len();
        let size = data.len();
        let blob = self.archive.push(id, file, kind, data).blob;
        let shared = self.archive.blobs.len() == blobs_before;
        debug!(
            "Cooked {} {} from {} ({} bytes, blob {}{})",
            category,
            id,
            file,
            size,
            blob,
            if shared { ", shared" } else { "" }
        );
        Ok(())
    }
}

impl CookSession for ArchiveSession {
    fn cook_mesh(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError> {
        self.add(
            id,
            file,
            EntryKind::Mesh {
                node: node.to_string(),
            },
        )
    }

    fn cook_texture(
        &mut self,
        id: AssetId,
        file: &str,
        format: TextureFormat,
    ) -> Result<(), CookError> {
        self.add(id, file, EntryKind::Texture { format })
    }

    fn cook_skeleton(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError> {
        self.add(
            id,
            file,
            EntryKind::Skeleton {
                node: node.to_string(),
            },
        )
    }

    fn cook_animation(
        &mut self,
        id: AssetId,
        file: &str,
        animation: &str,
    ) -> Result<(), CookError> {
        self.add(
            id,
            file,
            EntryKind::Animation {
                animation: animation.to_string(),
            },
        )
    }

    fn cook_audio(&mut self, id: AssetId, file: &str) -> Result<(), CookError> {
        self.add(id, file, EntryKind::Audio)
    }

    fn cook_font(&mut self, id: AssetId, file: &str) -> Result<(), CookError> {
        self.add(id, file, EntryKind::Font)
    }

    fn close(mut self) -> Result<CloseSummary, CookError> {
        let bytes = self
            .archive
            .to_bytes()
            .map_err(|e| CookError::Close(format!("{:#}", e)))?;

        self.writer
            .write_all(&bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|e| CookError::Close(format!("{}: {}", self.output.display(), e)))?;

        let summary = CloseSummary {
            entries: self.archive.entries.len(),
            bytes: bytes.len() as u64,
        };

        let per_category: Vec<String> = AssetCategory::ALL
            .into_iter()
            .filter_map(|c| {
                let n = self
                    .archive
                    .entries
                    .iter()
                    .filter(|e| e.category() == c)
                    .count();
                (n > 0).then(|| format!("{}: {}", c, n))
            })
            .collect();
        info!(
            "Wrote {} ({} entries, {} blobs, {} bytes) [{}]",
            self.output.display(),
            summary.entries,
            self.archive.blobs.len(),
            summary.bytes,
            per_category.join(", ")
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, ArchiveBackend) {
        let dir = tempdir().unwrap();
        let assets = dir.path().join("assets");
        std::fs::create_dir(&assets).unwrap();
        std::fs::write(assets.join("scenery.glb"), b"glTF scenery").unwrap();
        std::fs::write(assets.join("ground.png"), b"\x89PNG ground").unwrap();
        std::fs::write(assets.join("step_9.wav"), b"RIFF step").unwrap();
        let backend = ArchiveBackend::new(assets);
        (dir, backend)
    }

    #[test]
    fn test_open_creates_output() {
        let (dir, backend) = setup();
        let output = dir.path().join("out/cooked_assets");

        let session = backend.open(&output).unwrap();
        assert!(output.exists());
        assert!(session.archive().is_empty());
    }

    #[test]
    fn test_open_fails_on_directory() {
        let (dir, backend) = setup();
        let err = backend.open(dir.path()).err().unwrap();
        assert!(matches!(err, CookError::Open { .. }));
    }

    #[test]
    fn test_cook_and_close() {
        let (dir, backend) = setup();
        let output = dir.path().join("cooked_assets");

        let mut session = backend.open(&output).unwrap();
        session.cook_mesh(AssetId(5), "scenery.glb", "small_pot").unwrap();
        session.cook_mesh(AssetId(6), "scenery.glb", "big_pot").unwrap();
        session
            .cook_texture(AssetId(0), "ground.png", TextureFormat::U8Srgb)
            .unwrap();
        session.cook_audio(AssetId(2), "step_9.wav").unwrap();
        let summary = session.close().unwrap();

        assert_eq!(summary.entries, 4);
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(summary.bytes, bytes.len() as u64);

        let archive = CookedArchive::from_bytes(&bytes).unwrap();
        assert_eq!(archive.entries.len(), 4);
        assert_eq!(archive.blobs.len(), 3);

        let big_pot = archive.entry(AssetCategory::Mesh, AssetId(6)).unwrap();
        assert_eq!(big_pot.kind.sub_asset(), Some("big_pot"));
        assert_eq!(archive.blob(big_pot), Some(&b"glTF scenery"[..]));

        let step = archive.entry(AssetCategory::Sound, AssetId(2)).unwrap();
        assert_eq!(step.source, "step_9.wav");
    }

    #[test]
    fn test_missing_source_is_item_error() {
        let (dir, backend) = setup();
        let mut session = backend.open(&dir.path().join("cooked_assets")).unwrap();

        let err = session.cook_font(AssetId(0), "missing.ttf").unwrap_err();
        match err {
            CookError::Item { category, id, file, .. } => {
                assert_eq!(category, AssetCategory::Font);
                assert_eq!(id, AssetId(0));
                assert_eq!(file, "missing.ttf");
            }
            other => panic!("unexpected error: {other}"),
        }

        // The session stays usable
        session.cook_audio(AssetId(0), "step_9.wav").unwrap();
        assert_eq!(session.close().unwrap().entries, 1);
    }

    #[test]
    fn test_recook_same_id_is_item_error() {
        let (dir, backend) = setup();
        let mut session = backend.open(&dir.path().join("cooked_assets")).unwrap();

        session.cook_mesh(AssetId(1), "scenery.glb", "small_pot").unwrap();
        let err = session
            .cook_mesh(AssetId(1), "scenery.glb", "big_pot")
            .unwrap_err();
        assert!(err.to_string().contains("already cooked"));

        // Same id in another category is a different asset
        session.cook_skeleton(AssetId(1), "scenery.glb", "small_pot").unwrap();
        assert_eq!(session.archive().entries.len(), 2);
    }

    #[test]
    fn test_source_limit() {
        let (dir, backend) = setup();
        let backend = backend.with_source_limit(4);
        let mut session = backend.open(&dir.path().join("cooked_assets")).unwrap();

        let err = session
            .cook_animation(AssetId(0), "scenery.glb", "Idle")
            .unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_empty_session_writes_valid_archive() {
        let (dir, backend) = setup();
        let output = dir.path().join("cooked_assets");

        let summary = backend.open(&output).unwrap().close().unwrap();
        assert_eq!(summary.entries, 0);

        let archive = CookedArchive::from_bytes(&std::fs::read(&output).unwrap()).unwrap();
        assert!(archive.is_empty());
    }
}
