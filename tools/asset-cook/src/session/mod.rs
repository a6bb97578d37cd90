//! Cooking sessions
//!
//! A backend opens a session bound to an output path. The session accepts one
//! cook call per request and is consumed by `close`, so nothing can be cooked
//! into a closed session.

use std::path::{Path, PathBuf};

use cook_shared::{AssetCategory, AssetId, TextureFormat};

mod archive;
mod dry_run;
#[cfg(feature = "native")]
mod native;

pub use archive::{ArchiveBackend, ArchiveSession};
pub use dry_run::{DryRunBackend, DryRunSession};
#[cfg(feature = "native")]
pub use native::{NativeBackend, NativeSession};

#[derive(Debug, thiserror::Error)]
pub enum CookError {
    /// The session could not be acquired. Nothing was cooked.
    #[error("Failed to open cooking session at {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    /// A single cook call failed. The run continues.
    #[error("Failed to cook {category} {id} from '{file}': {reason}")]
    Item {
        category: AssetCategory,
        id: AssetId,
        file: String,
        reason: String,
    },

    #[error("Failed to close cooking session: {0}")]
    Close(String),
}

impl CookError {
    pub fn item(
        category: AssetCategory,
        id: AssetId,
        file: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        CookError::Item {
            category,
            id,
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// What a session reports when it closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseSummary {
    /// Entries committed to the output
    pub entries: usize,
    /// Bytes written to the output
    pub bytes: u64,
}

/// An open cooking session.
pub trait CookSession {
    fn cook_mesh(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError>;

    fn cook_texture(
        &mut self,
        id: AssetId,
        file: &str,
        format: TextureFormat,
    ) -> Result<(), CookError>;

    fn cook_skeleton(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError>;

    fn cook_animation(&mut self, id: AssetId, file: &str, animation: &str)
    -> Result<(), CookError>;

    fn cook_audio(&mut self, id: AssetId, file: &str) -> Result<(), CookError>;

    fn cook_font(&mut self, id: AssetId, file: &str) -> Result<(), CookError>;

    /// Finish the session and commit its output.
    fn close(self) -> Result<CloseSummary, CookError>
    where
        Self: Sized;
}

/// Something that can open a [`CookSession`].
pub trait CookBackend {
    type Session: CookSession;

    fn open(&self, output: &Path) -> Result<Self::Session, CookError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_error_message() {
        let err = CookError::item(AssetCategory::Mesh, AssetId(4), "totem.glb", "node not found");
        assert_eq!(
            err.to_string(),
            "Failed to cook mesh 4 from 'totem.glb': node not found"
        );
    }

    #[test]
    fn test_open_error_message() {
        let err = CookError::Open {
            path: PathBuf::from("out/cooked_assets"),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("out/cooked_assets"));
        assert!(err.to_string().contains("permission denied"));
    }
}
