//! Log-only backend for `--dry-run`.

use std::path::{Path, PathBuf};

use cook_shared::{AssetId, TextureFormat};
use tracing::info;

use super::{CloseSummary, CookBackend, CookError, CookSession};

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunBackend;

impl CookBackend for DryRunBackend {
    type Session = DryRunSession;

    fn open(&self, output: &Path) -> Result<DryRunSession, CookError> {
        info!("OPEN FILE: {}", output.display());
        Ok(DryRunSession {
            output: output.to_path_buf(),
            calls: 0,
        })
    }
}

/// Logs every call and writes nothing.
#[derive(Debug)]
pub struct DryRunSession {
    output: PathBuf,
    calls: usize,
}

impl CookSession for DryRunSession {
    fn cook_mesh(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError> {
        info!("COOK MESH: id = {}, file = {}, node = {}", id, file, node);
        self.calls += 1;
        Ok(())
    }

    fn cook_texture(
        &mut self,
        id: AssetId,
        file: &str,
        format: TextureFormat,
    ) -> Result<(), CookError> {
        info!(
            "COOK TEXTURE: id = {}, file = {}, format = {}",
            id,
            file,
            format.code()
        );
        self.calls += 1;
        Ok(())
    }

    fn cook_skeleton(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError> {
        info!("COOK SKELETON: id = {}, file = {}, node = {}", id, file, node);
        self.calls += 1;
        Ok(())
    }

    fn cook_animation(
        &mut self,
        id: AssetId,
        file: &str,
        animation: &str,
    ) -> Result<(), CookError> {
        info!(
            "COOK ANIMATION: id = {}, file = {}, animation = {}",
            id, file, animation
        );
        self.calls += 1;
        Ok(())
    }

    fn cook_audio(&mut self, id: AssetId, file: &str) -> Result<(), CookError> {
        info!("COOK AUDIO: id = {}, file = {}", id, file);
        self.calls += 1;
        Ok(())
    }

    fn cook_font(&mut self, id: AssetId, file: &str) -> Result<(), CookError> {
        info!("COOK FONT: id = {}, file = {}", id, file);
        self.calls += 1;
        Ok(())
    }

    fn close(self) -> Result<CloseSummary, CookError> {
        info!("File closed: {} ({} calls)", self.output.display(), self.calls);
        Ok(CloseSummary {
            entries: self.calls,
            bytes: 0,
        })
    }
}
