//! Everything a run needs before a session is opened.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cook_shared::AssetCategory;

use crate::driver::{cook_all, CookReport};
use crate::ids::{load_id_source, IdTables};
use crate::manifest::{load_manifest, ManifestContext};
use crate::request::{resolve_requests, CookRequest};
use crate::session::{ArchiveBackend, CookBackend};

/// A manifest with its id tables loaded and every request resolved.
///
/// Building one performs all setup checks, so a plan that exists can only
/// fail at open, per item, or at close.
pub struct CookPlan {
    pub context: ManifestContext,
    pub tables: IdTables,
    pub requests: Vec<CookRequest>,
    pub output: PathBuf,
}

impl CookPlan {
    pub fn prepare(manifest_path: &Path, output_override: Option<PathBuf>) -> Result<Self> {
        let context = load_manifest(manifest_path)?;

        let ids_path = context.ids_path();
        let tables = load_id_source(&ids_path, &context.manifest.parse_options())
            .with_context(|| format!("Failed to build id tables from {}", ids_path.display()))?;

        let requests = resolve_requests(&context.manifest, &tables)
            .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;

        let output = context.output_path(output_override);

        tracing::debug!(
            "Prepared {} requests from {} ({} ids declared)",
            requests.len(),
            manifest_path.display(),
            tables.total()
        );

        Ok(Self {
            context,
            tables,
            requests,
            output,
        })
    }

    /// Requests of one category, in cook order
    pub fn requests_in(&self, category: AssetCategory) -> impl Iterator<Item = &CookRequest> {
        self.requests.iter().filter(move |r| r.category() == category)
    }

    /// Backend packing sources from the manifest's asset directory
    pub fn archive_backend(&self) -> ArchiveBackend {
        ArchiveBackend::new(self.context.assets_dir())
    }

    pub fn cook<B: CookBackend>(&self, backend: &B) -> Result<CookReport> {
        cook_all(backend, &self.output, &self.requests)
            .with_context(|| format!("Cooking into {} failed", self.output.display()))
    }
}
