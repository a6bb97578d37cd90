//! cook.toml manifest parsing
//!
//! The manifest holds the literal request tables: which source file (and
//! which node or clip inside it) is cooked into each asset id.
//!
//! ```toml
//! [cook]
//! ids = "src/game_assets.h"
//! output = "cooked_assets"
//! assets = "assets"
//!
//! [[meshes]]
//! id = "raccoon"
//! file = "raccoon.glb"
//! node = "raccoon"
//!
//! [[textures]]
//! id = "ground_albedo"
//! file = "ground.png"
//! format = "u8_srgb"
//! ```

use anyhow::{Context, Result};
use cook_shared::{TextureFormat, COOKED_ARCHIVE_FORMAT};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ids::{ParseOptions, UnterminatedPolicy, DEFAULT_TERMINATORS};

/// cook.toml manifest structure
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookManifest {
    pub cook: CookSection,
    #[serde(default)]
    pub meshes: Vec<MeshEntry>,
    #[serde(default)]
    pub textures: Vec<TextureEntry>,
    #[serde(default)]
    pub skeletons: Vec<SkeletonEntry>,
    #[serde(default)]
    pub animations: Vec<AnimationEntry>,
    #[serde(default)]
    pub sounds: Vec<SoundEntry>,
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

/// Session and identifier source settings
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookSection {
    /// Asset id header, relative to the manifest
    pub ids: String,

    /// Archive path, relative to the manifest
    #[serde(default = "default_output")]
    pub output: String,

    /// Directory source files are read from, relative to the manifest
    #[serde(default = "default_assets")]
    pub assets: String,

    /// Handling of header lines without a terminator.
    /// Default: truncate
    #[serde(default)]
    pub unterminated: UnterminatedPolicy,

    /// Characters that end a symbol in the header.
    /// Default: ",;"
    #[serde(default = "default_terminators")]
    pub terminators: String,
}

fn default_output() -> String {
    COOKED_ARCHIVE_FORMAT.default_name.to_string()
}

fn default_assets() -> String {
    ".".to_string()
}

fn default_terminators() -> String {
    DEFAULT_TERMINATORS.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshEntry {
    pub id: String,
    pub file: String,
    /// glTF node to extract
    pub node: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureEntry {
    pub id: String,
    pub file: String,
    /// Color encoding, always stated
    pub format: TextureFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkeletonEntry {
    pub id: String,
    pub file: String,
    /// glTF node the skin is attached to
    pub node: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationEntry {
    pub id: String,
    pub file: String,
    /// Animation clip name inside the file
    pub animation: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundEntry {
    pub id: String,
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontEntry {
    pub id: String,
    pub file: String,
}

impl CookManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse cook.toml")
    }

    /// Check for empty fields that would only surface mid-cook
    pub fn validate(&self) -> Result<()> {
        if self.cook.ids.trim().is_empty() {
            anyhow::bail!("[cook] ids must name the asset id header");
        }
        if self.cook.output.trim().is_empty() {
            anyhow::bail!("[cook] output cannot be empty");
        }
        if self.cook.terminators.is_empty() {
            anyhow::bail!("[cook] terminators must contain at least one character");
        }

        for (i, e) in self.meshes.iter().enumerate() {
            let fields = [
                ("id", e.id.as_str()),
                ("file", e.file.as_str()),
                ("node", e.node.as_str()),
            ];
            require("meshes", i, &fields)?;
        }
        for (i, e) in self.textures.iter().enumerate() {
            require("textures", i, &[("id", e.id.as_str()), ("file", e.file.as_str())])?;
        }
        for (i, e) in self.skeletons.iter().enumerate() {
            let fields = [
                ("id", e.id.as_str()),
                ("file", e.file.as_str()),
                ("node", e.node.as_str()),
            ];
            require("skeletons", i, &fields)?;
        }
        for (i, e) in self.animations.iter().enumerate() {
            let fields = [
                ("id", e.id.as_str()),
                ("file", e.file.as_str()),
                ("animation", e.animation.as_str()),
            ];
            require("animations", i, &fields)?;
        }
        for (i, e) in self.sounds.iter().enumerate() {
            require("sounds", i, &[("id", e.id.as_str()), ("file", e.file.as_str())])?;
        }
        for (i, e) in self.fonts.iter().enumerate() {
            require("fonts", i, &[("id", e.id.as_str()), ("file", e.file.as_str())])?;
        }

        Ok(())
    }

    /// Options for parsing the id header
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            terminators: self.cook.terminators.chars().collect(),
            unterminated: self.cook.unterminated,
        }
    }

    /// Number of cook requests across all tables
    pub fn request_count(&self) -> usize {
        self.meshes.len()
            + self.textures.len()
            + self.skeletons.len()
            + self.animations.len()
            + self.sounds.len()
            + self.fonts.len()
    }
}

fn require(table: &str, index: usize, fields: &[(&str, &str)]) -> Result<()> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            anyhow::bail!("[[{}]] entry {} has an empty '{}' field", table, index + 1, name);
        }
    }
    Ok(())
}

/// A validated manifest and the directory its paths are relative to
pub struct ManifestContext {
    pub manifest: CookManifest,
    pub project_dir: PathBuf,
}

impl ManifestContext {
    pub fn ids_path(&self) -> PathBuf {
        self.project_dir.join(&self.manifest.cook.ids)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.project_dir.join(&self.manifest.cook.assets)
    }

    pub fn output_path(&self, override_path: Option<PathBuf>) -> PathBuf {
        override_path.unwrap_or_else(|| self.project_dir.join(&self.manifest.cook.output))
    }
}

pub fn load_manifest(manifest_path: &Path) -> Result<ManifestContext> {
    let manifest = CookManifest::load(manifest_path)?;
    manifest.validate()?;

    let project_dir = manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    Ok(ManifestContext {
        manifest,
        project_dir,
    })
}
