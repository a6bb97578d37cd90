//! Cook requests: manifest entries resolved against the id tables.

use std::fmt;

use anyhow::Result;
use cook_shared::{AssetCategory, AssetId, TextureFormat};
use hashbrown::HashSet;

use crate::ids::IdTables;
use crate::manifest::CookManifest;

/// One resolved cook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookRequest {
    Mesh {
        id: AssetId,
        file: String,
        node: String,
    },
    Texture {
        id: AssetId,
        file: String,
        format: TextureFormat,
    },
    Skeleton {
        id: AssetId,
        file: String,
        node: String,
    },
    Animation {
        id: AssetId,
        file: String,
        animation: String,
    },
    Audio {
        id: AssetId,
        file: String,
    },
    Font {
        id: AssetId,
        file: String,
    },
}

impl CookRequest {
    pub fn category(&self) -> AssetCategory {
        match self {
            CookRequest::Mesh { .. } => AssetCategory::Mesh,
            CookRequest::Texture { .. } => AssetCategory::Texture,
            CookRequest::Skeleton { .. } => AssetCategory::Skeleton,
            CookRequest::Animation { .. } => AssetCategory::Animation,
            CookRequest::Audio { .. } => AssetCategory::Sound,
            CookRequest::Font { .. } => AssetCategory::Font,
        }
    }

    pub fn id(&self) -> AssetId {
        match self {
            CookRequest::Mesh { id, .. }
            | CookRequest::Texture { id, .. }
            | CookRequest::Skeleton { id, .. }
            | CookRequest::Animation { id, .. }
            | CookRequest::Audio { id, .. }
            | CookRequest::Font { id, .. } => *id,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            CookRequest::Mesh { file, .. }
            | CookRequest::Texture { file, .. }
            | CookRequest::Skeleton { file, .. }
            | CookRequest::Animation { file, .. }
            | CookRequest::Audio { file, .. }
            | CookRequest::Font { file, .. } => file,
        }
    }

    /// Node or clip name inside the source file
    pub fn sub_asset(&self) -> Option<&str> {
        match self {
            CookRequest::Mesh { node, .. } | CookRequest::Skeleton { node, .. } => {
                Some(node.as_str())
            }
            CookRequest::Animation { animation, .. } => Some(animation.as_str()),
            CookRequest::Texture { .. } | CookRequest::Audio { .. } | CookRequest::Font { .. } => {
                None
            }
        }
    }
}

impl fmt::Display for CookRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}", self.category(), self.id(), self.file())?;
        if let Some(sub) = self.sub_asset() {
            write!(f, "#{}", sub)?;
        }
        if let CookRequest::Texture { format, .. } = self {
            write!(f, ", {}", format)?;
        }
        f.write_str(")")
    }
}

/// Tracks what a category has already claimed while resolving.
struct CategoryClaims {
    category: AssetCategory,
    ids: HashSet<AssetId>,
    sub_assets: HashSet<(String, String)>,
}

impl CategoryClaims {
    fn new(category: AssetCategory) -> Self {
        Self {
            category,
            ids: HashSet::new(),
            sub_assets: HashSet::new(),
        }
    }

    fn resolve(&mut self, tables: &IdTables, symbol: &str) -> Result<AssetId> {
        let id = tables.get(self.category, symbol).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown {} id '{}' (not declared with prefix {})",
                self.category,
                symbol,
                self.category.prefix()
            )
        })?;
        if !self.ids.insert(id) {
            anyhow::bail!("{} id '{}' is cooked more than once", self.category, symbol);
        }
        Ok(id)
    }

    fn claim_sub_asset(&mut self, file: &str, sub_asset: &str) -> Result<()> {
        if !self
            .sub_assets
            .insert((file.to_string(), sub_asset.to_string()))
        {
            anyhow::bail!(
                "{} '{}' is taken from '{}' more than once; sub-asset names must be unique per file",
                self.category,
                sub_asset,
                file
            );
        }
        Ok(())
    }
}

/// Resolve every manifest entry to a request, in cook order: meshes, textures,
/// skeletons, animations, sounds, fonts.
pub fn resolve_requests(manifest: &CookManifest, tables: &IdTables) -> Result<Vec<CookRequest>> {
    let mut requests = Vec::with_capacity(manifest.request_count());

    let mut claims = CategoryClaims::new(AssetCategory::Mesh);
    for entry in &manifest.meshes {
        let id = claims.resolve(tables, &entry.id)?;
        claims.claim_sub_asset(&entry.file, &entry.node)?;
        requests.push(CookRequest::Mesh {
            id,
            file: entry.file.clone(),
            node: entry.node.clone(),
        });
    }

    let mut claims = CategoryClaims::new(AssetCategory::Texture);
    for entry in &manifest.textures {
        let id = claims.resolve(tables, &entry.id)?;
        requests.push(CookRequest::Texture {
            id,
            file: entry.file.clone(),
            format: entry.format,
        });
    }

    let mut claims = CategoryClaims::new(AssetCategory::Skeleton);
    for entry in &manifest.skeletons {
        let id = claims.resolve(tables, &entry.id)?;
        claims.claim_sub_asset(&entry.file, &entry.node)?;
        requests.push(CookRequest::Skeleton {
            id,
            file: entry.file.clone(),
            node: entry.node.clone(),
        });
    }

    let mut claims = CategoryClaims::new(AssetCategory::Animation);
    for entry in &manifest.animations {
        let id = claims.resolve(tables, &entry.id)?;
        claims.claim_sub_asset(&entry.file, &entry.animation)?;
        requests.push(CookRequest::Animation {
            id,
            file: entry.file.clone(),
            animation: entry.animation.clone(),
        });
    }

    let mut claims = CategoryClaims::new(AssetCategory::Sound);
    for entry in &manifest.sounds {
        let id = claims.resolve(tables, &entry.id)?;
        requests.push(CookRequest::Audio {
            id,
            file: entry.file.clone(),
        });
    }

    let mut claims = CategoryClaims::new(AssetCategory::Font);
    for entry in &manifest.fonts {
        let id = claims.resolve(tables, &entry.id)?;
        requests.push(CookRequest::Font {
            id,
            file: entry.file.clone(),
        });
    }

    Ok(requests)
}
