//! Asset categories, ids and texture color encodings.

use std::fmt;
use std::str::FromStr;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Category of a game asset.
///
/// Each category owns one id enumeration in the game's asset header, and every
/// enumerator starts with the category's [`prefix`](AssetCategory::prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub enum AssetCategory {
    Mesh = 0,
    Texture = 1,
    Material = 2,
    Animation = 3,
    Skeleton = 4,
    Bone = 5,
    Sound = 6,
    Font = 7,
}

impl AssetCategory {
    pub const COUNT: usize = 8;

    pub const ALL: [AssetCategory; Self::COUNT] = [
        AssetCategory::Mesh,
        AssetCategory::Texture,
        AssetCategory::Material,
        AssetCategory::Animation,
        AssetCategory::Skeleton,
        AssetCategory::Bone,
        AssetCategory::Sound,
        AssetCategory::Font,
    ];

    /// Enumerator prefix in the asset header. No prefix is a prefix of another.
    pub const fn prefix(self) -> &'static str {
        match self {
            AssetCategory::Mesh => "MeshAssetId_",
            AssetCategory::Texture => "TextureAssetId_",
            AssetCategory::Material => "MaterialAssetId_",
            AssetCategory::Animation => "AnimationAssetId_",
            AssetCategory::Skeleton => "SkeletonAssetId_",
            AssetCategory::Bone => "CharacterSkeletonBone_",
            AssetCategory::Sound => "SoundAssetId_",
            AssetCategory::Font => "FontAssetId_",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AssetCategory::Mesh => "mesh",
            AssetCategory::Texture => "texture",
            AssetCategory::Material => "material",
            AssetCategory::Animation => "animation",
            AssetCategory::Skeleton => "skeleton",
            AssetCategory::Bone => "bone",
            AssetCategory::Sound => "sound",
            AssetCategory::Font => "font",
        }
    }

    /// Position in [`AssetCategory::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::from_name(&lower).ok_or_else(|| {
            let names: Vec<_> = Self::ALL.iter().map(|c| c.name()).collect();
            format!("unknown asset category '{}' (expected one of: {})", s, names.join(", "))
        })
    }
}

/// Dense, zero-based id of an asset within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct AssetId(pub u32);

impl AssetId {
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Color encoding of a cooked texture.
///
/// Discriminants match the game's `TextureFormat` enum and are passed as-is
/// across the native cooker ABI.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub enum TextureFormat {
    /// 8-bit channels, sRGB encoded (albedo, UI art)
    #[serde(rename = "u8_srgb")]
    U8Srgb = 0,
    /// 8-bit channels, linear (normal maps, masks)
    #[serde(rename = "u8_linear")]
    U8Linear = 1,
}

impl TextureFormat {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn name(self) -> &'static str {
        match self {
            TextureFormat::U8Srgb => "u8_srgb",
            TextureFormat::U8Linear => "u8_linear",
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
