//! asset-cook library
//!
//! Reads the game's asset id header and a `cook.toml` request table, then
//! drives a cooking session through every request in a fixed category order.

pub mod driver;
pub mod ids;
pub mod manifest;
pub mod plan;
pub mod request;
pub mod session;

pub use driver::{cook_all, issue, CookFailure, CookReport};
pub use ids::{
    load_id_source, parse_id_source, IdSourceError, IdTable, IdTables, ParseOptions,
    UnterminatedPolicy, DEFAULT_TERMINATORS,
};
pub use manifest::{load_manifest, CookManifest, ManifestContext};
pub use plan::CookPlan;
pub use request::{resolve_requests, CookRequest};
pub use session::{
    ArchiveBackend, ArchiveSession, CloseSummary, CookBackend, CookError, CookSession,
    DryRunBackend, DryRunSession,
};
#[cfg(feature = "native")]
pub use session::{NativeBackend, NativeSession};

// Shared types callers need alongside the cooker
pub use cook_shared::{AssetCategory, AssetId, CookedArchive, TextureFormat};
