//! Identifier table builder (asset header -> per-category id tables)
//!
//! The game declares its asset ids as C enums in a header. Rather than parsing
//! C, the builder scrapes lines of the shape `<Prefix><Symbol><Terminator>...`
//! and numbers each category's symbols in order of appearance, which is the
//! numbering the compiler gives the enumerators.

use std::path::{Path, PathBuf};

use cook_shared::{AssetCategory, AssetId};
use hashbrown::HashMap;
use serde::Deserialize;

/// Characters that end a symbol when no terminator set is configured.
pub const DEFAULT_TERMINATORS: &str = ",;";

/// What to do with a prefixed line that has no terminator or repeats a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnterminatedPolicy {
    /// Drop the line's last character and keep going (the header scraper's
    /// historical behavior). The symbol may come out truncated.
    #[default]
    Truncate,
    /// Fail with the offending line. Repeated symbols fail as well.
    Reject,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub terminators: Vec<char>,
    pub unterminated: UnterminatedPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            terminators: DEFAULT_TERMINATORS.chars().collect(),
            unterminated: UnterminatedPolicy::Truncate,
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            unterminated: UnterminatedPolicy::Reject,
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdSourceError {
    #[error("Failed to read identifier source {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: '{text}' has no terminator (expected one of {expected:?})")]
    Unterminated {
        line: usize,
        text: String,
        expected: String,
    },

    #[error("Line {line}: {category} symbol '{symbol}' already declared with id {first}")]
    Duplicate {
        line: usize,
        category: AssetCategory,
        symbol: String,
        first: AssetId,
    },
}

/// Symbol -> id mapping for one category.
///
/// Ids are positions: the n-th prefixed line of a category gets id n.
#[derive(Debug, Clone)]
pub struct IdTable {
    category: AssetCategory,
    symbols: Vec<String>,
    lookup: HashMap<String, AssetId>,
}

impl IdTable {
    fn new(category: AssetCategory) -> Self {
        Self {
            category,
            symbols: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<AssetId> {
        self.lookup.get(symbol).copied()
    }

    pub fn name(&self, id: AssetId) -> Option<&str> {
        self.symbols.get(id.index()).map(String::as_str)
    }

    /// Symbols in id order
    pub fn iter(&self) -> impl Iterator<Item = (AssetId, &str)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (AssetId(i as u32), s.as_str()))
    }

    /// Assign the next id. A repeated symbol still takes an id, but lookups
    /// keep resolving to the first one, which is returned alongside.
    fn push(&mut self, symbol: String) -> (AssetId, Option<AssetId>) {
        let id = AssetId(self.symbols.len() as u32);
        let first = *self.lookup.entry(symbol.clone()).or_insert(id);
        self.symbols.push(symbol);
        (id, (first != id).then_some(first))
    }
}

/// One [`IdTable`] per asset category.
#[derive(Debug, Clone)]
pub struct IdTables {
    tables: [IdTable; AssetCategory::COUNT],
}

impl IdTables {
    fn empty() -> Self {
        Self {
            tables: AssetCategory::ALL.map(IdTable::new),
        }
    }

    pub fn table(&self, category: AssetCategory) -> &IdTable {
        &self.tables[category.index()]
    }

    pub fn get(&self, category: AssetCategory, symbol: &str) -> Option<AssetId> {
        self.table(category).get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdTable> {
        self.tables.iter()
    }

    /// Number of symbols across all categories
    pub fn total(&self) -> usize {
        self.tables.iter().map(IdTable::count).sum()
    }
}

/// Build id tables from the text of an asset header.
pub fn parse_id_source(text: &str, options: &ParseOptions) -> Result<IdTables, IdSourceError> {
    let mut tables = IdTables::empty();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let Some((category, rest)) = match_prefix(line) else {
            continue;
        };

        let symbol = match extract_symbol(rest, &options.terminators) {
            Some(symbol) => symbol,
            None => match options.unterminated {
                UnterminatedPolicy::Truncate => {
                    let truncated = drop_last_char(rest);
                    tracing::warn!(
                        "Line {}: '{}' has no terminator, using '{}'",
                        index + 1,
                        line,
                        truncated
                    );
                    truncated
                }
                UnterminatedPolicy::Reject => {
                    return Err(IdSourceError::Unterminated {
                        line: index + 1,
                        text: line.to_string(),
                        expected: options.terminators.iter().collect(),
                    });
                }
            },
        };

        let (id, first) = tables.tables[category.index()].push(symbol.to_string());
        if let Some(first) = first {
            match options.unterminated {
                UnterminatedPolicy::Truncate => tracing::warn!(
                    "Line {}: {} symbol '{}' repeated, lookups keep id {}",
                    index + 1,
                    category,
                    symbol,
                    first
                ),
                UnterminatedPolicy::Reject => {
                    return Err(IdSourceError::Duplicate {
                        line: index + 1,
                        category,
                        symbol: symbol.to_string(),
                        first,
                    });
                }
            }
        }
        tracing::trace!("{} {} = {}", category, symbol, id);
    }

    tracing::debug!(
        "Parsed {} identifiers ({})",
        tables.total(),
        tables
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| format!("{}: {}", t.category(), t.count()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(tables)
}

/// Read and parse an asset header from disk.
pub fn load_id_source(path: &Path, options: &ParseOptions) -> Result<IdTables, IdSourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| IdSourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_id_source(&text, options)
}

fn match_prefix(line: &str) -> Option<(AssetCategory, &str)> {
    AssetCategory::ALL
        .into_iter()
        .find_map(|category| line.strip_prefix(category.prefix()).map(|rest| (category, rest)))
}

fn extract_symbol<'a>(rest: &'a str, terminators: &[char]) -> Option<&'a str> {
    rest.find(terminators).map(|end| rest[..end].trim_end())
}

fn drop_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> IdTables {
        parse_id_source(text, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_example_source() {
        let tables = parse("MeshAssetId_raccoon;\nMeshAssetId_robot;\nTextureAssetId_ground;\n");

        let meshes = tables.table(AssetCategory::Mesh);
        assert_eq!(meshes.count(), 2);
        assert_eq!(meshes.get("raccoon"), Some(AssetId(0)));
        assert_eq!(meshes.get("robot"), Some(AssetId(1)));

        let textures = tables.table(AssetCategory::Texture);
        assert_eq!(textures.count(), 1);
        assert_eq!(textures.get("ground"), Some(AssetId(0)));

        assert_eq!(tables.total(), 3);
    }

    #[test]
    fn test_ids_are_dense_and_in_order() {
        let tables = parse(
            "enum SoundAssetId : s32\n{\n\tSoundAssetId_background,\n\tSoundAssetId_step_1,\n\n\tSoundAssetId_step_2,\n\tSoundAssetId_birds,\n\tSoundAssetIdCount\n};\n",
        );

        let sounds = tables.table(AssetCategory::Sound);
        let listed: Vec<_> = sounds.iter().collect();
        assert_eq!(
            listed,
            vec![
                (AssetId(0), "background"),
                (AssetId(1), "step_1"),
                (AssetId(2), "step_2"),
                (AssetId(3), "birds"),
            ]
        );
    }

    #[test]
    fn test_order_changes_ids() {
        let a = parse("MeshAssetId_raccoon,\nMeshAssetId_robot,\n");
        let b = parse("MeshAssetId_robot,\nMeshAssetId_raccoon,\n");

        assert_eq!(a.get(AssetCategory::Mesh, "raccoon"), Some(AssetId(0)));
        assert_eq!(b.get(AssetCategory::Mesh, "raccoon"), Some(AssetId(1)));
        assert_eq!(a.get(AssetCategory::Mesh, "robot"), Some(AssetId(1)));
        assert_eq!(b.get(AssetCategory::Mesh, "robot"), Some(AssetId(0)));
    }

    #[test]
    fn test_categories_are_numbered_independently() {
        let tables = parse(
            "MeshAssetId_a,\nTextureAssetId_a,\nMeshAssetId_b,\nFontAssetId_game,\nTextureAssetId_b,\n",
        );

        assert_eq!(tables.get(AssetCategory::Mesh, "b"), Some(AssetId(1)));
        assert_eq!(tables.get(AssetCategory::Texture, "b"), Some(AssetId(1)));
        assert_eq!(tables.get(AssetCategory::Font, "game"), Some(AssetId(0)));
        assert!(tables.table(AssetCategory::Material).is_empty());
    }

    #[test]
    fn test_every_category_prefix() {
        let text: String = AssetCategory::ALL
            .iter()
            .map(|c| format!("{}first,\n{}second,\n", c.prefix(), c.prefix()))
            .collect();
        let tables = parse(&text);

        for category in AssetCategory::ALL {
            let table = tables.table(category);
            assert_eq!(table.category(), category);
            assert_eq!(table.count(), 2, "{}", category);
            assert_eq!(table.get("second"), Some(AssetId(1)), "{}", category);
        }
    }

    #[test]
    fn test_unmatched_lines_are_ignored() {
        let tables = parse(
            "/*\nenum values, parsed by the cooker\n*/\n#include \"types.h\"\nenum MeshAssetId : s32\n{\n    MeshAssetIdCount\n};\n",
        );
        assert_eq!(tables.total(), 0);
    }

    #[test]
    fn test_rest_of_line_is_ignored() {
        let tables = parse("MeshAssetId_box, // lid is separate\nMeshAssetId_box_cover , \n");

        assert_eq!(tables.get(AssetCategory::Mesh, "box"), Some(AssetId(0)));
        assert_eq!(tables.get(AssetCategory::Mesh, "box_cover"), Some(AssetId(1)));
    }

    #[test]
    fn test_prefix_must_start_the_line() {
        let tables = parse("// see MeshAssetId_raccoon,\nMeshAssetId_robot,\n");
        assert_eq!(tables.get(AssetCategory::Mesh, "robot"), Some(AssetId(0)));
        assert_eq!(tables.get(AssetCategory::Mesh, "raccoon"), None);
    }

    #[test]
    fn test_unterminated_line_is_truncated() {
        let tables = parse("MeshAssetId_cube\nMeshAssetId_train,\n");

        let meshes = tables.table(AssetCategory::Mesh);
        assert_eq!(meshes.name(AssetId(0)), Some("cub"));
        assert_eq!(meshes.get("train"), Some(AssetId(1)));
    }

    #[test]
    fn test_unterminated_line_is_rejected_when_strict() {
        let err = parse_id_source(
            "MeshAssetId_train,\nMeshAssetId_cube\n",
            &ParseOptions::strict(),
        )
        .unwrap_err();

        match err {
            IdSourceError::Unterminated { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "MeshAssetId_cube");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_terminators() {
        let options = ParseOptions {
            terminators: vec!['='],
            unterminated: UnterminatedPolicy::Reject,
        };
        let tables = parse_id_source("FontAssetId_game = 0\nFontAssetId_menu = 1\n", &options)
            .unwrap();

        assert_eq!(tables.get(AssetCategory::Font, "game"), Some(AssetId(0)));
        assert_eq!(tables.get(AssetCategory::Font, "menu"), Some(AssetId(1)));
    }

    #[test]
    fn test_duplicate_symbol_keeps_first_id() {
        let tables = parse("MeshAssetId_box,\nMeshAssetId_box,\nMeshAssetId_cloud,\n");

        let meshes = tables.table(AssetCategory::Mesh);
        assert_eq!(meshes.count(), 3);
        assert_eq!(meshes.get("box"), Some(AssetId(0)));
        assert_eq!(meshes.get("cloud"), Some(AssetId(2)));
        assert_eq!(meshes.name(AssetId(1)), Some("box"));
    }

    #[test]
    fn test_duplicate_symbol_rejected_when_strict() {
        let err = parse_id_source("MeshAssetId_box,\nMeshAssetId_box,\n", &ParseOptions::strict())
            .unwrap_err();
        assert!(matches!(
            err,
            IdSourceError::Duplicate {
                line: 2,
                first: AssetId(0),
                ..
            }
        ));
    }

    #[test]
    fn test_bone_names() {
        let tables = parse("CharacterSkeletonBone_root,\nCharacterSkeletonBone_hip,\n");
        assert_eq!(tables.get(AssetCategory::Bone, "hip"), Some(AssetId(1)));
        assert!(tables.table(AssetCategory::Skeleton).is_empty());
    }

    #[test]
    fn test_load_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_id_source(&dir.path().join("game_assets.h"), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, IdSourceError::Read { .. }));
        assert!(err.to_string().contains("game_assets.h"));
    }
}
