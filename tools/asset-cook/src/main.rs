//! asset-cook - cooks a game's source assets into a single archive
//!
//! Asset ids come from the game's C header; which file backs each id comes
//! from cook.toml.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cook_shared::{read_file_with_limit, AssetCategory, CookedArchive, MAX_ARCHIVE_BYTES};
use std::path::{Path, PathBuf};

use asset_cook::{load_id_source, CookPlan, CookReport, DryRunBackend, IdTables, ParseOptions};

#[derive(Parser)]
#[command(name = "asset-cook")]
#[command(about = "Game asset cooking tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cook every asset listed in a manifest
    Cook {
        /// Path to cook.toml manifest
        #[arg(default_value = "cook.toml")]
        manifest: PathBuf,

        /// Output archive (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log the cook calls without writing anything
        #[arg(long, conflicts_with = "native")]
        dry_run: bool,

        /// Cook through a native cooker library instead of packing sources
        #[arg(long, value_name = "LIB")]
        native: Option<PathBuf>,
    },

    /// Validate manifest and id header without cooking
    Check {
        /// Path to cook.toml manifest
        #[arg(default_value = "cook.toml")]
        manifest: PathBuf,
    },

    /// Print the id tables parsed from an asset header
    Ids {
        /// Asset id header (e.g. game_assets.h)
        source: PathBuf,

        /// Only print one category (mesh, texture, material, animation, ...)
        #[arg(short, long)]
        category: Option<AssetCategory>,

        /// Fail on unterminated or repeated symbols instead of warning
        #[arg(long)]
        strict: bool,
    },

    /// List the contents of a cooked archive
    Inspect {
        /// Cooked archive file
        archive: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging, info unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cook {
            manifest,
            output,
            dry_run,
            native,
        } => {
            let plan = CookPlan::prepare(&manifest, output)?;
            tracing::info!(
                "Cooking {} assets from {:?} into {:?}",
                plan.requests.len(),
                manifest,
                plan.output
            );

            let report = if dry_run {
                plan.cook(&DryRunBackend)?
            } else if let Some(library) = native {
                cook_native(&plan, &library)?
            } else {
                plan.cook(&plan.archive_backend())?
            };

            print_report(&plan, &report, dry_run);
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let plan = CookPlan::prepare(&manifest, None)?;
            for category in AssetCategory::ALL {
                let count = plan.requests_in(category).count();
                if count > 0 {
                    println!(
                        "  {:<10} {:>3} of {} ids",
                        category.name(),
                        count,
                        plan.tables.table(category).count()
                    );
                }
            }
            println!(
                "Manifest is valid: {} requests, output {}",
                plan.requests.len(),
                plan.output.display()
            );
        }

        Commands::Ids {
            source,
            category,
            strict,
        } => {
            let options = if strict {
                ParseOptions::strict()
            } else {
                ParseOptions::default()
            };
            let tables = load_id_source(&source, &options)?;
            print_tables(&tables, category);
        }

        Commands::Inspect { archive } => {
            inspect(&archive)?;
        }
    }

    Ok(())
}

#[cfg(feature = "native")]
fn cook_native(plan: &CookPlan, library: &Path) -> Result<CookReport> {
    plan.cook(&asset_cook::NativeBackend::new(library))
}

#[cfg(not(feature = "native"))]
fn cook_native(_plan: &CookPlan, library: &Path) -> Result<CookReport> {
    anyhow::bail!(
        "Cannot load {}: asset-cook was built without the `native` feature",
        library.display()
    )
}

fn print_report(plan: &CookPlan, report: &CookReport, dry_run: bool) {
    if !report.is_clean() {
        println!("Failed:");
        for failure in &report.failures {
            println!("  {}: {}", failure.request, failure.reason);
        }
    }

    if dry_run {
        println!("Dry run: {} cook calls, nothing written", report.issued);
    } else {
        println!(
            "Cooked {}/{} assets -> {} ({} bytes)",
            report.succeeded(),
            report.issued,
            plan.output.display(),
            report.summary.bytes
        );
    }
}

fn print_tables(tables: &IdTables, only: Option<AssetCategory>) {
    for table in tables.iter() {
        if only.is_some_and(|c| c != table.category()) {
            continue;
        }
        if only.is_none() && table.is_empty() {
            continue;
        }
        println!("{} ({})", table.category(), table.count());
        for (id, symbol) in table.iter() {
            println!("  {:>3}  {}", id.raw(), symbol);
        }
    }
}

fn inspect(path: &Path) -> Result<()> {
    let bytes = read_file_with_limit(path, MAX_ARCHIVE_BYTES)?;
    let archive = CookedArchive::from_bytes(&bytes)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    println!("{}", path.display());
    println!("  Version:  {}", archive.version);
    println!("  Cooked:   {}", archive.created_at);
    println!("  Tool:     {}", archive.tool_version);
    println!(
        "  Entries:  {} ({} blobs, {} payload bytes)",
        archive.entries.len(),
        archive.blobs.len(),
        archive.payload_bytes()
    );

    for entry in &archive.entries {
        let source = match entry.kind.sub_asset() {
            Some(sub) => format!("{}#{}", entry.source, sub),
            None => entry.source.clone(),
        };
        let size = archive.blob(entry).map_or(0, <[u8]>::len);
        println!(
            "  {:<10} {:>3}  {:<40} blob {:>3} ({} bytes)",
            entry.category().name(),
            entry.id.raw(),
            source,
            entry.blob,
            size
        );
    }

    Ok(())
}
