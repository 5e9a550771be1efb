//! Upgrade a legacy kext catalog to the current schema.
//!
//! Usage:
//!   catalog-migrate --input legacy/kexts.json --output data/kexts.json
//!   catalog-migrate --input legacy/kexts.json > kexts.json
//!
//! The migrated document is re-validated before anything is written; the list
//! of applied fixes goes to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use kextcatalog::migrate::migrate_catalog;
use kextcatalog::{CatalogStore, logging};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-migrate")]
#[command(about = "Upgrade a kext_catalog_v0 document to the current schema")]
struct Cli {
    /// Legacy catalog to read.
    #[arg(long)]
    input: PathBuf,
    /// Destination file; prints to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Suppress the per-fix report on stderr.
    #[arg(long)]
    quiet: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", cli.input.display()))?;

    let migration = migrate_catalog(document)
        .with_context(|| format!("migrating {}", cli.input.display()))?;

    let catalog = kextcatalog::catalog::load_catalog_from_value(migration.document.clone())
        .context("migrated catalog failed schema validation")?;
    let store = CatalogStore::from_catalog(catalog).context("migrated catalog is inconsistent")?;
    log::info!(
        "migrated catalog '{}' holds {} drivers",
        store.metadata().key,
        store.len()
    );

    if !cli.quiet {
        for fix in &migration.fixes {
            eprintln!("{fix}");
        }
        eprintln!("{} fixes applied", migration.fixes.len());
    }

    let json = serde_json::to_string_pretty(&migration.document)?;
    match cli.output {
        Some(path) => {
            fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("migrated catalog written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
