//! Query the kext catalog from the command line.
//!
//! Usage:
//!   kext-catalog categories
//!   kext-catalog show lilu --lang de
//!   kext-catalog recommend --cpu "AMD Ryzen 5 5600X" --gpu-brand amd
//!   kext-catalog search --keyword wifi --category network --page 1 --page-size 10
//!   kext-catalog resolve airportitlwm
//!   kext-catalog validate --file data/kexts.json --schema schema/kext_catalog.schema.json
//!
//! Every command prints JSON on stdout; diagnostics go to stderr.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use kextcatalog::{
    CatalogStore, CategoryId, DevelopmentStatus, DriverId, DriverRecord, HardwareSelection,
    PageRequest, Platform, Priority, SearchFilter, logging, parse_hardware_stream, recommend,
    resolve_catalog_path, search, search::DEFAULT_PAGE_SIZE,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::io::{Read, stdin};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kext-catalog")]
#[command(about = "Recommend and search kexts from the bundled driver catalog")]
struct Cli {
    /// Catalog file (defaults to KEXT_CATALOG_PATH or data/kexts.json in the repo).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List categories with their live driver counts.
    Categories,
    /// Print one driver with text resolved for a language.
    Show {
        id: String,
        #[arg(long, default_value = kextcatalog::FALLBACK_LANGUAGE)]
        lang: String,
    },
    /// Recommend drivers for a hardware selection.
    Recommend(RecommendArgs),
    /// Faceted search with pagination.
    Search(SearchArgs),
    /// Expand driver ids with their dependencies.
    Resolve {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Validate a catalog file and print a summary.
    Validate {
        /// Catalog to validate; defaults to the active catalog.
        #[arg(long)]
        file: Option<PathBuf>,
        /// JSON Schema to validate against instead of the bundled one.
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RecommendArgs {
    #[arg(long, default_value = "")]
    cpu: String,
    #[arg(long, default_value = "")]
    cpu_generation: String,
    #[arg(long, default_value = "")]
    gpu_brand: String,
    #[arg(long, default_value = "")]
    gpu_model: String,
    #[arg(long, default_value = "")]
    chipset: String,
    /// Read hardware selections (object, array or NDJSON) from stdin instead of flags.
    #[arg(long, conflicts_with_all = ["cpu", "cpu_generation", "gpu_brand", "gpu_model", "chipset"])]
    stdin: bool,
    /// Append the dependency closure of the recommended drivers.
    #[arg(long)]
    with_dependencies: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long = "category", value_delimiter = ',')]
    categories: Vec<CategoryId>,
    #[arg(long = "status", value_delimiter = ',')]
    statuses: Vec<DevelopmentStatus>,
    #[arg(long = "priority", value_delimiter = ',')]
    priorities: Vec<Priority>,
    #[arg(long = "brand", value_delimiter = ',')]
    brands: Vec<String>,
    #[arg(long = "macos", value_delimiter = ',')]
    macos_versions: Vec<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    /// Resolve names and descriptions for this language in the output.
    #[arg(long)]
    lang: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationOutput {
    hardware: HardwareSelection,
    platform: Platform,
    drivers: Vec<DriverId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bundle: Option<Vec<DriverId>>,
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

    let catalog_path = match &cli.command {
        Command::Validate {
            file: Some(path), ..
        } => path.clone(),
        _ => resolve_catalog_path(cli.catalog.as_deref())?,
    };
    let store = match &cli.command {
        Command::Validate {
            schema: Some(schema_path),
            ..
        } => CatalogStore::load_with_schema(&catalog_path, schema_path)?,
        _ => CatalogStore::load(&catalog_path)?,
    };

    match cli.command {
        Command::Categories => print_json(&store.category_summaries()),
        Command::Show { id, lang } => {
            let driver = store
                .driver(&id)
                .with_context(|| format!("driver '{id}' is not in the catalog"))?;
            print_json(&localized_view(driver, &lang))
        }
        Command::Recommend(args) => run_recommend(&store, args),
        Command::Search(args) => run_search(&store, args),
        Command::Resolve { ids } => {
            let ids: Vec<DriverId> = ids.into_iter().map(DriverId).collect();
            if let Some(missing) = ids.iter().find(|id| !store.contains(id.as_str())) {
                bail!("driver '{missing}' is not in the catalog");
            }
            print_json(&store.with_dependencies(&ids))
        }
        Command::Validate { schema, .. } => print_json(&json!({
            "path": catalog_path.display().to_string(),
            "schema": schema.map(|path| path.display().to_string()),
            "key": store.metadata().key,
            "drivers": store.len(),
            "categories": store.categories().len(),
            "valid": true,
        })),
    }
}

fn run_recommend(store: &CatalogStore, args: RecommendArgs) -> Result<()> {
    let selections = if args.stdin {
        let mut buf = String::new();
        stdin()
            .read_to_string(&mut buf)
            .context("reading hardware selections from stdin")?;
        parse_hardware_stream(&buf)?
    } else {
        vec![HardwareSelection {
            cpu_model: args.cpu,
            cpu_generation: args.cpu_generation,
            gpu_brand: args.gpu_brand,
            gpu_model: args.gpu_model,
            chipset: args.chipset,
        }]
    };

    let outputs: Vec<RecommendationOutput> = selections
        .into_iter()
        .map(|hardware| {
            let drivers = recommend(store, &hardware);
            let bundle = args
                .with_dependencies
                .then(|| store.with_dependencies(&drivers));
            RecommendationOutput {
                platform: Platform::detect(&hardware),
                hardware,
                drivers,
                bundle,
            }
        })
        .collect();

    if args.stdin {
        for output in &outputs {
            println!("{}", serde_json::to_string(output)?);
        }
        Ok(())
    } else {
        print_json(&outputs[0])
    }
}

fn run_search(store: &CatalogStore, args: SearchArgs) -> Result<()> {
    let filter = SearchFilter {
        keyword: args.keyword,
        categories: args.categories.into_iter().collect(),
        development_status: args.statuses.into_iter().collect(),
        priority: args.priorities.into_iter().collect(),
        hardware_brands: args.brands.into_iter().collect(),
        macos_versions: args.macos_versions.into_iter().collect(),
    };
    let result = search(store, &filter, PageRequest::new(args.page, args.page_size))?;

    match args.lang {
        Some(lang) => {
            let mut value = serde_json::to_value(&result)?;
            value["drivers"] = Value::Array(
                result
                    .drivers
                    .iter()
                    .map(|driver| localized_view(driver, &lang))
                    .collect(),
            );
            print_json(&value)
        }
        None => print_json(&result),
    }
}

// Flattens localized fields to plain strings for one language.
fn localized_view(driver: &DriverRecord, lang: &str) -> Value {
    json!({
        "id": driver.id,
        "name": driver.name.resolve(lang),
        "description": driver.description.resolve(lang),
        "languages": driver.description.languages(),
        "notes": driver.notes.as_ref().map(|notes| notes.resolve(lang)),
        "category": driver.category,
        "priority": driver.priority,
        "developmentStatus": driver.development_status,
        "compatibility": driver.compatibility,
        "dependencies": driver.dependencies,
        "tags": driver.tags.iter().map(|tag| tag.resolve(lang)).collect::<Vec<_>>(),
        "version": driver.version.as_ref().map(|v| v.version.as_str()),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
