//! Kext catalog engine for EFI configuration wizards.
//!
//! The crate loads a validated, read-only driver catalog ([`CatalogStore`]),
//! recommends kexts for a hardware snapshot ([`recommend`]), answers faceted
//! searches ([`search`]), tracks one wizard session's picks ([`Session`]) and
//! upgrades legacy catalog documents ([`migrate`]).

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod logging;
pub mod migrate;
pub mod recommend;
pub mod schema_loader;
pub mod search;
pub mod session;

pub use catalog::{
    CatalogMetadata, CatalogStore, CategoryId, CategoryRecord, CategorySummary, Compatibility,
    DEFAULT_CATALOG_PATH, DevelopmentStatus, DriverCatalog, DriverId, DriverRecord,
    FALLBACK_LANGUAGE, HardwareSupport, Keyword, LocalizedText, Priority, VersionInfo,
    load_catalog_from_path, load_catalog_from_str,
};
pub use recommend::{HardwareSelection, Platform, RecommendationRules, recommend};
pub use search::{PageRequest, SearchError, SearchFilter, SearchResult, search};
pub use session::{Action, Session, SessionError};

/// Catalog layout understood by this build.
pub const KEXT_CATALOG_SCHEMA_VERSION: &str = "kext_catalog_v1";

const ENV_CATALOG_PATH: &str = "KEXT_CATALOG_PATH";
const ENV_CATALOG_ROOT: &str = "KEXT_CATALOG_ROOT";
const SCHEMA_SENTINEL: &str = "schema/kext_catalog.schema.json";

fn is_repo_root(candidate: &Path) -> bool {
    candidate.join(DEFAULT_CATALOG_PATH).is_file() && candidate.join(SCHEMA_SENTINEL).is_file()
}

fn repo_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_repo_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_repo_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the directory holding `data/kexts.json`.
///
/// Order: `KEXT_CATALOG_ROOT`, ancestors of the running executable, then the
/// root recorded at build time.
pub fn find_repo_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(ENV_CATALOG_ROOT) {
        if let Some(root) = repo_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("KEXT_CATALOG_ROOT_HINT") {
        if let Some(root) = repo_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate the kext catalog. Set {ENV_CATALOG_ROOT} to the repository root or {ENV_CATALOG_PATH} to a catalog file."
    );
}

pub fn default_catalog_path(repo_root: &Path) -> PathBuf {
    repo_root.join(DEFAULT_CATALOG_PATH)
}

/// Pick the catalog file: explicit flag, then `KEXT_CATALOG_PATH`, then the
/// discovered repository copy.
pub fn resolve_catalog_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env::var_os(ENV_CATALOG_PATH).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let root = find_repo_root()?;
    Ok(default_catalog_path(&root))
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a comma-separated tag string. Unlike [`split_list`], spaces inside a
/// tag are kept ("input devices").
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse hardware snapshots from a JSON object, a JSON array, or NDJSON.
pub fn parse_hardware_stream(input: &str) -> Result<Vec<HardwareSelection>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("No input provided on stdin");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()
                .context("Unable to parse JSON array of hardware selections"),
            Value::Object(_) => serde_json::from_value(value)
                .map(|hw| vec![hw])
                .context("Unable to parse hardware selection"),
            _ => bail!("Unsupported JSON input; expected object or array"),
        };
    }

    let mut selections = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let hw: HardwareSelection = serde_json::from_str(line)
            .with_context(|| format!("Unable to parse hardware selection from line {}", idx + 1))?;
        selections.push(hw);
    }

    if selections.is_empty() {
        bail!("No hardware selections found in input stream");
    }

    Ok(selections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn hint_must_contain_catalog_and_schema() {
        let temp = TempRepo::new();
        assert!(repo_root_from_hint(temp.root.to_str().unwrap()).is_none());

        fs::create_dir_all(temp.root.join("data")).unwrap();
        fs::create_dir_all(temp.root.join("schema")).unwrap();
        fs::write(temp.root.join(DEFAULT_CATALOG_PATH), "{}").unwrap();
        assert!(repo_root_from_hint(temp.root.to_str().unwrap()).is_none());

        fs::write(temp.root.join(SCHEMA_SENTINEL), "{}").unwrap();
        let resolved = repo_root_from_hint(temp.root.to_str().unwrap()).unwrap();
        assert_eq!(resolved, fs::canonicalize(&temp.root).unwrap());
        assert!(repo_root_from_hint("").is_none());
    }

    #[test]
    fn search_upwards_finds_ancestor_root() {
        let temp = TempRepo::new();
        fs::create_dir_all(temp.root.join("data")).unwrap();
        fs::create_dir_all(temp.root.join("schema")).unwrap();
        fs::write(temp.root.join(DEFAULT_CATALOG_PATH), "{}").unwrap();
        fs::write(temp.root.join(SCHEMA_SENTINEL), "{}").unwrap();
        let nested = temp.root.join("target/debug");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            search_upwards(&nested).unwrap(),
            fs::canonicalize(&temp.root).unwrap()
        );
    }

    #[test]
    fn explicit_catalog_path_wins() {
        let path = resolve_catalog_path(Some(Path::new("/tmp/custom.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn split_helpers() {
        assert_eq!(split_list("a, b  c,,"), vec!["a", "b", "c"]);
        assert_eq!(split_tags("input devices, usb,"), vec!["input devices", "usb"]);
    }

    #[test]
    fn hardware_stream_accepts_object_array_and_ndjson() {
        let one = parse_hardware_stream(r#"{"cpuModel":"Core i5-10400","gpuBrand":"intel"}"#)
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].gpu_brand, "intel");

        let many = parse_hardware_stream(r#"[{"cpuModel":"a"},{"cpuModel":"b"}]"#).unwrap();
        assert_eq!(many.len(), 2);

        let ndjson =
            parse_hardware_stream("{\"cpuModel\":\"Ryzen 7\"}\n\n{\"chipset\":\"Z390\"}\n").unwrap();
        assert_eq!(ndjson[1].chipset, "Z390");

        assert!(parse_hardware_stream("   ").is_err());
        assert!(parse_hardware_stream("42").is_err());
    }

    struct TempRepo {
        root: PathBuf,
    }

    impl TempRepo {
        fn new() -> Self {
            static COUNTER: AtomicUsize = AtomicUsize::new(0);
            let mut dir = env::temp_dir();
            dir.push(format!(
                "kextcatalog-root-test-{}-{}",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::SeqCst)
            ));
            fs::create_dir_all(&dir).unwrap();
            Self { root: dir }
        }
    }

    impl Drop for TempRepo {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }
}
