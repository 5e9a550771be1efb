//! Indexed, read-only view of a kext catalog.
//!
//! The store enforces the catalog schema version and the cross-record rules
//! the JSON schema cannot express (unique ids, category references), then
//! builds id and category indexes once. Nothing mutates it afterwards, so it
//! can be shared freely between threads.

use crate::catalog::{
    CatalogMetadata, CategoryId, CategoryRecord, DriverCatalog, DriverId, DriverRecord,
    LocalizedText, load_catalog_from_path, load_catalog_with_schema,
};
use crate::schema_loader::{CatalogSchema, SchemaLoadOptions};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

// Only one catalog layout exists today; callers can widen the accepted set via
// env while the default stays strict.
const ENV_ALLOWED_SCHEMA_VERSIONS: &str = "KEXT_ALLOWED_CATALOG_SCHEMAS";

#[derive(Debug)]
/// Driver catalog plus derived lookups keyed by id and category.
pub struct CatalogStore {
    catalog: DriverCatalog,
    by_id: BTreeMap<DriverId, usize>,
    by_category: BTreeMap<CategoryId, Vec<usize>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// A category together with its live driver count.
pub struct CategorySummary<'a> {
    pub id: &'a CategoryId,
    pub name: &'a LocalizedText,
    pub description: &'a LocalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
    pub driver_count: usize,
}

impl CatalogStore {
    /// Load, validate and index the catalog at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let catalog =
            load_catalog_from_path(path).with_context(|| format!("loading {}", path.display()))?;
        let store = Self::from_catalog(catalog)
            .with_context(|| format!("validating {}", path.display()))?;
        log::info!(
            "loaded catalog '{}' from {} ({} drivers, {} categories)",
            store.metadata().key,
            path.display(),
            store.len(),
            store.categories().len()
        );
        Ok(store)
    }

    /// Like [`CatalogStore::load`], but checks the document against the schema
    /// at `schema_path` instead of the bundled one.
    pub fn load_with_schema(path: &Path, schema_path: &Path) -> Result<Self> {
        let allowed = allowed_schema_versions();
        let schema = CatalogSchema::load(
            schema_path,
            SchemaLoadOptions {
                allowed_versions: Some(&allowed),
            },
        )?;
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let value: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing catalog {}", path.display()))?;
        let catalog = load_catalog_with_schema(value, &schema)
            .with_context(|| format!("loading {} with {}", path.display(), schema_path.display()))?;
        let store = Self::from_catalog(catalog)
            .with_context(|| format!("validating {}", path.display()))?;
        log::info!(
            "loaded catalog '{}' from {} against schema {}",
            store.metadata().key,
            path.display(),
            schema_path.display()
        );
        Ok(store)
    }

    /// Validate an in-memory catalog and build its indexes.
    pub fn from_catalog(catalog: DriverCatalog) -> Result<Self> {
        validate_schema_version(&catalog.schema_version)?;
        validate_catalog_metadata(&catalog.catalog)?;
        let category_ids = validate_categories(&catalog.categories)?;
        let (by_id, by_category) = build_indexes(&catalog, &category_ids)?;
        warn_dangling_dependencies(&catalog, &by_id);
        Ok(Self {
            catalog,
            by_id,
            by_category,
        })
    }

    pub fn metadata(&self) -> &CatalogMetadata {
        &self.catalog.catalog
    }

    /// Categories in source declaration order.
    pub fn categories(&self) -> &[CategoryRecord] {
        &self.catalog.categories
    }

    pub fn category(&self, id: &CategoryId) -> Option<&CategoryRecord> {
        self.catalog.categories.iter().find(|c| &c.id == id)
    }

    /// Every driver, in load order.
    pub fn drivers(&self) -> &[DriverRecord] {
        &self.catalog.drivers
    }

    /// Drivers filed under `category`, in load order. Unknown categories yield nothing.
    pub fn drivers_by_category(&self, category: &CategoryId) -> Vec<&DriverRecord> {
        self.by_category
            .get(category)
            .map(|slots| slots.iter().map(|&idx| &self.catalog.drivers[idx]).collect())
            .unwrap_or_default()
    }

    /// Resolve a driver by id.
    ///
    /// Returns `None` instead of erroring; callers decide whether a missing id
    /// matters in their context.
    pub fn driver(&self, id: &str) -> Option<&DriverRecord> {
        self.by_id.get(id).map(|&idx| &self.catalog.drivers[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of drivers currently filed under `category`.
    pub fn driver_count(&self, category: &CategoryId) -> usize {
        self.by_category.get(category).map_or(0, Vec::len)
    }

    pub fn category_summaries(&self) -> Vec<CategorySummary<'_>> {
        self.categories()
            .iter()
            .map(|category| CategorySummary {
                id: &category.id,
                name: &category.name,
                description: &category.description,
                icon: category.icon.as_deref(),
                driver_count: self.driver_count(&category.id),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.catalog.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.drivers.is_empty()
    }

    /// Expand `ids` with their transitive dependencies.
    ///
    /// Dependencies come before the drivers that need them and every id
    /// appears once. Unknown ids are skipped; cycles terminate because an id
    /// is marked before its dependencies are visited.
    pub fn with_dependencies<'a, I>(&self, ids: I) -> Vec<DriverId>
    where
        I: IntoIterator<Item = &'a DriverId>,
    {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut ordered = Vec::new();
        for id in ids {
            self.visit_dependencies(id.as_str(), &mut visited, &mut ordered);
        }
        ordered
    }

    fn visit_dependencies<'s>(
        &'s self,
        id: &str,
        visited: &mut BTreeSet<&'s str>,
        ordered: &mut Vec<DriverId>,
    ) {
        let Some(driver) = self.driver(id) else {
            log::debug!("skipping unknown driver '{id}' during dependency expansion");
            return;
        };
        if !visited.insert(driver.id.as_str()) {
            return;
        }
        for dep in &driver.dependencies {
            self.visit_dependencies(dep.as_str(), visited, ordered);
        }
        ordered.push(driver.id.clone());
    }
}

fn validate_schema_version(schema_version: &str) -> Result<()> {
    if schema_version.is_empty() {
        bail!("schema_version must not be empty");
    }

    let allowed = allowed_schema_versions();
    if !allowed.contains(schema_version) {
        bail!(
            "schema_version '{}' not in allowed set {:?}",
            schema_version,
            allowed
        );
    }

    Ok(())
}

/// Catalog schema versions this build accepts (default plus env additions).
pub fn allowed_schema_versions() -> BTreeSet<String> {
    let mut versions: BTreeSet<String> = BTreeSet::new();
    versions.insert(crate::KEXT_CATALOG_SCHEMA_VERSION.to_string());
    if let Ok(raw) = std::env::var(ENV_ALLOWED_SCHEMA_VERSIONS) {
        versions.extend(crate::split_list(&raw));
    }
    versions
}

fn validate_catalog_metadata(meta: &CatalogMetadata) -> Result<()> {
    if !is_identifier(&meta.key) {
        bail!("catalog.key must match ^[A-Za-z0-9_.-]+$, got '{}'", meta.key);
    }
    if meta.title.trim().is_empty() {
        bail!("catalog.title must not be empty");
    }
    Ok(())
}

fn validate_categories(categories: &[CategoryRecord]) -> Result<BTreeSet<CategoryId>> {
    if categories.is_empty() {
        bail!("catalog must define at least one category");
    }
    let mut ids = BTreeSet::new();
    for category in categories {
        if !category.id.is_known() {
            bail!("unknown category id '{}'", category.id);
        }
        if !ids.insert(category.id.clone()) {
            bail!("duplicate category id '{}'", category.id);
        }
        if !category.name.has_fallback() {
            bail!("category {} name has no '{}' text", category.id, crate::FALLBACK_LANGUAGE);
        }
    }
    Ok(ids)
}

type Indexes = (BTreeMap<DriverId, usize>, BTreeMap<CategoryId, Vec<usize>>);

fn build_indexes(catalog: &DriverCatalog, category_ids: &BTreeSet<CategoryId>) -> Result<Indexes> {
    if catalog.drivers.is_empty() {
        bail!("catalog contains no drivers");
    }

    let mut by_id = BTreeMap::new();
    let mut by_category: BTreeMap<CategoryId, Vec<usize>> = BTreeMap::new();
    for (idx, driver) in catalog.drivers.iter().enumerate() {
        if !is_identifier(driver.id.as_str()) {
            bail!("driver id '{}' must match ^[A-Za-z0-9_.-]+$", driver.id);
        }
        if by_id.insert(driver.id.clone(), idx).is_some() {
            bail!("duplicate driver id {}", driver.id);
        }
        if !category_ids.contains(&driver.category) {
            bail!(
                "driver {} references unknown category {}",
                driver.id,
                driver.category
            );
        }
        if !driver.name.has_fallback() || !driver.description.has_fallback() {
            bail!(
                "driver {} is missing '{}' name or description text",
                driver.id,
                crate::FALLBACK_LANGUAGE
            );
        }
        if driver.dependencies.contains(&driver.id) {
            bail!("driver {} lists itself as a dependency", driver.id);
        }
        by_category
            .entry(driver.category.clone())
            .or_default()
            .push(idx);
    }
    Ok((by_id, by_category))
}

// Dependencies are informational; a dangling one is worth a warning, not a failed boot.
fn warn_dangling_dependencies(catalog: &DriverCatalog, by_id: &BTreeMap<DriverId, usize>) {
    for driver in &catalog.drivers {
        for dep in &driver.dependencies {
            if !by_id.contains_key(dep) {
                log::warn!("driver {} depends on unknown driver {}", driver.id, dep);
            }
        }
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
