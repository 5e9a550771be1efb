//! Serde model of the kext catalog document.
//!
//! The top-level envelope uses snake_case keys (`schema_version`); records use
//! the camelCase keys the wizard data files have always used.

use crate::catalog::{CategoryId, Compatibility, DevelopmentStatus, DriverId, LocalizedText, Priority};
use crate::schema_loader::{CatalogSchema, SchemaLoadOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DriverCatalog {
    pub schema_version: String,
    pub catalog: CatalogMetadata,
    pub categories: Vec<CategoryRecord>,
    pub drivers: Vec<DriverRecord>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CatalogMetadata {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// One catalog category. Its driver count is derived by the store, never stored.
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: LocalizedText,
    pub description: LocalizedText,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    pub id: DriverId,
    pub name: LocalizedText,
    pub description: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<LocalizedText>,
    pub category: CategoryId,
    pub priority: Priority,
    pub development_status: DevelopmentStatus,
    pub compatibility: Compatibility,
    #[serde(default)]
    pub dependencies: Vec<DriverId>,
    #[serde(default)]
    pub hardware_support: Vec<HardwareSupport>,
    #[serde(default)]
    pub tags: Vec<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionInfo>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSupport {
    pub brand: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub macos_versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<LocalizedText>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Release metadata. Descriptive only; matching never looks at it.
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default)]
    pub changelog: Option<LocalizedText>,
    #[serde(default)]
    pub is_latest: bool,
}

impl DriverRecord {
    pub fn supports_brand(&self, brand: &str) -> bool {
        self.hardware_support
            .iter()
            .any(|entry| entry.brand.trim().eq_ignore_ascii_case(brand.trim()))
    }

    pub fn supports_macos(&self, version: &str) -> bool {
        self.hardware_support.iter().any(|entry| {
            entry
                .macos_versions
                .iter()
                .any(|v| v.trim().eq_ignore_ascii_case(version.trim()))
        })
    }
}

/// Read, schema-check and deserialize a catalog file.
pub fn load_catalog_from_path(path: &Path) -> Result<DriverCatalog> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?;
    load_catalog_from_str(&data).with_context(|| format!("parsing catalog {}", path.display()))
}

pub fn load_catalog_from_str(data: &str) -> Result<DriverCatalog> {
    let value: Value = serde_json::from_str(data).context("catalog is not valid JSON")?;
    load_catalog_from_value(value)
}

/// Validate an already-parsed document against the bundled catalog schema.
pub fn load_catalog_from_value(value: Value) -> Result<DriverCatalog> {
    let allowed = crate::catalog::store::allowed_schema_versions();
    let schema = CatalogSchema::bundled(SchemaLoadOptions {
        allowed_versions: Some(&allowed),
    })?;
    load_catalog_with_schema(value, &schema)
}

/// Validate against a caller-supplied schema (for example one loaded from disk).
pub fn load_catalog_with_schema(value: Value, schema: &CatalogSchema) -> Result<DriverCatalog> {
    schema.validate(&value)?;
    serde_json::from_value(value).context("catalog does not match the driver record model")
}
