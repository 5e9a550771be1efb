#![allow(dead_code)]

use anyhow::{Context, Result};
use kextcatalog::{CatalogStore, default_catalog_path};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use crate::support::repo_root;

pub fn catalog_path() -> PathBuf {
    default_catalog_path(&repo_root())
}

pub fn bundled_store() -> CatalogStore {
    CatalogStore::load(&catalog_path()).expect("bundled catalog loads")
}

/// Minimal valid driver record; tests patch fields as needed.
pub fn driver_json(id: &str, category: &str) -> Value {
    json!({
        "id": id,
        "name": id,
        "description": {"en": format!("driver {id}")},
        "category": category,
        "priority": "optional",
        "developmentStatus": "stable",
        "compatibility": "good",
        "hardwareSupport": [{"brand": "intel", "macosVersions": ["14"]}]
    })
}

/// Wraps drivers in a catalog envelope declaring every category they use.
pub fn catalog_json(drivers: Vec<Value>) -> Value {
    let mut categories = BTreeSet::new();
    for driver in &drivers {
        if let Some(category) = driver.get("category").and_then(Value::as_str) {
            categories.insert(category.to_string());
        }
    }
    if categories.is_empty() {
        categories.insert("essential".to_string());
    }
    let categories: Vec<Value> = categories
        .into_iter()
        .map(|id| json!({"id": id.clone(), "name": {"en": id}, "description": "fixture"}))
        .collect();
    json!({
        "schema_version": "kext_catalog_v1",
        "catalog": {"key": "sample_catalog_v1", "title": "sample catalog"},
        "categories": categories,
        "drivers": drivers
    })
}

pub fn write_json(value: &Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, value)?;
    Ok(file)
}

pub fn store_from_json(value: &Value) -> Result<CatalogStore> {
    let file = write_json(value)?;
    CatalogStore::load(file.path())
}

pub fn sample_store(entries: &[(&str, &str)]) -> Result<CatalogStore> {
    let drivers = entries
        .iter()
        .map(|(id, category)| driver_json(id, category))
        .collect();
    store_from_json(&catalog_json(drivers))
        .with_context(|| "failed to load sample catalog".to_string())
}

/// Fifteen drivers spread round-robin over audio, network and usb.
pub fn fifteen_driver_store() -> Result<CatalogStore> {
    let categories = ["audio", "network", "usb"];
    let ids: Vec<String> = (0..15).map(|i| format!("kext{i:02}")).collect();
    let entries: Vec<(&str, &str)> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), categories[i % categories.len()]))
        .collect();
    sample_store(&entries)
}
