//! One-way upgrade of legacy (`kext_catalog_v0`) catalog documents.
//!
//! Legacy data drifted in a few known ways: Simplified Chinese stored under a
//! bare `zh` key, localized maps without an `en` entry, tags serialized as
//! JSON strings or as one comma-separated string, and a cached `driverCount`
//! on categories. The migration rewrites those shapes and stamps the current
//! schema version; it works on raw JSON so it can read documents the typed
//! model would reject.

use anyhow::{Result, bail};
use serde_json::{Map, Value};
use std::fmt;

pub const LEGACY_SCHEMA_VERSION: &str = "kext_catalog_v0";

const LEGACY_CHINESE_KEY: &str = "zh";
const SIMPLIFIED_CHINESE_KEY: &str = "zh-CN";
const CATEGORY_TEXT_FIELDS: &[&str] = &["name", "description"];
const DRIVER_TEXT_FIELDS: &[&str] = &["name", "description", "notes"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixKind {
    RenamedLanguage,
    AddedFallback { copied_from: String },
    DecodedTag,
    SplitTags { count: usize },
    DroppedDriverCount,
    BumpedSchemaVersion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One rewrite applied to the document, located by JSON pointer.
pub struct Fix {
    pub path: String,
    pub kind: FixKind,
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FixKind::RenamedLanguage => write!(
                f,
                "{}: renamed '{LEGACY_CHINESE_KEY}' to '{SIMPLIFIED_CHINESE_KEY}'",
                self.path
            ),
            FixKind::AddedFallback { copied_from } => write!(
                f,
                "{}: added '{}' text copied from '{copied_from}'",
                self.path,
                crate::FALLBACK_LANGUAGE
            ),
            FixKind::DecodedTag => write!(f, "{}: decoded JSON-encoded tag", self.path),
            FixKind::SplitTags { count } => {
                write!(f, "{}: split tag string into {count} tags", self.path)
            }
            FixKind::DroppedDriverCount => write!(f, "{}: dropped cached driverCount", self.path),
            FixKind::BumpedSchemaVersion => write!(
                f,
                "{}: schema_version set to {}",
                self.path,
                crate::KEXT_CATALOG_SCHEMA_VERSION
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Migration {
    pub document: Value,
    pub fixes: Vec<Fix>,
}

/// Upgrade a legacy catalog document to the current layout.
pub fn migrate_catalog(mut document: Value) -> Result<Migration> {
    let Some(root) = document.as_object_mut() else {
        bail!("catalog document must be a JSON object");
    };

    match root.get("schema_version").and_then(Value::as_str) {
        Some(LEGACY_SCHEMA_VERSION) => {}
        Some(version) if version == crate::KEXT_CATALOG_SCHEMA_VERSION => {
            bail!("catalog is already at {version}; nothing to migrate")
        }
        Some(other) => bail!(
            "cannot migrate schema_version '{other}', expected {LEGACY_SCHEMA_VERSION}"
        ),
        None => bail!("catalog has no schema_version"),
    }

    let mut fixes = Vec::new();

    if let Some(categories) = root.get_mut("categories").and_then(Value::as_array_mut) {
        for (idx, category) in categories.iter_mut().enumerate() {
            let path = format!("/categories/{idx}");
            if let Some(obj) = category.as_object_mut() {
                if obj.remove("driverCount").is_some() {
                    fixes.push(Fix {
                        path: format!("{path}/driverCount"),
                        kind: FixKind::DroppedDriverCount,
                    });
                }
                fix_text_fields(obj, CATEGORY_TEXT_FIELDS, &path, &mut fixes);
            }
        }
    }

    if let Some(drivers) = root.get_mut("drivers").and_then(Value::as_array_mut) {
        for (idx, driver) in drivers.iter_mut().enumerate() {
            if let Some(obj) = driver.as_object_mut() {
                migrate_driver(obj, &format!("/drivers/{idx}"), &mut fixes);
            }
        }
    }

    root.insert(
        "schema_version".to_string(),
        Value::String(crate::KEXT_CATALOG_SCHEMA_VERSION.to_string()),
    );
    fixes.push(Fix {
        path: "/schema_version".to_string(),
        kind: FixKind::BumpedSchemaVersion,
    });

    Ok(Migration { document, fixes })
}

fn migrate_driver(driver: &mut Map<String, Value>, path: &str, fixes: &mut Vec<Fix>) {
    fix_text_fields(driver, DRIVER_TEXT_FIELDS, path, fixes);

    if let Some(tags) = driver.get_mut("tags") {
        let tags_path = format!("{path}/tags");
        if let Some(joined) = tags.as_str().map(str::to_string) {
            let split: Vec<Value> = crate::split_tags(&joined)
                .into_iter()
                .map(Value::String)
                .collect();
            fixes.push(Fix {
                path: tags_path.clone(),
                kind: FixKind::SplitTags { count: split.len() },
            });
            *tags = Value::Array(split);
        }
        if let Some(items) = tags.as_array_mut() {
            for (idx, tag) in items.iter_mut().enumerate() {
                let tag_path = format!("{tags_path}/{idx}");
                if let Some(decoded) = decode_embedded_object(tag) {
                    *tag = decoded;
                    fixes.push(Fix {
                        path: tag_path.clone(),
                        kind: FixKind::DecodedTag,
                    });
                }
                fix_localized(tag, &tag_path, fixes);
            }
        }
    }

    if let Some(entries) = driver
        .get_mut("hardwareSupport")
        .and_then(Value::as_array_mut)
    {
        for (idx, entry) in entries.iter_mut().enumerate() {
            if let Some(obj) = entry.as_object_mut() {
                fix_text_fields(obj, &["notes"], &format!("{path}/hardwareSupport/{idx}"), fixes);
            }
        }
    }

    if let Some(version) = driver.get_mut("version").and_then(Value::as_object_mut) {
        fix_text_fields(version, &["changelog"], &format!("{path}/version"), fixes);
    }
}

fn fix_text_fields(
    obj: &mut Map<String, Value>,
    fields: &[&str],
    path: &str,
    fixes: &mut Vec<Fix>,
) {
    for field in fields {
        if let Some(value) = obj.get_mut(*field) {
            fix_localized(value, &format!("{path}/{field}"), fixes);
        }
    }
}

fn fix_localized(value: &mut Value, path: &str, fixes: &mut Vec<Fix>) {
    let Some(map) = value.as_object_mut() else {
        return;
    };

    if !map.contains_key(SIMPLIFIED_CHINESE_KEY) {
        if let Some(text) = map.remove(LEGACY_CHINESE_KEY) {
            map.insert(SIMPLIFIED_CHINESE_KEY.to_string(), text);
            fixes.push(Fix {
                path: path.to_string(),
                kind: FixKind::RenamedLanguage,
            });
        }
    }

    if !map.contains_key(crate::FALLBACK_LANGUAGE) {
        let source = map
            .iter()
            .filter(|(_, text)| text.is_string())
            .map(|(key, _)| key.clone())
            .min();
        if let Some(key) = source {
            let text = map[&key].clone();
            map.insert(crate::FALLBACK_LANGUAGE.to_string(), text);
            fixes.push(Fix {
                path: path.to_string(),
                kind: FixKind::AddedFallback { copied_from: key },
            });
        }
    }
}

// Legacy tooling sometimes stored localized tags as a JSON string.
fn decode_embedded_object(tag: &Value) -> Option<Value> {
    let raw = tag.as_str()?.trim();
    if !raw.starts_with('{') {
        return None;
    }
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(Value::is_object)
}
