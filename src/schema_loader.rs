//! JSON Schema loader for kext catalogs.
//!
//! The catalog schema ships inside the binary (`schema/kext_catalog.schema.json`)
//! so a catalog can be checked without locating the repository. Callers may
//! also load a schema from disk. When an allowed-version set is supplied, the
//! schema's `schema_version` const is checked against it and widened to the
//! whole set before compilation.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

const BUNDLED_CATALOG_SCHEMA: &str = include_str!("../schema/kext_catalog.schema.json");
const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version";

/// Controls how schemas are normalized before compilation.
#[derive(Default)]
pub struct SchemaLoadOptions<'a> {
    /// Allowed schema_version values; enforced and widened when present.
    pub allowed_versions: Option<&'a BTreeSet<String>>,
}

/// A compiled catalog schema plus the version it declares.
pub struct CatalogSchema {
    compiled: JSONSchema,
    schema_version: String,
}

impl CatalogSchema {
    pub fn bundled(options: SchemaLoadOptions<'_>) -> Result<Self> {
        let raw: Value =
            serde_json::from_str(BUNDLED_CATALOG_SCHEMA).context("parsing bundled catalog schema")?;
        Self::compile(raw, "bundled catalog schema", options)
    }

    pub fn load(path: &Path, options: SchemaLoadOptions<'_>) -> Result<Self> {
        let raw: Value = serde_json::from_reader(
            File::open(path).with_context(|| format!("opening schema {}", path.display()))?,
        )
        .with_context(|| format!("parsing schema {}", path.display()))?;
        Self::compile(raw, &path.display().to_string(), options)
    }

    fn compile(mut schema: Value, origin: &str, options: SchemaLoadOptions<'_>) -> Result<Self> {
        let schema_version = extract_schema_version(&schema)
            .ok_or_else(|| anyhow!("{origin} missing schema_version const"))?;

        if let Some(allowed) = options.allowed_versions {
            if !allowed.contains(&schema_version) {
                bail!(
                    "schema_version '{}' not in allowed set {:?}",
                    schema_version,
                    allowed
                );
            }
            if allowed.len() > 1 {
                widen_schema_version(&mut schema, allowed);
            }
        }

        // Compile errors borrow the schema value, so render them eagerly.
        let compiled =
            JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling {origin}: {err}"))?;

        Ok(Self {
            compiled,
            schema_version,
        })
    }

    /// The `schema_version` const the schema was authored for.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn validate(&self, instance: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(instance) {
            let details = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("catalog failed schema validation:\n{}", details);
        }
        Ok(())
    }
}

fn extract_schema_version(schema: &Value) -> Option<String> {
    let pointer = format!("{SCHEMA_VERSION_POINTER}/const");
    let version = schema.pointer(&pointer).and_then(Value::as_str)?;
    if version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}

fn widen_schema_version(schema: &mut Value, allowed: &BTreeSet<String>) {
    if let Some(slot) = schema.pointer_mut(SCHEMA_VERSION_POINTER) {
        *slot = json!({ "type": "string", "enum": allowed.iter().collect::<Vec<_>>() });
    }
}
