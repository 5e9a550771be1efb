//! Kext catalog wiring.
//!
//! This module wraps the driver catalog on disk (`data/kexts.json`) so the
//! engine can load a validated snapshot once and answer lookups from it.
//! Types here mirror the schema fields; callers use `CatalogStore` for
//! indexed access.

pub mod identity;
pub mod model;
pub mod store;
pub mod text;

pub use identity::{
    CategoryId, Compatibility, DevelopmentStatus, DriverId, Priority, UnknownVariant,
};
pub use model::{
    CatalogMetadata, CategoryRecord, DriverCatalog, DriverRecord, HardwareSupport, VersionInfo,
};
pub use store::{CatalogStore, CategorySummary};
pub use text::{FALLBACK_LANGUAGE, Keyword, LocalizedText, fold_for_match};

pub use model::{
    load_catalog_from_path, load_catalog_from_str, load_catalog_from_value, load_catalog_with_schema,
};

/// Default relative path to the bundled kext catalog.
pub const DEFAULT_CATALOG_PATH: &str = "data/kexts.json";
