//! Identifiers and closed vocabularies used by catalog records.
//!
//! Driver ids are opaque strings. Categories form a fixed vocabulary, but the
//! type keeps an `Other` arm so callers can express (and match nothing with) a
//! category the catalog does not know about. The remaining enums are closed:
//! the catalog schema rejects any value outside them.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Stable catalog key of a driver record (for example `lilu`).
pub struct DriverId(pub String);

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DriverId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DriverId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
/// Raised when a string does not name a member of a catalog vocabulary.
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryId {
    Essential,
    Graphics,
    Audio,
    Network,
    Bluetooth,
    InputDevices,
    System,
    Sensors,
    Usb,
    Features,
    Other(String),
}

impl CategoryId {
    /// Every known category, in catalog declaration order.
    pub const KNOWN: [CategoryId; 10] = [
        CategoryId::Essential,
        CategoryId::Graphics,
        CategoryId::Audio,
        CategoryId::Network,
        CategoryId::Bluetooth,
        CategoryId::InputDevices,
        CategoryId::System,
        CategoryId::Sensors,
        CategoryId::Usb,
        CategoryId::Features,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CategoryId::Essential => "essential",
            CategoryId::Graphics => "graphics",
            CategoryId::Audio => "audio",
            CategoryId::Network => "network",
            CategoryId::Bluetooth => "bluetooth",
            CategoryId::InputDevices => "input-devices",
            CategoryId::System => "system",
            CategoryId::Sensors => "sensors",
            CategoryId::Usb => "usb",
            CategoryId::Features => "features",
            CategoryId::Other(value) => value.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CategoryId::Other(_))
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        CategoryId::KNOWN
            .iter()
            .find(|known| known.as_str() == value)
            .cloned()
            .unwrap_or(CategoryId::Other(value))
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        CategoryId::from(value.to_string())
    }
}

impl From<CategoryId> for String {
    fn from(value: CategoryId) -> Self {
        match value {
            CategoryId::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for CategoryId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CategoryId::from(s.trim().to_ascii_lowercase()))
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Essential,
    Recommended,
    Optional,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Essential, Priority::Recommended, Priority::Optional];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Essential => "essential",
            Priority::Recommended => "recommended",
            Priority::Optional => "optional",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevelopmentStatus {
    Stable,
    Beta,
    Alpha,
    Deprecated,
    Experimental,
    Archived,
}

impl DevelopmentStatus {
    pub const ALL: [DevelopmentStatus; 6] = [
        DevelopmentStatus::Stable,
        DevelopmentStatus::Beta,
        DevelopmentStatus::Alpha,
        DevelopmentStatus::Deprecated,
        DevelopmentStatus::Experimental,
        DevelopmentStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DevelopmentStatus::Stable => "stable",
            DevelopmentStatus::Beta => "beta",
            DevelopmentStatus::Alpha => "alpha",
            DevelopmentStatus::Deprecated => "deprecated",
            DevelopmentStatus::Experimental => "experimental",
            DevelopmentStatus::Archived => "archived",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl Compatibility {
    pub const ALL: [Compatibility; 5] = [
        Compatibility::Excellent,
        Compatibility::Good,
        Compatibility::Fair,
        Compatibility::Poor,
        Compatibility::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Compatibility::Excellent => "excellent",
            Compatibility::Good => "good",
            Compatibility::Fair => "fair",
            Compatibility::Poor => "poor",
            Compatibility::Unknown => "unknown",
        }
    }
}

// Parsing is case-insensitive so CLI flags like `--status Beta` work.
impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("priority", s))
    }
}

impl FromStr for DevelopmentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DevelopmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("development status", s))
    }
}

impl FromStr for Compatibility {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Compatibility::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("compatibility", s))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DevelopmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
