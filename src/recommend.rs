//! Hardware-driven kext recommendations.
//!
//! A fixed rule list maps one wizard session's hardware choices to driver ids.
//! Rules only ever add ids; the final step drops anything the loaded catalog
//! does not carry, so a rule pointing at a retired kext degrades quietly.

use crate::catalog::{CatalogStore, DriverId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// Substrings that mark a CPU as AMD. Everything else is treated as Intel.
const AMD_CPU_MARKERS: &[&str] = &["amd", "ryzen", "threadripper", "athlon"];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Snapshot of the hardware picked in one wizard session.
pub struct HardwareSelection {
    pub cpu_model: String,
    pub cpu_generation: String,
    pub gpu_brand: String,
    pub gpu_model: String,
    pub chipset: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Intel,
    Amd,
}

impl Platform {
    pub fn detect(hardware: &HardwareSelection) -> Self {
        let haystack = format!("{} {}", hardware.cpu_model, hardware.cpu_generation).to_lowercase();
        if AMD_CPU_MARKERS.iter().any(|marker| haystack.contains(marker)) {
            Platform::Amd
        } else {
            Platform::Intel
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Intel => "intel",
            Platform::Amd => "amd",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Driver ids each recommendation rule contributes.
pub struct RecommendationRules {
    pub baseline: Vec<DriverId>,
    pub graphics: DriverId,
    pub audio: DriverId,
    pub intel_network: DriverId,
    pub amd_network: DriverId,
    pub usb: DriverId,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            baseline: vec![DriverId::from("lilu"), DriverId::from("virtualsmc")],
            graphics: DriverId::from("whatevergreen"),
            audio: DriverId::from("applealc"),
            intel_network: DriverId::from("intelmausi"),
            amd_network: DriverId::from("realtekrtl8111"),
            usb: DriverId::from("usbtoolbox"),
        }
    }
}

impl RecommendationRules {
    /// Apply the rules to `hardware` and keep only ids present in `store`.
    ///
    /// Output order follows rule order and is identical for identical input.
    pub fn recommend(&self, store: &CatalogStore, hardware: &HardwareSelection) -> Vec<DriverId> {
        let mut picked = RuleSet::default();

        for id in &self.baseline {
            picked.add(id);
        }
        if gpu_needs_graphics_patch(&hardware.gpu_brand) {
            picked.add(&self.graphics);
        }
        picked.add(&self.audio);
        let platform = Platform::detect(hardware);
        match platform {
            Platform::Intel => picked.add(&self.intel_network),
            Platform::Amd => picked.add(&self.amd_network),
        }
        picked.add(&self.usb);

        let (known, missing): (Vec<DriverId>, Vec<DriverId>) = picked
            .into_ids()
            .into_iter()
            .partition(|id| store.contains(id.as_str()));
        if !missing.is_empty() {
            log::debug!("dropping recommendations absent from catalog: {missing:?}");
        }
        log::debug!(
            "recommended {} drivers for {} platform (gpu brand '{}')",
            known.len(),
            platform.as_str(),
            hardware.gpu_brand
        );
        known
    }
}

/// Recommend drivers using the default rule list.
pub fn recommend(store: &CatalogStore, hardware: &HardwareSelection) -> Vec<DriverId> {
    RecommendationRules::default().recommend(store, hardware)
}

fn gpu_needs_graphics_patch(brand: &str) -> bool {
    let brand = brand.trim();
    brand.eq_ignore_ascii_case("amd") || brand.eq_ignore_ascii_case("intel")
}

// Insertion-ordered set: rules write here so duplicates cannot appear.
#[derive(Default)]
struct RuleSet {
    seen: BTreeSet<DriverId>,
    ordered: Vec<DriverId>,
}

impl RuleSet {
    fn add(&mut self, id: &DriverId) {
        if self.seen.insert(id.clone()) {
            self.ordered.push(id.clone());
        }
    }

    fn into_ids(self) -> Vec<DriverId> {
        self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hardware(cpu: &str, gpu_brand: &str) -> HardwareSelection {
        HardwareSelection {
            cpu_model: cpu.to_string(),
            gpu_brand: gpu_brand.to_string(),
            ..HardwareSelection::default()
        }
    }

    #[test]
    fn platform_detection_uses_model_and_generation() {
        assert_eq!(Platform::detect(&hardware("AMD Ryzen 5 5600X", "")), Platform::Amd);
        assert_eq!(Platform::detect(&hardware("Core i7-9700K", "")), Platform::Intel);
        let by_generation = HardwareSelection {
            cpu_generation: "Threadripper 3000".to_string(),
            ..HardwareSelection::default()
        };
        assert_eq!(Platform::detect(&by_generation), Platform::Amd);
        assert_eq!(Platform::detect(&HardwareSelection::default()), Platform::Intel);
    }

    #[test]
    fn graphics_patch_only_for_amd_and_intel_gpus() {
        assert!(gpu_needs_graphics_patch("AMD"));
        assert!(gpu_needs_graphics_patch(" intel "));
        assert!(!gpu_needs_graphics_patch("nvidia"));
        assert!(!gpu_needs_graphics_patch(""));
    }

    #[test]
    fn rule_set_keeps_first_insertion_order() {
        let mut set = RuleSet::default();
        for id in ["b", "a", "b", "c", "a"] {
            set.add(&DriverId::from(id));
        }
        let ids: Vec<String> = set.into_ids().into_iter().map(|id| id.0).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
