// Recommendation rules against the bundled and fixture catalogs.
mod support;
#[path = "support/common.rs"]
mod common;

use anyhow::Result;
use kextcatalog::{DriverId, HardwareSelection, RecommendationRules, recommend};

use common::{bundled_store, sample_store};

fn ids(list: &[DriverId]) -> Vec<&str> {
    list.iter().map(DriverId::as_str).collect()
}

fn hardware(cpu: &str, gpu_brand: &str) -> HardwareSelection {
    HardwareSelection {
        cpu_model: cpu.to_string(),
        gpu_brand: gpu_brand.to_string(),
        ..HardwareSelection::default()
    }
}

#[test]
fn amd_ryzen_with_amd_gpu() {
    let store = bundled_store();
    let picked = recommend(&store, &hardware("AMD Ryzen 5 5600X", "amd"));
    assert_eq!(
        ids(&picked),
        vec![
            "lilu",
            "virtualsmc",
            "whatevergreen",
            "applealc",
            "realtekrtl8111",
            "usbtoolbox"
        ]
    );
    assert!(!picked.iter().any(|id| id.as_str() == "intelmausi"));
}

#[test]
fn intel_cpu_with_nvidia_gpu_skips_graphics_patch() {
    let store = bundled_store();
    let picked = recommend(&store, &hardware("Intel Core i9-9900K", "nvidia"));
    assert_eq!(
        ids(&picked),
        vec!["lilu", "virtualsmc", "applealc", "intelmausi", "usbtoolbox"]
    );
}

#[test]
fn empty_selection_defaults_to_intel_platform() {
    let store = bundled_store();
    let picked = recommend(&store, &HardwareSelection::default());
    assert!(picked.iter().any(|id| id.as_str() == "intelmausi"));
    assert!(!picked.iter().any(|id| id.as_str() == "whatevergreen"));
}

#[test]
fn recommendations_are_deterministic_and_in_catalog() {
    let store = bundled_store();
    let inputs = [
        hardware("AMD Ryzen 9 7950X", "AMD"),
        hardware("Core i5-10400", "intel"),
        hardware("", "nvidia"),
        HardwareSelection {
            cpu_generation: "Athlon".to_string(),
            chipset: "B550".to_string(),
            ..HardwareSelection::default()
        },
    ];
    for hw in &inputs {
        let first = recommend(&store, hw);
        let second = recommend(&store, hw);
        assert_eq!(first, second);
        for id in &first {
            assert!(store.contains(id.as_str()), "{id} missing from catalog");
        }
        let mut deduped = first.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), first.len());
    }
}

#[test]
fn ids_absent_from_catalog_are_dropped() -> Result<()> {
    let store = sample_store(&[("lilu", "essential"), ("applealc", "audio")])?;
    let picked = recommend(&store, &hardware("AMD Ryzen 5 5600X", "amd"));
    assert_eq!(ids(&picked), vec!["lilu", "applealc"]);
    Ok(())
}

#[test]
fn custom_rules_replace_default_ids() -> Result<()> {
    let store = sample_store(&[
        ("core", "essential"),
        ("gfx", "graphics"),
        ("sound", "audio"),
        ("lan-intel", "network"),
        ("lan-amd", "network"),
        ("ports", "usb"),
    ])?;
    let rules = RecommendationRules {
        baseline: vec![DriverId::from("core"), DriverId::from("core")],
        graphics: DriverId::from("gfx"),
        audio: DriverId::from("sound"),
        intel_network: DriverId::from("lan-intel"),
        amd_network: DriverId::from("lan-amd"),
        usb: DriverId::from("ports"),
    };
    let picked = rules.recommend(&store, &hardware("Threadripper 3970X", "intel"));
    assert_eq!(ids(&picked), vec!["core", "gfx", "sound", "lan-amd", "ports"]);
    Ok(())
}
