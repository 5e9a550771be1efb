//! Owned wizard-session state.
//!
//! A `Session` holds one user's hardware snapshot and the kexts they picked.
//! It changes only through [`Session::apply`], and callers pass it along
//! explicitly; there is no process-wide cart.

use crate::catalog::{CatalogStore, DriverId};
use crate::recommend::{HardwareSelection, RecommendationRules};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetHardware(HardwareSelection),
    ApplyRecommendations,
    Select(DriverId),
    Deselect(DriverId),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("driver '{0}' is not in the catalog")]
    UnknownDriver(DriverId),
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    hardware: HardwareSelection,
    selected: Vec<DriverId>,
}

impl Session {
    pub fn new(hardware: HardwareSelection) -> Self {
        Self {
            hardware,
            selected: Vec::new(),
        }
    }

    pub fn hardware(&self) -> &HardwareSelection {
        &self.hardware
    }

    /// Selected ids in the order they were first picked.
    pub fn selected(&self) -> &[DriverId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s.as_str() == id)
    }

    pub fn apply(&mut self, store: &CatalogStore, action: Action) -> Result<(), SessionError> {
        self.apply_with_rules(store, &RecommendationRules::default(), action)
    }

    pub fn apply_with_rules(
        &mut self,
        store: &CatalogStore,
        rules: &RecommendationRules,
        action: Action,
    ) -> Result<(), SessionError> {
        match action {
            Action::SetHardware(hardware) => self.hardware = hardware,
            Action::ApplyRecommendations => {
                for id in rules.recommend(store, &self.hardware) {
                    self.insert(id);
                }
            }
            Action::Select(id) => {
                if !store.contains(id.as_str()) {
                    return Err(SessionError::UnknownDriver(id));
                }
                self.insert(id);
            }
            Action::Deselect(id) => self.selected.retain(|s| s != &id),
            Action::Clear => self.selected.clear(),
        }
        Ok(())
    }

    /// Selected drivers plus their dependencies, ready for packaging.
    pub fn bundle(&self, store: &CatalogStore) -> Vec<DriverId> {
        store.with_dependencies(&self.selected)
    }

    fn insert(&mut self, id: DriverId) {
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }
}
