use indexmap::IndexMap;
use pedigree_core::IndividualId;
use serde::{Deserialize, Serialize};

/// Per-node x overrides set by manual dragging.
///
/// Pins are UI state: they live outside the graph and survive relayout until cleared.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualPins(IndexMap<IndividualId, f64>);

impl ManualPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&mut self, id: IndividualId, x: f64) {
        self.0.insert(id, x);
    }

    pub fn clear(&mut self, id: &str) -> Option<f64> {
        self.0.shift_remove(id)
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Drops pins for individuals that no longer exist.
    pub fn retain_existing(&mut self, exists: impl Fn(&str) -> bool) {
        self.0.retain(|id, _| exists(id.as_str()));
    }
}
