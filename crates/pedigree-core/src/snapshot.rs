//! Plain serializable form of a [`PedigreeGraph`](crate::PedigreeGraph).

use crate::model::{ArtRecord, Individual, ParentChildLink, Partnership, Pregnancy};
use serde::{Deserialize, Serialize};

/// The record collections, in creation order.
///
/// Snapshots are data only; they become a graph through
/// [`PedigreeGraph::from_snapshot`](crate::PedigreeGraph::from_snapshot), which validates them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PedigreeSnapshot {
    #[serde(default)]
    pub individuals: Vec<Individual>,
    #[serde(default)]
    pub partnerships: Vec<Partnership>,
    #[serde(default)]
    pub parent_child_links: Vec<ParentChildLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pregnancies: Vec<Pregnancy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub art: Vec<ArtRecord>,
}

impl PedigreeSnapshot {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json_string_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_use_camel_case_collection_name() {
        let snap = PedigreeSnapshot::from_json_str(
            r#"{"individuals":[{"id":"I1"}],"parentChildLinks":[]}"#,
        )
        .unwrap();
        assert_eq!(snap.individuals.len(), 1);
        assert!(snap.partnerships.is_empty());

        let text = snap.to_json_string_pretty().unwrap();
        assert!(text.contains("parentChildLinks"));
        assert!(!text.contains("pregnancies"));
    }

    #[test]
    fn pregnancies_and_art_are_optional_collections() {
        let snap = PedigreeSnapshot::from_json_str(
            r#"{"individuals":[{"id":"I1","sex":"F"}],
                "pregnancies":[{"id":"P1","mother":"I1","outcome":"TOP"}],
                "art":[{"id":"ART1","role":"S","relatedTo":"P1"}]}"#,
        )
        .unwrap();
        assert_eq!(snap.pregnancies.len(), 1);
        assert_eq!(snap.art[0].role, crate::model::ArtRole::S);
    }
}
