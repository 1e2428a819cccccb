//! Adjacency indices used by [`PedigreeGraph`](super::PedigreeGraph).
//!
//! Rebuilt after every committed mutation; queries never scan the link or union tables.

use crate::ids::{IndividualId, PartnershipId};
use crate::model::{Individual, ParentChildLink, Partnership};
use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Default)]
pub(in crate::graph) struct AdjacencyIndex {
    /// Parent -> children, in child creation order.
    children: HashMap<IndividualId, Vec<IndividualId>>,
    /// Individual -> unions they take part in, in union creation order.
    unions: HashMap<IndividualId, Vec<PartnershipId>>,
    /// Creation position of every individual.
    order: HashMap<IndividualId, usize>,
}

impl AdjacencyIndex {
    pub(in crate::graph) fn rebuild(
        individuals: &IndexMap<IndividualId, Individual>,
        partnerships: &IndexMap<PartnershipId, Partnership>,
        links: &IndexMap<IndividualId, ParentChildLink>,
    ) -> Self {
        let mut index = Self::default();
        for (pos, id) in individuals.keys().enumerate() {
            index.order.insert(id.clone(), pos);
            let Some(link) = links.get(id) else {
                continue;
            };
            for parent in link.parents() {
                index
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .push(id.clone());
            }
        }
        for (uid, union) in partnerships {
            for member in [&union.partner_a, &union.partner_b] {
                index
                    .unions
                    .entry(member.clone())
                    .or_default()
                    .push(uid.clone());
            }
        }
        index
    }

    pub(in crate::graph) fn children(&self, id: &str) -> &[IndividualId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(in crate::graph) fn unions(&self, id: &str) -> &[PartnershipId] {
        self.unions.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(in crate::graph) fn position(&self, id: &str) -> Option<usize> {
        self.order.get(id).copied()
    }
}
