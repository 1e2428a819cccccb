//! The pedigree relationship graph.
//!
//! `PedigreeGraph` owns every record and keeps creation order for each collection.
//! Mutations validate first and only then write, so callers observe either full success or
//! an unchanged graph plus a [`StructuralError`].

use crate::error::{Result, StructuralError};
use crate::ids::{ArtId, IndividualId, PartnershipId, PregnancyId};
use crate::model::{
    ArtRecord, Individual, IndividualAttrs, ParentChildLink, Partnership, PartnershipAttrs,
    Pregnancy, UnionStatus,
};
use crate::snapshot::PedigreeSnapshot;
use crate::update::IndividualUpdate;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

mod index;

use index::AdjacencyIndex;

/// How new ids are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// `I1, I2, …` / `U1, U2, …` (`P…` for pregnancies, `ART…` for assisted reproduction),
    /// skipping ids that already exist. Deterministic.
    #[default]
    Sequential,
    /// `I-<uuid>` / `U-<uuid>` / `P-<uuid>` / `ART-<uuid>` (UUID v4).
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveMode {
    /// Delete the individual's unions and pregnancies and clear them from their children's
    /// links instead of rejecting the removal. Children are never deleted.
    pub cascade: bool,
}

impl RemoveMode {
    pub const STRICT: Self = Self { cascade: false };
    pub const CASCADE: Self = Self { cascade: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parents<'a> {
    pub father: Option<&'a IndividualId>,
    pub mother: Option<&'a IndividualId>,
}

impl<'a> Parents<'a> {
    pub fn is_empty(&self) -> bool {
        self.father.is_none() && self.mother.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a IndividualId> + use<'a> {
        self.father.into_iter().chain(self.mother)
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiblingKind {
    /// Same father and same mother.
    Full,
    /// Exactly one shared parent.
    Half,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sibling {
    pub id: IndividualId,
    pub kind: SiblingKind,
}

/// What a cascading removal of one individual would detach.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemovalImpact {
    pub partnerships: Vec<PartnershipId>,
    pub children: Vec<IndividualId>,
    pub pregnancies: Vec<PregnancyId>,
}

impl RemovalImpact {
    pub fn is_empty(&self) -> bool {
        self.partnerships.is_empty() && self.children.is_empty() && self.pregnancies.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PedigreeGraph {
    individuals: IndexMap<IndividualId, Individual>,
    partnerships: IndexMap<PartnershipId, Partnership>,
    links: IndexMap<IndividualId, ParentChildLink>,
    pregnancies: IndexMap<PregnancyId, Pregnancy>,
    art: IndexMap<ArtId, ArtRecord>,
    index: AdjacencyIndex,
    id_strategy: IdStrategy,
    next_individual: u64,
    next_partnership: u64,
    next_pregnancy: u64,
    next_art: u64,
    revision: u64,
}

impl PedigreeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Builds a graph from a loaded snapshot, validating every invariant.
    ///
    /// Records are inserted in snapshot order, so the first offending record determines the
    /// returned error.
    pub fn from_snapshot(snapshot: PedigreeSnapshot) -> Result<Self> {
        let mut g = Self::new();
        for ind in snapshot.individuals {
            if g.individuals.contains_key(&ind.id) {
                return Err(StructuralError::DuplicateId {
                    id: ind.id.to_string(),
                });
            }
            g.individuals.insert(ind.id.clone(), ind);
        }
        g.reindex();

        for union in snapshot.partnerships {
            if g.partnerships.contains_key(&union.id) {
                return Err(StructuralError::DuplicateId {
                    id: union.id.to_string(),
                });
            }
            g.check_partnership(&union.partner_a, &union.partner_b, union.status, None)?;
            g.partnerships.insert(union.id.clone(), union);
        }
        g.reindex();

        for link in snapshot.parent_child_links {
            if g.links.contains_key(&link.child) {
                return Err(StructuralError::DuplicateId {
                    id: link.child.to_string(),
                });
            }
            g.set_parent_child_link(link)?;
        }

        for pregnancy in snapshot.pregnancies {
            if g.pregnancies.contains_key(&pregnancy.id) {
                return Err(StructuralError::DuplicateId {
                    id: pregnancy.id.to_string(),
                });
            }
            g.upsert_pregnancy(pregnancy)?;
        }
        for record in snapshot.art {
            if g.art.contains_key(&record.id) {
                return Err(StructuralError::DuplicateId {
                    id: record.id.to_string(),
                });
            }
            g.upsert_art(record)?;
        }

        tracing::debug!(
            individuals = g.individuals.len(),
            partnerships = g.partnerships.len(),
            links = g.links.len(),
            pregnancies = g.pregnancies.len(),
            "loaded pedigree snapshot"
        );
        Ok(g)
    }

    pub fn to_snapshot(&self) -> PedigreeSnapshot {
        PedigreeSnapshot {
            individuals: self.individuals.values().cloned().collect(),
            partnerships: self.partnerships.values().cloned().collect(),
            parent_child_links: self.links.values().cloned().collect(),
            pregnancies: self.pregnancies.values().cloned().collect(),
            art: self.art.values().cloned().collect(),
        }
    }

    /// Monotonic counter bumped by every committed mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ---------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------

    pub fn contains(&self, id: &str) -> bool {
        self.individuals.contains_key(id)
    }

    pub fn individual(&self, id: &str) -> Option<&Individual> {
        self.individuals.get(id)
    }

    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    pub fn individual_ids(&self) -> impl Iterator<Item = &IndividualId> {
        self.individuals.keys()
    }

    pub fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    /// Creation position of an individual.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.position(id)
    }

    pub fn partnership(&self, id: &str) -> Option<&Partnership> {
        self.partnerships.get(id)
    }

    pub fn partnerships(&self) -> impl Iterator<Item = &Partnership> {
        self.partnerships.values()
    }

    pub fn partnership_count(&self) -> usize {
        self.partnerships.len()
    }

    pub fn links(&self) -> impl Iterator<Item = &ParentChildLink> {
        self.links.values()
    }

    pub fn link_of(&self, child: &str) -> Option<&ParentChildLink> {
        self.links.get(child)
    }

    pub fn pregnancy(&self, id: &str) -> Option<&Pregnancy> {
        self.pregnancies.get(id)
    }

    pub fn pregnancies(&self) -> impl Iterator<Item = &Pregnancy> {
        self.pregnancies.values()
    }

    /// Pregnancies naming `id` as mother or father.
    pub fn pregnancies_of(&self, id: &str) -> impl Iterator<Item = &Pregnancy> {
        self.pregnancies
            .values()
            .filter(move |p| p.parents().any(|parent| parent.as_str() == id))
    }

    pub fn art_record(&self, id: &str) -> Option<&ArtRecord> {
        self.art.get(id)
    }

    pub fn art(&self) -> impl Iterator<Item = &ArtRecord> {
        self.art.values()
    }

    /// Unions plus recorded parent references.
    pub fn edge_count(&self) -> usize {
        self.partnerships.len() + self.links.values().map(|l| l.parents().count()).sum::<usize>()
    }

    pub fn parents_of(&self, id: &str) -> Parents<'_> {
        match self.links.get(id) {
            Some(link) => Parents {
                father: link.father.as_ref(),
                mother: link.mother.as_ref(),
            },
            None => Parents::default(),
        }
    }

    pub fn children_of(&self, id: &str) -> &[IndividualId] {
        self.index.children(id)
    }

    pub fn partnerships_of(&self, id: &str) -> impl Iterator<Item = &Partnership> {
        self.index
            .unions(id)
            .iter()
            .filter_map(|uid| self.partnerships.get(uid))
    }

    /// Distinct partners, in union creation order.
    pub fn partners_of(&self, id: &str) -> Vec<&IndividualId> {
        let me = IndividualId::new(id);
        let mut out: Vec<&IndividualId> = Vec::new();
        for union in self.partnerships_of(id) {
            if let Some(other) = union.other(&me) {
                if !out.contains(&other) {
                    out.push(other);
                }
            }
        }
        out
    }

    /// Full and half siblings of `id`, in creation order.
    pub fn siblings_of(&self, id: &str) -> Vec<Sibling> {
        let mine = self.parents_of(id);
        if mine.is_empty() {
            return Vec::new();
        }

        let mut candidates: IndexSet<&IndividualId> = IndexSet::new();
        for parent in mine.iter() {
            for child in self.children_of(parent.as_str()) {
                if child.as_str() != id {
                    candidates.insert(child);
                }
            }
        }

        let mut out: Vec<Sibling> = candidates
            .into_iter()
            .filter_map(|cand| {
                let theirs = self.parents_of(cand.as_str());
                let same_father = mine.father.is_some() && mine.father == theirs.father;
                let same_mother = mine.mother.is_some() && mine.mother == theirs.mother;
                let kind = match (same_father, same_mother) {
                    (true, true) => SiblingKind::Full,
                    (true, false) | (false, true) => SiblingKind::Half,
                    (false, false) => return None,
                };
                Some(Sibling {
                    id: cand.clone(),
                    kind,
                })
            })
            .collect();
        out.sort_by_key(|s| self.position(s.id.as_str()).unwrap_or(usize::MAX));
        out
    }

    pub fn proband(&self) -> Option<&Individual> {
        self.individuals.values().find(|i| i.is_proband)
    }

    /// The union joining `a` and `b`, preferring a current one over ended ones.
    pub fn union_between(&self, a: &IndividualId, b: &IndividualId) -> Option<&Partnership> {
        let mut found: Option<&Partnership> = None;
        for union in self.partnerships_of(a.as_str()) {
            if !union.same_pair(a, b) {
                continue;
            }
            if union.is_current() {
                return Some(union);
            }
            found = Some(union);
        }
        found
    }

    /// Every recorded ancestor of `id`, nearest first.
    pub fn ancestors_of(&self, id: &str) -> Vec<IndividualId> {
        let mut seen: IndexSet<IndividualId> = IndexSet::new();
        let mut queue: VecDeque<IndividualId> = self.parents_of(id).iter().cloned().collect();
        while let Some(cur) = queue.pop_front() {
            if !seen.insert(cur.clone()) {
                continue;
            }
            queue.extend(self.parents_of(cur.as_str()).iter().cloned());
        }
        seen.into_iter().collect()
    }

    /// What [`RemoveMode::CASCADE`] would detach if `id` were removed.
    pub fn removal_impact(&self, id: &str) -> Result<RemovalImpact> {
        if !self.contains(id) {
            return Err(StructuralError::DanglingReference { id: id.to_string() });
        }
        Ok(RemovalImpact {
            partnerships: self.index.unions(id).to_vec(),
            children: self.index.children(id).to_vec(),
            pregnancies: self.pregnancies_of(id).map(|p| p.id.clone()).collect(),
        })
    }

    // ---------------------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------------------

    /// Creates an individual. Always succeeds; a requested id that is already taken is replaced
    /// by a freshly minted one.
    pub fn add_individual(&mut self, mut attrs: IndividualAttrs) -> IndividualId {
        let id = match attrs.id.take() {
            Some(id) if !id.as_str().is_empty() && !self.contains(id.as_str()) => id,
            _ => self.mint_individual_id(),
        };
        let make_proband = attrs.is_proband;
        let ind = Individual::from_attrs(id.clone(), attrs);
        if make_proband {
            for other in self.individuals.values_mut() {
                other.is_proband = false;
            }
        }
        self.individuals.insert(id.clone(), ind);
        self.commit();
        tracing::debug!(id = %id, "added individual");
        id
    }

    pub fn apply_update(&mut self, id: &str, update: IndividualUpdate) -> Result<()> {
        if !self.contains(id) {
            return Err(StructuralError::DanglingReference { id: id.to_string() });
        }
        if matches!(update, IndividualUpdate::SetProband(true)) {
            for (other_id, other) in self.individuals.iter_mut() {
                if other_id.as_str() != id {
                    other.is_proband = false;
                }
            }
        }
        if let Some(ind) = self.individuals.get_mut(id) {
            update.apply_to(ind);
        }
        self.commit();
        tracing::debug!(id, "updated individual");
        Ok(())
    }

    /// Upserts the single parentage record of `link.child`.
    ///
    /// A link without any parent removes the child's record instead.
    pub fn set_parent_child_link(&mut self, link: ParentChildLink) -> Result<()> {
        if !self.contains(link.child.as_str()) {
            return Err(StructuralError::dangling(&link.child));
        }
        for parent in link.parents() {
            if parent == &link.child {
                return Err(StructuralError::SelfReference {
                    id: link.child.clone(),
                });
            }
            if !self.contains(parent.as_str()) {
                return Err(StructuralError::dangling(parent));
            }
        }
        check_distinct_parents(link.father.as_ref(), link.mother.as_ref())?;
        for parent in link.parents() {
            if let Some(path) = self.descent_path(&link.child, parent) {
                tracing::debug!(child = %link.child, parent = %parent, "rejected cyclic parent link");
                return Err(StructuralError::Cycle { path });
            }
        }
        self.check_rows(Some(&link), None)?;

        if !link.has_parent() {
            self.links.shift_remove(link.child.as_str());
        } else if let Some(slot) = self.links.get_mut(link.child.as_str()) {
            *slot = link.clone();
        } else {
            self.links.insert(link.child.clone(), link.clone());
        }
        self.commit();
        tracing::debug!(
            child = %link.child,
            father = ?link.father.as_ref().map(IndividualId::as_str),
            mother = ?link.mother.as_ref().map(IndividualId::as_str),
            biological = link.biological,
            "set parent link"
        );
        Ok(())
    }

    pub fn remove_parent_child_link(&mut self, child: &str) -> Result<Option<ParentChildLink>> {
        if !self.contains(child) {
            return Err(StructuralError::DanglingReference {
                id: child.to_string(),
            });
        }
        let removed = self.links.shift_remove(child);
        if removed.is_some() {
            self.commit();
            tracing::debug!(child, "removed parent link");
        }
        Ok(removed)
    }

    pub fn add_partnership(
        &mut self,
        a: &IndividualId,
        b: &IndividualId,
        attrs: PartnershipAttrs,
    ) -> Result<PartnershipId> {
        self.check_partnership(a, b, attrs.status, None)?;
        let id = self.mint_partnership_id();
        self.partnerships.insert(
            id.clone(),
            Partnership {
                id: id.clone(),
                partner_a: a.clone(),
                partner_b: b.clone(),
                status: attrs.status,
                consanguinity: attrs.consanguinity,
            },
        );
        self.commit();
        tracing::debug!(id = %id, a = %a, b = %b, "added partnership");
        Ok(id)
    }

    pub fn set_partnership_status(&mut self, id: &str, status: UnionStatus) -> Result<()> {
        let union = self
            .partnerships
            .get(id)
            .ok_or_else(|| StructuralError::DanglingReference { id: id.to_string() })?;
        let (a, b) = (union.partner_a.clone(), union.partner_b.clone());
        self.check_partnership(&a, &b, status, Some(id))?;
        if let Some(union) = self.partnerships.get_mut(id) {
            union.status = status;
        }
        self.commit();
        tracing::debug!(id, ?status, "set partnership status");
        Ok(())
    }

    pub fn set_consanguinity(&mut self, id: &str, consanguinity: bool) -> Result<()> {
        let union = self
            .partnerships
            .get_mut(id)
            .ok_or_else(|| StructuralError::DanglingReference { id: id.to_string() })?;
        union.consanguinity = consanguinity;
        self.commit();
        tracing::debug!(id, consanguinity, "set consanguinity");
        Ok(())
    }

    pub fn remove_partnership(&mut self, id: &str) -> Result<Partnership> {
        let removed = self
            .partnerships
            .shift_remove(id)
            .ok_or_else(|| StructuralError::DanglingReference { id: id.to_string() })?;
        self.commit();
        tracing::debug!(id, "removed partnership");
        Ok(removed)
    }

    /// Inserts `pregnancy`, or replaces the record that has its id. An empty id is minted.
    pub fn upsert_pregnancy(&mut self, mut pregnancy: Pregnancy) -> Result<PregnancyId> {
        for parent in pregnancy.parents() {
            if !self.contains(parent.as_str()) {
                return Err(StructuralError::dangling(parent));
            }
        }
        check_distinct_parents(pregnancy.father.as_ref(), pregnancy.mother.as_ref())?;

        if pregnancy.id.is_empty() {
            pregnancy.id = self.mint_pregnancy_id();
        }
        let id = pregnancy.id.clone();
        tracing::debug!(
            id = %id,
            outcome = ?pregnancy.outcome,
            replaced = self.pregnancies.contains_key(&id),
            "upserted pregnancy"
        );
        self.pregnancies.insert(id.clone(), pregnancy);
        self.commit();
        Ok(id)
    }

    /// Removes a pregnancy along with the assisted-reproduction records attached to it.
    pub fn remove_pregnancy(&mut self, id: &str) -> Result<Pregnancy> {
        let removed = self
            .pregnancies
            .shift_remove(id)
            .ok_or_else(|| StructuralError::DanglingReference { id: id.to_string() })?;
        let before = self.art.len();
        self.art
            .retain(|_, record| record.related_to.as_ref() != Some(&removed.id));
        self.commit();
        tracing::debug!(id, art = before - self.art.len(), "removed pregnancy");
        Ok(removed)
    }

    /// Inserts `record`, or replaces the record that has its id. An empty id is minted.
    pub fn upsert_art(&mut self, mut record: ArtRecord) -> Result<ArtId> {
        if let Some(pregnancy) = &record.related_to {
            if !self.pregnancies.contains_key(pregnancy) {
                return Err(StructuralError::DanglingReference {
                    id: pregnancy.to_string(),
                });
            }
        }
        if record.id.is_empty() {
            record.id = self.mint_art_id();
        }
        let id = record.id.clone();
        self.art.insert(id.clone(), record);
        self.commit();
        tracing::debug!(id = %id, "upserted assisted reproduction record");
        Ok(id)
    }

    pub fn remove_art(&mut self, id: &str) -> Result<ArtRecord> {
        let removed = self
            .art
            .shift_remove(id)
            .ok_or_else(|| StructuralError::DanglingReference { id: id.to_string() })?;
        self.commit();
        tracing::debug!(id, "removed assisted reproduction record");
        Ok(removed)
    }

    /// Removes an individual together with their own parentage record.
    ///
    /// Without `cascade`, an individual who is a partner, a recorded parent or a pregnancy's
    /// parent is [`StructuralError::NotRemovable`]. With `cascade`, their unions and pregnancies
    /// are deleted and their children lose that parent; a child left with no parent becomes a
    /// founder.
    pub fn remove_individual(&mut self, id: &str, mode: RemoveMode) -> Result<Individual> {
        let impact = self.removal_impact(id)?;
        if !mode.cascade && !impact.is_empty() {
            return Err(StructuralError::NotRemovable {
                id: IndividualId::new(id),
                partnerships: impact.partnerships.len(),
                children: impact.children.len(),
                pregnancies: impact.pregnancies.len(),
            });
        }

        let me = IndividualId::new(id);
        for uid in &impact.partnerships {
            self.partnerships.shift_remove(uid.as_str());
        }
        for pid in &impact.pregnancies {
            self.pregnancies.shift_remove(pid.as_str());
        }
        self.art.retain(|_, record| {
            record
                .related_to
                .as_ref()
                .is_none_or(|pid| !impact.pregnancies.contains(pid))
        });
        for child in &impact.children {
            let emptied = match self.links.get_mut(child.as_str()) {
                Some(link) => {
                    if link.father.as_ref() == Some(&me) {
                        link.father = None;
                    }
                    if link.mother.as_ref() == Some(&me) {
                        link.mother = None;
                    }
                    !link.has_parent()
                }
                None => false,
            };
            if emptied {
                self.links.shift_remove(child.as_str());
            }
        }
        self.links.shift_remove(id);
        let removed = self
            .individuals
            .shift_remove(id)
            .ok_or_else(|| StructuralError::DanglingReference { id: id.to_string() })?;
        self.commit();
        tracing::debug!(
            id,
            unions = impact.partnerships.len(),
            children = impact.children.len(),
            pregnancies = impact.pregnancies.len(),
            "removed individual"
        );
        Ok(removed)
    }

    // ---------------------------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------------------------

    fn commit(&mut self) {
        self.reindex();
        self.revision += 1;
    }

    fn reindex(&mut self) {
        self.index = AdjacencyIndex::rebuild(&self.individuals, &self.partnerships, &self.links);
    }

    fn check_partnership(
        &self,
        a: &IndividualId,
        b: &IndividualId,
        status: UnionStatus,
        ignore: Option<&str>,
    ) -> Result<()> {
        if a == b {
            return Err(StructuralError::SelfReference { id: a.clone() });
        }
        for member in [a, b] {
            if !self.contains(member.as_str()) {
                return Err(StructuralError::dangling(member));
            }
        }
        for (elder, younger) in [(a, b), (b, a)] {
            if let Some(path) = self.descent_path(elder, younger) {
                tracing::debug!(a = %a, b = %b, "rejected union with a descendant");
                return Err(StructuralError::Cycle { path });
            }
        }
        self.check_rows(None, Some((a, b)))?;
        if status == UnionStatus::Current {
            let clash = self.partnerships_of(a.as_str()).any(|u| {
                u.same_pair(a, b) && u.is_current() && Some(u.id.as_str()) != ignore
            });
            if clash {
                return Err(StructuralError::DuplicateActiveUnion {
                    a: a.clone(),
                    b: b.clone(),
                });
            }
        }
        Ok(())
    }

    /// If `target` is a descendant of `from`, the chain `from -> … -> target -> from` that
    /// linking `target` as a parent of `from` would close.
    fn descent_path(&self, from: &IndividualId, target: &IndividualId) -> Option<Vec<IndividualId>> {
        let mut prev: HashMap<&IndividualId, &IndividualId> = HashMap::default();
        let mut queue: VecDeque<&IndividualId> = VecDeque::new();
        queue.push_back(from);
        while let Some(cur) = queue.pop_front() {
            for child in self.index.children(cur.as_str()) {
                if child == from || prev.contains_key(child) {
                    continue;
                }
                prev.insert(child, cur);
                if child == target {
                    let mut path = vec![target.clone()];
                    let mut at = target;
                    while let Some(&p) = prev.get(at) {
                        path.push(p.clone());
                        at = p;
                    }
                    path.reverse();
                    path.push(from.clone());
                    return Some(path);
                }
                queue.push_back(child);
            }
        }
        None
    }

    /// Partners share a row and children sit below their parents, so once the partners of
    /// every union are merged the descent edges must stay acyclic. Checks the graph as it would
    /// be with `link` replacing its child's record and `union` added.
    fn check_rows(
        &self,
        link: Option<&ParentChildLink>,
        union: Option<(&IndividualId, &IndividualId)>,
    ) -> Result<()> {
        const NEW: u8 = 0;
        const OPEN: u8 = 1;
        const DONE: u8 = 2;

        let ids: Vec<&IndividualId> = self.individuals.keys().collect();
        let slot: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut root: Vec<usize> = (0..ids.len()).collect();
        let pairs = self
            .partnerships
            .values()
            .map(|u| (&u.partner_a, &u.partner_b))
            .chain(union);
        for (a, b) in pairs {
            if let (Some(&a), Some(&b)) = (slot.get(a.as_str()), slot.get(b.as_str())) {
                let (ra, rb) = (find_root(&mut root, a), find_root(&mut root, b));
                root[ra] = rb;
            }
        }
        let rep: Vec<usize> = (0..ids.len()).map(|i| find_root(&mut root, i)).collect();

        let mut below: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        let records = self
            .links
            .values()
            .filter(|l| link.is_none_or(|new| new.child != l.child))
            .chain(link);
        for record in records {
            let Some(&child) = slot.get(record.child.as_str()) else {
                continue;
            };
            for parent in record.parents() {
                if let Some(&parent) = slot.get(parent.as_str()) {
                    below[rep[parent]].push(rep[child]);
                }
            }
        }

        let mut state = vec![NEW; ids.len()];
        let mut pred = vec![usize::MAX; ids.len()];
        for start in 0..ids.len() {
            if rep[start] != start || state[start] != NEW {
                continue;
            }
            state[start] = OPEN;
            let mut stack = vec![(start, 0usize)];
            while let Some(top) = stack.last_mut() {
                let (u, next) = *top;
                let Some(&v) = below[u].get(next) else {
                    state[u] = DONE;
                    stack.pop();
                    continue;
                };
                top.1 += 1;
                match state[v] {
                    NEW => {
                        state[v] = OPEN;
                        pred[v] = u;
                        stack.push((v, 0));
                    }
                    OPEN => {
                        let mut chain = vec![u];
                        let mut at = u;
                        while at != v {
                            at = pred[at];
                            chain.push(at);
                        }
                        chain.reverse();
                        chain.push(v);
                        let path: Vec<IndividualId> =
                            chain.into_iter().map(|i| ids[i].clone()).collect();
                        tracing::debug!(?path, "rejected record that puts partners on different rows");
                        return Err(StructuralError::Cycle { path });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn mint_individual_id(&mut self) -> IndividualId {
        IndividualId::new(next_id(
            self.id_strategy,
            &mut self.next_individual,
            "I",
            |raw| self.individuals.contains_key(raw),
        ))
    }

    fn mint_partnership_id(&mut self) -> PartnershipId {
        PartnershipId::new(next_id(
            self.id_strategy,
            &mut self.next_partnership,
            "U",
            |raw| self.partnerships.contains_key(raw),
        ))
    }

    fn mint_pregnancy_id(&mut self) -> PregnancyId {
        PregnancyId::new(next_id(
            self.id_strategy,
            &mut self.next_pregnancy,
            "P",
            |raw| self.pregnancies.contains_key(raw),
        ))
    }

    fn mint_art_id(&mut self) -> ArtId {
        ArtId::new(next_id(
            self.id_strategy,
            &mut self.next_art,
            "ART",
            |raw| self.art.contains_key(raw),
        ))
    }
}

fn next_id(
    strategy: IdStrategy,
    counter: &mut u64,
    prefix: &str,
    taken: impl Fn(&str) -> bool,
) -> String {
    loop {
        let raw = match strategy {
            IdStrategy::Sequential => {
                *counter += 1;
                format!("{prefix}{counter}")
            }
            IdStrategy::Random => format!("{prefix}-{}", uuid::Uuid::new_v4().simple()),
        };
        if !taken(&raw) {
            return raw;
        }
    }
}

fn find_root(root: &mut [usize], mut x: usize) -> usize {
    while root[x] != x {
        root[x] = root[root[x]];
        x = root[x];
    }
    x
}

fn check_distinct_parents(
    father: Option<&IndividualId>,
    mother: Option<&IndividualId>,
) -> Result<()> {
    match (father, mother) {
        (Some(f), Some(m)) if f == m => Err(StructuralError::DuplicateParent { parent: f.clone() }),
        _ => Ok(()),
    }
}
