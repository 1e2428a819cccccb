//! Mutation façade over a [`PedigreeGraph`].
//!
//! Each operation is staged on a copy of the graph and swapped in only when every step
//! succeeded, so a rejected operation leaves both the graph and the history untouched.
//! Compound operations (adding parents, siblings, partners or children) are one undo step.

use crate::drop::{DropOutcome, DropTarget, ToolPayload};
use crate::focus::focus_graph;
use crate::policy::{ParentRole, ParentRolePolicy, SexMatchPolicy, sex_conflict};
use crate::ui::{UiState, ViewMode};
use pedigree_core::{
    ArtId, ArtRecord, Individual, IndividualAttrs, IndividualId, IndividualUpdate, LintReport,
    ParentChildLink, PartnershipAttrs, PartnershipId, PedigreeConfig, PedigreeGraph,
    PedigreeSnapshot, Pregnancy, PregnancyId, RemoveMode, Result, Sex, StructuralError,
    UnionStatus,
};
use pedigree_layout::{LayoutOptions, PedigreeLayout, layout_graph};
use pedigree_render::{RenderModel, RenderOptions, build_render_model};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentsOptions {
    pub biological: bool,
}

impl Default for ParentsOptions {
    fn default() -> Self {
        Self { biological: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildOptions {
    /// The other parent. Must exist when given.
    pub preferred_partner: Option<IndividualId>,
    /// Overrides the role policy for the acting individual.
    pub role: Option<ParentRole>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParents {
    pub father: IndividualId,
    pub mother: IndividualId,
    pub partnership: PartnershipId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPartner {
    pub partner: IndividualId,
    pub partnership: PartnershipId,
}

/// Everything a confirmed removal will detach, bound to the revision it was prepared at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalPlan {
    pub id: IndividualId,
    pub partnerships: Vec<PartnershipId>,
    /// Children who lose this parent. They stay in the pedigree.
    pub children: Vec<IndividualId>,
    /// Pregnancies naming this individual; they are deleted with their ART records.
    pub pregnancies: Vec<PregnancyId>,
    pub revision: u64,
}

#[derive(Debug, Clone)]
struct History {
    past: VecDeque<PedigreeGraph>,
    future: Vec<PedigreeGraph>,
    limit: usize,
}

impl History {
    fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit,
        }
    }

    fn push_past(&mut self, graph: PedigreeGraph) {
        if self.limit == 0 {
            return;
        }
        if self.past.len() == self.limit {
            self.past.pop_front();
        }
        self.past.push_back(graph);
    }

    fn record(&mut self, previous: PedigreeGraph) {
        self.push_past(previous);
        self.future.clear();
    }
}

#[derive(Debug, Clone)]
pub struct Editor<P: ParentRolePolicy = SexMatchPolicy> {
    graph: PedigreeGraph,
    history: History,
    policy: P,
    revision: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_policy(SexMatchPolicy)
    }

    pub fn with_config(config: &PedigreeConfig) -> Self {
        let limit = config
            .get_u64("history.limit")
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        Self::new().with_history_limit(limit)
    }

    pub fn from_snapshot(snapshot: PedigreeSnapshot) -> Result<Self> {
        Ok(Self::from_graph(PedigreeGraph::from_snapshot(snapshot)?))
    }

    pub fn from_graph(graph: PedigreeGraph) -> Self {
        let mut editor = Self::new();
        editor.graph = graph;
        editor
    }
}

impl<P: ParentRolePolicy> Editor<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            graph: PedigreeGraph::new(),
            history: History::new(DEFAULT_HISTORY_LIMIT),
            policy,
            revision: 0,
        }
    }

    /// Caps the number of undo steps; older steps are dropped first. Zero disables undo.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history.limit = limit;
        while self.history.past.len() > limit {
            self.history.past.pop_front();
        }
        self
    }

    pub fn graph(&self) -> &PedigreeGraph {
        &self.graph
    }

    pub fn into_graph(self) -> PedigreeGraph {
        self.graph
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn snapshot(&self) -> PedigreeSnapshot {
        self.graph.to_snapshot()
    }

    /// Bumped by every commit, undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn lint(&self) -> LintReport {
        pedigree_core::lint(&self.graph)
    }

    // ---------------------------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------------------------

    fn commit(&mut self, label: &'static str, staged: PedigreeGraph) {
        let previous = std::mem::replace(&mut self.graph, staged);
        self.history.record(previous);
        self.revision += 1;
        tracing::debug!(op = label, revision = self.revision, "committed edit");
    }

    fn transact<T>(
        &mut self,
        label: &'static str,
        f: impl FnOnce(&mut PedigreeGraph, &P) -> Result<T>,
    ) -> Result<T> {
        let mut staged = self.graph.clone();
        match f(&mut staged, &self.policy) {
            Ok(out) => {
                self.commit(label, staged);
                Ok(out)
            }
            Err(err) => {
                tracing::debug!(op = label, error = %err, "rejected edit");
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.future.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.graph, previous);
        self.history.future.push(current);
        self.revision += 1;
        tracing::debug!(revision = self.revision, "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.graph, next);
        self.history.push_past(current);
        self.revision += 1;
        tracing::debug!(revision = self.revision, "redo");
        true
    }

    // ---------------------------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------------------------

    pub fn add_individual(&mut self, attrs: IndividualAttrs) -> IndividualId {
        let mut staged = self.graph.clone();
        let id = staged.add_individual(attrs);
        self.commit("add_individual", staged);
        id
    }

    /// Creates a father (M) and a mother (F) for a child without any recorded parent, joined by
    /// a current partnership.
    pub fn add_parents_for_child(
        &mut self,
        child: &str,
        options: ParentsOptions,
    ) -> Result<NewParents> {
        self.transact("add_parents", |g, _| {
            require(g, child)?;
            if !g.parents_of(child).is_empty() {
                return Err(StructuralError::AlreadyHasParents {
                    child: IndividualId::new(child),
                });
            }
            let father = g.add_individual(IndividualAttrs::with_sex(Sex::M));
            let mother = g.add_individual(IndividualAttrs::with_sex(Sex::F));
            let mut link = ParentChildLink::new(
                IndividualId::new(child),
                Some(father.clone()),
                Some(mother.clone()),
            );
            link.biological = options.biological;
            g.set_parent_child_link(link)?;
            let partnership = g.add_partnership(&father, &mother, PartnershipAttrs::default())?;
            Ok(NewParents {
                father,
                mother,
                partnership,
            })
        })
    }

    /// Adds an individual of unspecified sex with the same recorded parents as `id`.
    pub fn add_sibling(&mut self, id: &str) -> Result<IndividualId> {
        self.transact("add_sibling", |g, _| {
            require(g, id)?;
            let Some(link) = g.link_of(id).cloned() else {
                return Err(StructuralError::MissingParents {
                    id: IndividualId::new(id),
                });
            };
            let sibling = g.add_individual(IndividualAttrs::default());
            g.set_parent_child_link(ParentChildLink {
                child: sibling.clone(),
                ..link
            })?;
            Ok(sibling)
        })
    }

    pub fn add_partner(&mut self, id: &str) -> Result<NewPartner> {
        self.transact("add_partner", |g, _| {
            let acting = require(g, id)?;
            let sex = acting.sex.opposite();
            let me = acting.id.clone();
            let partner = g.add_individual(IndividualAttrs::with_sex(sex));
            let partnership = g.add_partnership(&me, &partner, PartnershipAttrs::default())?;
            Ok(NewPartner {
                partner,
                partnership,
            })
        })
    }

    /// Adds a child of unspecified sex to `id` and a partner.
    ///
    /// Without a preferred partner, the partner of the most recent current union is used,
    /// then the most recent union of any status, then none. When a recorded sex contradicts
    /// the resulting slot, the policy decides whether the edit goes through.
    pub fn add_child(&mut self, id: &str, options: ChildOptions) -> Result<IndividualId> {
        self.transact("add_child", |g, policy| {
            let acting = require(g, id)?.clone();
            let partner = match options.preferred_partner {
                Some(p) => {
                    if p == acting.id {
                        return Err(StructuralError::SelfReference { id: p });
                    }
                    Some(require(g, p.as_str())?.clone())
                }
                None => most_recent_partner(g, &acting.id)
                    .and_then(|p| g.individual(p.as_str()).cloned()),
            };
            let role = options
                .role
                .unwrap_or_else(|| policy.acting_role(&acting, partner.as_ref()));
            if let Some((who, slot)) = sex_conflict(&acting, partner.as_ref(), role) {
                tracing::debug!(
                    id = %who.id,
                    sex = ?who.sex,
                    ?slot,
                    "parent slot contradicts recorded sex"
                );
                if !policy.accepts_conflict(who, slot) {
                    return Err(StructuralError::ParentSexConflict { id: who.id.clone() });
                }
            }
            let partner_id = partner.map(|p| p.id);
            let (father, mother) = match role {
                ParentRole::Father => (Some(acting.id), partner_id),
                ParentRole::Mother => (partner_id, Some(acting.id)),
            };
            let child = g.add_individual(IndividualAttrs::default());
            g.set_parent_child_link(ParentChildLink::new(child.clone(), father, mother))?;
            Ok(child)
        })
    }

    /// Replaces or clears one parent slot of `child`. A child left without parents loses its
    /// parentage record.
    pub fn reassign_parent(
        &mut self,
        child: &str,
        role: ParentRole,
        parent: Option<&str>,
    ) -> Result<()> {
        self.transact("reassign_parent", |g, _| {
            require(g, child)?;
            let mut link = g
                .link_of(child)
                .cloned()
                .unwrap_or_else(|| ParentChildLink::new(IndividualId::new(child), None, None));
            let parent = parent.map(IndividualId::new);
            match role {
                ParentRole::Father => link.father = parent,
                ParentRole::Mother => link.mother = parent,
            }
            g.set_parent_child_link(link)
        })
    }

    /// Joins two existing individuals in a new partnership.
    pub fn link_partners(
        &mut self,
        a: &str,
        b: &str,
        attrs: PartnershipAttrs,
    ) -> Result<PartnershipId> {
        self.transact("link_partners", |g, _| {
            let a = require(g, a)?.id.clone();
            let b = require(g, b)?.id.clone();
            g.add_partnership(&a, &b, attrs)
        })
    }

    pub fn update_individual(&mut self, id: &str, update: IndividualUpdate) -> Result<()> {
        self.transact("update_individual", |g, _| g.apply_update(id, update))
    }

    pub fn set_union_status(&mut self, partnership: &str, status: UnionStatus) -> Result<()> {
        self.transact("set_union_status", |g, _| {
            g.set_partnership_status(partnership, status)
        })
    }

    pub fn set_consanguinity(&mut self, partnership: &str, consanguinity: bool) -> Result<()> {
        self.transact("set_consanguinity", |g, _| {
            g.set_consanguinity(partnership, consanguinity)
        })
    }

    pub fn remove_partnership(&mut self, partnership: &str) -> Result<()> {
        self.transact("remove_partnership", |g, _| {
            g.remove_partnership(partnership).map(|_| ())
        })
    }

    /// Inserts or replaces a pregnancy record.
    pub fn upsert_pregnancy(&mut self, pregnancy: Pregnancy) -> Result<PregnancyId> {
        self.transact("upsert_pregnancy", |g, _| g.upsert_pregnancy(pregnancy))
    }

    /// Removes a pregnancy and the ART records attached to it.
    pub fn remove_pregnancy(&mut self, id: &str) -> Result<()> {
        self.transact("remove_pregnancy", |g, _| g.remove_pregnancy(id).map(|_| ()))
    }

    pub fn upsert_art(&mut self, record: ArtRecord) -> Result<ArtId> {
        self.transact("upsert_art", |g, _| g.upsert_art(record))
    }

    pub fn remove_art(&mut self, id: &str) -> Result<()> {
        self.transact("remove_art", |g, _| g.remove_art(id).map(|_| ()))
    }

    /// First step of a removal: lists what confirming would detach.
    pub fn prepare_removal(&self, id: &str) -> Result<RemovalPlan> {
        let impact = self.graph.removal_impact(id)?;
        Ok(RemovalPlan {
            id: IndividualId::new(id),
            partnerships: impact.partnerships,
            children: impact.children,
            pregnancies: impact.pregnancies,
            revision: self.revision,
        })
    }

    /// Second step of a removal. The plan must have been prepared at the current revision.
    pub fn confirm_removal(&mut self, plan: &RemovalPlan) -> Result<Individual> {
        if plan.revision != self.revision {
            tracing::debug!(
                id = %plan.id,
                planned = plan.revision,
                current = self.revision,
                "stale removal plan"
            );
            return Err(StructuralError::StaleRemovalPlan {
                id: plan.id.clone(),
                planned: plan.revision,
                current: self.revision,
            });
        }
        self.transact("remove_individual", |g, _| {
            g.remove_individual(plan.id.as_str(), RemoveMode::CASCADE)
        })
    }

    // ---------------------------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------------------------

    /// Lays out the graph, or the focus view when `ui` asks for it. The focus view centres on
    /// the proband, or on the first individual when none is marked.
    pub fn layout(&self, ui: &UiState, options: &LayoutOptions) -> Result<PedigreeLayout> {
        if ui.view_mode == ViewMode::Focus {
            if let Some(view) = focus_graph(&self.graph, ui.focus_depth)? {
                return layout_graph(&view, &ui.pins, options);
            }
        }
        layout_graph(&self.graph, &ui.pins, options)
    }

    pub fn render_model(
        &self,
        ui: &UiState,
        layout_options: &LayoutOptions,
        render_options: &RenderOptions,
    ) -> Result<RenderModel> {
        let layout = self.layout(ui, layout_options)?;
        Ok(build_render_model(
            &self.graph,
            &layout,
            ui.selected(),
            render_options,
        ))
    }

    // ---------------------------------------------------------------------------------------
    // Drag and drop
    // ---------------------------------------------------------------------------------------

    /// Routes a palette drop through the regular operations.
    ///
    /// The individual tool creates an individual pinned at the drop x and selects it. Link
    /// tools act on the node under the pointer and are ignored on free space.
    pub fn dispatch_drop(
        &mut self,
        payload: ToolPayload,
        target: &DropTarget,
        ui: &mut UiState,
    ) -> Result<DropOutcome> {
        if let ToolPayload::Individual { sex } = payload {
            let id = self.add_individual(IndividualAttrs::with_sex(sex.unwrap_or_default()));
            ui.pins.pin(id.clone(), target.x);
            ui.select(Some(id.clone()));
            return Ok(DropOutcome::Created(vec![id]));
        }
        let Some(node) = target.node.as_ref() else {
            tracing::trace!(?payload, "ignored link tool dropped on free space");
            return Ok(DropOutcome::Ignored);
        };
        let node = node.as_str();
        let created = match payload {
            ToolPayload::LinkPartner => vec![self.add_partner(node)?.partner],
            ToolPayload::AddParents => {
                let parents = self.add_parents_for_child(node, ParentsOptions::default())?;
                vec![parents.father, parents.mother]
            }
            ToolPayload::LinkChild => vec![self.add_child(node, ChildOptions::default())?],
            ToolPayload::LinkSibling => vec![self.add_sibling(node)?],
            ToolPayload::Individual { .. } => Vec::new(),
        };
        Ok(DropOutcome::Created(created))
    }

    /// Decodes raw drag data and dispatches it.
    pub fn drop_data(
        &mut self,
        mime: &str,
        data: &str,
        target: &DropTarget,
        ui: &mut UiState,
    ) -> crate::Result<DropOutcome> {
        let payload = ToolPayload::decode(mime, data)?;
        Ok(self.dispatch_drop(payload, target, ui)?)
    }
}

fn require<'g>(graph: &'g PedigreeGraph, id: &str) -> Result<&'g Individual> {
    graph
        .individual(id)
        .ok_or_else(|| StructuralError::DanglingReference { id: id.to_string() })
}

fn most_recent_partner(graph: &PedigreeGraph, id: &IndividualId) -> Option<IndividualId> {
    let unions: Vec<_> = graph.partnerships_of(id.as_str()).collect();
    unions
        .iter()
        .rev()
        .find(|u| u.is_current())
        .or_else(|| unions.last())
        .and_then(|u| u.other(id))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let mut editor = Editor::new().with_history_limit(3);
        for _ in 0..5 {
            editor.add_individual(IndividualAttrs::default());
        }
        let mut steps = 0;
        while editor.undo() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(editor.graph().individual_count(), 2);
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut editor = Editor::new();
        editor.add_individual(IndividualAttrs::default());
        assert!(editor.undo());
        assert!(editor.can_redo());
        editor.add_individual(IndividualAttrs::default());
        assert!(!editor.can_redo());
    }

    #[test]
    fn rejected_edit_keeps_history_and_revision() {
        let mut editor = Editor::new();
        let id = editor.add_individual(IndividualAttrs::default());
        let rev = editor.revision();
        assert!(editor.add_sibling(id.as_str()).is_err());
        assert_eq!(editor.revision(), rev);
        assert_eq!(editor.graph().individual_count(), 1);
        assert!(editor.undo());
        assert!(!editor.can_undo());
    }

    #[test]
    fn history_limit_reads_config() {
        let mut cfg = PedigreeConfig::default();
        cfg.set_value("history.limit", serde_json::json!(1));
        let mut editor = Editor::with_config(&cfg);
        editor.add_individual(IndividualAttrs::default());
        editor.add_individual(IndividualAttrs::default());
        assert!(editor.undo());
        assert!(!editor.undo());
    }
}
