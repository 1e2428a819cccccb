//! Focus view: the proband's direct line and the sibships along it.
//!
//! Without a proband the view centres on the first individual in creation order.

use pedigree_core::{IndividualId, PedigreeGraph, PedigreeSnapshot, Result};
use rustc_hash::FxHashSet as HashSet;

/// Individuals visible around `root`: ancestors up to `max_depth` generations up and every
/// child of those ancestors (full and half siblings at each level).
pub fn focus_members(graph: &PedigreeGraph, root: &str, max_depth: usize) -> HashSet<IndividualId> {
    let mut included: HashSet<IndividualId> = HashSet::default();
    if !graph.contains(root) {
        return included;
    }
    let mut stack: Vec<(IndividualId, usize)> = vec![(IndividualId::new(root), 0)];
    while let Some((id, depth)) = stack.pop() {
        if depth > max_depth {
            continue;
        }
        included.insert(id.clone());
        let parents = graph.parents_of(id.as_str());
        for parent in parents.iter() {
            included.insert(parent.clone());
            for child in graph.children_of(parent.as_str()) {
                included.insert(child.clone());
            }
            stack.push((parent.clone(), depth + 1));
        }
    }
    included
}

/// The individual the focus view is built around: the proband, else the first individual.
pub fn focus_root(graph: &PedigreeGraph) -> Option<&IndividualId> {
    graph
        .proband()
        .map(|p| &p.id)
        .or_else(|| graph.individual_ids().next())
}

/// A self-contained graph restricted to the focus members, or `None` for an empty graph.
///
/// Pregnancies stay when every recorded parent is visible, together with their
/// assisted-reproduction records.
pub fn focus_graph(graph: &PedigreeGraph, max_depth: usize) -> Result<Option<PedigreeGraph>> {
    let Some(root) = focus_root(graph) else {
        return Ok(None);
    };
    let keep = focus_members(graph, root.as_str(), max_depth);
    let pregnancies: Vec<_> = graph
        .pregnancies()
        .filter(|p| p.parents().all(|parent| keep.contains(parent)))
        .cloned()
        .collect();
    let art = graph
        .art()
        .filter(|record| {
            record
                .related_to
                .as_ref()
                .is_none_or(|pid| pregnancies.iter().any(|p| &p.id == pid))
        })
        .cloned()
        .collect();
    let snapshot = PedigreeSnapshot {
        individuals: graph
            .individuals()
            .filter(|i| keep.contains(&i.id))
            .cloned()
            .collect(),
        partnerships: graph
            .partnerships()
            .filter(|u| keep.contains(&u.partner_a) && keep.contains(&u.partner_b))
            .cloned()
            .collect(),
        parent_child_links: graph
            .links()
            .filter(|l| keep.contains(&l.child))
            .filter_map(|l| {
                let mut link = l.clone();
                link.father = link.father.filter(|p| keep.contains(p));
                link.mother = link.mother.filter(|p| keep.contains(p));
                link.has_parent().then_some(link)
            })
            .collect(),
        pregnancies,
        art,
    };
    tracing::trace!(root = %root, visible = keep.len(), total = graph.individual_count(), "built focus view");
    PedigreeGraph::from_snapshot(snapshot).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedigree_core::{IndividualAttrs, ParentChildLink, PartnershipAttrs, Sex};

    #[test]
    fn focus_keeps_the_direct_line_and_sibships() {
        let mut g = PedigreeGraph::new();
        let gf = g.add_individual(IndividualAttrs::with_sex(Sex::M));
        let f = g.add_individual(IndividualAttrs::with_sex(Sex::M));
        let uncle = g.add_individual(IndividualAttrs::with_sex(Sex::M));
        let m = g.add_individual(IndividualAttrs::with_sex(Sex::F));
        let p = g.add_individual(IndividualAttrs::with_sex(Sex::F).proband());
        let cousin = g.add_individual(IndividualAttrs::default());
        let stranger = g.add_individual(IndividualAttrs::default());
        for c in [&f, &uncle] {
            g.set_parent_child_link(ParentChildLink::new(c.clone(), Some(gf.clone()), None))
                .unwrap();
        }
        g.set_parent_child_link(ParentChildLink::new(p.clone(), Some(f.clone()), Some(m.clone())))
            .unwrap();
        g.set_parent_child_link(ParentChildLink::new(cousin.clone(), Some(uncle.clone()), None))
            .unwrap();
        g.add_partnership(&f, &m, PartnershipAttrs::default()).unwrap();

        let members = focus_members(&g, p.as_str(), 5);
        for id in [&gf, &f, &uncle, &m, &p] {
            assert!(members.contains(id), "{id} should be visible");
        }
        assert!(!members.contains(&cousin));
        assert!(!members.contains(&stranger));

        let view = focus_graph(&g, 5).unwrap().unwrap();
        assert_eq!(view.individual_count(), 5);
        assert_eq!(view.partnership_count(), 1);

        let shallow = focus_members(&g, p.as_str(), 0);
        assert!(shallow.contains(&f) && shallow.contains(&m));
        assert!(!shallow.contains(&gf));
    }

    #[test]
    fn without_a_proband_the_first_individual_is_the_root() {
        let mut g = PedigreeGraph::new();
        let first = g.add_individual(IndividualAttrs::with_sex(Sex::F));
        let mother = g.add_individual(IndividualAttrs::with_sex(Sex::F));
        let stranger = g.add_individual(IndividualAttrs::default());
        g.set_parent_child_link(ParentChildLink::new(first.clone(), None, Some(mother.clone())))
            .unwrap();

        assert_eq!(focus_root(&g), Some(&first));
        let view = focus_graph(&g, 5).unwrap().unwrap();
        assert!(view.contains(first.as_str()) && view.contains(mother.as_str()));
        assert!(!view.contains(stranger.as_str()));

        assert!(focus_graph(&PedigreeGraph::new(), 5).unwrap().is_none());
    }
}
