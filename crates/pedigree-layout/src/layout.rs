//! Row placement and connector geometry.

use crate::LayoutOptions;
use crate::generation::Generations;
use crate::model::{
    Bounds, ChildLine, ChildLineKind, CoupleLine, DescentAnchor, LayoutNode, PedigreeLayout,
    PregnancyNode,
};
use crate::pins::ManualPins;
use indexmap::IndexMap;
use pedigree_core::{IndividualId, PedigreeGraph};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

type ParentKey = (Option<IndividualId>, Option<IndividualId>);

/// A sibling followed by whoever is slotted next to them: married-in partners, and siblings
/// who are their partners. `(id, is_sibling)` in left-to-right order.
type SlotGroup = Vec<(IndividualId, bool)>;

/// A run of siblings sharing the same parent set.
struct SibshipBlock {
    anchor: f64,
    groups: Vec<SlotGroup>,
}

pub fn layout_pedigree(
    graph: &PedigreeGraph,
    generations: &Generations,
    pins: &ManualPins,
    options: &LayoutOptions,
) -> PedigreeLayout {
    let cell = options.cell_width;
    let r = options.node_radius;

    let mut xs: HashMap<IndividualId, f64> = HashMap::default();
    let mut nodes: Vec<LayoutNode> = Vec::new();

    for (row_ix, row) in generations.rows().iter().enumerate() {
        let y = row_ix as f64 * options.generation_pitch;
        let placed: Vec<(IndividualId, f64)> = if row_ix == 0 {
            union_chains(graph, row.iter())
                .into_iter()
                .enumerate()
                .map(|(i, id)| (id, i as f64 * cell))
                .collect()
        } else {
            place_row(graph, row, &xs, cell)
        };
        for (id, x) in placed {
            let x = pins.get(id.as_str()).unwrap_or(x);
            xs.insert(id.clone(), x);
            nodes.push(LayoutNode {
                id,
                x,
                y,
                r,
                generation: row_ix,
            });
        }
    }

    let index: HashMap<IndividualId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), i))
        .collect();
    let at = |id: &IndividualId| index.get(id).map(|&i| &nodes[i]);

    let mut couple_lines = Vec::new();
    for union in graph.partnerships() {
        let (Some(a), Some(b)) = (at(&union.partner_a), at(&union.partner_b)) else {
            continue;
        };
        let y = (a.y + b.y) / 2.0;
        let mid_x = (a.x + b.x) / 2.0;
        couple_lines.push(CoupleLine {
            partnership: union.id.clone(),
            a: union.partner_a.clone(),
            b: union.partner_b.clone(),
            x1: a.x.min(b.x),
            x2: a.x.max(b.x),
            y,
            mid_x,
            mid_y: y,
            consanguinity: union.consanguinity,
            ended: !union.is_current(),
        });
    }

    let mut child_lines = Vec::new();
    for link in graph.links() {
        let Some(child) = at(&link.child) else {
            continue;
        };
        let parents: Vec<&LayoutNode> = link.parents().filter_map(at).collect();
        let Some(anchor) = descent_anchor(&parents) else {
            continue;
        };
        child_lines.push(ChildLine {
            child: link.child.clone(),
            x1: anchor.x,
            y1: anchor.y,
            x2: child.x,
            y2: child.y - child.r,
            bar_y: child.y - (child.r + options.sibship_gap),
            kind: anchor.kind,
            dashed: !link.biological,
        });
    }

    let mut occupied: HashMap<usize, Vec<f64>> = HashMap::default();
    for n in &nodes {
        occupied.entry(n.generation).or_default().push(n.x);
    }
    let mut pregnancies = Vec::new();
    for pregnancy in graph.pregnancies() {
        let parents: Vec<&LayoutNode> = pregnancy.parents().filter_map(at).collect();
        let anchor = descent_anchor(&parents);
        let generation = parents
            .iter()
            .map(|p| p.generation + 1)
            .max()
            .unwrap_or(0);
        let row = occupied.entry(generation).or_default();
        let mut x = match anchor {
            Some(a) => a.x,
            None => row.iter().copied().reduce(f64::max).map_or(0.0, |m| m + cell),
        };
        // Half-cell steps keep the symbol as close to its parents as the row allows.
        while row.iter().any(|&o| (o - x).abs() < cell) {
            x += cell / 2.0;
        }
        row.push(x);
        let y = generation as f64 * options.generation_pitch;
        pregnancies.push(PregnancyNode {
            id: pregnancy.id.clone(),
            x,
            y,
            r,
            generation,
            anchor,
            bar_y: y - (r + options.sibship_gap),
        });
    }

    let bounds = Bounds::from_points(
        nodes
            .iter()
            .map(|n| (n.x, n.y, n.r))
            .chain(pregnancies.iter().map(|p| (p.x, p.y, p.r)))
            .flat_map(|(x, y, r)| [(x - r, y - r), (x + r, y + r)]),
    )
    .unwrap_or_else(Bounds::empty);

    tracing::trace!(
        nodes = nodes.len(),
        couples = couple_lines.len(),
        descents = child_lines.len(),
        pregnancies = pregnancies.len(),
        "laid out pedigree"
    );

    PedigreeLayout {
        nodes,
        couple_lines,
        child_lines,
        pregnancies,
        bounds,
        index,
    }
}

/// Parents' midpoint for two parents, the parent's bottom edge for one.
fn descent_anchor(parents: &[&LayoutNode]) -> Option<DescentAnchor> {
    match parents {
        [p] => Some(DescentAnchor {
            x: p.x,
            y: p.y + p.r,
            kind: ChildLineKind::Stub,
        }),
        [f, m] => Some(DescentAnchor {
            x: (f.x + m.x) / 2.0,
            y: (f.y + m.y) / 2.0,
            kind: ChildLineKind::Direct,
        }),
        _ => None,
    }
}

/// Creation order, except that each individual's partners among `ids` follow them directly,
/// then those partners' partners, and so on.
fn union_chains<'a>(
    graph: &PedigreeGraph,
    ids: impl Iterator<Item = &'a IndividualId>,
) -> Vec<IndividualId> {
    let ids: Vec<&IndividualId> = ids.collect();
    let members: HashSet<&str> = ids.iter().copied().map(IndividualId::as_str).collect();
    let mut placed: HashSet<IndividualId> = HashSet::default();
    let mut out = Vec::with_capacity(ids.len());
    for &id in &ids {
        let mut stack = vec![id.clone()];
        while let Some(cur) = stack.pop() {
            if !placed.insert(cur.clone()) {
                continue;
            }
            for partner in graph.partners_of(cur.as_str()).into_iter().rev() {
                if members.contains(partner.as_str()) && !placed.contains(partner) {
                    stack.push(partner.clone());
                }
            }
            out.push(cur);
        }
    }
    out
}

/// Computes x for every member of a lower row. Parents are already placed.
fn place_row(
    graph: &PedigreeGraph,
    row: &[IndividualId],
    xs: &HashMap<IndividualId, f64>,
    cell: f64,
) -> Vec<(IndividualId, f64)> {
    let in_row: HashSet<&IndividualId> = row.iter().collect();
    let is_blood = |id: &IndividualId| graph.link_of(id.as_str()).is_some();

    let mut sibships: IndexMap<ParentKey, Vec<&IndividualId>> = IndexMap::new();
    for id in row.iter().filter(|id| is_blood(*id)) {
        let p = graph.parents_of(id.as_str());
        sibships
            .entry((p.father.cloned(), p.mother.cloned()))
            .or_default()
            .push(id);
    }

    let mut taken: HashSet<IndividualId> = HashSet::default();
    let mut blocks: Vec<SibshipBlock> = Vec::new();
    for ((father, mother), members) in &sibships {
        let parent_xs: Vec<f64> = [father, mother]
            .into_iter()
            .flatten()
            .filter_map(|p| xs.get(p).copied())
            .collect();
        if parent_xs.is_empty() {
            continue;
        }
        let anchor = parent_xs.iter().sum::<f64>() / parent_xs.len() as f64;

        let mut groups = Vec::new();
        for &member in members {
            if !taken.insert(member.clone()) {
                continue;
            }
            let mut group = vec![(member.clone(), true)];
            for partner in graph.partners_of(member.as_str()) {
                if !in_row.contains(partner) || taken.contains(partner) {
                    continue;
                }
                if !is_blood(partner) {
                    taken.insert(partner.clone());
                    group.push((partner.clone(), false));
                } else if members.contains(&partner) {
                    taken.insert(partner.clone());
                    group.push((partner.clone(), true));
                }
            }
            groups.push(group);
        }
        blocks.push(SibshipBlock { anchor, groups });
    }
    blocks.sort_by(|a, b| a.anchor.total_cmp(&b.anchor));

    // A sibling partnered into another sibship moves to the edge facing that sibship.
    let block_of: HashMap<&IndividualId, usize> = blocks
        .iter()
        .enumerate()
        .flat_map(|(bi, block)| {
            block
                .groups
                .iter()
                .flatten()
                .filter(|(_, sib)| *sib)
                .map(move |(id, _)| (id, bi))
        })
        .collect();
    let facing: Vec<Vec<i8>> = blocks
        .iter()
        .enumerate()
        .map(|(bi, block)| {
            block
                .groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .flat_map(|(id, _)| graph.partners_of(id.as_str()))
                        .filter_map(|partner| block_of.get(partner).copied())
                        .find(|&bj| bj != bi)
                        .map_or(0, |bj| if bj > bi { 1 } else { -1 })
                })
                .collect()
        })
        .collect();
    for (block, keys) in blocks.iter_mut().zip(facing) {
        let mut keyed: Vec<(i8, SlotGroup)> = keys.into_iter().zip(block.groups.drain(..)).collect();
        keyed.sort_by_key(|(key, _)| *key);
        block.groups = keyed.into_iter().map(|(_, group)| group).collect();
    }

    let mut out: Vec<(IndividualId, f64)> = Vec::with_capacity(row.len());
    let mut right_edge: Option<f64> = None;
    for block in blocks {
        let slots: Vec<(IndividualId, bool)> = block.groups.into_iter().flatten().collect();
        let sibling_offsets: Vec<f64> = slots
            .iter()
            .enumerate()
            .filter(|(_, (_, sib))| *sib)
            .map(|(i, _)| i as f64 * cell)
            .collect();
        let centroid = sibling_offsets.iter().sum::<f64>() / sibling_offsets.len().max(1) as f64;
        let mut start = block.anchor - centroid;
        if let Some(edge) = right_edge {
            if start < edge + cell {
                start = edge + cell;
            }
        }
        for (i, (id, _)) in slots.into_iter().enumerate() {
            let x = start + i as f64 * cell;
            right_edge = Some(x);
            out.push((id, x));
        }
    }

    let mut next = right_edge.map(|e| e + cell).unwrap_or(0.0);
    for id in union_chains(graph, row.iter().filter(|id| !taken.contains(*id))) {
        out.push((id, next));
        next += cell;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::assign_generations;
    use pedigree_core::{IndividualAttrs, ParentChildLink, PartnershipAttrs, Sex};

    #[test]
    fn married_in_partner_sits_next_to_the_blood_member() {
        let mut g = PedigreeGraph::new();
        let f = g.add_individual(IndividualAttrs::with_sex(Sex::M));
        let m = g.add_individual(IndividualAttrs::with_sex(Sex::F));
        let son = g.add_individual(IndividualAttrs::with_sex(Sex::M));
        let wife = g.add_individual(IndividualAttrs::with_sex(Sex::F));
        let daughter = g.add_individual(IndividualAttrs::with_sex(Sex::F));
        g.add_partnership(&f, &m, PartnershipAttrs::default()).unwrap();
        for c in [&son, &daughter] {
            g.set_parent_child_link(ParentChildLink::new(
                c.clone(),
                Some(f.clone()),
                Some(m.clone()),
            ))
            .unwrap();
        }
        g.add_partnership(&son, &wife, PartnershipAttrs::default())
            .unwrap();

        let gens = assign_generations(&g).unwrap();
        let layout = layout_pedigree(&g, &gens, &ManualPins::new(), &LayoutOptions::default());
        let x = |id: &IndividualId| layout.node(id.as_str()).unwrap().x;

        assert_eq!(gens.get(wife.as_str()), Some(1));
        assert_eq!(x(&wife) - x(&son), 140.0);
        assert_eq!(x(&daughter) - x(&wife), 140.0);
        // Siblings stay centered on the parents' midpoint.
        assert_eq!((x(&son) + x(&daughter)) / 2.0, (x(&f) + x(&m)) / 2.0);
    }

    #[test]
    fn overlapping_sibships_are_pushed_right() {
        let mut g = PedigreeGraph::new();
        let a = g.add_individual(IndividualAttrs::with_sex(Sex::M));
        let b = g.add_individual(IndividualAttrs::with_sex(Sex::M));
        let kids: Vec<IndividualId> = (0..4)
            .map(|_| g.add_individual(IndividualAttrs::default()))
            .collect();
        for (i, k) in kids.iter().enumerate() {
            let parent = if i < 2 { &a } else { &b };
            g.set_parent_child_link(ParentChildLink::new(k.clone(), Some(parent.clone()), None))
                .unwrap();
        }

        let gens = assign_generations(&g).unwrap();
        let layout = layout_pedigree(&g, &gens, &ManualPins::new(), &LayoutOptions::default());
        let mut row: Vec<f64> = kids
            .iter()
            .map(|k| layout.node(k.as_str()).unwrap().x)
            .collect();
        row.sort_by(f64::total_cmp);
        for pair in row.windows(2) {
            assert!(pair[1] - pair[0] >= 140.0);
        }
    }
}
