//! Generation (row) assignment.
//!
//! Blood components are ranked independently by relaxing descent, partner and founder
//! constraints to a fixed point, then stitched together through the partnerships that bridge
//! them.

use pedigree_core::{IndividualId, PedigreeGraph, Result, StructuralError};
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Default)]
pub struct Generations {
    by_id: HashMap<IndividualId, usize>,
    rows: Vec<Vec<IndividualId>>,
}

impl Generations {
    pub fn get(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Individuals per generation, top row first, creation order inside a row.
    pub fn rows(&self) -> &[Vec<IndividualId>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Union-find whose members carry an integer offset relative to their parent.
struct OffsetForest {
    parent: Vec<usize>,
    delta: Vec<i64>,
    size: Vec<usize>,
}

impl OffsetForest {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            delta: vec![0; n],
            size: vec![1; n],
        }
    }

    /// Root of `x` and the offset of `x` relative to it.
    fn find(&mut self, x: usize) -> (usize, i64) {
        let p = self.parent[x];
        if p == x {
            return (x, 0);
        }
        let (root, off) = self.find(p);
        self.delta[x] += off;
        self.parent[x] = root;
        (root, self.delta[x])
    }

    /// Hangs root `child` under root `parent`, shifting `child`'s members by `delta`.
    fn attach(&mut self, child: usize, parent: usize, delta: i64) {
        self.parent[child] = parent;
        self.delta[child] = delta;
        self.size[parent] += self.size[child];
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, _) = self.find(a);
        let (rb, _) = self.find(b);
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            self.attach(ra, rb, 0);
        } else {
            self.attach(rb, ra, 0);
        }
    }
}

pub fn assign_generations(graph: &PedigreeGraph) -> Result<Generations> {
    let ids: Vec<&IndividualId> = graph.individual_ids().collect();
    let n = ids.len();
    let ix: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut descents: Vec<(usize, usize)> = Vec::new();
    for link in graph.links() {
        let Some(&c) = ix.get(link.child.as_str()) else {
            continue;
        };
        for parent in link.parents() {
            if let Some(&p) = ix.get(parent.as_str()) {
                descents.push((p, c));
            }
        }
    }

    let mut blood = OffsetForest::new(n);
    for &(p, c) in &descents {
        blood.union(p, c);
    }
    let component: Vec<usize> = (0..n).map(|i| blood.find(i).0).collect();

    let mut couples: Vec<(usize, usize)> = Vec::new();
    let mut bridges: Vec<(usize, usize)> = Vec::new();
    for union in graph.partnerships() {
        let (Some(&a), Some(&b)) = (
            ix.get(union.partner_a.as_str()),
            ix.get(union.partner_b.as_str()),
        ) else {
            continue;
        };
        if component[a] == component[b] {
            couples.push((a, b));
        } else {
            bridges.push((a, b));
        }
    }

    let founders: Vec<(usize, Vec<usize>)> = (0..n)
        .filter(|&i| graph.link_of(ids[i].as_str()).is_none())
        .filter_map(|i| {
            let kids: Vec<usize> = graph
                .children_of(ids[i].as_str())
                .iter()
                .filter_map(|c| ix.get(c.as_str()).copied())
                .collect();
            (!kids.is_empty()).then_some((i, kids))
        })
        .collect();

    let mut generation = vec![0i64; n];
    let mut rounds = 0usize;
    loop {
        let mut changed = false;
        for &(p, c) in &descents {
            let want = generation[p] + 1;
            if generation[c] < want {
                generation[c] = want;
                changed = true;
            }
        }
        for &(a, b) in &couples {
            let hi = generation[a].max(generation[b]);
            if generation[a] != hi || generation[b] != hi {
                generation[a] = hi;
                generation[b] = hi;
                changed = true;
            }
        }
        for (f, kids) in &founders {
            let lowest = kids.iter().map(|&k| generation[k]).min().unwrap_or(1) - 1;
            if generation[*f] < lowest {
                generation[*f] = lowest;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        rounds += 1;
        // A consistent assignment never ranks anyone at or below the individual count.
        if let Some(i) = (0..n).find(|&i| generation[i] >= n as i64) {
            tracing::debug!(id = %ids[i], rounds, "generation relaxation did not converge");
            return Err(StructuralError::Cycle {
                path: cycle_witness(graph, ids[i]),
            });
        }
    }

    let mut component_min: HashMap<usize, i64> = HashMap::default();
    for i in 0..n {
        let slot = component_min.entry(component[i]).or_insert(generation[i]);
        *slot = (*slot).min(generation[i]);
    }
    for i in 0..n {
        generation[i] -= component_min[&component[i]];
    }

    let mut groups = OffsetForest::new(n);
    for i in 0..n {
        if component[i] != i {
            groups.size[component[i]] += 1;
        }
    }
    for &(a, b) in &bridges {
        let (ra, ta) = groups.find(component[a]);
        let (rb, tb) = groups.find(component[b]);
        let at_a = generation[a] + ta;
        let at_b = generation[b] + tb;
        if ra == rb {
            if at_a != at_b {
                tracing::debug!(
                    a = %ids[a],
                    b = %ids[b],
                    offset = at_b - at_a,
                    "conflicting partnership bridge; keeping earlier alignment"
                );
            }
            continue;
        }
        if groups.size[ra] < groups.size[rb] {
            groups.attach(ra, rb, at_b - at_a);
        } else {
            groups.attach(rb, ra, at_a - at_b);
        }
    }

    let mut group_of = vec![0usize; n];
    for i in 0..n {
        let (root, offset) = groups.find(component[i]);
        group_of[i] = root;
        generation[i] += offset;
    }
    let mut group_min: HashMap<usize, i64> = HashMap::default();
    for i in 0..n {
        let slot = group_min.entry(group_of[i]).or_insert(generation[i]);
        *slot = (*slot).min(generation[i]);
    }

    let mut out = Generations::default();
    for i in 0..n {
        let g = (generation[i] - group_min[&group_of[i]]).max(0) as usize;
        if out.rows.len() <= g {
            out.rows.resize_with(g + 1, Vec::new);
        }
        out.rows[g].push(ids[i].clone());
        out.by_id.insert(ids[i].clone(), g);
    }
    tracing::trace!(
        individuals = n,
        rows = out.rows.len(),
        bridges = bridges.len(),
        rounds,
        "assigned generations"
    );
    Ok(out)
}

/// `id` and the partners who pull them out of their rank.
fn cycle_witness(graph: &PedigreeGraph, id: &IndividualId) -> Vec<IndividualId> {
    let mut path = vec![id.clone()];
    path.extend(graph.partners_of(id.as_str()).into_iter().cloned());
    path.push(id.clone());
    path
}
