//! Assembles the full render model from a graph and its layout.

use crate::RenderOptions;
use crate::describe::{describe_individual, describe_pregnancy};
use crate::legend::{LegendUsage, build_legend};
use crate::model::{CoupleDescriptor, DescentDescriptor, RenderModel, Segment};
use pedigree_core::PedigreeGraph;
use pedigree_layout::{CoupleLine, PedigreeLayout};

/// Half the distance between the two strokes of a consanguineous union.
const DOUBLE_LINE_OFFSET: f64 = 3.0;
const ENDED_SLASH_HALF_WIDTH: f64 = 5.0;
const ENDED_SLASH_HALF_HEIGHT: f64 = 8.0;

fn couple_descriptor(line: &CoupleLine) -> CoupleDescriptor {
    let segments = if line.consanguinity {
        vec![
            Segment::new(line.x1, line.y - DOUBLE_LINE_OFFSET, line.x2, line.y - DOUBLE_LINE_OFFSET),
            Segment::new(line.x1, line.y + DOUBLE_LINE_OFFSET, line.x2, line.y + DOUBLE_LINE_OFFSET),
        ]
    } else {
        vec![Segment::new(line.x1, line.y, line.x2, line.y)]
    };
    let ended_slash = line.ended.then(|| {
        Segment::new(
            line.mid_x - ENDED_SLASH_HALF_WIDTH,
            line.mid_y + ENDED_SLASH_HALF_HEIGHT,
            line.mid_x + ENDED_SLASH_HALF_WIDTH,
            line.mid_y - ENDED_SLASH_HALF_HEIGHT,
        )
    });
    CoupleDescriptor {
        partnership: line.partnership.clone(),
        segments,
        consanguinity: line.consanguinity,
        ended_slash,
    }
}

pub fn build_render_model(
    graph: &PedigreeGraph,
    layout: &PedigreeLayout,
    selected: Option<&str>,
    options: &RenderOptions,
) -> RenderModel {
    let proband = graph.proband().map(|p| p.id.as_str());

    let nodes: Vec<_> = layout
        .nodes
        .iter()
        .filter_map(|node| {
            let ind = graph.individual(node.id.as_str())?;
            let is_proband = proband == Some(node.id.as_str());
            let is_selected = selected == Some(node.id.as_str());
            Some(describe_individual(ind, node, is_proband, is_selected, options))
        })
        .collect();

    let couples = layout.couple_lines.iter().map(couple_descriptor).collect();

    let descents = layout
        .child_lines
        .iter()
        .map(|line| DescentDescriptor {
            child: line.child.clone(),
            segments: line
                .segments()
                .into_iter()
                .map(|(x1, y1, x2, y2)| Segment::new(x1, y1, x2, y2))
                .collect(),
            dashed: line.dashed,
        })
        .collect();

    let pregnancies: Vec<_> = layout
        .pregnancies
        .iter()
        .filter_map(|node| Some(describe_pregnancy(graph.pregnancy(node.id.as_str())?, node)))
        .collect();

    let mut usage = LegendUsage::from_nodes(&nodes);
    usage.record_pregnancies(&pregnancies);
    let legend = build_legend(&usage, &options.legend);

    RenderModel {
        nodes,
        couples,
        descents,
        pregnancies,
        legend,
        bounds: layout.bounds,
    }
}
