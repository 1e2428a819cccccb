#![forbid(unsafe_code)]

//! Generation assignment and row layout for pedigree diagrams.
//!
//! Layout is a pure function of the graph, its creation order and the manual pins, so the same
//! inputs always produce the same coordinates.

pub mod generation;
pub mod layout;
pub mod model;
pub mod pins;

pub use generation::{Generations, assign_generations};
pub use layout::layout_pedigree;
pub use model::{
    Bounds, ChildLine, ChildLineKind, CoupleLine, DescentAnchor, LayoutNode, PedigreeLayout,
    PregnancyNode,
};
pub use pins::ManualPins;

use pedigree_core::{PedigreeConfig, PedigreeGraph, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Horizontal pitch between neighbours in a row.
    pub cell_width: f64,
    /// Vertical distance between generations.
    pub generation_pitch: f64,
    pub node_radius: f64,
    /// Gap between a symbol's top edge and its sibship bar.
    pub sibship_gap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            cell_width: 140.0,
            generation_pitch: 120.0,
            node_radius: 24.0,
            sibship_gap: 10.0,
        }
    }
}

impl LayoutOptions {
    pub fn from_config(config: &PedigreeConfig) -> Self {
        let d = Self::default();
        Self {
            cell_width: config.get_f64("layout.cellWidth").unwrap_or(d.cell_width),
            generation_pitch: config
                .get_f64("layout.generationPitch")
                .unwrap_or(d.generation_pitch),
            node_radius: config.get_f64("layout.nodeRadius").unwrap_or(d.node_radius),
            sibship_gap: config.get_f64("layout.sibshipGap").unwrap_or(d.sibship_gap),
        }
    }
}

/// Assigns generations and lays the graph out in one step.
pub fn layout_graph(
    graph: &PedigreeGraph,
    pins: &ManualPins,
    options: &LayoutOptions,
) -> Result<PedigreeLayout> {
    let generations = assign_generations(graph)?;
    Ok(layout_pedigree(graph, &generations, pins, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_read_config_with_defaults() {
        let mut cfg = PedigreeConfig::default();
        cfg.set_value("layout.cellWidth", json!(200));
        let opts = LayoutOptions::from_config(&cfg);
        assert_eq!(opts.cell_width, 200.0);
        assert_eq!(opts.generation_pitch, 120.0);
        assert_eq!(opts.node_radius, 24.0);
    }
}
