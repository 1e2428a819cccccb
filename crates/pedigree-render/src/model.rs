use crate::legend::LegendEntry;
use pedigree_core::{IndividualId, PartnershipId, PregnancyId};
use pedigree_layout::Bounds;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Square,
    Circle,
    Diamond,
    /// Pregnancy that did not reach term.
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    None,
    Filled,
    Half,
    Dot,
}

impl Shading {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Filled => "filled",
            Self::Half => "half",
            Self::Dot => "dot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbandRing {
    pub r: f64,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub id: IndividualId,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub shape: NodeShape,
    pub shading: Shading,
    pub label_top: String,
    pub label_bottom_lines: Vec<String>,
    pub proband_ring: Option<ProbandRing>,
    pub stroke: Stroke,
    pub deceased: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleDescriptor {
    pub partnership: PartnershipId,
    /// One segment, or two parallel segments for a consanguineous union.
    pub segments: Vec<Segment>,
    pub consanguinity: bool,
    /// Short slash across the midpoint of an ended union.
    pub ended_slash: Option<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescentDescriptor {
    pub child: IndividualId,
    pub segments: Vec<Segment>,
    pub dashed: bool,
}

/// A pregnancy symbol with its descent from the parents.
///
/// Losses (SAB, TOP, ECT, SB) are triangles; ongoing or live pregnancies are diamonds marked
/// with a "P".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyDescriptor {
    pub id: PregnancyId,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub shape: NodeShape,
    pub filled: bool,
    pub label_lines: Vec<String>,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub nodes: Vec<NodeDescriptor>,
    pub couples: Vec<CoupleDescriptor>,
    pub descents: Vec<DescentDescriptor>,
    pub pregnancies: Vec<PregnancyDescriptor>,
    pub legend: Vec<LegendEntry>,
    pub bounds: Bounds,
}

/// SVG `viewBox` rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// The bounds grown by `margin` on every side.
    pub fn around(bounds: &Bounds, margin: f64) -> Self {
        Self {
            x: bounds.min_x - margin,
            y: bounds.min_y - margin,
            width: (bounds.width() + 2.0 * margin).max(1.0),
            height: (bounds.height() + 2.0 * margin).max(1.0),
        }
    }
}
