use pedigree_core::{IndividualId, PartnershipId, PregnancyId};
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn empty() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: IndividualId,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub generation: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleLine {
    pub partnership: PartnershipId,
    pub a: IndividualId,
    pub b: IndividualId,
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    /// Descent anchor for the union's children.
    pub mid_x: f64,
    pub mid_y: f64,
    pub consanguinity: bool,
    pub ended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildLineKind {
    /// Descends from the midpoint between two recorded parents.
    Direct,
    /// Only one parent is recorded; descends from that parent.
    Stub,
}

/// Descent from a parent anchor to a child.
///
/// `(x1, y1)` is the anchor, `(x2, y2)` the child's top edge, and `bar_y` the sibship bar level
/// where the horizontal run happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildLine {
    pub child: IndividualId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub bar_y: f64,
    #[serde(rename = "type")]
    pub kind: ChildLineKind,
    pub dashed: bool,
}

impl ChildLine {
    /// Drop, optional horizontal run and final stub, as `(x1, y1, x2, y2)` segments.
    pub fn segments(&self) -> Vec<(f64, f64, f64, f64)> {
        let mut out = vec![(self.x1, self.y1, self.x1, self.bar_y)];
        if self.x1 != self.x2 {
            out.push((self.x1, self.bar_y, self.x2, self.bar_y));
        }
        out.push((self.x2, self.bar_y, self.x2, self.y2));
        out
    }
}

/// Where a pregnancy's descent leaves its parents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescentAnchor {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: ChildLineKind,
}

/// A pregnancy symbol, one row below its recorded parents and right of their children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyNode {
    pub id: PregnancyId,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub generation: usize,
    /// `None` when no parent is recorded.
    pub anchor: Option<DescentAnchor>,
    pub bar_y: f64,
}

impl PregnancyNode {
    /// Same drop, run and stub as [`ChildLine::segments`], ending at the symbol's apex.
    pub fn segments(&self) -> Vec<(f64, f64, f64, f64)> {
        let Some(anchor) = self.anchor else {
            return Vec::new();
        };
        let mut out = vec![(anchor.x, anchor.y, anchor.x, self.bar_y)];
        if anchor.x != self.x {
            out.push((anchor.x, self.bar_y, self.x, self.bar_y));
        }
        out.push((self.x, self.bar_y, self.x, self.y - self.r));
        out
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedigreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub couple_lines: Vec<CoupleLine>,
    pub child_lines: Vec<ChildLine>,
    pub pregnancies: Vec<PregnancyNode>,
    pub bounds: Bounds,
    #[serde(skip)]
    pub(crate) index: HashMap<IndividualId, usize>,
}

impl PedigreeLayout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.index.get(id).and_then(|&ix| self.nodes.get(ix))
    }

    pub fn pregnancy(&self, id: &str) -> Option<&PregnancyNode> {
        self.pregnancies.iter().find(|p| p.id.as_str() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.pregnancies.is_empty()
    }
}
