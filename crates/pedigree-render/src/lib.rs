#![forbid(unsafe_code)]

//! NSGC-style render model and SVG output for laid-out pedigrees.
//!
//! The render model is plain data derived from the graph and the layout. UI state such as the
//! current selection is passed in explicitly.

pub mod describe;
pub mod legend;
pub mod model;
pub mod scene;
pub mod svg;

pub use describe::{describe_individual, describe_pregnancy, display_name};
pub use legend::{LegendEntry, LegendKey, LegendLabels, LegendUsage, build_legend};
pub use model::{
    CoupleDescriptor, DescentDescriptor, NodeDescriptor, NodeShape, PregnancyDescriptor,
    ProbandRing, RenderModel, Segment, Shading, Stroke, ViewBox,
};
pub use scene::build_render_model;
pub use svg::{SvgOptions, render_svg};

use chrono::Datelike;
use pedigree_core::PedigreeConfig;

/// How names are shown on the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivacyMode {
    /// Stored initials, or initials derived from the display name.
    #[default]
    Initials,
    Full,
}

impl PrivacyMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "initials" => Some(Self::Initials),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub privacy: PrivacyMode,
    pub age_prefix: String,
    /// Year used to derive ages from birth years.
    pub reference_year: i32,
    pub legend: LegendLabels,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            privacy: PrivacyMode::default(),
            age_prefix: "edad".to_string(),
            reference_year: chrono::Local::now().year(),
            legend: LegendLabels::default(),
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &PedigreeConfig) -> Self {
        let d = Self::default();
        Self {
            privacy: config
                .get_str("labels.privacy")
                .and_then(PrivacyMode::parse)
                .unwrap_or(d.privacy),
            age_prefix: config
                .get_str("labels.agePrefix")
                .map(str::to_string)
                .unwrap_or(d.age_prefix),
            reference_year: config
                .get_f64("labels.referenceYear")
                .map(|y| y as i32)
                .unwrap_or(d.reference_year),
            legend: LegendLabels::from_config(config),
        }
    }

    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }
}
