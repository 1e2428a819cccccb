use crate::model::{NodeDescriptor, NodeShape, PregnancyDescriptor, Shading};
use pedigree_core::PedigreeConfig;
use rustc_hash::FxHashSet as HashSet;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendKey {
    Male,
    Female,
    Unspecified,
    Filled,
    Half,
    Dot,
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub key: LegendKey,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendLabels {
    pub male: String,
    pub female: String,
    pub unspecified: String,
    pub filled: String,
    pub half: String,
    pub dot: String,
    pub triangle: String,
}

impl Default for LegendLabels {
    fn default() -> Self {
        Self {
            male: "Masculino".to_string(),
            female: "Femenino".to_string(),
            unspecified: "Sexo no especificado".to_string(),
            filled: "Afectado clínicamente".to_string(),
            half: "Portador AR".to_string(),
            dot: "Portador ligado al X".to_string(),
            triangle: "Embarazo no a término".to_string(),
        }
    }
}

impl LegendLabels {
    pub fn from_config(config: &PedigreeConfig) -> Self {
        let d = Self::default();
        let read = |key: &str, fallback: String| {
            config
                .get_str(key)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or(fallback)
        };
        Self {
            male: read("legend.male", d.male),
            female: read("legend.female", d.female),
            unspecified: read("legend.unspecified", d.unspecified),
            filled: read("legend.filled", d.filled),
            half: read("legend.half", d.half),
            dot: read("legend.dot", d.dot),
            triangle: read("legend.triangle", d.triangle),
        }
    }

    fn label(&self, key: LegendKey) -> &str {
        match key {
            LegendKey::Male => &self.male,
            LegendKey::Female => &self.female,
            LegendKey::Unspecified => &self.unspecified,
            LegendKey::Filled => &self.filled,
            LegendKey::Half => &self.half,
            LegendKey::Dot => &self.dot,
            LegendKey::Triangle => &self.triangle,
        }
    }
}

/// Shading variants and pregnancy-loss symbols present on the diagram.
#[derive(Debug, Clone, Default)]
pub struct LegendUsage {
    shadings: HashSet<Shading>,
    pregnancy_loss: bool,
}

impl LegendUsage {
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a NodeDescriptor>) -> Self {
        let mut usage = Self::default();
        for node in nodes {
            usage.record(node.shading);
        }
        usage
    }

    pub fn record_pregnancies<'a>(
        &mut self,
        pregnancies: impl IntoIterator<Item = &'a PregnancyDescriptor>,
    ) {
        self.pregnancy_loss |= pregnancies
            .into_iter()
            .any(|p| p.shape == NodeShape::Triangle);
    }

    pub fn uses_pregnancy_loss(&self) -> bool {
        self.pregnancy_loss
    }

    pub fn record(&mut self, shading: Shading) {
        if shading != Shading::None {
            self.shadings.insert(shading);
        }
    }

    pub fn uses(&self, shading: Shading) -> bool {
        self.shadings.contains(&shading)
    }
}

/// The three sex symbols always, then one entry per shading in use, then the pregnancy-loss
/// triangle when one is drawn.
pub fn build_legend(usage: &LegendUsage, labels: &LegendLabels) -> Vec<LegendEntry> {
    let mut keys = vec![LegendKey::Male, LegendKey::Female, LegendKey::Unspecified];
    for (shading, key) in [
        (Shading::Filled, LegendKey::Filled),
        (Shading::Half, LegendKey::Half),
        (Shading::Dot, LegendKey::Dot),
    ] {
        if usage.uses(shading) {
            keys.push(key);
        }
    }
    if usage.uses_pregnancy_loss() {
        keys.push(LegendKey::Triangle);
    }
    keys.into_iter()
        .map(|key| LegendEntry {
            key,
            label: labels.label(key).to_string(),
        })
        .collect()
}
