//! Symbol and label rules for a single individual.

use crate::model::{NodeDescriptor, NodeShape, PregnancyDescriptor, ProbandRing, Segment, Shading, Stroke};
use crate::{PrivacyMode, RenderOptions};
use pedigree_core::{CarrierType, Individual, Pregnancy, Sex, VitalStatus};
use pedigree_layout::{LayoutNode, PregnancyNode};

const PROBAND_RING_GAP: f64 = 4.0;
const STROKE: &str = "#0f172a";
const STROKE_SELECTED: &str = "#2563eb";

pub fn shape_for(sex: Sex) -> NodeShape {
    match sex {
        Sex::M => NodeShape::Square,
        Sex::F => NodeShape::Circle,
        Sex::U => NodeShape::Diamond,
    }
}

/// Affected status beats carrier status.
pub fn shading_for(ind: &Individual) -> Shading {
    if ind.affected.value {
        return Shading::Filled;
    }
    match ind.carrier.kind {
        CarrierType::AR => Shading::Half,
        CarrierType::X => Shading::Dot,
        CarrierType::None => Shading::None,
    }
}

/// The name shown on the diagram under the given privacy mode. Falls back to the id.
pub fn display_name(ind: &Individual, privacy: PrivacyMode) -> String {
    let name = ind.display_name.trim();
    match privacy {
        PrivacyMode::Full if !name.is_empty() => name.to_string(),
        PrivacyMode::Full => ind.id.to_string(),
        PrivacyMode::Initials => {
            if let Some(initials) = ind.initials.as_deref().map(str::trim) {
                if !initials.is_empty() {
                    return initials.to_string();
                }
            }
            let derived: String = name
                .split_whitespace()
                .filter_map(|word| word.chars().next())
                .flat_map(char::to_uppercase)
                .collect();
            if derived.is_empty() {
                ind.id.to_string()
            } else {
                derived
            }
        }
    }
}

fn age_line(ind: &Individual, options: &RenderOptions) -> Option<String> {
    let age = match (ind.age_years, ind.birth_year) {
        (Some(age), _) => i64::from(age),
        (None, Some(born)) if born <= options.reference_year => {
            i64::from(options.reference_year - born)
        }
        _ => return None,
    };
    Some(format!("{} {age}", options.age_prefix))
}

fn deceased_line(status: &VitalStatus) -> Option<String> {
    let VitalStatus::Deceased { year, note } = status else {
        return None;
    };
    if let Some(year) = year {
        return Some(format!("d. {year}"));
    }
    note.as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Outcome code for losses, gestational age, then karyotype.
pub fn describe_pregnancy(pregnancy: &Pregnancy, node: &PregnancyNode) -> PregnancyDescriptor {
    let mut label_lines = Vec::new();
    if let Some(outcome) = pregnancy.outcome.filter(|o| !o.is_live()) {
        label_lines.push(outcome.code().to_string());
    }
    if let Some(weeks) = pregnancy.gestational_age_wks {
        label_lines.push(format!("{weeks} sem"));
    }
    if let Some(karyotype) = pregnancy
        .karyotype
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
    {
        label_lines.push(karyotype.to_string());
    }

    PregnancyDescriptor {
        id: pregnancy.id.clone(),
        x: node.x,
        y: node.y,
        r: node.r,
        shape: if pregnancy.is_loss() {
            NodeShape::Triangle
        } else {
            NodeShape::Diamond
        },
        filled: pregnancy.affected,
        label_lines,
        segments: node
            .segments()
            .into_iter()
            .map(|(x1, y1, x2, y2)| Segment::new(x1, y1, x2, y2))
            .collect(),
    }
}

pub fn describe_individual(
    ind: &Individual,
    node: &LayoutNode,
    is_proband: bool,
    is_selected: bool,
    options: &RenderOptions,
) -> NodeDescriptor {
    let name = display_name(ind, options.privacy);
    let role = ind.role.trim();
    let label_top = if role.is_empty() {
        name
    } else {
        format!("{name} · {role}")
    };

    let mut label_bottom_lines = Vec::new();
    label_bottom_lines.extend(age_line(ind, options));
    label_bottom_lines.extend(deceased_line(&ind.vital_status));
    if !ind.affected.dx.is_empty() {
        label_bottom_lines.push(ind.affected.dx.join(", "));
    }

    let stroke = if is_selected {
        Stroke {
            color: STROKE_SELECTED.to_string(),
            width: 3.0,
        }
    } else {
        Stroke {
            color: STROKE.to_string(),
            width: 1.0,
        }
    };

    NodeDescriptor {
        id: ind.id.clone(),
        x: node.x,
        y: node.y,
        r: node.r,
        shape: shape_for(ind.sex),
        shading: shading_for(ind),
        label_top,
        label_bottom_lines,
        proband_ring: is_proband.then_some(ProbandRing {
            r: node.r + PROBAND_RING_GAP,
            dashed: true,
        }),
        stroke,
        deceased: ind.vital_status.is_deceased(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedigree_core::{Carrier, IndividualId};

    fn individual(json: &str) -> Individual {
        serde_json::from_str(json).unwrap()
    }

    fn node() -> LayoutNode {
        LayoutNode {
            id: IndividualId::new("I1"),
            x: 10.0,
            y: 20.0,
            r: 24.0,
            generation: 0,
        }
    }

    fn options() -> RenderOptions {
        RenderOptions::default().with_reference_year(2024)
    }

    #[test]
    fn affected_beats_carrier() {
        let mut ind = individual(r#"{"id":"I1","sex":"F","carrier":{"type":"AR"}}"#);
        assert_eq!(shading_for(&ind), Shading::Half);
        ind.affected.value = true;
        assert_eq!(shading_for(&ind), Shading::Filled);
        ind.affected.value = false;
        ind.carrier = Carrier {
            kind: CarrierType::X,
            ..Default::default()
        };
        assert_eq!(shading_for(&ind), Shading::Dot);
    }

    #[test]
    fn initials_are_derived_from_the_name() {
        let ind = individual(r#"{"id":"I7","displayName":"maría  López"}"#);
        assert_eq!(display_name(&ind, PrivacyMode::Initials), "ML");
        assert_eq!(display_name(&ind, PrivacyMode::Full), "maría  López");

        let anon = individual(r#"{"id":"I7"}"#);
        assert_eq!(display_name(&anon, PrivacyMode::Initials), "I7");
        assert_eq!(display_name(&anon, PrivacyMode::Full), "I7");
    }

    #[test]
    fn bottom_lines_follow_age_death_dx_order() {
        let ind = individual(
            r#"{
                "id":"I1","sex":"M","displayName":"Juan Pérez","role":"Proband",
                "birthYear":1950,
                "vitalStatus":{"status":"deceased","year":2007},
                "affected":{"value":true,"dx":["Marfan","Aneurisma"]}
            }"#,
        );
        let d = describe_individual(&ind, &node(), true, false, &options());
        assert_eq!(d.label_top, "JP · Proband");
        assert_eq!(
            d.label_bottom_lines,
            vec!["edad 74", "d. 2007", "Marfan, Aneurisma"]
        );
        assert_eq!(d.shape, NodeShape::Square);
        assert_eq!(d.proband_ring.map(|r| r.r), Some(28.0));
        assert!(d.deceased);
    }

    #[test]
    fn pregnancy_loss_is_a_labelled_triangle() {
        let pregnancy: Pregnancy = serde_json::from_str(
            r#"{"id":"P1","mother":"I2","gestationalAgeWks":12,"outcome":"TOP","karyotype":"47,XY,+18","affected":true}"#,
        )
        .unwrap();
        let node = PregnancyNode {
            id: pregnancy.id.clone(),
            x: 70.0,
            y: 120.0,
            r: 24.0,
            generation: 1,
            anchor: None,
            bar_y: 86.0,
        };
        let d = describe_pregnancy(&pregnancy, &node);
        assert_eq!(d.shape, NodeShape::Triangle);
        assert!(d.filled);
        assert_eq!(d.label_lines, vec!["TOP", "12 sem", "47,XY,+18"]);
        assert!(d.segments.is_empty());

        let ongoing = Pregnancy::new(None, None);
        assert_eq!(describe_pregnancy(&ongoing, &node).shape, NodeShape::Diamond);
    }

    #[test]
    fn stored_age_wins_over_birth_year() {
        let ind = individual(r#"{"id":"I1","ageYears":3,"birthYear":1990}"#);
        let d = describe_individual(&ind, &node(), false, true, &options());
        assert_eq!(d.label_bottom_lines, vec!["edad 3"]);
        assert_eq!(d.shape, NodeShape::Diamond);
        assert_eq!(d.stroke.color, STROKE_SELECTED);
        assert_eq!(d.stroke.width, 3.0);
        assert!(d.proband_ring.is_none());
    }
}
