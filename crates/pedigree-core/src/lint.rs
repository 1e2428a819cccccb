//! Diagram-convention checks over an already valid graph.
//!
//! Structural invariants are enforced by the graph itself; lint only reports clinical
//! notation issues (missing death info, undocumented diagnoses, …).

use crate::graph::PedigreeGraph;
use crate::ids::IndividualId;
use crate::model::VitalStatus;
use rustc_hash::FxHashSet as HashSet;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Error,
    Warning,
    Suggestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LintCode {
    DeadInfoMissing,
    DeadNotePrefix,
    AffectedWithoutDx,
    MultipleProbands,
    ConsanguinityWithoutSharedAncestor,
    /// Pregnancy without a recorded outcome.
    PregOutcomeInvalid,
    /// Pregnancy loss with neither karyotype nor affected status.
    PregNoteSuggest,
    /// Assisted-reproduction record not attached to any pregnancy.
    ArtNoPreg,
}

impl LintCode {
    pub fn level(self) -> LintLevel {
        match self {
            Self::MultipleProbands | Self::PregOutcomeInvalid => LintLevel::Error,
            Self::DeadInfoMissing | Self::AffectedWithoutDx | Self::ArtNoPreg => {
                LintLevel::Warning
            }
            Self::DeadNotePrefix
            | Self::ConsanguinityWithoutSharedAncestor
            | Self::PregNoteSuggest => LintLevel::Suggestion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub code: LintCode,
    pub level: LintLevel,
    /// Record the finding is about (individual, partnership, pregnancy or ART id).
    pub subject: String,
    pub message: String,
    /// Replacement text when the fix is mechanical.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LintReport {
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn at_level(&self, level: LintLevel) -> impl Iterator<Item = &LintFinding> {
        self.findings.iter().filter(move |f| f.level == level)
    }

    pub fn has_errors(&self) -> bool {
        self.at_level(LintLevel::Error).next().is_some()
    }

    fn push(&mut self, code: LintCode, subject: &str, message: String, fix: Option<String>) {
        self.findings.push(LintFinding {
            code,
            level: code.level(),
            subject: subject.to_string(),
            message,
            fix,
        });
    }
}

pub fn lint(graph: &PedigreeGraph) -> LintReport {
    let mut report = LintReport::default();

    for ind in graph.individuals() {
        let id = ind.id.as_str();
        if let VitalStatus::Deceased { year, note } = &ind.vital_status {
            let note = note.as_deref().map(str::trim).unwrap_or_default();
            if year.is_none() && note.is_empty() {
                report.push(
                    LintCode::DeadInfoMissing,
                    id,
                    format!("{id} is deceased without a year or note (use \"d. 2007\" or \"d. 60s\")"),
                    None,
                );
            } else if !note.is_empty() && !note.to_lowercase().starts_with("d.") {
                report.push(
                    LintCode::DeadNotePrefix,
                    id,
                    format!("death note of {id} should start with \"d.\""),
                    Some(format!("d. {note}")),
                );
            }
        }
        if ind.affected.value && ind.affected.dx.is_empty() {
            report.push(
                LintCode::AffectedWithoutDx,
                id,
                format!("{id} is marked affected without a diagnosis"),
                None,
            );
        }
    }

    let probands: Vec<&str> = graph
        .individuals()
        .filter(|i| i.is_proband)
        .map(|i| i.id.as_str())
        .collect();
    if probands.len() > 1 {
        report.push(
            LintCode::MultipleProbands,
            probands[0],
            format!("more than one proband: {}", probands.join(", ")),
            None,
        );
    }

    for union in graph.partnerships().filter(|u| u.consanguinity) {
        if !share_ancestor(graph, &union.partner_a, &union.partner_b) {
            report.push(
                LintCode::ConsanguinityWithoutSharedAncestor,
                union.id.as_str(),
                format!(
                    "{} and {} are marked consanguineous but share no recorded ancestor",
                    union.partner_a, union.partner_b
                ),
                None,
            );
        }
    }

    for pregnancy in graph.pregnancies() {
        let id = pregnancy.id.as_str();
        match pregnancy.outcome {
            None => report.push(
                LintCode::PregOutcomeInvalid,
                id,
                format!("pregnancy {id} has no outcome (SAB, TOP, ECT, SB or Live)"),
                None,
            ),
            Some(outcome) if !outcome.is_live() => {
                let karyotype = pregnancy.karyotype.as_deref().map(str::trim).unwrap_or_default();
                if karyotype.is_empty() && !pregnancy.affected {
                    report.push(
                        LintCode::PregNoteSuggest,
                        id,
                        format!(
                            "pregnancy {id} ({}) could record a karyotype or affected status",
                            outcome.code()
                        ),
                        None,
                    );
                }
            }
            Some(_) => {}
        }
    }

    for record in graph.art().filter(|r| r.related_to.is_none()) {
        let id = record.id.as_str();
        report.push(
            LintCode::ArtNoPreg,
            id,
            format!("assisted reproduction record {id} is not attached to a pregnancy"),
            None,
        );
    }

    tracing::trace!(findings = report.findings.len(), "linted pedigree");
    report
}

fn share_ancestor(graph: &PedigreeGraph, a: &IndividualId, b: &IndividualId) -> bool {
    let mut lineage_a: HashSet<IndividualId> = graph.ancestors_of(a.as_str()).into_iter().collect();
    lineage_a.insert(a.clone());
    if lineage_a.contains(b) {
        return true;
    }
    graph
        .ancestors_of(b.as_str())
        .iter()
        .any(|anc| lineage_a.contains(anc))
}
