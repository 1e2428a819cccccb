//! Typed edits for a single [`Individual`].
//!
//! Nested records (`affected`, `carrier`, `vital_status`) are edited through dedicated variants
//! instead of merging arbitrary patch objects.

use crate::model::{CarrierEvidence, CarrierType, Evaluation, Individual, Sex, VitalStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndividualUpdate {
    SetSex(Sex),
    SetDisplayName(String),
    SetInitials(Option<String>),
    SetRole(String),
    SetBirthYear(Option<i32>),
    SetAgeYears(Option<u32>),
    SetVitalStatus(VitalStatus),
    SetAffected(bool),
    /// Appends a diagnosis unless the same text is already recorded.
    AddDiagnosis(String),
    /// Removes the diagnosis at the given position; out-of-range indices are ignored.
    RemoveDiagnosis(usize),
    SetDiagnoses(Vec<String>),
    SetCarrierType(CarrierType),
    SetCarrierEvidence(CarrierEvidence),
    AddEvaluation(Evaluation),
    SetEvaluations(Vec<Evaluation>),
    /// Marking an individual as proband clears the flag on everyone else (handled by the graph).
    SetProband(bool),
    SetNotes(String),
}

impl IndividualUpdate {
    /// Applies the edit to a single record. `SetProband` only touches `ind`; the graph is
    /// responsible for clearing other probands.
    pub(crate) fn apply_to(self, ind: &mut Individual) {
        match self {
            Self::SetSex(sex) => ind.sex = sex,
            Self::SetDisplayName(name) => ind.display_name = name,
            Self::SetInitials(initials) => {
                ind.initials = initials.filter(|s| !s.trim().is_empty());
            }
            Self::SetRole(role) => ind.role = role,
            Self::SetBirthYear(year) => ind.birth_year = year,
            Self::SetAgeYears(age) => ind.age_years = age,
            Self::SetVitalStatus(status) => ind.vital_status = status,
            Self::SetAffected(value) => ind.affected.value = value,
            Self::AddDiagnosis(dx) => {
                let dx = dx.trim().to_string();
                if !dx.is_empty() && !ind.affected.dx.iter().any(|d| d == &dx) {
                    ind.affected.dx.push(dx);
                }
            }
            Self::RemoveDiagnosis(ix) => {
                if ix < ind.affected.dx.len() {
                    ind.affected.dx.remove(ix);
                }
            }
            Self::SetDiagnoses(dx) => {
                ind.affected.dx = dx.into_iter().filter(|d| !d.trim().is_empty()).collect();
            }
            Self::SetCarrierType(kind) => ind.carrier.kind = kind,
            Self::SetCarrierEvidence(evidence) => ind.carrier.evidence = evidence,
            Self::AddEvaluation(ev) => ind.evaluations.push(ev),
            Self::SetEvaluations(evs) => ind.evaluations = evs,
            Self::SetProband(value) => ind.is_proband = value,
            Self::SetNotes(notes) => ind.notes = notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IndividualId;
    use crate::model::IndividualAttrs;

    fn blank() -> Individual {
        Individual::from_attrs(IndividualId::new("I1"), IndividualAttrs::default())
    }

    #[test]
    fn add_diagnosis_skips_duplicates_and_blanks() {
        let mut ind = blank();
        IndividualUpdate::AddDiagnosis("Marfan".into()).apply_to(&mut ind);
        IndividualUpdate::AddDiagnosis(" Marfan ".into()).apply_to(&mut ind);
        IndividualUpdate::AddDiagnosis("  ".into()).apply_to(&mut ind);
        assert_eq!(ind.affected.dx, vec!["Marfan".to_string()]);
    }

    #[test]
    fn remove_diagnosis_ignores_out_of_range() {
        let mut ind = blank();
        IndividualUpdate::SetDiagnoses(vec!["a".into(), "b".into()]).apply_to(&mut ind);
        IndividualUpdate::RemoveDiagnosis(5).apply_to(&mut ind);
        IndividualUpdate::RemoveDiagnosis(0).apply_to(&mut ind);
        assert_eq!(ind.affected.dx, vec!["b".to_string()]);
    }

    #[test]
    fn carrier_variants_edit_only_their_field() {
        let mut ind = blank();
        IndividualUpdate::SetCarrierEvidence(CarrierEvidence::Lab).apply_to(&mut ind);
        IndividualUpdate::SetCarrierType(CarrierType::X).apply_to(&mut ind);
        assert_eq!(ind.carrier.kind, CarrierType::X);
        assert_eq!(ind.carrier.evidence, CarrierEvidence::Lab);
    }
}
