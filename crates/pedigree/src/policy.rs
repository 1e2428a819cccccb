//! Which parent slot an acting individual takes when a child is added.

use pedigree_core::{Individual, Sex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRole {
    Father,
    Mother,
}

impl ParentRole {
    pub fn other(self) -> Self {
        match self {
            Self::Father => Self::Mother,
            Self::Mother => Self::Father,
        }
    }
}

/// Decides the acting individual's role for `add_child`. The partner, if any, takes the other
/// slot.
pub trait ParentRolePolicy {
    fn acting_role(&self, acting: &Individual, partner: Option<&Individual>) -> ParentRole;

    /// Called when `individual`'s recorded sex contradicts the slot they are about to take
    /// (a female father, a male mother). Returning `false` rejects the edit.
    fn accepts_conflict(&self, individual: &Individual, slot: ParentRole) -> bool {
        let _ = (individual, slot);
        true
    }
}

/// The first of `acting` (in `role`) and `partner` (in the other slot) whose definite sex
/// contradicts that slot.
pub fn sex_conflict<'a>(
    acting: &'a Individual,
    partner: Option<&'a Individual>,
    role: ParentRole,
) -> Option<(&'a Individual, ParentRole)> {
    let contradicts = |ind: &Individual, slot: ParentRole| {
        matches!(
            (slot, ind.sex),
            (ParentRole::Father, Sex::F) | (ParentRole::Mother, Sex::M)
        )
    };
    std::iter::once((acting, role))
        .chain(partner.map(|p| (p, role.other())))
        .find(|&(ind, slot)| contradicts(ind, slot))
}

/// Acting sex decides when definite; otherwise the partner's definite sex decides; otherwise
/// the acting individual is recorded as the mother.
#[derive(Debug, Clone, Copy, Default)]
pub struct SexMatchPolicy;

impl ParentRolePolicy for SexMatchPolicy {
    fn acting_role(&self, acting: &Individual, partner: Option<&Individual>) -> ParentRole {
        match (acting.sex, partner.map(|p| p.sex)) {
            (Sex::M, _) => ParentRole::Father,
            (Sex::F, _) => ParentRole::Mother,
            (Sex::U, Some(Sex::M)) => ParentRole::Mother,
            (Sex::U, Some(Sex::F)) => ParentRole::Father,
            (Sex::U, _) => ParentRole::Mother,
        }
    }
}

/// Same roles as [`SexMatchPolicy`], but refuses to put anyone in a slot their recorded sex
/// contradicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSexPolicy;

impl ParentRolePolicy for StrictSexPolicy {
    fn acting_role(&self, acting: &Individual, partner: Option<&Individual>) -> ParentRole {
        SexMatchPolicy.acting_role(acting, partner)
    }

    fn accepts_conflict(&self, _individual: &Individual, _slot: ParentRole) -> bool {
        false
    }
}
