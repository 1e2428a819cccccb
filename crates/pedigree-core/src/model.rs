//! Plain data records owned by [`PedigreeGraph`](crate::PedigreeGraph).
//!
//! Records never store back-references; relations are answered by the graph's indices.

use crate::ids::{ArtId, IndividualId, PartnershipId, PregnancyId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
    #[default]
    U,
}

impl Sex {
    /// The sex a new partner defaults to. Unspecified stays unspecified.
    pub fn opposite(self) -> Self {
        match self {
            Self::M => Self::F,
            Self::F => Self::M,
            Self::U => Self::U,
        }
    }

    pub fn is_definite(self) -> bool {
        !matches!(self, Self::U)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VitalStatus {
    #[default]
    Alive,
    Deceased {
        #[serde(default)]
        year: Option<i32>,
        #[serde(default)]
        note: Option<String>,
    },
}

impl VitalStatus {
    pub fn is_deceased(&self) -> bool {
        matches!(self, Self::Deceased { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Affected {
    #[serde(default)]
    pub value: bool,
    #[serde(default)]
    pub dx: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CarrierType {
    #[default]
    #[serde(rename = "none")]
    None,
    AR,
    X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierEvidence {
    Lab,
    Family,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Carrier {
    #[serde(rename = "type", default)]
    pub kind: CarrierType,
    #[serde(default)]
    pub evidence: CarrierEvidence,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    pub id: IndividualId,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub age_years: Option<u32>,
    #[serde(default)]
    pub vital_status: VitalStatus,
    #[serde(default)]
    pub affected: Affected,
    #[serde(default)]
    pub carrier: Carrier,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub is_proband: bool,
    #[serde(default)]
    pub notes: String,
}

impl Individual {
    pub(crate) fn from_attrs(id: IndividualId, attrs: IndividualAttrs) -> Self {
        Self {
            id,
            sex: attrs.sex,
            display_name: attrs.display_name.unwrap_or_default(),
            initials: attrs.initials,
            role: attrs.role.unwrap_or_default(),
            birth_year: attrs.birth_year,
            age_years: attrs.age_years,
            vital_status: attrs.vital_status.unwrap_or_default(),
            affected: attrs.affected.unwrap_or_default(),
            carrier: attrs.carrier.unwrap_or_default(),
            evaluations: attrs.evaluations,
            is_proband: attrs.is_proband,
            notes: attrs.notes.unwrap_or_default(),
        }
    }
}

/// Attributes for [`PedigreeGraph::add_individual`](crate::PedigreeGraph::add_individual).
///
/// Every field is optional; missing ones take the record defaults (unspecified sex, alive,
/// unaffected, non-carrier).
#[derive(Debug, Clone, Default)]
pub struct IndividualAttrs {
    pub id: Option<IndividualId>,
    pub sex: Sex,
    pub display_name: Option<String>,
    pub initials: Option<String>,
    pub role: Option<String>,
    pub birth_year: Option<i32>,
    pub age_years: Option<u32>,
    pub vital_status: Option<VitalStatus>,
    pub affected: Option<Affected>,
    pub carrier: Option<Carrier>,
    pub evaluations: Vec<Evaluation>,
    pub is_proband: bool,
    pub notes: Option<String>,
}

impl IndividualAttrs {
    pub fn with_sex(sex: Sex) -> Self {
        Self {
            sex,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn proband(mut self) -> Self {
        self.is_proband = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnionStatus {
    #[default]
    Current,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partnership {
    pub id: PartnershipId,
    pub partner_a: IndividualId,
    pub partner_b: IndividualId,
    #[serde(default)]
    pub status: UnionStatus,
    #[serde(default)]
    pub consanguinity: bool,
}

impl Partnership {
    pub fn involves(&self, id: &IndividualId) -> bool {
        &self.partner_a == id || &self.partner_b == id
    }

    /// The other member of the union, if `id` is one of the partners.
    pub fn other(&self, id: &IndividualId) -> Option<&IndividualId> {
        if &self.partner_a == id {
            Some(&self.partner_b)
        } else if &self.partner_b == id {
            Some(&self.partner_a)
        } else {
            None
        }
    }

    /// True when both unions join the same unordered pair.
    pub fn same_pair(&self, a: &IndividualId, b: &IndividualId) -> bool {
        (&self.partner_a == a && &self.partner_b == b)
            || (&self.partner_a == b && &self.partner_b == a)
    }

    pub fn is_current(&self) -> bool {
        self.status == UnionStatus::Current
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PartnershipAttrs {
    pub status: UnionStatus,
    pub consanguinity: bool,
}

fn default_biological() -> bool {
    true
}

/// The single parentage record of a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentChildLink {
    pub child: IndividualId,
    #[serde(default)]
    pub father: Option<IndividualId>,
    #[serde(default)]
    pub mother: Option<IndividualId>,
    #[serde(default = "default_biological")]
    pub biological: bool,
}

impl ParentChildLink {
    pub fn new(
        child: IndividualId,
        father: Option<IndividualId>,
        mother: Option<IndividualId>,
    ) -> Self {
        Self {
            child,
            father,
            mother,
            biological: true,
        }
    }

    pub fn non_biological(mut self) -> Self {
        self.biological = false;
        self
    }

    pub fn parents(&self) -> impl Iterator<Item = &IndividualId> {
        self.father.iter().chain(self.mother.iter())
    }

    pub fn has_parent(&self) -> bool {
        self.father.is_some() || self.mother.is_some()
    }

    pub fn references_parent(&self, id: &IndividualId) -> bool {
        self.father.as_ref() == Some(id) || self.mother.as_ref() == Some(id)
    }
}

/// How a recorded pregnancy ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PregnancyOutcome {
    /// Spontaneous abortion.
    SAB,
    /// Termination of pregnancy.
    TOP,
    /// Ectopic pregnancy.
    ECT,
    /// Stillbirth.
    SB,
    Live,
}

impl PregnancyOutcome {
    pub fn is_live(self) -> bool {
        self == Self::Live
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::SAB => "SAB",
            Self::TOP => "TOP",
            Self::ECT => "ECT",
            Self::SB => "SB",
            Self::Live => "Live",
        }
    }
}

/// A pregnancy that has no individual of its own: ongoing, lost or terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pregnancy {
    #[serde(default = "PregnancyId::empty")]
    pub id: PregnancyId,
    #[serde(default)]
    pub mother: Option<IndividualId>,
    #[serde(default)]
    pub father: Option<IndividualId>,
    #[serde(default)]
    pub gestational_age_wks: Option<u32>,
    #[serde(default)]
    pub outcome: Option<PregnancyOutcome>,
    #[serde(default)]
    pub karyotype: Option<String>,
    #[serde(default)]
    pub affected: bool,
}

impl Pregnancy {
    /// A record with no id yet; [`PedigreeGraph::upsert_pregnancy`] mints one.
    ///
    /// [`PedigreeGraph::upsert_pregnancy`]: crate::PedigreeGraph::upsert_pregnancy
    pub fn new(mother: Option<IndividualId>, father: Option<IndividualId>) -> Self {
        Self {
            id: PregnancyId::empty(),
            mother,
            father,
            gestational_age_wks: None,
            outcome: None,
            karyotype: None,
            affected: false,
        }
    }

    pub fn with_outcome(mut self, outcome: PregnancyOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn parents(&self) -> impl Iterator<Item = &IndividualId> {
        self.father.iter().chain(self.mother.iter())
    }

    pub fn references_parent(&self, id: &IndividualId) -> bool {
        self.father.as_ref() == Some(id) || self.mother.as_ref() == Some(id)
    }

    /// Ended without a live birth.
    pub fn is_loss(&self) -> bool {
        self.outcome.is_some_and(|o| !o.is_live())
    }
}

/// Role of a third party in assisted reproduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArtRole {
    /// Gamete donor.
    #[default]
    D,
    /// Gestational surrogate.
    S,
}

/// Assisted reproduction record, attached to a pregnancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtRecord {
    #[serde(default = "ArtId::empty")]
    pub id: ArtId,
    #[serde(default)]
    pub role: ArtRole,
    #[serde(default)]
    pub related_to: Option<PregnancyId>,
    #[serde(default)]
    pub notes: String,
}

impl ArtRecord {
    pub fn new(role: ArtRole, related_to: Option<PregnancyId>) -> Self {
        Self {
            id: ArtId::empty(),
            role,
            related_to,
            notes: String::new(),
        }
    }
}
