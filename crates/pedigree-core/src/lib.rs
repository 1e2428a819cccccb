#![forbid(unsafe_code)]

//! Relationship graph for clinical pedigrees.
//!
//! The graph owns individuals, unions (partnerships) and parent-child links, plus pregnancy
//! and assisted-reproduction records that hang off the parents. Every mutation is
//! validated before anything is written, so a rejected call leaves the graph unchanged and
//! returns a typed [`StructuralError`].

pub mod config;
pub mod error;
pub mod graph;
pub mod ids;
pub mod lint;
pub mod model;
pub mod snapshot;
pub mod update;

pub use config::PedigreeConfig;
pub use error::{Result, StructuralError, StructuralErrorKind};
pub use graph::{
    IdStrategy, Parents, PedigreeGraph, RemovalImpact, RemoveMode, Sibling, SiblingKind,
};
pub use ids::{ArtId, IndividualId, PartnershipId, PregnancyId};
pub use lint::{LintCode, LintFinding, LintLevel, LintReport, lint};
pub use model::{
    Affected, ArtRecord, ArtRole, Carrier, CarrierEvidence, CarrierType, Evaluation, Individual,
    IndividualAttrs, ParentChildLink, Partnership, PartnershipAttrs, Pregnancy, PregnancyOutcome,
    Sex, UnionStatus, VitalStatus,
};
pub use snapshot::PedigreeSnapshot;
pub use update::IndividualUpdate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
