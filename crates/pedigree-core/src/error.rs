use crate::ids::IndividualId;

pub type Result<T> = std::result::Result<T, StructuralError>;

/// A rejected graph mutation.
///
/// Whenever one of these is returned, the graph is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("relationship would create a cycle: {}", join_ids(path))]
    Cycle { path: Vec<IndividualId> },

    #[error("{id} cannot be linked to themselves")]
    SelfReference { id: IndividualId },

    #[error("{parent} cannot be recorded as both father and mother")]
    DuplicateParent { parent: IndividualId },

    #[error("recorded sex of {id} conflicts with the parent slot they would take")]
    ParentSexConflict { id: IndividualId },

    #[error("{a} and {b} already have a current partnership")]
    DuplicateActiveUnion { a: IndividualId, b: IndividualId },

    #[error("unknown reference: {id}")]
    DanglingReference { id: String },

    #[error("{child} already has a recorded parent")]
    AlreadyHasParents { child: IndividualId },

    #[error("{id} has no recorded parents")]
    MissingParents { id: IndividualId },

    #[error(
        "{id} is still referenced by {partnerships} partnership(s), {children} child link(s) and {pregnancies} pregnancy record(s)"
    )]
    NotRemovable {
        id: IndividualId,
        partnerships: usize,
        children: usize,
        pregnancies: usize,
    },

    #[error("duplicate id in snapshot: {id}")]
    DuplicateId { id: String },

    #[error("removal plan for {id} was prepared against revision {planned}, graph is at {current}")]
    StaleRemovalPlan {
        id: IndividualId,
        planned: u64,
        current: u64,
    },
}

/// Discriminant of a [`StructuralError`], convenient for matching in UI code and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralErrorKind {
    Cycle,
    SelfReference,
    DuplicateParent,
    ParentSexConflict,
    DuplicateActiveUnion,
    DanglingReference,
    AlreadyHasParents,
    MissingParents,
    NotRemovable,
    DuplicateId,
    StaleRemovalPlan,
}

impl StructuralError {
    pub fn kind(&self) -> StructuralErrorKind {
        match self {
            Self::Cycle { .. } => StructuralErrorKind::Cycle,
            Self::SelfReference { .. } => StructuralErrorKind::SelfReference,
            Self::DuplicateParent { .. } => StructuralErrorKind::DuplicateParent,
            Self::ParentSexConflict { .. } => StructuralErrorKind::ParentSexConflict,
            Self::DuplicateActiveUnion { .. } => StructuralErrorKind::DuplicateActiveUnion,
            Self::DanglingReference { .. } => StructuralErrorKind::DanglingReference,
            Self::AlreadyHasParents { .. } => StructuralErrorKind::AlreadyHasParents,
            Self::MissingParents { .. } => StructuralErrorKind::MissingParents,
            Self::NotRemovable { .. } => StructuralErrorKind::NotRemovable,
            Self::DuplicateId { .. } => StructuralErrorKind::DuplicateId,
            Self::StaleRemovalPlan { .. } => StructuralErrorKind::StaleRemovalPlan,
        }
    }

    pub(crate) fn dangling(id: &IndividualId) -> Self {
        Self::DanglingReference {
            id: id.to_string(),
        }
    }
}

fn join_ids(path: &[IndividualId]) -> String {
    path.iter()
        .map(IndividualId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
