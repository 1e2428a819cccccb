#![forbid(unsafe_code)]

//! Interactive pedigree editing.
//!
//! [`Editor`] wraps a [`PedigreeGraph`] with atomic compound operations and undo history;
//! [`Viewport`] maps pointer input onto the laid-out diagram; [`export`] writes the current
//! view as SVG or PNG. Interaction state lives in [`UiState`] and is passed in explicitly.

pub mod drop;
pub mod editor;
pub mod export;
pub mod focus;
pub mod policy;
#[cfg(feature = "raster")]
pub mod raster;
pub mod ui;
pub mod viewport;

pub use drop::{DropOutcome, DropTarget, PayloadError, TOOL_MIME, ToolPayload};
pub use editor::{
    ChildOptions, DEFAULT_HISTORY_LIMIT, Editor, NewParents, NewPartner, ParentsOptions,
    RemovalPlan,
};
pub use focus::{focus_graph, focus_members, focus_root};
pub use policy::{ParentRole, ParentRolePolicy, SexMatchPolicy, StrictSexPolicy, sex_conflict};
#[cfg(feature = "raster")]
pub use raster::{RasterError, RasterOptions};
pub use ui::{DEFAULT_FOCUS_DEPTH, UiState, ViewMode};
pub use viewport::{Viewport, ViewportKey, ViewportOptions};

pub use pedigree_core::{
    ArtId, ArtRecord, ArtRole, IndividualAttrs, IndividualId, IndividualUpdate, PartnershipId,
    PedigreeConfig, PedigreeGraph, PedigreeSnapshot, Pregnancy, PregnancyId, PregnancyOutcome, Sex,
    StructuralError, StructuralErrorKind,
};
pub use pedigree_layout::{LayoutOptions, PedigreeLayout};
pub use pedigree_render::{RenderModel, RenderOptions, SvgOptions};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[cfg(feature = "raster")]
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
