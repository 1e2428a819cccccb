use pedigree_core::{IndividualId, PedigreeGraph};
use pedigree_layout::ManualPins;

pub const DEFAULT_FOCUS_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Full,
    /// Proband, their ancestors and the ancestors' children only.
    Focus,
}

/// Interaction state that never enters the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub selected: Option<IndividualId>,
    pub view_mode: ViewMode,
    pub pins: ManualPins,
    pub focus_depth: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected: None,
            view_mode: ViewMode::default(),
            pins: ManualPins::new(),
            focus_depth: DEFAULT_FOCUS_DEPTH,
        }
    }
}

impl UiState {
    pub fn select(&mut self, id: Option<IndividualId>) {
        self.selected = id;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_ref().map(IndividualId::as_str)
    }

    /// Drops selection and pins that refer to individuals no longer in `graph`.
    pub fn prune(&mut self, graph: &PedigreeGraph) {
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !graph.contains(id.as_str()))
        {
            self.selected = None;
        }
        self.pins.retain_existing(|id| graph.contains(id));
    }
}
