use crate::models::{Theme, TodoItem};
use crate::view::{build_rows, EditDraft, TodoRow, ViewState};

pub const EVENT_STATE_UPDATED: &str = "state_updated";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatePayload {
    pub rows: Vec<TodoRow>,
    pub theme: Theme,
    pub editing: Option<EditDraft>,
}

impl StatePayload {
    pub fn new(todos: &[TodoItem], view: &ViewState) -> Self {
        Self {
            rows: build_rows(todos, view),
            theme: view.theme,
            editing: view.editing.clone(),
        }
    }
}
