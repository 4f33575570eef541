use serde::Serialize;

use crate::models::{Theme, TodoId, TodoItem};

/// Session-local UI state. Nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub theme: Theme,
    pub editing: Option<EditDraft>,
}

impl ViewState {
    pub fn is_editing(&self, id: TodoId) -> bool {
        self.editing.as_ref().is_some_and(|draft| draft.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditDraft {
    pub id: TodoId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoRow {
    pub item: TodoItem,
    pub editing: bool,
    // Completed rows hide their timestamp and cannot be edited.
    pub show_created_at: bool,
    pub can_edit: bool,
}

/// Newest first.
pub fn build_rows(todos: &[TodoItem], view: &ViewState) -> Vec<TodoRow> {
    todos
        .iter()
        .rev()
        .map(|item| TodoRow {
            editing: view.is_editing(item.id),
            show_created_at: !item.checked,
            can_edit: !item.checked,
            item: item.clone(),
        })
        .collect()
}
