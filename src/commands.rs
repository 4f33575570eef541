use crate::clock::Clock;
use crate::events::StatePayload;
use crate::models::{Notice, Theme, TodoId, TodoItem};
use crate::storage::{KeyValueStore, StorageError};
use crate::store::TodoStore;
use crate::view::{EditDraft, ViewState};

pub const MSG_EMPTY_TODO: &str = "cannot add empty todo";
pub const MSG_ADDED: &str = "Todo added successfully";
pub const MSG_UPDATED: &str = "Todo updated successfully";
pub const MSG_COMPLETED: &str = "Todo successfully completed";
pub const MSG_DELETED: &str = "Todo deleted successfully";
pub const MSG_NOT_FOUND: &str = "todo not found";
pub const MSG_COMPLETED_NOT_EDITABLE: &str = "completed todos cannot be edited";
pub const MSG_NOT_EDITING: &str = "no todo is being edited";

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Where commands send their side effects: re-render requests and notices.
pub trait CommandCtx {
    fn emit_state_updated(&self, payload: StatePayload);
    fn show_notice(&self, notice: Notice);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn storage_err<T>(ctx: &impl CommandCtx, error: StorageError) -> CommandResult<T> {
    let message = format!("storage error: {error}");
    log::error!("command: {message}");
    ctx.show_notice(Notice::error(message.clone()));
    err(&message)
}

fn emit<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &TodoStore<S, C>,
    view: &ViewState,
) {
    ctx.emit_state_updated(StatePayload::new(store.todos(), view));
}

pub fn load_state_impl<S: KeyValueStore, C: Clock>(
    store: &TodoStore<S, C>,
    view: &ViewState,
) -> CommandResult<StatePayload> {
    ok(StatePayload::new(store.todos(), view))
}

pub fn add_todo_impl<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &mut TodoStore<S, C>,
    view: &ViewState,
    text: &str,
) -> CommandResult<TodoItem> {
    let text = text.trim();
    if text.is_empty() {
        ctx.show_notice(Notice::error(MSG_EMPTY_TODO));
        return err(MSG_EMPTY_TODO);
    }
    let item = match store.add(text) {
        Ok(item) => item,
        Err(error) => return storage_err(ctx, error),
    };
    log::info!("command: add_todo id={}", item.id);
    emit(ctx, store, view);
    ctx.show_notice(Notice::success(MSG_ADDED));
    ok(item)
}

pub fn begin_edit_impl<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &TodoStore<S, C>,
    view: &mut ViewState,
    id: TodoId,
) -> CommandResult<EditDraft> {
    let item = match store.get(id) {
        Some(item) => item,
        None => return err(MSG_NOT_FOUND),
    };
    if item.checked {
        return err(MSG_COMPLETED_NOT_EDITABLE);
    }
    let draft = EditDraft {
        id,
        text: item.text.clone(),
    };
    view.editing = Some(draft.clone());
    emit(ctx, store, view);
    ok(draft)
}

/// Empty text leaves edit mode untouched and reports `false`.
pub fn save_edit_impl<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &mut TodoStore<S, C>,
    view: &mut ViewState,
    text: &str,
) -> CommandResult<bool> {
    let id = match &view.editing {
        Some(draft) => draft.id,
        None => return err(MSG_NOT_EDITING),
    };
    if text.is_empty() {
        return ok(false);
    }
    // The item may have been completed or deleted since the draft was opened.
    let refused = match store.get(id) {
        Some(item) if !item.checked => None,
        Some(_) => Some(MSG_COMPLETED_NOT_EDITABLE),
        None => Some(MSG_NOT_FOUND),
    };
    if let Some(message) = refused {
        view.editing = None;
        emit(ctx, store, view);
        return err(message);
    }
    if let Err(error) = store.edit(id, text) {
        return storage_err(ctx, error);
    }
    log::info!("command: edit_todo id={id}");
    view.editing = None;
    emit(ctx, store, view);
    ctx.show_notice(Notice::success(MSG_UPDATED));
    ok(true)
}

pub fn cancel_edit_impl<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &TodoStore<S, C>,
    view: &mut ViewState,
) -> CommandResult<bool> {
    let was_editing = view.editing.take().is_some();
    if was_editing {
        emit(ctx, store, view);
    }
    ok(was_editing)
}

pub fn toggle_todo_impl<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &mut TodoStore<S, C>,
    view: &ViewState,
    id: TodoId,
) -> CommandResult<bool> {
    let was_checked = store.get(id).map(|item| item.checked);
    if let Err(error) = store.toggle(id) {
        return storage_err(ctx, error);
    }
    log::info!("command: toggle_todo id={id} found={}", was_checked.is_some());
    emit(ctx, store, view);
    if was_checked == Some(false) {
        ctx.show_notice(Notice::success(MSG_COMPLETED));
    }
    ok(was_checked.is_some())
}

pub fn delete_todo_impl<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &mut TodoStore<S, C>,
    view: &mut ViewState,
    id: TodoId,
) -> CommandResult<bool> {
    let before = store.todos().len();
    let removed = match store.delete(id) {
        Ok(todos) => todos.len() < before,
        Err(error) => return storage_err(ctx, error),
    };
    log::info!("command: delete_todo id={id} removed={removed}");
    if view.is_editing(id) {
        view.editing = None;
    }
    emit(ctx, store, view);
    if removed {
        ctx.show_notice(Notice::success(MSG_DELETED));
    }
    ok(removed)
}

pub fn toggle_theme_impl<S: KeyValueStore, C: Clock>(
    ctx: &impl CommandCtx,
    store: &TodoStore<S, C>,
    view: &mut ViewState,
) -> CommandResult<Theme> {
    view.theme = view.theme.toggled();
    emit(ctx, store, view);
    ok(view.theme)
}
