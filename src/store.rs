use crate::clock::{
    format_created_at, Clock, IdSource, SystemClock, TimestampStyle, MAX_TODO_ID,
};
use crate::models::{TodoCollection, TodoId, TodoItem};
use crate::storage::{KeyValueStore, StorageError};

pub const TODOS_KEY: &str = "todos";

/// The todo collection and its persisted mirror.
///
/// Every mutation builds the next snapshot, writes it to the `todos` slot and
/// only then adopts it, so the in-memory collection always equals the last
/// successful write. A missing id is never an error.
pub struct TodoStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    style: TimestampStyle,
    ids: IdSource,
    todos: TodoCollection,
}

impl<S: KeyValueStore> TodoStore<S, SystemClock> {
    pub fn open(storage: S) -> Self {
        Self::load(storage, SystemClock, TimestampStyle::detect())
    }
}

impl<S: KeyValueStore, C: Clock> TodoStore<S, C> {
    /// Reads the slot once. Absent, unreadable or malformed data starts empty.
    pub fn load(storage: S, clock: C, style: TimestampStyle) -> Self {
        let todos = load_collection(&storage);
        log::info!("store: loaded todos count={}", todos.len());
        let ids = IdSource::seeded(todos.iter().map(|todo| &todo.id));
        Self {
            storage,
            clock,
            style,
            ids,
            todos,
        }
    }

    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Callers are expected to reject blank text before calling.
    pub fn add(&mut self, text: &str) -> Result<TodoItem, StorageError> {
        let now = self.clock.now();
        let item = TodoItem {
            id: self.ids.next_id(now.timestamp_millis()),
            text: text.to_string(),
            checked: false,
            created_at: format_created_at(&now, self.style),
        };
        let mut next = self.todos.clone();
        next.push(item.clone());
        self.commit(next)?;
        Ok(item)
    }

    /// Writes the slot even when no item matches.
    pub fn edit(&mut self, id: TodoId, text: &str) -> Result<(), StorageError> {
        let next = self
            .todos
            .iter()
            .map(|todo| {
                if todo.id == id {
                    TodoItem {
                        text: text.to_string(),
                        ..todo.clone()
                    }
                } else {
                    todo.clone()
                }
            })
            .collect();
        self.commit(next)
    }

    /// Writes the slot even when no item matches.
    pub fn toggle(&mut self, id: TodoId) -> Result<(), StorageError> {
        let next = self
            .todos
            .iter()
            .map(|todo| {
                if todo.id == id {
                    TodoItem {
                        checked: !todo.checked,
                        ..todo.clone()
                    }
                } else {
                    todo.clone()
                }
            })
            .collect();
        self.commit(next)
    }

    pub fn delete(&mut self, id: TodoId) -> Result<&[TodoItem], StorageError> {
        let next = self
            .todos
            .iter()
            .filter(|todo| todo.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        Ok(&self.todos)
    }

    fn commit(&mut self, next: TodoCollection) -> Result<(), StorageError> {
        let json = serde_json::to_string(&next)?;
        self.storage.set_item(TODOS_KEY, &json)?;
        log::debug!("store: persisted todos count={}", next.len());
        self.todos = next;
        Ok(())
    }
}

fn load_collection(storage: &impl KeyValueStore) -> TodoCollection {
    let raw = match storage.get_item(TODOS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return TodoCollection::new(),
        Err(err) => {
            log::warn!("store: failed to read slot key={TODOS_KEY}: {err}");
            return TodoCollection::new();
        }
    };
    match serde_json::from_str::<TodoCollection>(&raw) {
        Ok(mut todos) => {
            let before = todos.len();
            todos.retain(|todo| todo.id <= MAX_TODO_ID);
            if todos.len() < before {
                log::warn!(
                    "store: dropped {} todos with ids above {MAX_TODO_ID}",
                    before - todos.len()
                );
            }
            todos
        }
        Err(err) => {
            log::warn!("store: discarding malformed slot key={TODOS_KEY}: {err}");
            TodoCollection::new()
        }
    }
}
