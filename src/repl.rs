use std::fmt::Write as _;

use crate::events::StatePayload;
use crate::models::{Notice, NoticeKind, Theme, TodoId};

pub const USAGE: &str = "commands:
  add <text>      add a todo
  edit <id>       start editing a todo
  save <text>     save the todo being edited
  cancel          stop editing
  toggle <id>     mark a todo done or not done
  delete <id>     remove a todo
  list            show all todos
  theme           switch light/dark
  help            show this help
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Add(String),
    Edit(TodoId),
    Save(String),
    Cancel,
    Toggle(TodoId),
    Delete(TodoId),
    List,
    Theme,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingId(&'static str),
    BadId(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::Unknown(word) => write!(f, "unknown command: {word}"),
            ParseError::MissingId(command) => write!(f, "{command} needs a todo id"),
            ParseError::BadId(raw) => write!(f, "not a todo id: {raw}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// `add` and `save` keep the rest of the line verbatim so the command layer
/// decides what counts as empty.
pub fn parse_command(line: &str) -> Result<ReplCommand, ParseError> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    let trimmed = line.trim_start();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (trimmed, ""),
    };
    match word.to_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "add" | "a" => Ok(ReplCommand::Add(rest.to_string())),
        "save" | "s" => Ok(ReplCommand::Save(rest.trim().to_string())),
        "edit" | "e" => parse_id("edit", rest).map(ReplCommand::Edit),
        "toggle" | "t" | "done" => parse_id("toggle", rest).map(ReplCommand::Toggle),
        "delete" | "d" | "rm" => parse_id("delete", rest).map(ReplCommand::Delete),
        "cancel" => Ok(ReplCommand::Cancel),
        "list" | "ls" => Ok(ReplCommand::List),
        "theme" => Ok(ReplCommand::Theme),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        _ => Err(ParseError::Unknown(word.to_string())),
    }
}

fn parse_id(command: &'static str, rest: &str) -> Result<TodoId, ParseError> {
    let raw = rest.trim();
    if raw.is_empty() {
        return Err(ParseError::MissingId(command));
    }
    raw.parse::<TodoId>()
        .map_err(|_| ParseError::BadId(raw.to_string()))
}

const ANSI_DARK: &str = "\x1b[97;40m";
const ANSI_RESET: &str = "\x1b[0m";

pub fn render_state(payload: &StatePayload) -> String {
    let mut out = String::new();
    let (open, close) = match payload.theme {
        Theme::Light => ("", ""),
        Theme::Dark => (ANSI_DARK, ANSI_RESET),
    };
    out.push_str(open);
    if payload.rows.is_empty() {
        out.push_str("  (nothing to do)\n");
    }
    for row in &payload.rows {
        let mark = if row.item.checked { 'x' } else { ' ' };
        let _ = write!(out, "  [{mark}] {} ", row.item.id);
        if row.editing {
            let draft = payload
                .editing
                .as_ref()
                .map(|draft| draft.text.as_str())
                .unwrap_or_default();
            let _ = write!(out, "(editing) {draft}");
        } else {
            out.push_str(&row.item.text);
        }
        if row.show_created_at {
            let _ = write!(out, "  · {}", row.item.created_at);
        }
        out.push('\n');
    }
    out.push_str(close);
    out
}

pub fn render_notice(notice: &Notice) -> String {
    let icon = match notice.kind {
        NoticeKind::Success => '✔',
        NoticeKind::Error => '!',
    };
    format!("{icon} {}: {}", notice.kind.title(), notice.message)
}

#[cfg(all(feature = "app", not(test)))]
pub use terminal::run_session;

#[cfg(all(feature = "app", not(test)))]
mod terminal {
    use tokio::io::{AsyncBufReadExt, BufReader};

    use super::{parse_command, render_notice, render_state, ReplCommand, USAGE};
    use crate::commands::*;
    use crate::config::AppConfig;
    use crate::events::{StatePayload, EVENT_STATE_UPDATED};
    use crate::models::Notice;
    use crate::notice::NoticeBoard;
    use crate::storage::FileStorage;
    use crate::store::TodoStore;
    use crate::view::ViewState;

    struct TerminalCtx {
        notices: NoticeBoard,
    }

    impl CommandCtx for TerminalCtx {
        fn emit_state_updated(&self, payload: StatePayload) {
            log::debug!("{EVENT_STATE_UPDATED}: rows={}", payload.rows.len());
            print!("{}", render_state(&payload));
        }

        // Printed once here. After the board expires it, `list` stops repeating it.
        fn show_notice(&self, notice: Notice) {
            println!("{}", render_notice(&notice));
            self.notices.show(notice);
        }
    }

    pub async fn run_session(config: AppConfig) -> std::io::Result<()> {
        let storage = FileStorage::new(config.data_dir.clone());
        let mut store = TodoStore::open(storage);
        let mut view = ViewState::default();
        let ctx = TerminalCtx {
            notices: NoticeBoard::new(config.notice_ttl),
        };

        log::info!("session: started data_dir={}", config.data_dir.display());
        if let Some(payload) = load_state_impl(&store, &view).data {
            print!("{}", render_state(&payload));
        }
        println!("type `help` for commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(super::ParseError::Empty) => continue,
                Err(error) => {
                    println!("{error}\n{USAGE}");
                    continue;
                }
            };
            let error = match command {
                ReplCommand::Add(text) => add_todo_impl(&ctx, &mut store, &view, &text).error,
                ReplCommand::Edit(id) => begin_edit_impl(&ctx, &store, &mut view, id).error,
                ReplCommand::Save(text) => {
                    save_edit_impl(&ctx, &mut store, &mut view, &text).error
                }
                ReplCommand::Cancel => cancel_edit_impl(&ctx, &store, &mut view).error,
                ReplCommand::Toggle(id) => toggle_todo_impl(&ctx, &mut store, &view, id).error,
                ReplCommand::Delete(id) => {
                    delete_todo_impl(&ctx, &mut store, &mut view, id).error
                }
                ReplCommand::Theme => toggle_theme_impl(&ctx, &store, &mut view).error,
                ReplCommand::List => {
                    let payload = load_state_impl(&store, &view).data;
                    if let Some(payload) = payload {
                        print!("{}", render_state(&payload));
                    }
                    if let Some(notice) = ctx.notices.current() {
                        println!("{}", render_notice(&notice));
                    }
                    None
                }
                ReplCommand::Help => {
                    println!("{USAGE}");
                    None
                }
                ReplCommand::Quit => break,
            };
            // Blank-text and storage errors already surfaced as notices.
            if let Some(error) = error {
                let notified = ctx
                    .notices
                    .current()
                    .is_some_and(|notice| notice.message == error);
                if !notified {
                    println!("! {error}");
                }
            }
        }
        ctx.notices.dismiss();
        log::info!("session: ended todos={}", store.todos().len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoItem;
    use crate::view::{EditDraft, TodoRow};

    #[test]
    fn parse_command_reads_words_and_ids() {
        assert_eq!(
            parse_command("add buy milk"),
            Ok(ReplCommand::Add("buy milk".to_string()))
        );
        assert_eq!(parse_command("  toggle 17\n"), Ok(ReplCommand::Toggle(17)));
        assert_eq!(parse_command("rm 3"), Ok(ReplCommand::Delete(3)));
        assert_eq!(parse_command("EDIT 9"), Ok(ReplCommand::Edit(9)));
        assert_eq!(
            parse_command("save  new words "),
            Ok(ReplCommand::Save("new words".to_string()))
        );
        assert_eq!(parse_command("list"), Ok(ReplCommand::List));
        assert_eq!(parse_command("theme"), Ok(ReplCommand::Theme));
        assert_eq!(parse_command("cancel"), Ok(ReplCommand::Cancel));
        assert_eq!(parse_command("q"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn parse_command_keeps_blank_add_text_for_the_command_layer() {
        assert_eq!(parse_command("add"), Ok(ReplCommand::Add(String::new())));
        assert_eq!(parse_command("add    "), Ok(ReplCommand::Add("   ".to_string())));
    }

    #[test]
    fn parse_command_reports_errors() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_command("fly away"),
            Err(ParseError::Unknown("fly".to_string()))
        );
        assert_eq!(parse_command("toggle"), Err(ParseError::MissingId("toggle")));
        assert_eq!(
            parse_command("delete abc"),
            Err(ParseError::BadId("abc".to_string()))
        );
        assert_eq!(
            ParseError::MissingId("edit").to_string(),
            "edit needs a todo id"
        );
    }

    fn row(id: TodoId, text: &str, checked: bool, editing: bool) -> TodoRow {
        TodoRow {
            item: TodoItem {
                id,
                text: text.to_string(),
                checked,
                created_at: "1/2/2025, 3:04:05 PM".to_string(),
            },
            editing,
            show_created_at: !checked,
            can_edit: !checked,
        }
    }

    #[test]
    fn render_state_marks_done_rows_and_drafts() {
        let payload = StatePayload {
            rows: vec![row(2, "fix fence", false, true), row(1, "feed goat", true, false)],
            theme: Theme::Light,
            editing: Some(EditDraft {
                id: 2,
                text: "fix the fence".to_string(),
            }),
        };
        let out = render_state(&payload);
        assert_eq!(
            out,
            "  [ ] 2 (editing) fix the fence  · 1/2/2025, 3:04:05 PM\n  [x] 1 feed goat\n"
        );
    }

    #[test]
    fn render_state_wraps_dark_theme_and_empty_list() {
        let payload = StatePayload {
            rows: Vec::new(),
            theme: Theme::Dark,
            editing: None,
        };
        let out = render_state(&payload);
        assert!(out.starts_with(ANSI_DARK));
        assert!(out.contains("(nothing to do)"));
        assert!(out.ends_with(ANSI_RESET));
    }

    #[test]
    fn render_notice_shows_kind_and_message() {
        assert_eq!(
            render_notice(&Notice::error("cannot add empty todo")),
            "! Error: cannot add empty todo"
        );
        assert!(render_notice(&Notice::success("ok")).ends_with("Success: ok"));
    }
}
