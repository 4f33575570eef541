use serde::{Deserialize, Serialize};

pub type TodoId = i64;

/// Ordered oldest first, the way it is stored.
pub type TodoCollection = Vec<TodoItem>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoId,
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn title(self) -> &'static str {
        match self {
            NoticeKind::Success => "Success",
            NoticeKind::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_item_uses_camel_case_created_at() {
        let item = TodoItem {
            id: 1_700_000_000_000,
            text: "buy milk".to_string(),
            checked: false,
            created_at: "11/14/2023, 10:13:20 PM".to_string(),
        };
        let value = serde_json::to_value(&item).expect("serialize todo");
        assert_eq!(
            value,
            serde_json::json!({
              "id": 1_700_000_000_000i64,
              "text": "buy milk",
              "checked": false,
              "createdAt": "11/14/2023, 10:13:20 PM"
            })
        );
    }

    #[test]
    fn todo_item_checked_defaults_to_false_when_missing() {
        let json = r#"{ "id": 5, "text": "walk the goat", "createdAt": "today" }"#;
        let item: TodoItem = serde_json::from_str(json).expect("todo should deserialize");
        assert!(!item.checked);
        assert_eq!(item.id, 5);
        assert_eq!(item.created_at, "today");
    }

    #[test]
    fn theme_defaults_to_light_and_toggles_both_ways() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn notice_constructors_set_kind() {
        let ok = Notice::success("done");
        assert_eq!(ok.kind, NoticeKind::Success);
        assert_eq!(ok.kind.title(), "Success");
        let bad = Notice::error("nope");
        assert_eq!(bad.kind, NoticeKind::Error);
        assert_eq!(bad.kind.title(), "Error");
        assert_eq!(bad.message, "nope");
    }
}
