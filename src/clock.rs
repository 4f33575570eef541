use chrono::{DateTime, Local, TimeZone};

use crate::models::TodoId;

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Largest id that survives a round trip through a JSON number unchanged
/// (`Number.MAX_SAFE_INTEGER`). Loaded items above it are dropped.
pub const MAX_TODO_ID: TodoId = 9_007_199_254_740_991;

/// Hands out epoch-millisecond ids that never repeat, even when the clock
/// stalls or steps backwards between two calls.
#[derive(Debug, Clone, Default)]
pub struct IdSource {
    last: TodoId,
}

impl IdSource {
    /// Seeds from ids already in use so reloaded collections stay unique.
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a TodoId>) -> Self {
        Self {
            last: existing
                .into_iter()
                .copied()
                .filter(|id| *id <= MAX_TODO_ID)
                .max()
                .unwrap_or(0),
        }
    }

    pub fn next_id(&mut self, now_millis: i64) -> TodoId {
        // `last` starts at or below MAX_TODO_ID, far from i64::MAX.
        let id = now_millis.max(self.last + 1);
        self.last = id;
        id
    }
}

/// How `createdAt` is rendered, mirroring what a browser's `toLocaleString()`
/// produces for the main locale families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// `1/2/2025, 3:04:05 PM`
    UsEnglish,
    /// `2025/1/2 15:04:05`
    YearFirst,
    /// `02/01/2025, 15:04:05`
    DayFirstSlash,
    /// `02.01.2025, 15:04:05`
    DayFirstDot,
    /// `2025-01-02 15:04:05`
    Iso,
}

impl TimestampStyle {
    pub fn detect() -> Self {
        let locale = std::env::var("TODO_APP_LOCALE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(sys_locale::get_locale)
            .unwrap_or_default();
        Self::for_locale(&locale)
    }

    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.trim().to_lowercase().replace('_', "-");
        let language = normalized.split('-').next().unwrap_or_default();
        match language {
            "" | "c" | "posix" => TimestampStyle::Iso,
            "en" if normalized == "en" || normalized.starts_with("en-us") => {
                TimestampStyle::UsEnglish
            }
            "zh" | "ja" => TimestampStyle::YearFirst,
            "de" | "ru" | "pl" | "cs" | "fi" | "nb" | "tr" => TimestampStyle::DayFirstDot,
            "en" | "fr" | "es" | "it" | "pt" | "nl" | "el" | "id" | "vi" => {
                TimestampStyle::DayFirstSlash
            }
            _ => TimestampStyle::Iso,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            TimestampStyle::UsEnglish => "%-m/%-d/%Y, %-I:%M:%S %p",
            TimestampStyle::YearFirst => "%Y/%-m/%-d %H:%M:%S",
            TimestampStyle::DayFirstSlash => "%d/%m/%Y, %H:%M:%S",
            TimestampStyle::DayFirstDot => "%d.%m.%Y, %H:%M:%S",
            TimestampStyle::Iso => "%Y-%m-%d %H:%M:%S",
        }
    }
}

pub fn format_created_at<Tz>(at: &DateTime<Tz>, style: TimestampStyle) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(style.pattern()).to_string()
}
