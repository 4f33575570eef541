use std::path::PathBuf;
use std::time::Duration;

use crate::notice::DEFAULT_NOTICE_TTL;

pub const APP_DIR_NAME: &str = "todo-app";
pub const ENV_DATA_DIR: &str = "TODO_APP_DATA_DIR";
pub const ENV_NOTICE_MS: &str = "TODO_APP_NOTICE_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Holds the `todos.json` slot and the log files.
    pub data_dir: PathBuf,
    pub notice_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), platform_data_dir())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        platform_dir: Option<PathBuf>,
    ) -> Self {
        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| platform_dir.map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}")));

        let notice_ttl = match lookup(ENV_NOTICE_MS) {
            None => DEFAULT_NOTICE_TTL,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    log::warn!("config: ignoring {ENV_NOTICE_MS}={raw:?}, expected positive milliseconds");
                    DEFAULT_NOTICE_TTL
                }
            },
        };

        Self {
            data_dir,
            notice_ttl,
        }
    }
}

#[cfg(feature = "app")]
fn platform_data_dir() -> Option<PathBuf> {
    dirs::data_dir()
}

#[cfg(not(feature = "app"))]
fn platform_data_dir() -> Option<PathBuf> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_platform_dir_and_two_second_notices() {
        let config = AppConfig::from_lookup(lookup_from(&[]), Some(PathBuf::from("/data")));
        assert_eq!(config.data_dir, PathBuf::from("/data").join(APP_DIR_NAME));
        assert_eq!(config.notice_ttl, Duration::from_secs(2));
    }

    #[test]
    fn falls_back_to_local_dir_without_platform_dir() {
        let config = AppConfig::from_lookup(lookup_from(&[]), None);
        assert_eq!(config.data_dir, PathBuf::from(".todo-app"));
    }

    #[test]
    fn env_overrides_data_dir_and_ttl() {
        let config = AppConfig::from_lookup(
            lookup_from(&[(ENV_DATA_DIR, "/tmp/todos"), (ENV_NOTICE_MS, " 3500 ")]),
            Some(PathBuf::from("/data")),
        );
        assert_eq!(config.data_dir, PathBuf::from("/tmp/todos"));
        assert_eq!(config.notice_ttl, Duration::from_millis(3_500));
    }

    #[test]
    fn blank_dir_and_invalid_ttl_fall_back_to_defaults() {
        for bad in ["0", "-5", "soon", ""] {
            let config = AppConfig::from_lookup(
                lookup_from(&[(ENV_DATA_DIR, "  "), (ENV_NOTICE_MS, bad)]),
                Some(PathBuf::from("/data")),
            );
            assert_eq!(config.data_dir, PathBuf::from("/data").join(APP_DIR_NAME));
            assert_eq!(config.notice_ttl, DEFAULT_NOTICE_TTL);
        }
    }
}
