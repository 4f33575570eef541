use std::path::Path;

pub const LOG_FILE_BASENAME: &str = "todo-app";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 5;
pub const ENV_LOG: &str = "TODO_APP_LOG";

/// Log files live next to the `todos.json` slot.
pub fn log_directory(data_dir: &Path) -> &Path {
    data_dir
}

/// `TODO_APP_LOG`, then `RUST_LOG`, then the build default.
pub fn log_spec(lookup: impl Fn(&str) -> Option<String>) -> String {
    let default_spec = if cfg!(debug_assertions) {
        "warn,todo_app_lib=debug"
    } else {
        "warn,todo_app_lib=info"
    };
    lookup(ENV_LOG)
        .filter(|value| !value.trim().is_empty())
        .or_else(|| lookup("RUST_LOG").filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

/// Keep the returned handle alive until exit: dropping it stops the
/// background flusher and loses buffered lines.
#[cfg(all(feature = "app", not(test)))]
pub fn init_logging(
    data_dir: &Path,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    std::fs::create_dir_all(data_dir)?;

    let files = FileSpec::default()
        .directory(log_directory(data_dir))
        .basename(LOG_FILE_BASENAME)
        .suffix(LOG_FILE_SUFFIX);
    // The REPL owns stdout in release builds.
    let echo = if cfg!(debug_assertions) {
        Duplicate::Info
    } else {
        Duplicate::None
    };

    let handle = Logger::try_with_str(log_spec(|key| std::env::var(key).ok()))?
        .log_to_file(files)
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stdout(echo)
        .start()?;

    install_crash_logger(handle.clone());

    log::info!(
        "logging: writing {LOG_FILE_BASENAME}.{LOG_FILE_SUFFIX} to {}",
        log_directory(data_dir).display()
    );
    Ok(handle)
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Records the crash in the log file and flushes it before the default hook
/// prints to stderr.
#[cfg(all(feature = "app", not(test)))]
fn install_crash_logger(handle: flexi_logger::LoggerHandle) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let thread = std::thread::current();
        let location = info
            .location()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<unknown>".to_string());
        log::error!(
            "todo-app crashed in thread '{}' at {location}: {}\n{}",
            thread.name().unwrap_or("<unnamed>"),
            panic_message(info.payload()),
            std::backtrace::Backtrace::force_capture()
        );
        handle.flush();
        default_hook(info);
    }));
}
