pub mod clock;
pub mod commands;
pub mod config;
pub mod events;
pub mod logging;
pub mod models;
pub mod notice;
pub mod repl;
pub mod storage;
pub mod store;
pub mod view;

#[cfg(all(feature = "app", not(test)))]
use crate::config::AppConfig;

#[cfg(all(feature = "app", not(test)))]
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    let _logger = logging::init_logging(&config.data_dir)?;

    // One thread, one event loop: commands never interleave.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(repl::run_session(config));
    if let Err(err) = &outcome {
        log::error!("session: stdin failed: {err}");
    }
    outcome?;
    Ok(())
}
