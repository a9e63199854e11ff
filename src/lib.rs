mod config;
mod console;
pub mod db;
pub mod error;
pub mod interview;
pub mod session;
pub mod store;
pub mod timer;
mod utils;

use anyhow::Context;

pub use config::{AppConfig, StoreBackend};
pub use error::{SessionError, StoreError, TimerError};

pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("InterviewMate starting up...");

    let config = AppConfig::from_env()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;

    runtime.block_on(console::run_console(config))
}
