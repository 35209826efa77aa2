pub mod calendar;
pub mod commands;
pub mod config;
mod console;
pub mod db;
pub mod health;
pub mod models;
pub mod settings;
pub mod tracker;
mod utils;
pub mod views;

use std::sync::Arc;

use anyhow::Context;
use log::{error, warn};

use calendar::{Clock, SystemClock};
use config::AppConfig;
use db::Database;
use health::LocalHealthStore;
use settings::SettingsStore;
use tracker::{StepTracker, TrackerOptions};

/// Everything the front end needs, shared behind an `Arc`.
pub struct AppState {
    pub tracker: StepTracker,
    pub settings: Arc<SettingsStore>,
    pub health: LocalHealthStore,
    pub clock: Arc<dyn Clock>,
}

async fn start(config: AppConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("failed to create data directory {}", config.data_dir.display())
    })?;

    let database = Database::new(config.database_path())?;
    let health = LocalHealthStore::new(database, config.health_access);
    let settings = Arc::new(SettingsStore::new(config.settings_path())?);

    let tracker = StepTracker::spawn(
        Arc::new(health.clone()),
        settings.clone(),
        TrackerOptions {
            refresh_interval: config.refresh_interval,
            ..TrackerOptions::default()
        },
    );

    let state = Arc::new(AppState {
        tracker,
        settings,
        health,
        clock: Arc::new(SystemClock),
    });

    // Ask for access right away; a refusal leaves the call-to-action on screen.
    if let Err(err) = commands::request_authorization(&state).await {
        warn!("Initial authorization request failed: {err}");
    }

    let result = console::run(state.clone()).await;
    state.tracker.shutdown().await;
    result
}

pub fn run() {
    let config = AppConfig::from_env();

    // Initialize logging; RUST_LOG overrides the default level
    let level = match &config {
        Ok(config) if config.debug => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    log::info!("stepgoal starting up...");

    let result = config.and_then(|config| {
        let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
        runtime.block_on(start(config))
    });

    if let Err(err) = result {
        error!("stepgoal exited with error: {err:#}");
        std::process::exit(1);
    }
}
