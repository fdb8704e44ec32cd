mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use config::DashboardConfig;
use data::loader::{HttpFetcher, load_dataset};

fn main() {
    let config = DashboardConfig::default();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.default_log_filter()),
    )
    .init();

    if let Err(err) = run(&config) {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(config: &DashboardConfig) -> Result<()> {
    // The server never starts with a partial dataset.
    let dataset = load_dataset(&HttpFetcher::new(), &config.sources)?;
    log::info!("Loaded {} observations", dataset.len());

    app::serve(config, Arc::new(dataset))
}
