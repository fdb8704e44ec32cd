use crate::data::loader::{SourceSpec, station_sources};

/// Fixed dashboard settings. There are no flags or environment overrides;
/// the struct exists so the server and tests get their settings explicitly.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    /// Access logging and a `debug` default log level.
    pub debug: bool,
    pub sources: Vec<SourceSpec>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            host: "127.0.0.1".to_string(),
            port: 8051,
            debug: true,
            sources: station_sources(),
        }
    }
}

impl DashboardConfig {
    /// Filter handed to `env_logger` when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
