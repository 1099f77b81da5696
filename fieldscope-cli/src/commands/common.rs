//! Common types and utilities shared across CLI commands.

use std::time::Duration;

use clap::Args;
use fieldscope::app::AppConfig;
use fieldscope::error::LoaderError;
use fieldscope::loader::LoaderEvents;

/// Server overrides accepted by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct ServerArgs {
    /// Server base URL (overrides server.base_url)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// API key (overrides server.api_key)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds (overrides server.timeout_secs)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl ServerArgs {
    /// Apply overrides on top of a config built from the file.
    ///
    /// CLI takes precedence, then config.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// Prints loader notifications for the user.
#[derive(Debug, Default)]
pub struct ConsoleEvents;

impl LoaderEvents for ConsoleEvents {
    fn on_index_pattern_refresh(&self) {
        tracing::debug!("Index patterns refreshed from server");
    }

    fn on_no_data(&self) {
        eprintln!("No data in the selected time range for the current index pattern.");
    }

    fn on_error(&self, error: &LoaderError) {
        eprintln!("Warning: {}", error);
    }
}
