//! Shared setup for commands that talk to the server.

use std::future::Future;

use fieldscope::app::{AppConfig, FieldscopeApp};
use fieldscope::config::ConfigFile;
use fieldscope::logging::{init_logging, LoggingGuard};
use tokio::runtime::Runtime;
use tracing::info;

use crate::commands::common::ServerArgs;
use crate::error::CliError;

/// Loaded config, active logging and a runtime for one command invocation.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    log_guard: LoggingGuard,
}

impl CliRunner {
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let log_guard = init_logging(&config.logging)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            config,
            runtime,
            log_guard,
        })
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = fieldscope::VERSION,
            command,
            log_file = %self.log_guard.log_path().display(),
            "fieldscope starting"
        );
    }

    /// Resolve the application config: file first, then command-line overrides.
    pub fn app_config(&self, server: &ServerArgs) -> AppConfig {
        server.apply(AppConfig::from_config_file(&self.config))
    }

    /// Build the application from config plus command-line overrides.
    pub fn app(&self, server: &ServerArgs) -> Result<FieldscopeApp, CliError> {
        Ok(FieldscopeApp::new(self.app_config(server))?)
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
