//! Application wiring.
//!
//! [`FieldscopeApp`] builds the HTTP adapters from an [`AppConfig`] and owns a
//! [`DataPanelState`](crate::state::DataPanelState), so callers can drive the
//! loader and the existence synchronizer without assembling the pieces.
//!
//! # Example
//!
//! ```no_run
//! use fieldscope::app::{AppConfig, FieldscopeApp};
//! use fieldscope::config::ConfigFile;
//! use fieldscope::loader::NoopEvents;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_config_file(&ConfigFile::load()?);
//! let app = FieldscopeApp::new(config)?;
//!
//! let refs = app.index_pattern_refs().await?;
//! println!("{} data views", refs.len());
//! app.load(&["logs".to_string()], &[], &NoopEvents).await;
//! let state = app.sync_existence("logs", &NoopEvents).await?;
//! println!("timed out: {}", state.existence_fetch_timeout);
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::FieldscopeApp;
pub use config::{match_all_query, AppConfig};
pub use error::AppError;
