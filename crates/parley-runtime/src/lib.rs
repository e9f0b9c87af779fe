//! Parley Runtime - configuration, logging and store wiring.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`): defaults, `parley.toml` /
//!   `parley.yaml`, `PARLEY_*` environment variables
//! - Logging setup on `tracing-subscriber` (`LoggingBuilder`)
//! - [`connect_store`], which opens the configured state backend
//! - [`bootstrap`], which does all of the above in one call
//!
//! ```ignore
//! use parley_runtime::{ConfigLoader, bootstrap};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (_config, store) = bootstrap(ConfigLoader::new()).await?;
//!     let dispatcher = Dispatcher::new(registry(), store, default_resolver());
//!     // feed decoded webhook events to `dispatcher.dispatch(..)`
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `toml-config`, `yaml-config`: config file formats (the `parley` facade
//!   enables `toml-config` by default)
//! - `json-log`: JSON log lines
//! - `redis`, `postgres`: durable state backends

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;

pub use bootstrap::bootstrap;
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, ParleyConfig, StoreConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use store::connect_store;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for application code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
