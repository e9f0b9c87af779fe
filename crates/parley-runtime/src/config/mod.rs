//! Configuration module for Parley applications.
//!
//! Layered loading (defaults, files, environment) lives in [`loader`]; the
//! shape of the configuration lives in [`schema`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LoggingConfig, ParleyConfig, PostgresConfig, RedisConfig,
    SpanEventConfig, StoreBackend, StoreConfig,
};
pub use validation::validate_config;
