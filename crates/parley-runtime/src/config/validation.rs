//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, ParleyConfig, StoreBackend, StoreConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ParleyConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_store_config(&config.store)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

/// Only the selected backend's section is checked.
fn validate_store_config(store: &StoreConfig) -> ConfigResult<()> {
    match store.backend {
        StoreBackend::Memory => Ok(()),
        StoreBackend::Redis => {
            if store.redis.url.trim().is_empty() {
                return Err(ConfigError::missing_field("store.redis.url"));
            }
            Ok(())
        }
        StoreBackend::Postgres => {
            let postgres = &store.postgres;
            if postgres.url.trim().is_empty() {
                return Err(ConfigError::missing_field("store.postgres.url"));
            }
            if postgres.table.trim().is_empty() {
                return Err(ConfigError::missing_field("store.postgres.table"));
            }
            if postgres.max_connections == 0 {
                return Err(ConfigError::validation(
                    "store.postgres.max_connections must be greater than 0",
                ));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&ParleyConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = ParleyConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some(PathBuf::from("parley.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_only_selected_backend_is_checked() {
        let mut config = ParleyConfig::default();
        config.store.postgres.max_connections = 0;
        assert!(validate_config(&config).is_ok());

        config.store.backend = StoreBackend::Postgres;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.store.backend = StoreBackend::Redis;
        config.store.redis.url = "  ".into();
        assert!(validate_config(&config).is_err());
    }
}
