//! One-call application startup.

use parley_core::StateStore;

use crate::config::{ConfigLoader, ParleyConfig};
use crate::error::RuntimeResult;
use crate::logging;
use crate::store::connect_store;

/// Loads configuration from `loader`, installs logging and opens the
/// configured state store.
///
/// ```rust,ignore
/// let (config, store) = parley_runtime::bootstrap(ConfigLoader::new()).await?;
/// let dispatcher = Dispatcher::new(registry(), store, default_resolver());
/// ```
pub async fn bootstrap(loader: ConfigLoader) -> RuntimeResult<(ParleyConfig, StateStore)> {
    let config = loader.load()?;
    logging::init_from_config(&config.logging);
    let store = connect_store(&config.store).await?;
    Ok((config, store))
}
