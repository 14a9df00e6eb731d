#![forbid(unsafe_code)]

pub mod api_client;
pub mod app;
pub mod config;
pub mod error;
pub mod gate;

use std::sync::Arc;

use beacons_os::RegistrationApi;
use beacons_storage::{FormCacheConfig, InMemoryFormCache, StorageError};

pub use app::{build_router, AppState};
pub use config::AdapterConfig;
pub use error::AppError;

/// Wires the in-memory cache and the registration client described by `config`.
pub fn app_state_from_config(config: &AdapterConfig) -> Result<AppState, StorageError> {
    let cache = InMemoryFormCache::new(FormCacheConfig::mvp_v1().with_ttl(config.cache_ttl))?;
    let api: Arc<dyn RegistrationApi> = match config.api_url.as_deref() {
        Some(url) => Arc::new(api_client::UreqRegistrationApi::new(url, config.api_timeout)),
        None => Arc::new(api_client::DisabledRegistrationApi),
    };
    Ok(AppState::new(Arc::new(cache), api))
}
