#![forbid(unsafe_code)]

pub mod form_cache;

pub use form_cache::{FormCache, FormCacheConfig, InMemoryFormCache, StorageError};
