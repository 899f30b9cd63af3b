//! Display settings: persistence and the observable settings store

pub mod storage;
pub mod store;

pub use storage::{FileStore, KeyValueStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
pub use store::{keys, SettingsStore, Subscriber};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings storage unavailable: {0}")]
    Unavailable(&'static str),

    #[error("failed to read setting '{key}': {message}")]
    Read { key: String, message: String },

    #[error("failed to write setting '{key}': {message}")]
    Write { key: String, message: String },

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
