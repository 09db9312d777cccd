pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::model::{Amenity, City, Entity, EntityKind, Model, Place, Review, State, User};
pub use infra::config::{Config, StorageBackend};
pub use storage::{open_storage, DbStorage, FileStorage, Storage, StorageError, StorageResult};

/// Installs the global `tracing` subscriber. Respects `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();
}
