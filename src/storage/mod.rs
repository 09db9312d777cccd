//! The storage engine: one façade over interchangeable backends.
//!
//! Exactly one backend is live per process. It is chosen from configuration at
//! start-up by [`open_storage`] and then handed by reference to whoever needs it;
//! entities never persist themselves.

pub mod db;
pub mod error;
pub mod file;

pub use db::DbStorage;
pub use error::{StorageError, StorageResult};
pub use file::FileStorage;

use crate::domain::model::{City, Entity, EntityKind, Model};
use crate::infra::config::{Config, StorageBackend};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Live entities keyed by composite key `"<TypeName>.<id>"`.
pub type ObjectMap = BTreeMap<String, Entity>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Short backend name, for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Every live instance of `kind`, or of every known kind when `None`.
    ///
    /// An uninitialized or empty store yields an empty map.
    async fn all(&self, kind: Option<EntityKind>) -> StorageResult<ObjectMap>;

    /// Registers `entity` as pending. Re-registering an existing key replaces it.
    async fn new(&mut self, entity: Entity) -> StorageResult<()>;

    /// Makes every pending change durable, all or nothing.
    async fn save(&mut self) -> StorageResult<()>;

    /// Removes `entity` from the live set; durable after the next `save`.
    /// `None` is a no-op.
    async fn delete(&mut self, entity: Option<&Entity>) -> StorageResult<()>;

    /// Replaces the live set with the durable snapshot. A missing snapshot is
    /// an empty store.
    async fn reload(&mut self) -> StorageResult<()>;

    /// Releases the current session so the next operation starts from a fresh
    /// one. Unsaved changes are dropped.
    async fn close(&mut self) -> StorageResult<()>;

    async fn get(&self, kind: EntityKind, id: &str) -> StorageResult<Option<Entity>> {
        Ok(self.all(Some(kind)).await?.remove(&kind.key(id)))
    }

    /// Cities whose `state_id` is `state_id`.
    ///
    /// The default is a computed lookup over `all(City)`; relational backends
    /// override it with a relationship query.
    async fn cities_of(&self, state_id: &str) -> StorageResult<Vec<City>> {
        Ok(self
            .all(Some(EntityKind::City))
            .await?
            .into_values()
            .filter_map(City::from_entity)
            .filter(|c| c.state_id == state_id)
            .collect())
    }
}

impl<'a> dyn Storage + 'a {
    /// Typed variant of [`Storage::all`].
    pub async fn all_of<M: Model>(&self) -> StorageResult<Vec<M>> {
        Ok(self
            .all(Some(M::KIND))
            .await?
            .into_values()
            .filter_map(M::from_entity)
            .collect())
    }

    pub async fn get_of<M: Model>(&self, id: &str) -> StorageResult<Option<M>> {
        Ok(self.get(M::KIND, id).await?.and_then(M::from_entity))
    }

    /// Refreshes `updated_at`, registers the entity and saves everything pending.
    pub async fn save_entity(&mut self, entity: impl Into<Entity> + Send) -> StorageResult<Entity> {
        let mut entity = entity.into();
        entity.base_mut().touch();
        self.new(entity.clone()).await?;
        self.save().await?;
        Ok(entity)
    }
}

/// Builds the configured backend and loads its durable snapshot.
pub async fn open_storage(config: &Config) -> StorageResult<Box<dyn Storage>> {
    let mut storage: Box<dyn Storage> = match &config.storage {
        StorageBackend::File { path } => Box::new(FileStorage::open(path)),
        StorageBackend::Database { url } => {
            Box::new(DbStorage::connect(url, config.is_test_env()).await?)
        }
    };
    storage.reload().await?;
    tracing::info!(backend = storage.backend_name(), "storage engine ready");
    Ok(storage)
}
