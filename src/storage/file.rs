//! JSON file backend: the whole live set in memory, serialized to one file on save.

use crate::domain::model::{Entity, EntityKind};
use crate::storage::{ObjectMap, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed storage. The snapshot is a single JSON object mapping
/// `"<TypeName>.<id>"` to the record's dict form.
pub struct FileStorage {
    path: PathBuf,
    objects: ObjectMap,
}

impl FileStorage {
    /// Points the store at `path`. Nothing is read until [`Storage::reload`].
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: ObjectMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Parses a snapshot, checking each entry's key against the record it holds.
fn parse_snapshot(bytes: &[u8]) -> StorageResult<ObjectMap> {
    let raw: ObjectMap = serde_json::from_slice(bytes)?;
    for (key, entity) in &raw {
        if *key != entity.key() {
            return Err(StorageError::InvalidData(format!(
                "snapshot key '{}' holds record '{}'",
                key,
                entity.key()
            )));
        }
    }
    Ok(raw)
}

#[async_trait]
impl Storage for FileStorage {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn all(&self, kind: Option<EntityKind>) -> StorageResult<ObjectMap> {
        Ok(match kind {
            None => self.objects.clone(),
            Some(kind) => self
                .objects
                .iter()
                .filter(|(_, e)| e.kind() == kind)
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect(),
        })
    }

    async fn new(&mut self, entity: Entity) -> StorageResult<()> {
        tracing::debug!(key = %entity.key(), "registering object");
        self.objects.insert(entity.key(), entity);
        Ok(())
    }

    async fn save(&mut self) -> StorageResult<()> {
        let bytes = serde_json::to_vec(&self.objects)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        // Write-then-rename so a failed save never leaves a torn snapshot.
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::info!(
            path = %self.path.display(),
            objects = self.objects.len(),
            "snapshot saved"
        );
        Ok(())
    }

    async fn delete(&mut self, entity: Option<&Entity>) -> StorageResult<()> {
        let Some(entity) = entity else {
            return Ok(());
        };
        if self.objects.remove(&entity.key()).is_some() {
            tracing::debug!(key = %entity.key(), "object removed from live set");
        }
        Ok(())
    }

    async fn reload(&mut self) -> StorageResult<()> {
        self.objects = match tokio::fs::read(&self.path).await {
            Ok(bytes) => parse_snapshot(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot yet, starting empty");
                ObjectMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(objects = self.objects.len(), "snapshot loaded");
        Ok(())
    }

    async fn close(&mut self) -> StorageResult<()> {
        self.reload().await
    }
}
