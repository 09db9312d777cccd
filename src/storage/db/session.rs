//! Unit of work for the database backend: changes staged between commits.

use crate::domain::model::{Entity, EntityKind};
use crate::storage::ObjectMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    Upsert(Entity),
    Delete(EntityKind, String),
}

/// Pending changes keyed by composite key; the latest change to a key wins.
#[derive(Debug, Default)]
pub struct Session {
    pending: BTreeMap<String, Pending>,
}

impl Session {
    pub fn stage_upsert(&mut self, entity: Entity) {
        self.pending.insert(entity.key(), Pending::Upsert(entity));
    }

    pub fn stage_delete(&mut self, kind: EntityKind, id: &str) {
        self.pending
            .insert(kind.key(id), Pending::Delete(kind, id.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn upserts_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.pending.values().filter_map(move |p| match p {
            Pending::Upsert(e) if e.kind() == kind => Some(e),
            _ => None,
        })
    }

    pub fn deletes_of(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.pending.values().filter_map(move |p| match p {
            Pending::Delete(k, id) if *k == kind => Some(id.as_str()),
            _ => None,
        })
    }

    /// Applies staged changes of `kind` (or of every kind) on top of committed rows.
    pub fn overlay(&self, kind: Option<EntityKind>, objects: &mut ObjectMap) {
        for (key, pending) in &self.pending {
            match pending {
                Pending::Upsert(e) if kind.map_or(true, |k| k == e.kind()) => {
                    objects.insert(key.clone(), e.clone());
                }
                Pending::Delete(k, _) if kind.map_or(true, |want| want == *k) => {
                    objects.remove(key);
                }
                _ => {}
            }
        }
    }
}
