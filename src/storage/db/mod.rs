//! Database backend over an sqlx `Any` pool.
//!
//! Registered and deleted entities are staged in a session and only reach
//! the database when `save` commits them in one transaction. Reads see the
//! committed rows with the session's staged changes laid over them.

pub mod schema;
pub(crate) mod session;

use session::Session;

use crate::domain::model::{City, Entity, EntityKind, Model};
use crate::storage::{ObjectMap, Storage, StorageResult};
use async_trait::async_trait;
use schema::{ColumnType, Table};
use serde_json::{Map, Value as JsonValue};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{Any, AnyPool, Row, ValueRef};

/// Value of one column, ready to bind.
#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Text(Option<String>),
    BigInt(Option<i64>),
    Double(Option<f64>),
}

pub struct DbStorage {
    pool: AnyPool,
    session: Option<Session>,
}

impl DbStorage {
    /// Connects to `database_url` (`postgres://…` or `sqlite://…`).
    ///
    /// With `drop_existing` every table is dropped first, which is what test
    /// environments want. No session is open until [`Storage::reload`].
    pub async fn connect(database_url: &str, drop_existing: bool) -> StorageResult<Self> {
        sqlx::any::install_default_drivers();

        // Every connection to `sqlite::memory:` is its own database.
        let max_connections = if database_url.starts_with("sqlite::memory:") {
            1
        } else {
            5
        };
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        if drop_existing {
            tracing::warn!("test environment: dropping all tables");
            schema::drop_all(&pool).await?;
        }

        Ok(Self { pool, session: None })
    }

    /// Number of staged changes in the open session.
    pub fn pending_len(&self) -> usize {
        self.session.as_ref().map_or(0, Session::len)
    }

    async fn fetch(
        &self,
        kind: EntityKind,
        filter: Option<(&str, &str)>,
    ) -> StorageResult<ObjectMap> {
        let table = schema::table(kind);
        let rows = match filter {
            None => sqlx::query(&table.select_sql()).fetch_all(&self.pool).await?,
            Some((column, value)) => {
                sqlx::query(&table.select_where_sql(column))
                    .bind(value.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut objects = ObjectMap::new();
        for row in rows {
            let entity = row_to_entity(kind, table, &row)?;
            objects.insert(entity.key(), entity);
        }
        Ok(objects)
    }
}

fn row_to_entity(kind: EntityKind, table: &Table, row: &AnyRow) -> StorageResult<Entity> {
    let mut record = Map::new();
    record.insert("__class__".to_string(), JsonValue::from(kind.name()));
    for column in table.columns {
        // `Any` refuses to decode NULL into `Option<T>`. A skipped column reads
        // as an absent field, which the entity's serde defaults fill in.
        if row.try_get_raw(column.name)?.is_null() {
            continue;
        }
        let value = match column.col_type {
            ColumnType::Text => JsonValue::from(row.try_get::<String, _>(column.name)?),
            ColumnType::BigInt => JsonValue::from(row.try_get::<i64, _>(column.name)?),
            ColumnType::Double => JsonValue::from(row.try_get::<f64, _>(column.name)?),
        };
        record.insert(column.name.to_string(), value);
    }
    Ok(Entity::from_dict(JsonValue::Object(record))?)
}

/// Column values of `entity` in table order. Missing fields bind as NULL and
/// are left to the schema's constraints.
fn entity_to_values(table: &Table, entity: &Entity) -> StorageResult<Vec<SqlValue>> {
    let dict = entity.to_dict()?;
    Ok(table
        .columns
        .iter()
        .map(|column| {
            let field = dict.get(column.name);
            match column.col_type {
                ColumnType::Text => {
                    SqlValue::Text(field.and_then(|v| v.as_str()).map(str::to_string))
                }
                ColumnType::BigInt => SqlValue::BigInt(field.and_then(JsonValue::as_i64)),
                ColumnType::Double => SqlValue::Double(field.and_then(JsonValue::as_f64)),
            }
        })
        .collect())
}

async fn upsert_in_tx(
    tx: &mut sqlx::Transaction<'_, Any>,
    entity: &Entity,
) -> StorageResult<()> {
    let table = schema::table(entity.kind());
    let sql = table.upsert_sql();
    let mut query = sqlx::query(&sql);
    for value in entity_to_values(table, entity)? {
        query = match value {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::BigInt(v) => query.bind(v),
            SqlValue::Double(v) => query.bind(v),
        };
    }
    query.execute(tx.as_mut()).await?;
    Ok(())
}

async fn delete_in_tx(
    tx: &mut sqlx::Transaction<'_, Any>,
    kind: EntityKind,
    id: &str,
) -> StorageResult<()> {
    if kind == EntityKind::State {
        // Children go first; the FK cascade is not enforced on every engine.
        sqlx::query("DELETE FROM cities WHERE state_id = $1")
            .bind(id.to_string())
            .execute(tx.as_mut())
            .await?;
    }
    sqlx::query(&schema::table(kind).delete_sql())
        .bind(id.to_string())
        .execute(tx.as_mut())
        .await?;
    Ok(())
}

#[async_trait]
impl Storage for DbStorage {
    fn backend_name(&self) -> &'static str {
        "db"
    }

    async fn all(&self, kind: Option<EntityKind>) -> StorageResult<ObjectMap> {
        let Some(session) = &self.session else {
            return Ok(ObjectMap::new());
        };

        let mut objects = ObjectMap::new();
        match kind {
            Some(kind) => objects = self.fetch(kind, None).await?,
            None => {
                for kind in EntityKind::ALL {
                    objects.extend(self.fetch(kind, None).await?);
                }
            }
        }
        session.overlay(kind, &mut objects);
        Ok(objects)
    }

    async fn new(&mut self, entity: Entity) -> StorageResult<()> {
        match &mut self.session {
            Some(session) => {
                tracing::debug!(key = %entity.key(), "staging object");
                session.stage_upsert(entity);
            }
            None => tracing::warn!(key = %entity.key(), "no open session, object not registered"),
        }
        Ok(())
    }

    async fn save(&mut self) -> StorageResult<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        if session.is_empty() {
            return Ok(());
        }

        // Dropping the transaction on an early return rolls it back, and the
        // session keeps its staged changes.
        let mut tx = self.pool.begin().await?;
        for kind in EntityKind::ALL.into_iter().rev() {
            for id in session.deletes_of(kind) {
                delete_in_tx(&mut tx, kind, id).await?;
            }
        }
        for kind in EntityKind::ALL {
            for entity in session.upserts_of(kind) {
                upsert_in_tx(&mut tx, entity).await?;
            }
        }
        tx.commit().await?;

        let committed = session.len();
        if let Some(session) = &mut self.session {
            session.clear();
        }
        tracing::info!(changes = committed, "transaction committed");
        Ok(())
    }

    async fn delete(&mut self, entity: Option<&Entity>) -> StorageResult<()> {
        let Some(entity) = entity else {
            return Ok(());
        };
        if self.session.is_none() {
            tracing::warn!(key = %entity.key(), "no open session, delete ignored");
            return Ok(());
        }

        let cascaded = if let Entity::State(state) = entity {
            self.cities_of(&state.base.id).await?
        } else {
            Vec::new()
        };

        if let Some(session) = &mut self.session {
            for city in &cascaded {
                session.stage_delete(EntityKind::City, city.id());
            }
            session.stage_delete(entity.kind(), entity.id());
        }
        tracing::debug!(key = %entity.key(), cascaded = cascaded.len(), "delete staged");
        Ok(())
    }

    async fn reload(&mut self) -> StorageResult<()> {
        schema::create_all(&self.pool).await?;
        self.session = Some(Session::default());
        tracing::debug!("database session opened");
        Ok(())
    }

    async fn close(&mut self) -> StorageResult<()> {
        if let Some(session) = &mut self.session {
            if !session.is_empty() {
                tracing::debug!(dropped = session.len(), "closing session with unsaved changes");
            }
            *session = Session::default();
        }
        Ok(())
    }

    async fn cities_of(&self, state_id: &str) -> StorageResult<Vec<City>> {
        let Some(session) = &self.session else {
            return Ok(Vec::new());
        };
        let mut cities = self
            .fetch(EntityKind::City, Some(("state_id", state_id)))
            .await?;
        session.overlay(Some(EntityKind::City), &mut cities);
        Ok(cities
            .into_values()
            .filter_map(City::from_entity)
            .filter(|c| c.state_id == state_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Place, State};

    #[test]
    fn values_follow_table_column_order() {
        let state = State::new("Maine");
        let entity: Entity = state.clone().into();
        let values = entity_to_values(schema::table(EntityKind::State), &entity).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], SqlValue::Text(Some(state.base.id.clone())));
        assert_eq!(values[3], SqlValue::Text(Some("Maine".to_string())));
    }

    #[test]
    fn optional_place_fields_bind_as_null() {
        let mut place = Place::new("c1", "u1", "Cabin");
        place.price_by_night = 120;
        let entity: Entity = place.into();
        let table = schema::table(EntityKind::Place);
        let values = entity_to_values(table, &entity).unwrap();
        let by_name: Vec<(&str, &SqlValue)> =
            table.columns.iter().map(|c| c.name).zip(values.iter()).collect();
        assert!(by_name.contains(&("description", &SqlValue::Text(None))));
        assert!(by_name.contains(&("price_by_night", &SqlValue::BigInt(Some(120)))));
        assert!(by_name.contains(&("latitude", &SqlValue::Double(None))));
    }
}
