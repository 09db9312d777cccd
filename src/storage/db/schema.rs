//! Relational schema: one table per entity kind.
//!
//! The DDL sticks to the subset Postgres and SQLite share, so the same
//! statements serve production and local runs. Timestamps are stored as
//! RFC 3339 text.

use crate::domain::model::EntityKind;
use sqlx::AnyPool;

/// How a column is bound and decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    BigInt,
    Double,
}

#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    /// Every column, `id` first.
    pub columns: &'static [Column],
    pub create_sql: &'static str,
}

const fn text(name: &'static str) -> Column {
    Column { name, col_type: ColumnType::Text }
}

const fn bigint(name: &'static str) -> Column {
    Column { name, col_type: ColumnType::BigInt }
}

const fn double(name: &'static str) -> Column {
    Column { name, col_type: ColumnType::Double }
}

static USERS: Table = Table {
    name: "users",
    columns: &[
        text("id"),
        text("created_at"),
        text("updated_at"),
        text("email"),
        text("password"),
        text("first_name"),
        text("last_name"),
    ],
    create_sql: "CREATE TABLE IF NOT EXISTS users (
        id VARCHAR(60) PRIMARY KEY,
        created_at VARCHAR(40) NOT NULL,
        updated_at VARCHAR(40) NOT NULL,
        email VARCHAR(128) NOT NULL,
        password VARCHAR(128) NOT NULL,
        first_name VARCHAR(128),
        last_name VARCHAR(128)
    )",
};

static STATES: Table = Table {
    name: "states",
    columns: &[text("id"), text("created_at"), text("updated_at"), text("name")],
    create_sql: "CREATE TABLE IF NOT EXISTS states (
        id VARCHAR(60) PRIMARY KEY,
        created_at VARCHAR(40) NOT NULL,
        updated_at VARCHAR(40) NOT NULL,
        name VARCHAR(128) NOT NULL
    )",
};

static CITIES: Table = Table {
    name: "cities",
    columns: &[
        text("id"),
        text("created_at"),
        text("updated_at"),
        text("state_id"),
        text("name"),
    ],
    create_sql: "CREATE TABLE IF NOT EXISTS cities (
        id VARCHAR(60) PRIMARY KEY,
        created_at VARCHAR(40) NOT NULL,
        updated_at VARCHAR(40) NOT NULL,
        state_id VARCHAR(60) NOT NULL REFERENCES states(id) ON DELETE CASCADE,
        name VARCHAR(128) NOT NULL
    )",
};

static AMENITIES: Table = Table {
    name: "amenities",
    columns: &[text("id"), text("created_at"), text("updated_at"), text("name")],
    create_sql: "CREATE TABLE IF NOT EXISTS amenities (
        id VARCHAR(60) PRIMARY KEY,
        created_at VARCHAR(40) NOT NULL,
        updated_at VARCHAR(40) NOT NULL,
        name VARCHAR(128) NOT NULL
    )",
};

static PLACES: Table = Table {
    name: "places",
    columns: &[
        text("id"),
        text("created_at"),
        text("updated_at"),
        text("city_id"),
        text("user_id"),
        text("name"),
        text("description"),
        bigint("number_rooms"),
        bigint("number_bathrooms"),
        bigint("max_guest"),
        bigint("price_by_night"),
        double("latitude"),
        double("longitude"),
    ],
    create_sql: "CREATE TABLE IF NOT EXISTS places (
        id VARCHAR(60) PRIMARY KEY,
        created_at VARCHAR(40) NOT NULL,
        updated_at VARCHAR(40) NOT NULL,
        city_id VARCHAR(60) NOT NULL,
        user_id VARCHAR(60) NOT NULL,
        name VARCHAR(128) NOT NULL,
        description VARCHAR(1024),
        number_rooms BIGINT NOT NULL DEFAULT 0,
        number_bathrooms BIGINT NOT NULL DEFAULT 0,
        max_guest BIGINT NOT NULL DEFAULT 0,
        price_by_night BIGINT NOT NULL DEFAULT 0,
        latitude DOUBLE PRECISION,
        longitude DOUBLE PRECISION
    )",
};

static REVIEWS: Table = Table {
    name: "reviews",
    columns: &[
        text("id"),
        text("created_at"),
        text("updated_at"),
        text("place_id"),
        text("user_id"),
        text("text"),
    ],
    create_sql: "CREATE TABLE IF NOT EXISTS reviews (
        id VARCHAR(60) PRIMARY KEY,
        created_at VARCHAR(40) NOT NULL,
        updated_at VARCHAR(40) NOT NULL,
        place_id VARCHAR(60) NOT NULL,
        user_id VARCHAR(60) NOT NULL,
        text VARCHAR(1024) NOT NULL
    )",
};

pub fn table(kind: EntityKind) -> &'static Table {
    match kind {
        EntityKind::User => &USERS,
        EntityKind::State => &STATES,
        EntityKind::City => &CITIES,
        EntityKind::Amenity => &AMENITIES,
        EntityKind::Place => &PLACES,
        EntityKind::Review => &REVIEWS,
    }
}

impl Table {
    pub fn select_sql(&self) -> String {
        format!("SELECT {} FROM {}", self.column_list(), self.name)
    }

    pub fn select_where_sql(&self, column: &str) -> String {
        format!("{} WHERE {} = $1", self.select_sql(), column)
    }

    /// Insert-or-replace keyed on `id`.
    pub fn upsert_sql(&self) -> String {
        let placeholders: Vec<String> =
            (1..=self.columns.len()).map(|i| format!("${}", i)).collect();
        let updates: Vec<String> = self
            .columns
            .iter()
            .skip(1)
            .map(|c| format!("{0} = excluded.{0}", c.name))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT (id) DO UPDATE SET {}",
            self.name,
            self.column_list(),
            placeholders.join(", "),
            updates.join(", ")
        )
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE id = $1", self.name)
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Creates every table that does not exist yet, parents first.
pub async fn create_all(pool: &AnyPool) -> Result<(), sqlx::Error> {
    for kind in EntityKind::ALL {
        sqlx::query(table(kind).create_sql).execute(pool).await?;
    }
    Ok(())
}

/// Drops every table, children first.
pub async fn drop_all(pool: &AnyPool) -> Result<(), sqlx::Error> {
    for kind in EntityKind::ALL.into_iter().rev() {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table(kind).name))
            .execute(pool)
            .await?;
    }
    Ok(())
}
