//! Domain model definitions for the listing site.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

pub mod base;
pub mod entities;

pub use base::BaseModel;
pub use entities::{Amenity, City, Place, Review, State, User};

/// The set of known entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl EntityKind {
    /// Every kind, parents before the kinds that reference them.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::User,
        EntityKind::State,
        EntityKind::City,
        EntityKind::Amenity,
        EntityKind::Place,
        EntityKind::Review,
    ];

    /// The class name used in composite keys and in `__class__`.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::State => "State",
            EntityKind::City => "City",
            EntityKind::Amenity => "Amenity",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
        }
    }

    /// Composite key `"<TypeName>.<id>"`.
    pub fn key(self, id: &str) -> String {
        format!("{}.{}", self.name(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown entity type '{}'", s))
    }
}

/// Any persisted record. Serializes with its class name under `__class__`,
/// which is what lets a snapshot be read back into the right concrete type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__class__")]
pub enum Entity {
    User(User),
    State(State),
    City(City),
    Amenity(Amenity),
    Place(Place),
    Review(Review),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::User(_) => EntityKind::User,
            Entity::State(_) => EntityKind::State,
            Entity::City(_) => EntityKind::City,
            Entity::Amenity(_) => EntityKind::Amenity,
            Entity::Place(_) => EntityKind::Place,
            Entity::Review(_) => EntityKind::Review,
        }
    }

    pub fn base(&self) -> &BaseModel {
        match self {
            Entity::User(e) => &e.base,
            Entity::State(e) => &e.base,
            Entity::City(e) => &e.base,
            Entity::Amenity(e) => &e.base,
            Entity::Place(e) => &e.base,
            Entity::Review(e) => &e.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseModel {
        match self {
            Entity::User(e) => &mut e.base,
            Entity::State(e) => &mut e.base,
            Entity::City(e) => &mut e.base,
            Entity::Amenity(e) => &mut e.base,
            Entity::Place(e) => &mut e.base,
            Entity::Review(e) => &mut e.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn key(&self) -> String {
        self.kind().key(self.id())
    }

    /// Dict form of the record, `__class__` included.
    pub fn to_dict(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }

    pub fn from_dict(value: JsonValue) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// Typed access to one variant of [`Entity`].
pub trait Model: Into<Entity> + Sized + Send {
    const KIND: EntityKind;

    fn base(&self) -> &BaseModel;

    /// Returns the record if `entity` is of this type.
    fn from_entity(entity: Entity) -> Option<Self>;

    fn id(&self) -> &str {
        &self.base().id
    }

    fn key(&self) -> String {
        Self::KIND.key(self.id())
    }
}

macro_rules! impl_model {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Model for $ty {
                const KIND: EntityKind = EntityKind::$ty;

                fn base(&self) -> &BaseModel {
                    &self.base
                }

                fn from_entity(entity: Entity) -> Option<Self> {
                    match entity {
                        Entity::$ty(e) => Some(e),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Entity {
                fn from(e: $ty) -> Self {
                    Entity::$ty(e)
                }
            }
        )*
    };
}

impl_model!(User, State, City, Amenity, Place, Review);
