//! The concrete entity records of the listing site.

use super::BaseModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(flatten)]
    pub base: BaseModel,
    pub name: String,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseModel::new(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(flatten)]
    pub base: BaseModel,
    pub state_id: String,
    pub name: String,
}

impl City {
    pub fn new(state_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            base: BaseModel::new(),
            state_id: state_id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    #[serde(flatten)]
    pub base: BaseModel,
    pub name: String,
}

impl Amenity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseModel::new(),
            name: name.into(),
        }
    }
}

/// A rentable listing. `user_id` is the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(flatten)]
    pub base: BaseModel,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_rooms: i64,
    #[serde(default)]
    pub number_bathrooms: i64,
    #[serde(default)]
    pub max_guest: i64,
    #[serde(default)]
    pub price_by_night: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Place {
    pub fn new(
        city_id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            base: BaseModel::new(),
            city_id: city_id.into(),
            user_id: user_id.into(),
            name: name.into(),
            description: None,
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub base: BaseModel,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

impl Review {
    pub fn new(
        place_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            base: BaseModel::new(),
            place_id: place_id.into(),
            user_id: user_id.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub base: BaseModel,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base: BaseModel::new(),
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }

    /// "First Last", skipping whichever half is missing.
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
