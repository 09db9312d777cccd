//! Reshapes storage objects into the views the pages render.
//!
//! Everything here reads through the storage façade only, so the same code
//! serves the file and the database backends. Lists are sorted by name.

use crate::domain::model::{Amenity, City, Place, State, User};
use crate::storage::{Storage, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateView {
    pub id: String,
    pub name: String,
    pub cities: Vec<CityView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmenityView {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceView {
    pub name: String,
    /// Owner's full name; empty when the owner no longer exists.
    pub owner: String,
    pub description: String,
    pub price: i64,
    pub rooms: i64,
    pub bathrooms: i64,
    pub max_guests: i64,
}

fn city_views(mut cities: Vec<City>) -> Vec<CityView> {
    cities.sort_by(|a, b| a.name.cmp(&b.name));
    cities
        .into_iter()
        .map(|c| CityView {
            id: c.base.id,
            name: c.name,
        })
        .collect()
}

async fn sorted_states(storage: &dyn Storage) -> StorageResult<Vec<State>> {
    let mut states = storage.all_of::<State>().await?;
    states.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(states)
}

async fn with_cities(storage: &dyn Storage, state: State) -> StorageResult<StateView> {
    let cities = storage.cities_of(&state.base.id).await?;
    Ok(StateView {
        id: state.base.id,
        name: state.name,
        cities: city_views(cities),
    })
}

/// States without their cities.
pub async fn states(storage: &dyn Storage) -> StorageResult<Vec<StateView>> {
    Ok(sorted_states(storage)
        .await?
        .into_iter()
        .map(|s| StateView {
            id: s.base.id,
            name: s.name,
            cities: Vec::new(),
        })
        .collect())
}

pub async fn states_with_cities(storage: &dyn Storage) -> StorageResult<Vec<StateView>> {
    let mut views = Vec::new();
    for state in sorted_states(storage).await? {
        views.push(with_cities(storage, state).await?);
    }
    Ok(views)
}

pub async fn state_with_cities(
    storage: &dyn Storage,
    id: &str,
) -> StorageResult<Option<StateView>> {
    match storage.get_of::<State>(id).await? {
        Some(state) => Ok(Some(with_cities(storage, state).await?)),
        None => Ok(None),
    }
}

pub async fn amenities(storage: &dyn Storage) -> StorageResult<Vec<AmenityView>> {
    let mut amenities = storage.all_of::<Amenity>().await?;
    amenities.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(amenities
        .into_iter()
        .map(|a| AmenityView { name: a.name })
        .collect())
}

pub async fn places(storage: &dyn Storage) -> StorageResult<Vec<PlaceView>> {
    let mut places = storage.all_of::<Place>().await?;
    places.sort_by(|a, b| a.name.cmp(&b.name));

    let mut views = Vec::with_capacity(places.len());
    for place in places {
        let owner = storage
            .get_of::<User>(&place.user_id)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_default();
        views.push(PlaceView {
            name: place.name,
            owner,
            description: place.description.unwrap_or_default(),
            price: place.price_by_night,
            rooms: place.number_rooms,
            bathrooms: place.number_bathrooms,
            max_guests: place.max_guest,
        });
    }
    Ok(views)
}
