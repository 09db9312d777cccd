//! File backend lifecycle: register, save, reload in a fresh engine, delete.

use hbnb::{Amenity, City, Entity, EntityKind, FileStorage, Model, State, Storage, User};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> Box<dyn Storage> {
    Box::new(FileStorage::open(dir.path().join("file.json")))
}

#[tokio::test]
async fn missing_snapshot_is_an_empty_store() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut storage = store_in(&dir);
    storage.reload().await?;
    assert!(storage.all(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn saved_state_survives_a_fresh_engine() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;

    let mut first = store_in(&dir);
    first.reload().await?;
    let california = State::new("California");
    first.new(california.clone().into()).await?;
    first.save().await?;
    drop(first);

    let mut second = store_in(&dir);
    second.reload().await?;
    let states = second.all(Some(EntityKind::State)).await?;
    assert_eq!(states.len(), 1);
    let stored = states.get(&california.key()).expect("state present");
    assert_eq!(stored, &Entity::State(california));
    Ok(())
}

#[tokio::test]
async fn snapshot_embeds_class_names() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut storage = store_in(&dir);
    storage.reload().await?;
    let amenity = Amenity::new("Wifi");
    storage.new(amenity.clone().into()).await?;
    storage.save().await?;

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("file.json"))?)?;
    let record = &raw[amenity.key()];
    assert_eq!(record["__class__"], "Amenity");
    assert_eq!(record["name"], "Wifi");
    assert_eq!(record["id"], amenity.base.id.as_str());
    Ok(())
}

#[tokio::test]
async fn all_filters_by_exact_type() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut storage = store_in(&dir);
    storage.reload().await?;

    let state = State::new("Oregon");
    let city = City::new(&state.base.id, "Portland");
    let user = User::new("host@example.com", "secret");
    for e in [Entity::from(state.clone()), city.clone().into(), user.clone().into()] {
        storage.new(e).await?;
    }

    let states = storage.all(Some(EntityKind::State)).await?;
    assert_eq!(states.keys().collect::<Vec<_>>(), vec![&state.key()]);

    let everything = storage.all(None).await?;
    assert_eq!(everything.len(), 3);
    assert!(everything.contains_key(&city.key()));
    assert!(everything.contains_key(&user.key()));
    Ok(())
}

#[tokio::test]
async fn delete_removes_exactly_one_instance() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut storage = store_in(&dir);
    storage.reload().await?;

    let keep = State::new("Idaho");
    let gone = State::new("Iowa");
    storage.new(keep.clone().into()).await?;
    storage.new(gone.clone().into()).await?;
    storage.save().await?;

    storage.delete(Some(&gone.clone().into())).await?;
    storage.delete(None).await?;
    storage.save().await?;
    storage.reload().await?;

    let states = storage.all(Some(EntityKind::State)).await?;
    assert!(states.contains_key(&keep.key()));
    assert!(!states.contains_key(&gone.key()));
    Ok(())
}

#[tokio::test]
async fn close_drops_unsaved_changes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut storage = store_in(&dir);
    storage.reload().await?;
    storage.new(State::new("Draft").into()).await?;
    storage.close().await?;
    storage.close().await?;
    assert!(storage.all(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn save_entity_refreshes_updated_at() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut storage = store_in(&dir);
    storage.reload().await?;

    let mut state = State::new("Vermont");
    state.base.updated_at = state.base.created_at - chrono::Duration::hours(1);
    let saved = storage.save_entity(state.clone()).await?;
    assert!(saved.base().updated_at > state.base.updated_at);

    storage.reload().await?;
    let reloaded: Vec<State> = storage.all_of::<State>().await?;
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].base.updated_at, saved.base().updated_at);
    Ok(())
}

#[tokio::test]
async fn cities_are_computed_from_the_live_set() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut storage = store_in(&dir);
    storage.reload().await?;

    let state = State::new("Washington");
    let other = State::new("Montana");
    storage.new(state.clone().into()).await?;
    storage.new(other.clone().into()).await?;
    storage.new(City::new(&state.base.id, "Seattle").into()).await?;
    storage.new(City::new(&state.base.id, "Spokane").into()).await?;
    storage.new(City::new(&other.base.id, "Helena").into()).await?;

    let mut names: Vec<String> = storage
        .cities_of(&state.base.id)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Seattle", "Spokane"]);
    Ok(())
}

#[tokio::test]
async fn corrupt_snapshot_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("file.json"), b"{not json")?;
    let mut storage = store_in(&dir);
    let err = storage.reload().await.unwrap_err();
    assert!(matches!(err, hbnb::StorageError::Serialization(_)));
    Ok(())
}
