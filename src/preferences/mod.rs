mod storage;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::carpark::VehicleType;
use crate::errors::EaseParkError;

pub use storage::{FileStore, KeyValueStore, MemoryStore};

pub const FAVORITES_KEY: &str = "favorites";
pub const VEHICLE_TYPE_KEY: &str = "vehicleType";

/// Favorited park ids. Membership is what matters; insertion order is kept so the
/// persisted list stays stable between toggles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(Vec<String>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, park_id: &str) -> bool {
        self.0.iter().any(|id| id == park_id)
    }

    /// Adds `park_id` if absent, removes it if present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, park_id: &str) -> bool {
        if self.contains(park_id) {
            self.0.retain(|id| id != park_id);
            false
        } else {
            self.0.push(park_id.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = FavoriteSet::new();
        for id in iter {
            let id = id.into();
            if !set.contains(&id) {
                set.0.push(id);
            }
        }
        set
    }
}

/// Typed access to the two persisted preferences on top of a [`KeyValueStore`].
pub struct Preferences<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persisted favorites, or an empty set when nothing usable is stored.
    pub fn favorites(&self) -> FavoriteSet {
        match self.store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!("Ignoring malformed favorites {:?}: {}", raw, e);
                    FavoriteSet::new()
                }
            },
            Ok(None) => FavoriteSet::new(),
            Err(e) => {
                warn!("Could not read favorites: {}", e);
                FavoriteSet::new()
            }
        }
    }

    /// Persisted vehicle type, or [`VehicleType::PrivateCar`] when nothing usable is stored.
    pub fn vehicle_type(&self) -> VehicleType {
        match self.store.get(VEHICLE_TYPE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to default", e);
                VehicleType::default()
            }),
            Ok(None) => VehicleType::default(),
            Err(e) => {
                warn!("Could not read vehicle type: {}", e);
                VehicleType::default()
            }
        }
    }

    pub fn save_favorites(&mut self, favorites: &FavoriteSet) -> Result<(), EaseParkError> {
        let raw = serde_json::to_string(favorites)
            .map_err(|e| EaseParkError::ConfigSerializeError { source: e })?;
        debug!("Saving {} favorites", favorites.len());
        self.store.set(FAVORITES_KEY, &raw)
    }

    pub fn save_vehicle_type(&mut self, vehicle_type: VehicleType) -> Result<(), EaseParkError> {
        debug!("Saving vehicle type {}", vehicle_type);
        self.store.set(VEHICLE_TYPE_KEY, vehicle_type.key())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_when_store_is_empty() {
        let prefs = Preferences::new(MemoryStore::new());
        assert!(prefs.favorites().is_empty());
        assert_eq!(prefs.vehicle_type(), VehicleType::PrivateCar);
    }

    #[test]
    fn test_reads_persisted_values() {
        let store = MemoryStore::new()
            .with_value(FAVORITES_KEY, r#"["A1","B2"]"#)
            .with_value(VEHICLE_TYPE_KEY, "HGV");
        let prefs = Preferences::new(store);
        let favorites = prefs.favorites();
        assert!(favorites.contains("A1"));
        assert!(favorites.contains("B2"));
        assert_eq!(favorites.len(), 2);
        assert_eq!(prefs.vehicle_type(), VehicleType::Hgv);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let store = MemoryStore::new()
            .with_value(FAVORITES_KEY, "not a list")
            .with_value(VEHICLE_TYPE_KEY, "spaceship");
        let prefs = Preferences::new(store);
        assert!(prefs.favorites().is_empty());
        assert_eq!(prefs.vehicle_type(), VehicleType::PrivateCar);
    }

    #[test]
    fn test_save_writes_wire_format() {
        let mut prefs = Preferences::new(MemoryStore::new());
        let favorites: FavoriteSet = ["A1", "B2"].into_iter().collect();
        prefs.save_favorites(&favorites).unwrap();
        prefs.save_vehicle_type(VehicleType::MotorCycle).unwrap();

        assert_eq!(
            prefs.store().get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["A1","B2"]"#)
        );
        assert_eq!(
            prefs.store().get(VEHICLE_TYPE_KEY).unwrap().as_deref(),
            Some("motorCycle")
        );
        assert_eq!(prefs.favorites(), favorites);
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut favorites = FavoriteSet::new();
        assert!(favorites.toggle("A1"));
        assert!(favorites.contains("A1"));
        assert!(!favorites.toggle("A1"));
        assert!(!favorites.contains("A1"));
    }

    #[test]
    fn test_from_iter_drops_duplicates() {
        let favorites: FavoriteSet = ["A1", "B2", "A1"].into_iter().collect();
        assert_eq!(favorites.iter().collect::<Vec<_>>(), vec!["A1", "B2"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Toggling the same id twice restores the original set.
        #[test]
        fn prop_double_toggle_is_identity(
            ids in proptest::collection::vec("[A-Z][0-9]{1,3}", 0..10),
            target in "[A-Z][0-9]{1,3}",
        ) {
            let original: FavoriteSet = ids.into_iter().collect();
            let mut favorites = original.clone();
            favorites.toggle(&target);
            favorites.toggle(&target);

            prop_assert_eq!(favorites.len(), original.len());
            for id in original.iter() {
                prop_assert!(favorites.contains(id));
            }
            prop_assert_eq!(favorites.contains(&target), original.contains(&target));
        }
    }
}
