// Runtime state of the dashboard, independent of any rendering

use log::{debug, error, info};

use crate::carpark::{CarparkRecord, FetchOutcome, FetchRequest, Vacancy, VehicleType};
use crate::preferences::{FavoriteSet, KeyValueStore, Preferences};
use crate::view_model::{self, DerivedLists, FilterState, SortKey, SortState};

/// Owns everything the user can change plus the last merged carpark collection.
///
/// Every interaction is a method here; methods that need new data return the
/// [`FetchRequest`] the caller must hand to a fetch worker. Each request carries a
/// fresh generation and [`Dashboard::apply`] ignores outcomes from older generations,
/// so a slow response for a previous vehicle type can never overwrite newer data.
pub struct Dashboard<S: KeyValueStore> {
    preferences: Preferences<S>,
    records: Vec<CarparkRecord>,
    filter: FilterState,
    sort: SortState,
    favorites: FavoriteSet,
    selected: Option<CarparkRecord>,
    loading: bool,
    generation: u64,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Restores favorites and vehicle type from `preferences`.
    pub fn new(preferences: Preferences<S>) -> Self {
        let favorites = preferences.favorites();
        let vehicle_type = preferences.vehicle_type();
        info!(
            "Restored {} favorites, vehicle type {}",
            favorites.len(),
            vehicle_type
        );

        Self {
            preferences,
            records: Vec::new(),
            filter: FilterState::new(vehicle_type),
            sort: SortState::default(),
            favorites,
            selected: None,
            loading: false,
            generation: 0,
        }
    }

    /// Starts a fetch for the current vehicle type.
    pub fn refresh(&mut self) -> FetchRequest {
        self.generation += 1;
        self.loading = true;
        FetchRequest {
            generation: self.generation,
            vehicle_type: self.filter.vehicle_type,
        }
    }

    /// Selects a vehicle type, persists it, and drops data merged for the previous one,
    /// including any open detail view. Returns `None` when the type is unchanged.
    pub fn set_vehicle_type(&mut self, vehicle_type: VehicleType) -> Option<FetchRequest> {
        if self.filter.vehicle_type == vehicle_type {
            return None;
        }
        self.filter.vehicle_type = vehicle_type;
        if let Err(e) = self.preferences.save_vehicle_type(vehicle_type) {
            error!("Failed to save vehicle type: {}", e);
        }
        self.records.clear();
        self.selected = None;
        Some(self.refresh())
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    /// Applies a header click.
    pub fn sort_by(&mut self, key: SortKey) {
        self.sort = self.sort.clicked(key);
        debug!("Sorting by {} {:?}", self.sort.key, self.sort.direction);
    }

    /// Toggles a favorite and persists the new set before returning.
    pub fn toggle_favorite(&mut self, park_id: &str) -> bool {
        let is_favorite = self.favorites.toggle(park_id);
        if let Err(e) = self.preferences.save_favorites(&self.favorites) {
            error!("Failed to save favorites: {}", e);
        }
        is_favorite
    }

    /// Installs a finished fetch. Returns `false` when the outcome was stale and dropped.
    /// Failures empty the collection.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                "Dropping stale fetch generation {} (current {})",
                outcome.generation, self.generation
            );
            return false;
        }

        self.loading = false;
        match outcome.result {
            Ok(records) => {
                info!(
                    "Loaded {} carparks for {}",
                    records.len(),
                    outcome.vehicle_type
                );
                self.records = records;
            }
            Err(e) => {
                error!("Error fetching data: {}", e);
                self.records.clear();
            }
        }
        true
    }

    /// Opens the detail overlay for `record`, replacing any current selection.
    pub fn select(&mut self, record: &CarparkRecord) {
        self.selected = Some(record.clone());
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&CarparkRecord> {
        self.selected.as_ref()
    }

    /// Vacancy of the selected carpark for the current vehicle type.
    pub fn selected_vacancy(&self) -> Option<&Vacancy> {
        self.selected
            .as_ref()
            .map(|r| r.vacancy_for(self.filter.vehicle_type))
    }

    pub fn lists(&self) -> DerivedLists<'_> {
        view_model::derive(&self.records, &self.filter, &self.sort, &self.favorites)
    }

    pub fn records(&self) -> &[CarparkRecord] {
        &self.records
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn is_favorite(&self, park_id: &str) -> bool {
        self.favorites.contains(park_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn preferences(&self) -> &Preferences<S> {
        &self.preferences
    }
}
