use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EaseParkError;
use crate::carpark::{CarparkRecord, VehicleType};
use crate::preferences::FavoriteSet;

/// Sortable table columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "displayAddress")]
    DisplayAddress,
    #[serde(rename = "opening_status")]
    OpeningStatus,
    #[serde(rename = "vacancy")]
    Vacancy,
}

impl SortKey {
    /// Columns in display order.
    pub const ALL: [SortKey; 4] = [
        SortKey::Name,
        SortKey::DisplayAddress,
        SortKey::OpeningStatus,
        SortKey::Vacancy,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DisplayAddress => "displayAddress",
            Self::OpeningStatus => "opening_status",
            Self::Vacancy => "vacancy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Carpark Name",
            Self::DisplayAddress => "Address",
            Self::OpeningStatus => "Status",
            Self::Vacancy => "Vacancy",
        }
    }

    fn text<'r>(&self, record: &'r CarparkRecord) -> &'r str {
        match self {
            Self::Name => &record.name,
            Self::DisplayAddress => &record.display_address,
            Self::OpeningStatus => &record.opening_status,
            Self::Vacancy => record.vacancy.as_str(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortKey {
    type Err = EaseParkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| EaseParkError::UnknownSortColumn {
                value: s.to_string(),
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Vacancy,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// State after a click on the `key` header. Only a second click on a column that
    /// is currently ascending flips it to descending; anything else sorts ascending.
    pub fn clicked(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self { key, direction }
    }

    /// Header arrow for `key`.
    pub fn indicator(&self, key: SortKey) -> &'static str {
        if self.key == key && self.direction == SortDirection::Descending {
            "▼"
        } else {
            "▲"
        }
    }

    /// Ascending comparison for this column.
    pub fn compare(&self, a: &CarparkRecord, b: &CarparkRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::Vacancy => a.vacancy.sort_value().cmp(&b.vacancy.sort_value()),
            key => compare_text(key.text(a), key.text(b)),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

// Case-insensitive first, then lowercase before uppercase on ties.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub vehicle_type: VehicleType,
    pub search: String,
}

impl FilterState {
    pub fn new(vehicle_type: VehicleType) -> Self {
        Self {
            vehicle_type,
            search: String::new(),
        }
    }

    /// Case-insensitive substring match on name or address. A blank search matches everything.
    pub fn matches_search(&self, record: &CarparkRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || record.name.to_lowercase().contains(&needle)
            || record.display_address.to_lowercase().contains(&needle)
    }

    pub fn is_available(&self, record: &CarparkRecord) -> bool {
        record.vacancy_for(self.vehicle_type).is_available()
    }
}

/// The presentation lists derived from one snapshot of dashboard state.
#[derive(Debug, Default, PartialEq)]
pub struct DerivedLists<'a> {
    /// Carparks with a usable vacancy, search-filtered, sorted, favorites first.
    pub available: Vec<&'a CarparkRecord>,
    /// Favorited carparks in collection order, search-filtered only.
    pub favorites: Vec<&'a CarparkRecord>,
}

pub fn available_list<'a>(
    records: &'a [CarparkRecord],
    filter: &FilterState,
    sort: &SortState,
    favorites: &FavoriteSet,
) -> Vec<&'a CarparkRecord> {
    let mut matching: Vec<&CarparkRecord> = records
        .iter()
        .filter(|r| filter.is_available(r))
        .filter(|r| filter.matches_search(r))
        .collect();
    matching.sort_by(|a, b| sort.compare(a, b));

    let (mut favorited, rest): (Vec<_>, Vec<_>) = matching
        .into_iter()
        .partition(|r| favorites.contains(&r.park_id));
    favorited.extend(rest);
    favorited
}

pub fn favorites_list<'a>(
    records: &'a [CarparkRecord],
    filter: &FilterState,
    favorites: &FavoriteSet,
) -> Vec<&'a CarparkRecord> {
    records
        .iter()
        .filter(|r| favorites.contains(&r.park_id))
        .filter(|r| filter.matches_search(r))
        .collect()
}

pub fn derive<'a>(
    records: &'a [CarparkRecord],
    filter: &FilterState,
    sort: &SortState,
    favorites: &FavoriteSet,
) -> DerivedLists<'a> {
    DerivedLists {
        available: available_list(records, filter, sort, favorites),
        favorites: favorites_list(records, filter, favorites),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carpark::{Vacancy, VacancyByType, VACANCY_SENTINELS};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn record(id: &str, name: &str, private_car: &str) -> CarparkRecord {
        let mut vacancies = VacancyByType::default();
        vacancies.set(VehicleType::PrivateCar, Vacancy::new(private_car));
        CarparkRecord {
            park_id: id.to_string(),
            name: name.to_string(),
            display_address: format!("{} Road", id),
            latitude: 22.28,
            longitude: 114.16,
            opening_status: "OPEN".to_string(),
            vacancy: Vacancy::new(private_car),
            vacancies,
        }
    }

    fn ids(list: &[&CarparkRecord]) -> Vec<String> {
        list.iter().map(|r| r.park_id.clone()).collect()
    }

    #[test]
    fn test_scenario_available_and_favorites() {
        let records = vec![
            record("A1", "Central Carpark", "5"),
            record("B2", "Admiralty Carpark", "N/A"),
        ];
        let filter = FilterState::new(VehicleType::PrivateCar);
        let favorites: FavoriteSet = ["A1", "B2"].into_iter().collect();

        let lists = derive(&records, &filter, &SortState::default(), &favorites);
        assert_eq!(ids(&lists.available), vec!["A1"]);
        assert_eq!(ids(&lists.favorites), vec!["A1", "B2"]);
    }

    #[test]
    fn test_header_click_sequence() {
        let sort = SortState::new(SortKey::Name, SortDirection::Ascending);
        let sort = sort.clicked(SortKey::Vacancy);
        assert_eq!(sort, SortState::new(SortKey::Vacancy, SortDirection::Ascending));
        let sort = sort.clicked(SortKey::Vacancy);
        assert_eq!(sort, SortState::new(SortKey::Vacancy, SortDirection::Descending));
        // a third click goes back to ascending
        let sort = sort.clicked(SortKey::Vacancy);
        assert_eq!(sort.direction, SortDirection::Ascending);
        // switching column always resets to ascending
        let sort = SortState::default().clicked(SortKey::Name);
        assert_eq!(sort, SortState::new(SortKey::Name, SortDirection::Ascending));
    }

    #[test]
    fn test_indicator() {
        let sort = SortState::default();
        assert_eq!(sort.indicator(SortKey::Vacancy), "▼");
        assert_eq!(sort.indicator(SortKey::Name), "▲");
        let sort = SortState::new(SortKey::Name, SortDirection::Ascending);
        assert_eq!(sort.indicator(SortKey::Name), "▲");
    }

    #[test]
    fn test_sentinels_are_excluded_from_available() {
        let records = vec![
            record("A", "a", "none"),
            record("B", "b", "-1"),
            record("C", "c", "N/A"),
            record("D", "d", "0"),
        ];
        let favorites: FavoriteSet = ["A", "B"].into_iter().collect();
        let filter = FilterState::new(VehicleType::PrivateCar);
        let lists = derive(&records, &filter, &SortState::default(), &favorites);
        assert_eq!(ids(&lists.available), vec!["D"]);
        assert_eq!(ids(&lists.favorites), vec!["A", "B"]);
    }

    #[test]
    fn test_availability_uses_selected_vehicle_type() {
        let records = vec![record("A", "a", "5")];
        let filter = FilterState::new(VehicleType::Coach);
        let lists = derive(&records, &filter, &SortState::default(), &FavoriteSet::new());
        assert!(lists.available.is_empty());
    }

    #[test]
    fn test_vacancy_sort_is_numeric() {
        let records = vec![
            record("A", "a", "9"),
            record("B", "b", "10"),
            record("C", "c", "100"),
        ];
        let filter = FilterState::new(VehicleType::PrivateCar);
        let asc = SortState::new(SortKey::Vacancy, SortDirection::Ascending);
        let list = available_list(&records, &filter, &asc, &FavoriteSet::new());
        assert_eq!(ids(&list), vec!["A", "B", "C"]);
        let list = available_list(&records, &filter, &SortState::default(), &FavoriteSet::new());
        assert_eq!(ids(&list), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let records = vec![
            record("A", "banana", "1"),
            record("B", "Apple", "1"),
            record("C", "cherry", "1"),
        ];
        let filter = FilterState::new(VehicleType::PrivateCar);
        let asc = SortState::new(SortKey::Name, SortDirection::Ascending);
        let list = available_list(&records, &filter, &asc, &FavoriteSet::new());
        assert_eq!(ids(&list), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_favorites_come_first_and_keep_sort_order() {
        let records = vec![
            record("A", "a", "1"),
            record("B", "b", "2"),
            record("C", "c", "3"),
            record("D", "d", "4"),
        ];
        let favorites: FavoriteSet = ["A", "C"].into_iter().collect();
        let filter = FilterState::new(VehicleType::PrivateCar);
        let list = available_list(&records, &filter, &SortState::default(), &favorites);
        assert_eq!(ids(&list), vec!["C", "A", "D", "B"]);
    }

    #[test]
    fn test_search_matches_name_or_address_case_insensitively() {
        let records = vec![
            record("A1", "Central Carpark", "5"),
            record("B2", "Admiralty Carpark", "7"),
        ];
        let mut filter = FilterState::new(VehicleType::PrivateCar);

        filter.search = "  central ".to_string();
        let list = available_list(&records, &filter, &SortState::default(), &FavoriteSet::new());
        assert_eq!(ids(&list), vec!["A1"]);

        filter.search = "b2 road".to_string();
        let list = available_list(&records, &filter, &SortState::default(), &FavoriteSet::new());
        assert_eq!(ids(&list), vec!["B2"]);

        let favorites: FavoriteSet = ["A1"].into_iter().collect();
        filter.search = "admiralty".to_string();
        assert!(favorites_list(&records, &filter, &favorites).is_empty());
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("displayAddress".parse::<SortKey>().unwrap(), SortKey::DisplayAddress);
        assert!("address".parse::<SortKey>().is_err());
    }

    fn raw_vacancy() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u32..500).prop_map(|n| n.to_string()),
            proptest::sample::select(VACANCY_SENTINELS.to_vec()).prop_map(str::to_string),
        ]
    }

    fn records_strategy() -> impl Strategy<Value = Vec<CarparkRecord>> {
        proptest::collection::vec(("[A-Za-z ]{0,12}", raw_vacancy()), 0..30).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (name, vacancy))| record(&format!("P{}", i), &name, &vacancy))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_available_never_contains_sentinels(
            records in records_strategy(),
            fav_mask in proptest::collection::vec(any::<bool>(), 30),
        ) {
            let favorites: FavoriteSet = records
                .iter()
                .zip(fav_mask)
                .filter(|(_, fav)| *fav)
                .map(|(r, _)| r.park_id.clone())
                .collect();
            let filter = FilterState::new(VehicleType::PrivateCar);
            let lists = derive(&records, &filter, &SortState::default(), &favorites);

            for r in &lists.available {
                prop_assert!(!VACANCY_SENTINELS.contains(&r.vacancy_for(VehicleType::PrivateCar).as_str()));
            }
            for r in &lists.favorites {
                prop_assert!(favorites.contains(&r.park_id));
            }
            prop_assert_eq!(lists.favorites.len(), favorites.len());
        }

        #[test]
        fn prop_empty_search_matches_unfiltered(records in records_strategy(), blank in "[ ]{0,3}") {
            let mut filter = FilterState::new(VehicleType::PrivateCar);
            filter.search = blank;
            let list = available_list(&records, &filter, &SortState::default(), &FavoriteSet::new());
            let expected: HashSet<&str> = records
                .iter()
                .filter(|r| r.vacancy.is_available())
                .map(|r| r.park_id.as_str())
                .collect();
            let actual: HashSet<&str> = list.iter().map(|r| r.park_id.as_str()).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_vacancy_desc_reverses_asc(values in proptest::collection::hash_set(0u32..10_000, 0..40)) {
            let records: Vec<CarparkRecord> = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| record(&format!("P{}", i), "carpark", &v.to_string()))
                .collect();
            let filter = FilterState::new(VehicleType::PrivateCar);
            let none = FavoriteSet::new();

            let asc = available_list(&records, &filter, &SortState::new(SortKey::Vacancy, SortDirection::Ascending), &none);
            let mut desc = available_list(&records, &filter, &SortState::new(SortKey::Vacancy, SortDirection::Descending), &none);
            desc.reverse();
            prop_assert_eq!(ids(&asc), ids(&desc));
        }
    }
}
