use std::collections::HashMap;

use itertools::Itertools;
use log::{info, warn};

use crate::EaseParkError;

use super::api::{CarparkInfo, CarparkProvider, CarparkVacancy};
use super::{CarparkRecord, VacancyByType, VehicleType};

/// Builds the per-carpark vacancy lookup. Each vehicle type takes the first reported
/// entry, or "N/A" when the provider sent none. Later entries for the same park id
/// replace earlier ones. Entries without a park id are skipped.
pub fn vacancy_lookup(vacancies: &[CarparkVacancy]) -> HashMap<&str, VacancyByType> {
    let (with_id, without_id): (Vec<_>, Vec<_>) =
        vacancies.iter().partition(|entry| has_park_id(&entry.park_id));
    if !without_id.is_empty() {
        warn!("Skipped {} vacancy entries without a park id", without_id.len());
    }

    with_id
        .into_iter()
        .map(|entry| {
            let mut by_type = VacancyByType::default();
            for vt in VehicleType::ALL {
                if let Some(first) = entry.reports(vt).first() {
                    by_type.set(vt, first.normalized());
                }
            }
            (entry.park_id.as_str(), by_type)
        })
        .collect()
}

/// Merges metadata with live vacancy. Output order follows the metadata response and
/// park ids are unique (the first occurrence wins). Carparks without an id are dropped.
pub fn merge_carparks(
    info: Vec<CarparkInfo>,
    vacancies: &[CarparkVacancy],
    vehicle_type: VehicleType,
) -> Vec<CarparkRecord> {
    let lookup = vacancy_lookup(vacancies);
    let (info, without_id): (Vec<_>, Vec<_>) = info
        .into_iter()
        .partition(|carpark| has_park_id(&carpark.park_id));
    if !without_id.is_empty() {
        warn!("Dropped {} carparks without a park id", without_id.len());
    }
    let total = info.len();

    let merged = info
        .into_iter()
        .unique_by(|carpark| carpark.park_id.clone())
        .map(|carpark| {
            let vacancies = lookup
                .get(carpark.park_id.as_str())
                .cloned()
                .unwrap_or_default();
            let vacancy = vacancies.get(vehicle_type).clone();
            CarparkRecord {
                park_id: carpark.park_id,
                name: carpark.name.unwrap_or_default(),
                display_address: carpark.display_address.unwrap_or_default(),
                latitude: carpark.latitude.unwrap_or_default(),
                longitude: carpark.longitude.unwrap_or_default(),
                opening_status: carpark.opening_status.unwrap_or_default(),
                vacancies,
                vacancy,
            }
        })
        .collect_vec();

    if merged.len() != total {
        warn!(
            "Dropped {} carparks with duplicate park ids",
            total - merged.len()
        );
    }
    merged
}

fn has_park_id(park_id: &str) -> bool {
    !park_id.trim().is_empty()
}

/// Requests metadata and vacancy concurrently, waits for both, then merges them.
/// A failure in either request fails the whole fetch.
pub async fn fetch_carparks(
    provider: &impl CarparkProvider,
    vehicle_type: VehicleType,
) -> Result<Vec<CarparkRecord>, EaseParkError> {
    let (info, vacancies) = tokio::join!(provider.carpark_info(), provider.vacancies());
    let info = info?;
    let vacancies = vacancies?;

    let merged = merge_carparks(info, &vacancies, vehicle_type);
    info!(
        "Merged {} carparks with {} vacancy entries for {}",
        merged.len(),
        vacancies.len(),
        vehicle_type
    );
    Ok(merged)
}
