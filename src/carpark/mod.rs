pub mod api;
pub mod merge;
pub mod worker;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EaseParkError;

pub use api::{CarparkProvider, HttpProvider};
pub use merge::{fetch_carparks, merge_carparks};
pub use worker::{FetchOutcome, FetchRequest, FetchWorker};

/// Display value used whenever a field or vacancy figure is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw vacancy values the provider uses to mean "no usable count".
pub const VACANCY_SENTINELS: [&str; 3] = [NOT_AVAILABLE, "none", "-1"];

/// The five vehicle categories the provider reports vacancy for.
///
/// The serialized form is the provider's key (`privateCar`, `HGV`, ...), which is
/// also the value persisted in the preference store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "privateCar")]
    PrivateCar,
    #[serde(rename = "motorCycle")]
    MotorCycle,
    #[serde(rename = "HGV")]
    Hgv,
    #[serde(rename = "LGV")]
    Lgv,
    #[serde(rename = "coach")]
    Coach,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::PrivateCar,
        VehicleType::MotorCycle,
        VehicleType::Hgv,
        VehicleType::Lgv,
        VehicleType::Coach,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::PrivateCar => "privateCar",
            Self::MotorCycle => "motorCycle",
            Self::Hgv => "HGV",
            Self::Lgv => "LGV",
            Self::Coach => "coach",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PrivateCar => "Private Car",
            Self::MotorCycle => "Motorcycle",
            Self::Hgv => "Heavy Goods Vehicle",
            Self::Lgv => "Light Goods Vehicle",
            Self::Coach => "Coach",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::PrivateCar => 0,
            Self::MotorCycle => 1,
            Self::Hgv => 2,
            Self::Lgv => 3,
            Self::Coach => 4,
        }
    }
}

impl Default for VehicleType {
    fn default() -> Self {
        Self::PrivateCar
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for VehicleType {
    type Err = EaseParkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .into_iter()
            .find(|vt| vt.key() == s)
            .ok_or_else(|| EaseParkError::UnknownVehicleType {
                value: s.to_string(),
            })
    }
}

/// A vacancy figure as reported by the provider: either a count rendered as a
/// string or one of the [`VACANCY_SENTINELS`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vacancy(String);

impl Vacancy {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn not_available() -> Self {
        Self(NOT_AVAILABLE.to_string())
    }

    pub fn count(count: u64) -> Self {
        Self(count.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `false` for empty values and for any of the sentinels.
    pub fn is_available(&self) -> bool {
        !self.0.is_empty() && !VACANCY_SENTINELS.contains(&self.0.as_str())
    }

    /// Numeric value used for sorting. Mirrors a lenient integer parse: leading
    /// whitespace and sign are accepted, parsing stops at the first non-digit,
    /// and anything without leading digits counts as zero.
    pub fn sort_value(&self) -> i64 {
        let trimmed = self.0.trim_start();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let value = digits
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .fold(0i64, |acc, b| {
                acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
            });
        if negative { -value } else { value }
    }
}

impl Default for Vacancy {
    fn default() -> Self {
        Self::not_available()
    }
}

impl fmt::Display for Vacancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-vehicle-type vacancy for one carpark.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyByType([Vacancy; 5]);

impl VacancyByType {
    pub fn get(&self, vehicle_type: VehicleType) -> &Vacancy {
        &self.0[vehicle_type.index()]
    }

    pub fn set(&mut self, vehicle_type: VehicleType, vacancy: Vacancy) {
        self.0[vehicle_type.index()] = vacancy;
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleType, &Vacancy)> {
        VehicleType::ALL.into_iter().map(|vt| (vt, self.get(vt)))
    }
}

/// One carpark after metadata and live vacancy have been merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarparkRecord {
    pub park_id: String,
    pub name: String,
    pub display_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_status: String,
    pub vacancies: VacancyByType,
    /// Vacancy for the vehicle type that was selected when this record was merged.
    pub vacancy: Vacancy,
}

impl CarparkRecord {
    pub fn vacancy_for(&self, vehicle_type: VehicleType) -> &Vacancy {
        self.vacancies.get(vehicle_type)
    }

    /// Google Maps link centred on the carpark.
    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// Substitutes [`NOT_AVAILABLE`] for empty display fields.
pub fn display_or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}
