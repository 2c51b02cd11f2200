use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use snafu::ResultExt;

use crate::EaseParkError;
use crate::errors::{HttpClientSnafu, HttpRequestSnafu, ResponseDecodeSnafu};

use super::{Vacancy, VehicleType};

pub const DEFAULT_INFO_URL: &str = "https://api.data.gov.hk/v1/carpark-info-vacancy";
pub const DEFAULT_VACANCY_URL: &str = "https://api.data.gov.hk/v1/carpark-info-vacancy?data=vacancy&vehicleTypes=privateCar,motorCycle,LGV,HGV,coach&lang=en_US";
pub const DEFAULT_TIMEOUT_S: u64 = 15;

/// Both provider endpoints wrap their payload in `{ "results": [...] }`.
#[derive(Debug, Deserialize)]
pub struct ResultsEnvelope<T> {
    pub results: Vec<T>,
}

// Treats a null id like a missing one so a single bad entry cannot fail the envelope.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Static carpark metadata as served by the info endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CarparkInfo {
    /// Empty when the provider omitted the id; such entries are dropped at merge time.
    #[serde(rename = "park_Id", default, deserialize_with = "string_or_empty")]
    pub park_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "displayAddress", default)]
    pub display_address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub opening_status: Option<String>,
}

/// One entry of a per-vehicle vacancy list. Only the first entry of each list is used.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct VacancyReport {
    #[serde(default)]
    pub vacancy: Option<serde_json::Value>,
}

impl VacancyReport {
    /// Normalizes the raw value: non-negative integers (numbers or numeric strings)
    /// become a count, everything else becomes "N/A".
    pub fn normalized(&self) -> Vacancy {
        let count = match &self.vacancy {
            Some(serde_json::Value::Number(n)) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0. && f.fract() == 0. && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
            Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        count.map(Vacancy::count).unwrap_or_default()
    }
}

/// Live vacancy for one carpark as served by the vacancy endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CarparkVacancy {
    #[serde(rename = "park_Id", default, deserialize_with = "string_or_empty")]
    pub park_id: String,
    #[serde(rename = "privateCar", default)]
    pub private_car: Option<Vec<VacancyReport>>,
    #[serde(rename = "motorCycle", default)]
    pub motor_cycle: Option<Vec<VacancyReport>>,
    #[serde(rename = "HGV", default)]
    pub hgv: Option<Vec<VacancyReport>>,
    #[serde(rename = "LGV", default)]
    pub lgv: Option<Vec<VacancyReport>>,
    #[serde(default)]
    pub coach: Option<Vec<VacancyReport>>,
}

impl CarparkVacancy {
    pub fn reports(&self, vehicle_type: VehicleType) -> &[VacancyReport] {
        let reports = match vehicle_type {
            VehicleType::PrivateCar => &self.private_car,
            VehicleType::MotorCycle => &self.motor_cycle,
            VehicleType::Hgv => &self.hgv,
            VehicleType::Lgv => &self.lgv,
            VehicleType::Coach => &self.coach,
        };
        reports.as_deref().unwrap_or_default()
    }
}

/// Source of carpark data. The two calls are independent so callers can issue them
/// concurrently.
#[allow(async_fn_in_trait)]
pub trait CarparkProvider {
    /// Fetch static metadata for every carpark.
    async fn carpark_info(&self) -> Result<Vec<CarparkInfo>, EaseParkError>;

    /// Fetch live vacancy for every carpark and vehicle type.
    async fn vacancies(&self) -> Result<Vec<CarparkVacancy>, EaseParkError>;
}

/// [`CarparkProvider`] backed by the public open-data HTTP API.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    client: Client,
    info_url: String,
    vacancy_url: String,
}

impl HttpProvider {
    pub fn new(
        info_url: impl Into<String>,
        vacancy_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EaseParkError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("easepark/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(HttpClientSnafu)?;
        Ok(Self {
            client,
            info_url: info_url.into(),
            vacancy_url: vacancy_url.into(),
        })
    }

    async fn get_results<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, EaseParkError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context(HttpRequestSnafu { url })?;

        check_status(url, response.status())?;
        let body = response
            .bytes()
            .await
            .context(HttpRequestSnafu { url })?;
        let results = decode_results(url, &body)?;
        debug!("{} returned {} results", url, results.len());
        Ok(results)
    }
}

fn check_status(url: &str, status: StatusCode) -> Result<(), EaseParkError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(EaseParkError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn decode_results<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<Vec<T>, EaseParkError> {
    let envelope: ResultsEnvelope<T> =
        serde_json::from_slice(body).context(ResponseDecodeSnafu { url })?;
    Ok(envelope.results)
}

impl Default for HttpProvider {
    fn default() -> Self {
        Self {
            client: Client::new(),
            info_url: DEFAULT_INFO_URL.to_string(),
            vacancy_url: DEFAULT_VACANCY_URL.to_string(),
        }
    }
}

impl CarparkProvider for HttpProvider {
    async fn carpark_info(&self) -> Result<Vec<CarparkInfo>, EaseParkError> {
        self.get_results(&self.info_url).await
    }

    async fn vacancies(&self) -> Result<Vec<CarparkVacancy>, EaseParkError> {
        self.get_results(&self.vacancy_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_envelope_decodes_provider_fields() {
        let body = r#"{
            "results": [{
                "park_Id": "10",
                "name": "Kwai Fong Plaza",
                "displayAddress": "1 Kwai Fong Road",
                "latitude": 22.357,
                "longitude": 114.127,
                "opening_status": "OPEN",
                "district": "Kwai Tsing"
            }]
        }"#;
        let envelope: ResultsEnvelope<CarparkInfo> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.results.len(), 1);
        let info = &envelope.results[0];
        assert_eq!(info.park_id, "10");
        assert_eq!(info.display_address.as_deref(), Some("1 Kwai Fong Road"));
        assert_eq!(info.opening_status.as_deref(), Some("OPEN"));
        assert_eq!(info.latitude, Some(22.357));
    }

    #[test]
    fn test_info_missing_optional_fields() {
        let info: CarparkInfo = serde_json::from_str(r#"{"park_Id": "x", "name": null}"#).unwrap();
        assert_eq!(info.name, None);
        assert_eq!(info.display_address, None);
        assert_eq!(info.longitude, None);
    }

    #[test]
    fn test_vacancy_envelope_decodes_vehicle_lists() {
        let body = r#"{
            "results": [{
                "park_Id": "10",
                "privateCar": [{"vacancy_type": "A", "vacancy": 23, "lastupdate": "2024-01-01 10:00:00"}],
                "LGV": [{"vacancy": "4"}, {"vacancy": 9}],
                "coach": []
            }]
        }"#;
        let envelope: ResultsEnvelope<CarparkVacancy> = serde_json::from_str(body).unwrap();
        let entry = &envelope.results[0];
        assert_eq!(entry.reports(VehicleType::PrivateCar).len(), 1);
        assert_eq!(entry.reports(VehicleType::Lgv).len(), 2);
        assert!(entry.reports(VehicleType::Coach).is_empty());
        assert!(entry.reports(VehicleType::Hgv).is_empty());
    }

    #[test]
    fn test_entries_without_id_do_not_fail_the_envelope() {
        let body = br#"{
            "results": [
                {"park_Id": "A1", "name": "Central Carpark", "latitude": 22.28, "longitude": 114.16},
                {"name": "No id carpark", "displayAddress": "Somewhere"},
                {"park_Id": null, "name": "Null id carpark"}
            ]
        }"#;
        let results: Vec<CarparkInfo> = decode_results("info", body).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].park_id, "A1");
        assert_eq!(results[1].park_id, "");
        assert_eq!(results[2].park_id, "");

        let body = br#"{"results": [{"privateCar": [{"vacancy": 3}]}, {"park_Id": "A1"}]}"#;
        let results: Vec<CarparkVacancy> = decode_results("vacancy", body).unwrap();
        assert_eq!(results[0].park_id, "");
        assert_eq!(results[1].park_id, "A1");
    }

    #[test]
    fn test_malformed_body_is_a_decode_error() {
        let bodies: [&[u8]; 3] = [b"{}", b"not json", br#"{"results": {"park_Id": "A1"}}"#];
        for body in bodies {
            let result = decode_results::<CarparkInfo>("https://example.test/info", body);
            match result {
                Err(EaseParkError::ResponseDecode { url, .. }) => {
                    assert_eq!(url, "https://example.test/info")
                }
                other => panic!("expected decode error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        assert!(check_status("info", StatusCode::OK).is_ok());
        assert!(matches!(
            check_status("info", StatusCode::SERVICE_UNAVAILABLE),
            Err(EaseParkError::HttpStatus { status: 503, .. })
        ));
        assert!(matches!(
            check_status("info", StatusCode::NOT_FOUND),
            Err(EaseParkError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn test_vacancy_report_normalization() {
        let report = |v: serde_json::Value| VacancyReport { vacancy: Some(v) };
        assert_eq!(report(serde_json::json!(12)).normalized().as_str(), "12");
        assert_eq!(report(serde_json::json!("7")).normalized().as_str(), "7");
        assert_eq!(report(serde_json::json!(3.0)).normalized().as_str(), "3");
        assert_eq!(report(serde_json::json!(-1)).normalized().as_str(), "N/A");
        assert_eq!(report(serde_json::json!("-1")).normalized().as_str(), "N/A");
        assert_eq!(report(serde_json::json!("none")).normalized().as_str(), "N/A");
        assert_eq!(report(serde_json::json!(null)).normalized().as_str(), "N/A");
        assert_eq!(VacancyReport::default().normalized().as_str(), "N/A");
    }
}
