// Error types for easepark

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EaseParkError {
    // Errors talking to the open-data provider
    #[snafu(display("Request to {url} failed"))]
    HttpRequest { url: String, source: reqwest::Error },
    #[snafu(display("Provider returned HTTP {status} for {url}"))]
    HttpStatus { url: String, status: u16 },
    #[snafu(display("Could not decode response from {url}"))]
    ResponseDecode {
        url: String,
        source: serde_json::Error,
    },
    #[snafu(display("Could not build HTTP client"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("Could not start async runtime"))]
    RuntimeStart { source: io::Error },

    // Config and preference management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
    #[snafu(display("Error reading preferences from {path}"))]
    PreferencesReadError { path: String, source: io::Error },

    // User input validation errors
    #[snafu(display("Unknown vehicle type: {value}"))]
    UnknownVehicleType { value: String },
    #[snafu(display("Unknown sort column: {value}"))]
    UnknownSortColumn { value: String },

    // UI errors
    #[snafu(display("Could not start the dashboard window: {reason}"))]
    GuiStartError { reason: String },
}
