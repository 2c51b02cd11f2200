use std::time::Duration;

use egui::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::EaseParkError;
use crate::carpark::api::{DEFAULT_INFO_URL, DEFAULT_TIMEOUT_S, DEFAULT_VACANCY_URL};

const CONFIG_DIR_NAME: &str = "easepark";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1024.,
            height: 720.,
        }
    }
}

impl From<WindowSize> for Vec2 {
    fn from(value: WindowSize) -> Self {
        Vec2::new(value.width, value.height)
    }
}

impl From<Vec2> for WindowSize {
    fn from(value: Vec2) -> Self {
        Self {
            width: value.x,
            height: value.y,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub info_url: String,
    pub vacancy_url: String,
    pub request_timeout_s: u64,
    pub window_size: WindowSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            info_url: DEFAULT_INFO_URL.to_string(),
            vacancy_url: DEFAULT_VACANCY_URL.to_string(),
            request_timeout_s: DEFAULT_TIMEOUT_S,
            window_size: WindowSize::default(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s)
    }

    pub fn from_local_file() -> Option<Self> {
        let config_path = dirs::config_dir()?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let file = std::fs::File::open(&config_path)
                .map_err(|e| warn!("Could not open config file {:?}: {}", config_path, e))
                .ok()?;
            serde_json::from_reader(file)
                .map_err(|e| warn!("Could not parse config file {:?}: {}", config_path, e))
                .ok()
        } else {
            None
        }
    }

    pub fn save(&self) -> Result<(), EaseParkError> {
        let config_path = dirs::config_dir()
            .ok_or(EaseParkError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EaseParkError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| EaseParkError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| EaseParkError::ConfigSerializeError { source: e })
    }
}
