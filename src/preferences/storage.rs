// Key-value storage backends for user preferences

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::EaseParkError;

const APP_DIR_NAME: &str = "easepark";
const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Trait defining a string key-value store. Writes are synchronous: once `set`
/// returns, the value is durable for the backend.
pub trait KeyValueStore {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, EaseParkError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), EaseParkError>;
}

/// File-based implementation: a single JSON object mapping keys to string values,
/// rewritten on every `set`.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, loading existing values. A missing file starts empty;
    /// a corrupt file is logged and also starts empty.
    pub fn open(path: PathBuf) -> Result<Self, EaseParkError> {
        let values = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| EaseParkError::PreferencesReadError {
                    path: path.display().to_string(),
                    source: e,
                })?;
            match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(
                        "Ignoring unreadable preferences file {:?}: {}",
                        path, e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            debug!("No preferences file at {:?}, starting empty", path);
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Open the store in the default application config directory
    pub fn open_default() -> Result<Self, EaseParkError> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf, EaseParkError> {
        let config_dir = dirs::config_dir().ok_or(EaseParkError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR_NAME).join(PREFERENCES_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), EaseParkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| EaseParkError::ConfigIOError { source: e })?;
            }
        }

        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| EaseParkError::ConfigSerializeError { source: e })?;
        fs::write(&self.path, content).map_err(|e| EaseParkError::ConfigIOError { source: e })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, EaseParkError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EaseParkError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// In-memory store, used by tests and by commands that must not persist anything.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, EaseParkError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EaseParkError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, EaseParkError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EaseParkError> {
        (**self).set(key, value)
    }
}
