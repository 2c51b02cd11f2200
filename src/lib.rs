// Library interface for easepark
// This allows integration tests and benches to access internal modules

pub mod carpark;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod listing;
pub mod preferences;
pub mod ui;
pub mod view_model;

// Re-export commonly used types
pub use carpark::{CarparkProvider, CarparkRecord, Vacancy, VehicleType};
pub use dashboard::Dashboard;
pub use errors::EaseParkError;
pub use preferences::{FavoriteSet, FileStore, KeyValueStore, MemoryStore, Preferences};
pub use view_model::{FilterState, SortDirection, SortKey, SortState};
