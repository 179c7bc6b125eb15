//! CartonKit Settings Crate
//!
//! Handles application configuration and persistence of the flute
//! catalogue and allowance tables.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{Config, DesignDefaults, StorageSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use persistence::{AllowanceStore, FluteStore};
