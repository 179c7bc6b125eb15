//! Configuration management for CartonKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files stored in the platform config directory.
//!
//! Configuration is organized into sections:
//! - Design defaults (dimensions, flute, glue lap, slots, units)
//! - Storage locations for the flute and allowance tables

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use cartonkit_core::{GlueSide, MeasurementSystem};
use cartonkit_dieline::rsc::allowance::DEFAULT_STYLE_KEY;
use cartonkit_dieline::rsc::{
    DEFAULT_BEVEL_ANGLE, DEFAULT_GLUE_LAP, DEFAULT_HEIGHT, DEFAULT_LENGTH, DEFAULT_SLOT_WIDTH,
    DEFAULT_THICKNESS, DEFAULT_WIDTH, MIN_SLOT_WIDTH,
};
use cartonkit_dieline::{BoxSpec, DesignRequest, GlueConfig, GlueOff, SlotConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config directory
pub const APP_DIR: &str = "cartonkit";
pub const CONFIG_FILE: &str = "config.toml";
pub const ALLOWANCES_FILE: &str = "panel_allowances.json";
pub const FLUTES_FILE: &str = "flutes.json";

/// Defaults used when a design input is not given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignDefaults {
    /// Internal length in mm
    pub length: f64,
    /// Internal width in mm
    pub width: f64,
    /// Internal height in mm
    pub height: f64,
    /// Board thickness in mm
    pub thickness: f64,
    pub flute: String,
    pub glue_side: GlueSide,
    pub glue_off: GlueOff,
    /// Glue lap width in mm
    pub glue_lap: f64,
    pub bevel_angle_deg: f64,
    pub extension_a: f64,
    pub slot_width: f64,
    /// Allowance table section to read (`rsc`, `hsc`, `ffsc`)
    pub style_key: String,
    /// Units for CLI input and summaries
    pub measurement_system: MeasurementSystem,
}

impl Default for DesignDefaults {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            thickness: DEFAULT_THICKNESS,
            flute: "B".to_string(),
            glue_side: GlueSide::Outside,
            glue_off: GlueOff::Small,
            glue_lap: DEFAULT_GLUE_LAP,
            bevel_angle_deg: DEFAULT_BEVEL_ANGLE,
            extension_a: 0.0,
            slot_width: DEFAULT_SLOT_WIDTH,
            style_key: DEFAULT_STYLE_KEY.to_string(),
            measurement_system: MeasurementSystem::Metric,
        }
    }
}

impl DesignDefaults {
    /// Design request seeded from these defaults
    pub fn to_request(&self) -> DesignRequest {
        DesignRequest {
            spec: BoxSpec::new(self.length, self.width, self.height, self.thickness),
            flute: self.flute.clone(),
            glue: GlueConfig {
                side: self.glue_side,
                off: self.glue_off,
                lap_width: self.glue_lap,
                extension_a: self.extension_a,
                bevel_angle_deg: self.bevel_angle_deg,
            },
            gaps: None,
            slot: SlotConfig {
                slot_width: self.slot_width,
            },
        }
    }
}

/// Where the persisted tables live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// Allowance table file; defaults to the config directory
    pub allowances_path: Option<PathBuf>,
    /// Flute catalogue file; defaults to the config directory
    pub flutes_path: Option<PathBuf>,
}

impl StorageSettings {
    pub fn allowances_path(&self) -> SettingsResult<PathBuf> {
        match &self.allowances_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(ALLOWANCES_FILE)),
        }
    }

    pub fn flutes_path(&self) -> SettingsResult<PathBuf> {
        match &self.flutes_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(FLUTES_FILE)),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Design defaults
    pub design: DesignDefaults,
    /// Table storage locations
    pub storage: StorageSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("(none)").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(format!("Failed to serialize config: {}", e)))?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let d = &self.design;

        for (key, value) in [
            ("design.length", d.length),
            ("design.width", d.width),
            ("design.height", d.height),
            ("design.thickness", d.thickness),
            ("design.glue_lap", d.glue_lap),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(out_of_range(key, value));
            }
        }

        if !(d.bevel_angle_deg > 0.0 && d.bevel_angle_deg < 90.0) {
            return Err(out_of_range("design.bevel_angle_deg", d.bevel_angle_deg));
        }

        if !d.extension_a.is_finite() || d.extension_a < 0.0 {
            return Err(out_of_range("design.extension_a", d.extension_a));
        }

        if !d.slot_width.is_finite() || d.slot_width < MIN_SLOT_WIDTH {
            return Err(out_of_range("design.slot_width", d.slot_width));
        }

        if d.flute.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "design.flute".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn out_of_range(key: &str, value: f64) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Platform config directory for CartonKit
pub fn config_dir() -> SettingsResult<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| SettingsError::ConfigDirectory("no config or home directory".to_string()))?;
    Ok(base.join(APP_DIR))
}

/// Default config file location
pub fn default_config_path() -> SettingsResult<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.design.flute, "B");
        assert_eq!(config.design.style_key, "rsc");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.design.bevel_angle_deg = 90.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { ref key, .. }) if key == "design.bevel_angle_deg"
        ));

        let mut config = Config::new();
        config.design.slot_width = 0.2;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.design.height = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.design.flute = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_format() {
        let err = Config::new()
            .save_to_file(Path::new("config.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(ref ext)) if ext == "yaml"
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[design]\nlength = 300.0\nglue_off = \"large\"\n").unwrap();
        assert_eq!(config.design.length, 300.0);
        assert_eq!(config.design.glue_off, GlueOff::Large);
        assert_eq!(config.design.width, DEFAULT_WIDTH);
        assert_eq!(config.storage, StorageSettings::default());
    }

    #[test]
    fn test_to_request() {
        let mut defaults = DesignDefaults::default();
        defaults.glue_side = GlueSide::Inside;
        defaults.slot_width = 6.0;
        let request = defaults.to_request();
        assert_eq!(request.spec.length, DEFAULT_LENGTH);
        assert_eq!(request.glue.side, GlueSide::Inside);
        assert_eq!(request.slot.slot_width, 6.0);
        assert!(request.gaps.is_none());
    }

    #[test]
    fn test_storage_overrides() {
        let storage = StorageSettings {
            allowances_path: Some(PathBuf::from("/tmp/a.json")),
            flutes_path: None,
        };
        assert_eq!(
            storage.allowances_path().unwrap(),
            PathBuf::from("/tmp/a.json")
        );
    }
}
