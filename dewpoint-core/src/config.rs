use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    dew_point::{DEFAULT_PRECISION, validate_precision},
    model::{Coordinates, Measurement},
    provider::open_meteo::DEFAULT_BASE_URL,
};

/// Where to look up the forecast when no coordinates are given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places for dew point and forecast values.
    pub precision: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub base_url: String,
    pub past_days: u8,
    pub forecast_days: u8,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            past_days: 1,
            forecast_days: 3,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [location]
/// latitude = 52.52
/// longitude = 13.41
///
/// [display]
/// precision = 1
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: LocationConfig,
    pub display: DisplayConfig,
    pub forecast: ForecastConfig,
    /// Initial measurement when nothing else is supplied.
    pub defaults: Measurement,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Reject values the calculator and renderer cannot honour.
    pub fn validate(&self) -> Result<()> {
        validate_precision(self.display.precision).context("Invalid [display] precision")?;
        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "dewpoint", "dewpoint-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_location(&mut self, coordinates: Coordinates) {
        self.location = LocationConfig {
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
        };
    }

    pub fn default_coordinates(&self) -> Option<Coordinates> {
        self.location.coordinates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_calculator() {
        let cfg = Config::default();

        assert_eq!(cfg.defaults, Measurement::default());
        assert_eq!(cfg.display.precision, 1);
        assert_eq!(cfg.forecast.base_url, "https://api.open-meteo.com");
        assert_eq!((cfg.forecast.past_days, cfg.forecast.forecast_days), (1, 3));
        assert_eq!(cfg.default_coordinates(), None);
    }

    #[test]
    fn half_configured_location_is_ignored() {
        let mut cfg = Config::default();
        cfg.location.latitude = Some(10.0);
        assert_eq!(cfg.default_coordinates(), None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [location]
            latitude = 52.52
            longitude = 13.41

            [display]
            precision = 2
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.default_coordinates(),
            Some(Coordinates {
                latitude: 52.52,
                longitude: 13.41,
            })
        );
        assert_eq!(cfg.display.precision, 2);
        assert_eq!(cfg.forecast, ForecastConfig::default());
        assert_eq!(cfg.defaults, Measurement::default());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from_path(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_location(Coordinates {
            latitude: -33.87,
            longitude: 151.21,
        });
        cfg.defaults = Measurement {
            temperature: 18.0,
            humidity: 72.0,
        };
        cfg.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn oversized_precision_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display]\nprecision = 400\n").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert!(format!("{err:#}").contains("precision 400 exceeds the maximum of 6"));
    }

    #[test]
    fn max_precision_is_accepted() {
        let mut cfg = Config::default();
        cfg.display.precision = 6;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unparsable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "display = [").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
