//! Run configuration, stored as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::generator::GridAxes;
use crate::grid::key::LongitudeConvention;
use crate::models::inputs::CompositionUnit;
use crate::physics::constants::PhysicalConstants;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read or write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(String),
    #[error("invalid value for `{key}`: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub grid: GridAxes,
    #[serde(default)]
    pub constants: PhysicalConstants,
    #[serde(default)]
    pub composition_unit: CompositionUnit,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Also write the aligned table of intermediate quantities.
    #[serde(default)]
    pub write_intermediate: bool,
    /// Drop keys with non-finite conductivity before export.
    #[serde(default = "default_true")]
    pub drop_non_finite: bool,
}

fn default_directory() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            write_intermediate: false,
            drop_non_finite: true,
        }
    }
}

fn invalid(key: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: RunConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        for (key, len) in [
            ("grid.times_s", grid.times_s.len()),
            ("grid.heights_km", grid.heights_km.len()),
            ("grid.latitudes_deg", grid.latitudes_deg.len()),
            ("grid.longitudes_deg", grid.longitudes_deg.len()),
        ] {
            if len == 0 {
                return Err(invalid(key, "[]", "axis must not be empty"));
            }
        }

        if let Some(h) = grid.heights_km.iter().find(|&&h| !(h > 0.0)) {
            return Err(invalid("grid.heights_km", h, "heights must be positive"));
        }
        if let Some(lat) = grid
            .latitudes_deg
            .iter()
            .find(|&&lat| !(-90.0..=90.0).contains(&lat))
        {
            return Err(invalid("grid.latitudes_deg", lat, "latitude must be in [-90, 90]"));
        }
        // one wrap convention, and never both ends of it (-180 and 180 are one meridian)
        if LongitudeConvention::detect(&grid.longitudes_deg).is_none() {
            return Err(invalid(
                "grid.longitudes_deg",
                format!("{:?}", grid.longitudes_deg),
                "longitudes must all lie in [0, 360) or all in [-180, 180)",
            ));
        }

        let c = &self.constants;
        for (key, mass) in [
            ("constants.electron_mass", c.electron_mass),
            ("constants.ion1_mass", c.ion1_mass),
            ("constants.ion2_mass", c.ion2_mass),
        ] {
            if !(mass > 0.0) {
                return Err(invalid(key, mass, "mass must be positive"));
            }
        }
        if c.elementary_charge == 0.0 {
            return Err(invalid("constants.elementary_charge", 0.0, "charge must be non-zero"));
        }

        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
