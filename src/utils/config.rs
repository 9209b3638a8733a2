//! System configuration
//!
//! Serializable parameters for the array geometry, the propagation medium,
//! and the resolution tolerances. A loaded file is validated as a whole
//! before any of it is applied.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    GeometryError, SensorArray, DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ, SPEED_OF_SOUND_WATER,
};

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = {value}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("failed to read or write '{path}': {message}")]
    Io { path: String, message: String },
    #[error("failed to parse '{path}': {message}")]
    Parse { path: String, message: String },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// System-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarConfig {
    /// Receiver 1 offset along the x axis (m)
    pub receiver_x1_m: f64,
    /// Receiver 2 offset along the x axis (m)
    pub receiver_x2_m: f64,
    /// Receiver 3 offset along the z axis (m)
    pub receiver_z3_m: f64,
    /// Wave propagation speed in the medium (m/s)
    pub wave_speed_ms: f64,
    /// Receiver sample rate (Hz)
    pub sample_rate_hz: u32,
    /// Intercept-matching tolerance for the resolver stages (m)
    pub tol_dist_m: f64,
    /// Axis-wise merge tolerance between resolved positions (m)
    pub tol_obj_m: f64,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            receiver_x1_m: -0.15,
            receiver_x2_m: 0.25,
            receiver_z3_m: 0.2,
            wave_speed_ms: SPEED_OF_SOUND_WATER,
            sample_rate_hz: 200_000,
            tol_dist_m: DEFAULT_TOL_DIST,
            tol_obj_m: DEFAULT_TOL_OBJ,
        }
    }
}

impl SonarConfig {
    /// Load and validate a configuration from a JSON file. Nothing is
    /// applied when validation fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path_str,
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().display().to_string();

        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, content).map_err(|e| ConfigError::Io {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Check every parameter range. Geometry degeneracy is caught here as
    /// well, so a valid config always yields a sensor array.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tol_dist_m > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "tol_dist_m",
                value: self.tol_dist_m,
                reason: "intercept tolerance must be positive",
            });
        }
        if !(self.tol_obj_m > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "tol_obj_m",
                value: self.tol_obj_m,
                reason: "merge tolerance must be positive",
            });
        }
        self.sensor_array().map(|_| ())
    }

    /// Build the sensor array this configuration describes.
    pub fn sensor_array(&self) -> Result<SensorArray, ConfigError> {
        SensorArray::with_wave_speed(
            self.receiver_x1_m,
            self.receiver_x2_m,
            self.receiver_z3_m,
            self.wave_speed_ms,
            self.sample_rate_hz,
        )
        .map_err(ConfigError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sonarloc-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SonarConfig::default();
        config.validate().unwrap();

        let array = config.sensor_array().unwrap();
        assert_eq!(array.receiver(1), Vector3::new(-0.15, 0.0, 0.0));
        assert_eq!(array.receiver(2), Vector3::new(0.25, 0.0, 0.0));
        assert_eq!(array.receiver(3), Vector3::new(0.0, 0.0, 0.2));
        assert_eq!(array.wave_speed(), SPEED_OF_SOUND_WATER);
        assert_eq!(array.sample_rate(), 200_000);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut config = SonarConfig::default();
        config.wave_speed_ms = 1500.0;
        config.tol_dist_m = 1.5;

        let path = temp_path("round-trip.json");
        config.save_to_file(&path).unwrap();
        let loaded = SonarConfig::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = temp_path("partial.json");
        std::fs::write(&path, r#"{ "wave_speed_ms": 1500.0 }"#).unwrap();
        let loaded = SonarConfig::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.wave_speed_ms, 1500.0);
        assert_eq!(loaded.sample_rate_hz, 200_000);
        assert_eq!(loaded.tol_obj_m, DEFAULT_TOL_OBJ);
    }

    #[test]
    fn test_invalid_tolerances_rejected() {
        let mut config = SonarConfig::default();
        config.tol_dist_m = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                parameter: "tol_dist_m",
                ..
            })
        ));

        let mut config = SonarConfig::default();
        config.tol_obj_m = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_degenerate_geometry_rejected_before_apply() {
        let path = temp_path("degenerate.json");
        std::fs::write(&path, r#"{ "receiver_x1_m": 0.0 }"#).unwrap();
        let result = SonarConfig::from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Geometry(_))));
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let result = SonarConfig::from_file("/nonexistent/sonarloc.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
