//! Viewer configuration.
//!
//! Loaded from JSON; every field has a default, so `{}` is a valid file.

use crate::geometry::GeometryKind;
use crate::scene::CameraTarget;
use crate::speed::SpeedSpec;
use globetrack_env::SourceId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for a viewer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Name shown on the start marker (default: "Indianapolis Motor Speedway")
    pub name: String,

    /// Where the track text comes from (default: track_coords.csv)
    pub source: SourceId,

    /// Fixed camera placement
    pub camera: CameraTarget,

    /// Marker speed (default: constant 1000 m/s)
    pub speed: SpeedSpec,

    /// Distance collaborator (default: ellipsoid chord)
    pub geometry: GeometryKind,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            name: "Indianapolis Motor Speedway".to_string(),
            source: SourceId::default(),
            camera: CameraTarget::default(),
            speed: SpeedSpec::default(),
            geometry: GeometryKind::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_viewer_config_default() {
        let config = ViewerConfig::default();
        assert_eq!(config.speed, SpeedSpec::Constant(1000.0));
        assert_eq!(config.geometry, GeometryKind::EllipsoidChord);
        assert_eq!(config.camera.destination.longitude, -86.234842);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = ViewerConfig::from_json(
            r#"{ "source": { "file": "laps.csv" }, "speed": [10, 20], "geometry": "haversine" }"#,
        )
        .unwrap();

        assert_eq!(config.source, SourceId::File(PathBuf::from("laps.csv")));
        assert_eq!(config.speed, SpeedSpec::PerSegment(vec![10.0, 20.0]));
        assert_eq!(config.geometry, GeometryKind::Haversine);
        assert_eq!(config.name, "Indianapolis Motor Speedway");
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "speed": "fast" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ViewerConfig::load("/no/such/viewer.json"),
            Err(ConfigError::Read { .. })
        ));
    }
}
