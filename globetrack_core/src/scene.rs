//! Renderer-facing description of what to draw.
//!
//! The core does not render. It hands the rendering collaborator a static
//! scene (camera, start marker, path) once, and marker positions over time.

use crate::track::{GeoPoint, Track};
use serde::{Deserialize, Serialize};

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const YELLOW: Rgba = Rgba([255, 255, 0, 255]);
    pub const RED: Rgba = Rgba([255, 0, 0, 255]);

    pub fn rgb(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }
}

/// Where the camera sits. Set once, never re-centred on the marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    pub destination: GeoPoint,

    /// Fly-to duration; 0 snaps instantly
    pub fly_duration_secs: f64,
}

impl Default for CameraTarget {
    fn default() -> Self {
        // Above the Indianapolis Motor Speedway
        Self {
            destination: GeoPoint::new(-86.234842, 39.794542, 3000.0),
            fly_duration_secs: 0.0,
        }
    }
}

/// Point marker styling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub pixel_size: f32,
    pub color: Rgba,
}

/// A labelled point on the globe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub position: GeoPoint,
    pub style: MarkerStyle,
    pub description: String,
}

/// The static track polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathGraphic {
    pub positions: Vec<GeoPoint>,
    pub width: f32,
    pub color: Rgba,
}

/// Everything static about the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraTarget,

    /// Absent when the track is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_marker: Option<Marker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathGraphic>,

    /// Style applied to each marker position update
    pub moving_marker: MarkerStyle,
}

impl SceneDescription {
    pub const MOVING_MARKER_NAME: &'static str = "Moving Entity";

    /// Camera only: what a failed load leaves on screen.
    pub fn camera_only(camera: CameraTarget) -> Self {
        Self {
            camera,
            start_marker: None,
            path: None,
            moving_marker: MarkerStyle {
                pixel_size: 20.0,
                color: Rgba::RED,
            },
        }
    }

    /// Start marker and path for a non-empty track.
    pub fn for_track(track: &Track, camera: CameraTarget, name: &str) -> Self {
        let mut scene = Self::camera_only(camera);
        if let Some(first) = track.first() {
            scene.start_marker = Some(Marker {
                name: name.to_string(),
                position: *first,
                style: MarkerStyle {
                    pixel_size: 10.0,
                    color: Rgba::WHITE,
                },
                description: "Start Point".to_string(),
            });
            scene.path = Some(PathGraphic {
                positions: track.points().to_vec(),
                width: 5.0,
                color: Rgba::YELLOW,
            });
        }
        scene
    }

    pub fn has_track(&self) -> bool {
        self.path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_track_is_camera_only() {
        let scene = SceneDescription::for_track(&Track::default(), CameraTarget::default(), "x");
        assert!(!scene.has_track());
        assert!(scene.start_marker.is_none());
        assert_eq!(scene.camera.destination.altitude, 3000.0);
    }

    #[test]
    fn test_track_scene() {
        let track = Track::new(vec![GeoPoint::surface(-86.23, 39.79), GeoPoint::surface(-86.24, 39.80)]);
        let scene = SceneDescription::for_track(&track, CameraTarget::default(), "Speedway");

        let start = scene.start_marker.as_ref().unwrap();
        assert_eq!(start.position, GeoPoint::surface(-86.23, 39.79));
        assert_eq!(start.style.color, Rgba::WHITE);

        let path = scene.path.as_ref().unwrap();
        assert_eq!(path.positions.len(), 2);
        assert_eq!(path.color, Rgba::YELLOW);
        assert_eq!(scene.moving_marker.color, Rgba::RED);
    }

    #[test]
    fn test_camera_does_not_follow_track() {
        let track = Track::new(vec![GeoPoint::surface(100.0, -10.0)]);
        let camera = CameraTarget::default();
        let scene = SceneDescription::for_track(&track, camera, "x");
        assert_eq!(scene.camera, camera);
    }
}
