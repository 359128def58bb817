//! Rerun visualization of a viewer session.
//!
//! Visualization is optional and only available with the `visualization`
//! feature. Without it every method is a no-op, so callers never need
//! their own `cfg` guards.
//!
//! # What Gets Logged
//!
//! - The track polyline (yellow) and start point (white), once, as static data
//! - The moving marker (red) at every position update, on the `anim_time` timeline
//! - Diagnostics as text entries
//!
//! Positions are Earth-centred Cartesian metres relative to the camera
//! target, which keeps them small enough for `f32`.

use crate::animator::PositionUpdate;
use crate::geometry::EllipsoidChord;
use crate::scene::SceneDescription;
use crate::track::GeoPoint;
use nalgebra::Vector3;
#[cfg(feature = "visualization")]
use rerun::{Color, LineStrips3D, Points3D, Radius, RecordingStream};

/// Converts a point to `f32` coordinates around `origin`.
pub fn local_position(origin: &Vector3<f64>, point: &GeoPoint) -> [f32; 3] {
    let offset = EllipsoidChord::to_ecef(point) - origin;
    [offset.x as f32, offset.y as f32, offset.z as f32]
}

/// Rerun logger for viewer sessions.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// ECEF of the camera target
    origin: Vector3<f64>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            origin: Vector3::zeros(),
            enabled: false,
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to follow the marker");
                Self {
                    rec: Some(rec),
                    origin: Vector3::zeros(),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs the static part of the scene and fixes the local origin.
    #[cfg(feature = "visualization")]
    pub fn log_scene(&mut self, scene: &SceneDescription) {
        self.origin = EllipsoidChord::to_ecef(&scene.camera.destination);
        let Some(ref rec) = self.rec else { return };

        if let Some(path) = &scene.path {
            let strip: Vec<[f32; 3]> = path
                .positions
                .iter()
                .map(|p| local_position(&self.origin, p))
                .collect();
            let [r, g, b] = path.color.rgb();
            let _ = rec.log_static(
                "globe/track/path",
                &LineStrips3D::new([strip])
                    .with_colors([Color::from_rgb(r, g, b)])
                    .with_radii([Radius::new_ui_points(path.width)]),
            );
        }

        if let Some(start) = &scene.start_marker {
            let [r, g, b] = start.style.color.rgb();
            let _ = rec.log_static(
                "globe/track/start",
                &Points3D::new([local_position(&self.origin, &start.position)])
                    .with_colors([Color::from_rgb(r, g, b)])
                    .with_radii([Radius::new_ui_points(start.style.pixel_size)])
                    .with_labels([start.description.as_str()]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_scene(&mut self, scene: &SceneDescription) {
        self.origin = EllipsoidChord::to_ecef(&scene.camera.destination);
    }

    /// Logs one marker position at its animation time.
    #[cfg(feature = "visualization")]
    pub fn log_position(&self, scene: &SceneDescription, update: &PositionUpdate) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("anim_time", update.elapsed.as_secs_f64());
            let [r, g, b] = scene.moving_marker.color.rgb();
            let _ = rec.log(
                "globe/marker",
                &Points3D::new([local_position(&self.origin, &update.position)])
                    .with_colors([Color::from_rgb(r, g, b)])
                    .with_radii([Radius::new_ui_points(scene.moving_marker.pixel_size)])
                    .with_labels([SceneDescription::MOVING_MARKER_NAME]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_position(&self, _scene: &SceneDescription, _update: &PositionUpdate) {}

    /// Logs a text annotation (e.g., skipped row, cancellation).
    #[cfg(feature = "visualization")]
    pub fn log_event(&self, path: &str, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_event(&self, _path: &str, _message: &str) {}
}
