//! JSON exporter for replayed timelines.
//!
//! Exports the scene and every marker position so a renderer (or a
//! notebook) can play the animation back without the timers.

use globetrack_core::{Diagnostic, PositionUpdate, SceneDescription, SegmentPlan};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single marker position on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineFrame {
    /// Animation time in seconds
    pub time_sec: f64,

    /// Waypoint index
    pub index: usize,

    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

impl From<&PositionUpdate> for TimelineFrame {
    fn from(update: &PositionUpdate) -> Self {
        Self {
            time_sec: update.elapsed.as_secs_f64(),
            index: update.index,
            longitude: update.position.longitude,
            latitude: update.position.latitude,
            altitude: update.position.altitude,
        }
    }
}

/// Complete replay export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineExport {
    /// Where the track came from
    pub source: String,

    /// Geometry used for segment lengths
    pub geometry: String,

    /// Static scene
    pub scene: SceneDescription,

    /// Planned segment timers
    pub segments: Vec<SegmentPlan>,

    /// All frames
    pub frames: Vec<TimelineFrame>,

    /// Total animation time in seconds
    pub duration_sec: f64,

    /// Final phase (`completed`, `failed`, ...)
    pub outcome: String,

    /// Skipped rows and run events
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl TimelineExport {
    /// Creates a new export container.
    pub fn new(source: &str, geometry: &str, scene: SceneDescription) -> Self {
        Self {
            source: source.to_string(),
            geometry: geometry.to_string(),
            scene,
            segments: Vec::new(),
            frames: Vec::new(),
            duration_sec: 0.0,
            outcome: "pending".to_string(),
            diagnostics: Vec::new(),
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: TimelineFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, outcome: &str, diagnostics: Vec<Diagnostic>) {
        self.outcome = outcome.to_string();
        self.diagnostics = diagnostics;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globetrack_core::{CameraTarget, GeoPoint, Track};
    use std::time::Duration;

    #[test]
    fn test_export_roundtrip_file() {
        let track = Track::new(vec![GeoPoint::surface(-86.23, 39.79), GeoPoint::surface(-86.24, 39.80)]);
        let scene = SceneDescription::for_track(&track, CameraTarget::default(), "Speedway");
        let mut export = TimelineExport::new("memory:test", "ellipsoid_chord", scene);

        export.add_frame(TimelineFrame::from(&PositionUpdate {
            index: 0,
            position: track.points()[0],
            elapsed: Duration::ZERO,
        }));
        export.add_frame(TimelineFrame::from(&PositionUpdate {
            index: 1,
            position: track.points()[1],
            elapsed: Duration::from_millis(1400),
        }));
        export.finalize("completed", vec![]);

        assert_eq!(export.duration_sec, 1.4);

        let path = std::env::temp_dir().join("globetrack_export_test.json");
        let path = path.to_string_lossy().to_string();
        export.write_to_file(&path).unwrap();

        let loaded: TimelineExport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.frames.len(), 2);
        assert_eq!(loaded.outcome, "completed");
        assert!(loaded.scene.has_track());

        let _ = std::fs::remove_file(&path);
    }
}
