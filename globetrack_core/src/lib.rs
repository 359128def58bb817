//! GlobeTrack Core - track loading and timed marker animation
//!
//! Turns a CSV of waypoints into a path on a globe and a marker that
//! travels along it:
//! 1. **Loader**: fetch text, keep well-formed rows, report the rest
//! 2. **Animator**: one timer per segment, `distance / speed` long, with
//!    explicit start/cancel and an ordered position stream
//! 3. **Scene**: static description (camera, start point, path) for a renderer

pub mod track;
pub mod geometry;
pub mod diagnostics;
pub mod loader;
pub mod speed;
pub mod animator;
pub mod scene;
pub mod config;
pub mod viewer;
pub mod visualization;

// Re-export key types for convenience
pub use track::{GeoPoint, Track};
pub use geometry::{EllipsoidChord, Geometry, GeometryKind, Haversine};
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, RowDefect, TeeSink, TracingSink};
pub use loader::{load_track, parse_track, LoadError};
pub use speed::SpeedSpec;
pub use animator::{
    plan_segment, AnimationError, AnimationPhase, AnimationState, PositionStream, PositionUpdate,
    SegmentPlan, TrackAnimator,
};
pub use scene::{CameraTarget, SceneDescription};
pub use config::{ConfigError, ViewerConfig};
pub use viewer::ViewerSession;
pub use visualization::RerunLogger;
