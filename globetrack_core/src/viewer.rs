//! Viewer Session - wires the loader, animator and scene together.
//!
//! ```text
//! ┌──────────────┐   Track   ┌──────────────┐  PositionStream  ┌──────────┐
//! │ TextSource   │──────────►│ TrackAnimator│─────────────────►│ renderer │
//! │ + load_track │           └──────────────┘                  └──────────┘
//! └──────────────┘                  ▲                               ▲
//!        │                          │ TrackContext (timers)         │
//!        └────── SceneDescription (camera, start marker, path) ─────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let ctx = TokioContext::shared();
//! let session = ViewerSession::load(ctx, Arc::new(EllipsoidChord), &source, &config, sink).await?;
//! render_static(&session.scene);
//! let mut positions = session.start()?;
//! while let Some(update) = positions.next().await {
//!     move_marker(update.position);
//! }
//! ```

use crate::animator::{AnimationError, AnimationState, PositionStream, TrackAnimator};
use crate::config::ViewerConfig;
use crate::diagnostics::DiagnosticSink;
use crate::geometry::Geometry;
use crate::loader::{load_track, LoadError};
use crate::scene::SceneDescription;
use crate::track::Track;
use globetrack_env::{TextSource, TrackContext};
use std::sync::Arc;

/// A loaded track, its static scene and the (not yet started) animator.
pub struct ViewerSession<Ctx, G>
where
    Ctx: TrackContext,
    G: Geometry,
{
    pub scene: SceneDescription,
    animator: TrackAnimator<Ctx, G>,
}

impl<Ctx, G> ViewerSession<Ctx, G>
where
    Ctx: TrackContext,
    G: Geometry,
{
    /// Loads the track and prepares the scene.
    ///
    /// On `Err` the caller should keep showing
    /// `SceneDescription::camera_only(config.camera)`.
    pub async fn load<S>(
        context: Arc<Ctx>,
        geometry: Arc<G>,
        source: &S,
        config: &ViewerConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, LoadError>
    where
        S: TextSource + ?Sized,
    {
        let track = load_track(source, sink.as_ref()).await?;
        Ok(Self::from_track(context, geometry, track, config, sink))
    }

    /// Builds a session around an already-loaded track.
    pub fn from_track(
        context: Arc<Ctx>,
        geometry: Arc<G>,
        track: Track,
        config: &ViewerConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let scene = SceneDescription::for_track(&track, config.camera, &config.name);
        let animator = TrackAnimator::new(
            context,
            geometry,
            sink,
            Arc::new(track),
            config.speed.clone(),
        )
        .with_name(config.name.clone());

        Self { scene, animator }
    }

    pub fn track(&self) -> &Track {
        self.animator.track()
    }

    pub fn animator(&self) -> &TrackAnimator<Ctx, G> {
        &self.animator
    }

    /// Starts the marker.
    pub fn start(&mut self) -> Result<PositionStream, AnimationError> {
        self.animator.start()
    }

    /// Tears the session down: cancels any pending step.
    pub fn close(self) -> AnimationState {
        self.animator.cancel();
        self.animator.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::AnimationPhase;
    use crate::diagnostics::{Diagnostic, RecordingSink};
    use crate::geometry::EllipsoidChord;
    use async_trait::async_trait;
    use globetrack_env::{EnvError, TokioContext};
    use std::time::Duration;

    struct Csv(String);

    #[async_trait]
    impl TextSource for Csv {
        async fn fetch_text(&self) -> Result<String, EnvError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "csv".to_string()
        }
    }

    struct Down;

    #[async_trait]
    impl TextSource for Down {
        async fn fetch_text(&self) -> Result<String, EnvError> {
            Err(EnvError::transport("connection refused"))
        }

        fn describe(&self) -> String {
            "down".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_runs_track() {
        let sink = Arc::new(RecordingSink::new());
        let source = Csv("id,lat,lon\n1,39.79,-86.23\n2,39.80,-86.24\nbad,row\n3,39.81,-86.25\n".into());

        let mut session = ViewerSession::load(
            TokioContext::shared(),
            Arc::new(EllipsoidChord),
            &source,
            &ViewerConfig::default(),
            sink.clone(),
        )
        .await
        .unwrap();

        assert!(session.scene.has_track());
        assert_eq!(session.track().len(), 3);

        let updates = session.start().unwrap().collect().await;
        assert_eq!(updates.len(), 3);
        // ~1.4 km per leg at 1000 m/s
        assert!(updates[2].elapsed > Duration::from_secs(2));
        assert_eq!(session.animator().state().phase, AnimationPhase::Completed);
        assert_eq!(sink.malformed_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_session_source_down() {
        let sink = Arc::new(RecordingSink::new());
        let result = ViewerSession::load(
            TokioContext::shared(),
            Arc::new(EllipsoidChord),
            &Down,
            &ViewerConfig::default(),
            sink,
        )
        .await;

        assert!(matches!(result, Err(LoadError::SourceUnavailable { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels() {
        let sink = Arc::new(RecordingSink::new());
        let track: Track = (0..5)
            .map(|i| crate::track::GeoPoint::surface(-86.0 - i as f64 * 0.01, 39.8))
            .collect();

        let mut session = ViewerSession::from_track(
            TokioContext::shared(),
            Arc::new(EllipsoidChord),
            track,
            &ViewerConfig::default(),
            sink.clone(),
        );
        let mut positions = session.start().unwrap();
        assert!(positions.next().await.is_some());

        let state = session.close();
        assert_eq!(state.phase, AnimationPhase::Cancelled);
        assert!(positions.next().await.is_none());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::AnimationCancelled { index: 0 })));
    }
}
