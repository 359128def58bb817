//! Replay runner - plays a whole session on the virtual clock.

use crate::context::SimContext;
use crate::exporter::{TimelineExport, TimelineFrame};
use globetrack_core::{
    AnimationPhase, Diagnostic, DiagnosticSink, GeometryKind, LoadError, RecordingSink,
    SegmentPlan, TeeSink, TracingSink, ViewerConfig, ViewerSession,
};
use globetrack_core::{PositionUpdate, SceneDescription};
use globetrack_env::TextSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Forwards to tracing and keeps a copy for the export.
struct ReplaySink {
    recording: RecordingSink,
}

impl DiagnosticSink for ReplaySink {
    fn report(&self, diagnostic: Diagnostic) {
        TeeSink::new(vec![&self.recording as &dyn DiagnosticSink, &TracingSink]).report(diagnostic);
    }
}

/// Result of a replay.
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub scene: SceneDescription,
    pub updates: Vec<PositionUpdate>,
    pub segments: Vec<SegmentPlan>,
    pub phase: AnimationPhase,

    /// Virtual time at the end of the run
    pub total_time: Duration,

    /// Failure reason when the run did not complete
    pub failure_reason: Option<String>,

    pub diagnostics: Vec<Diagnostic>,
}

impl ReplayResult {
    pub fn completed(&self) -> bool {
        self.phase == AnimationPhase::Completed
    }

    /// Skipped rows, empty loads and failures seen during the run.
    pub fn problems(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_problem())
    }

    /// Builds the JSON export for this run.
    pub fn to_export(&self, source: &str, geometry: GeometryKind) -> TimelineExport {
        let mut export = TimelineExport::new(source, geometry.name(), self.scene.clone());
        export.segments = self.segments.clone();
        for update in &self.updates {
            export.add_frame(TimelineFrame::from(update));
        }
        let outcome = serde_json::to_value(self.phase)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.phase));
        export.finalize(&outcome, self.diagnostics.clone());
        export
    }
}

/// Loads `source` and replays its animation to the end on a virtual clock.
///
/// # Returns
/// * `Ok(result)` - The run finished (completed, failed or inert)
/// * `Err(LoadError)` - The source could not be fetched
pub async fn replay<S>(source: &S, config: &ViewerConfig) -> Result<ReplayResult, LoadError>
where
    S: TextSource + ?Sized,
{
    let context = SimContext::shared();
    let sink = Arc::new(ReplaySink {
        recording: RecordingSink::new(),
    });

    let mut session = ViewerSession::load(
        Arc::clone(&context),
        Arc::new(config.geometry),
        source,
        config,
        sink.clone(),
    )
    .await?;

    let segments = session.animator().segment_delays().unwrap_or_default();

    let (updates, failure_reason) = match session.start() {
        Ok(stream) => (stream.collect().await, None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    let state = session.animator().finished().await;
    let failure_reason = failure_reason.or_else(|| {
        sink.recording.diagnostics().into_iter().find_map(|d| match d {
            Diagnostic::AnimationFailed { reason, .. } => Some(reason),
            _ => None,
        })
    });

    for update in &updates {
        debug!(
            index = update.index,
            t = format_args!("{:.3}s", update.elapsed.as_secs_f64()),
            "Marker at {}",
            update.position
        );
    }
    info!(
        frames = updates.len(),
        phase = ?state.phase,
        virtual_secs = context.time_ns() as f64 / 1e9,
        "Replay finished"
    );

    Ok(ReplayResult {
        scene: session.scene.clone(),
        updates,
        segments,
        phase: state.phase,
        total_time: Duration::from_nanos(context.time_ns()),
        failure_reason,
        diagnostics: sink.recording.diagnostics(),
    })
}
