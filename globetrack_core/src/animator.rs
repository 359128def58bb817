//! The Track Animator - moves a marker along a Track in real time.
//!
//! A linear, single-flight state machine:
//!
//! ```text
//!   Idle ──start()──► Running(0) ─timer─► Running(1) ─ ... ─► Completed
//!                         │                   │
//!                         └──cancel()/drop────┴─► Cancelled
//!                         └──bad segment──────┴─► Failed
//! ```
//!
//! Each transition `index -> index + 1` waits exactly one timer of
//! `distance / speed` seconds. The next timer is only armed after the
//! previous one fired and its position was published.
//!
//! # Observing
//!
//! - `PositionStream` delivers every emitted position in order
//!   (single subscriber).
//! - `current_position()` / `state()` read the latest published state.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::geometry::Geometry;
use crate::speed::SpeedSpec;
use crate::track::{GeoPoint, Track};
use globetrack_env::TrackContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Errors that stop an animation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    /// Resolved speed is zero, negative or not finite.
    #[error("Invalid speed {speed} m/s for segment {segment}")]
    InvalidSpeed { segment: usize, speed: f64 },

    /// Per-segment speeds do not cover every segment.
    #[error("Speed spec covers {provided} segments, {required} required")]
    SpeedSpecTooShort { required: usize, provided: usize },

    /// Geometry returned something that is not a usable length.
    #[error("Invalid distance {distance} m for segment {segment}")]
    InvalidDistance { segment: usize, distance: f64 },

    /// `start()` was called on an animator that already ran.
    #[error("Animation already started")]
    AlreadyStarted,
}

/// Lifecycle of an animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl AnimationPhase {
    /// No further emissions once terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// The single mutable cell behind the moving marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    /// Index of the waypoint the marker currently sits on
    pub index: usize,

    /// `None` until the first emission (and forever for inert tracks)
    pub position: Option<GeoPoint>,

    pub phase: AnimationPhase,
}

impl AnimationState {
    fn idle() -> Self {
        Self {
            index: 0,
            position: None,
            phase: AnimationPhase::Idle,
        }
    }
}

/// One emitted marker position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub index: usize,
    pub position: GeoPoint,

    /// Context time since `start()`
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

/// Timing of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Segment `i` runs from point `i` to point `i + 1`
    pub segment: usize,
    pub distance_m: f64,
    pub speed_mps: f64,
    #[serde(with = "duration_secs")]
    pub delay: Duration,
}

impl SegmentPlan {
    pub fn delay_ms(&self) -> f64 {
        self.delay.as_secs_f64() * 1000.0
    }
}

/// Computes the timer for `segment`: `distance / speed * 1000` ms.
pub fn plan_segment<G>(
    geometry: &G,
    track: &Track,
    speed: &SpeedSpec,
    segment: usize,
) -> Result<SegmentPlan, AnimationError>
where
    G: Geometry + ?Sized,
{
    let (from, to) = match (track.get(segment), track.get(segment + 1)) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Err(AnimationError::InvalidDistance {
                segment,
                distance: f64::NAN,
            })
        }
    };

    let distance_m = geometry.distance(from, to);
    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(AnimationError::InvalidDistance {
            segment,
            distance: distance_m,
        });
    }

    let speed_mps = speed.speed_for(segment)?;
    let travel_ms = (distance_m / speed_mps) * 1000.0;
    let delay = Duration::try_from_secs_f64(travel_ms / 1000.0).map_err(|_| {
        AnimationError::InvalidDistance {
            segment,
            distance: distance_m,
        }
    })?;

    Ok(SegmentPlan {
        segment,
        distance_m,
        speed_mps,
        delay,
    })
}

/// Ordered stream of marker positions.
///
/// Ends (`next()` returns `None`) once the run reaches a terminal phase.
/// Dropping the stream tears the run down.
pub struct PositionStream {
    rx: mpsc::UnboundedReceiver<PositionUpdate>,
}

impl PositionStream {
    fn closed() -> Self {
        let (_tx, rx) = mpsc::unbounded_channel();
        Self { rx }
    }

    /// Waits for the next position.
    pub async fn next(&mut self) -> Option<PositionUpdate> {
        self.rx.recv().await
    }

    /// Drains the stream until it ends.
    pub async fn collect(mut self) -> Vec<PositionUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next().await {
            updates.push(update);
        }
        updates
    }
}

/// Drives a marker along a Track.
///
/// Generic over the context (tokio or simulated clock) and the geometry
/// collaborator.
pub struct TrackAnimator<Ctx, G>
where
    Ctx: TrackContext,
    G: Geometry,
{
    context: Arc<Ctx>,
    geometry: Arc<G>,
    sink: Arc<dyn DiagnosticSink>,
    track: Arc<Track>,
    speed: SpeedSpec,
    state: Arc<watch::Sender<AnimationState>>,
    name: String,
}

impl<Ctx, G> TrackAnimator<Ctx, G>
where
    Ctx: TrackContext,
    G: Geometry,
{
    pub fn new(
        context: Arc<Ctx>,
        geometry: Arc<G>,
        sink: Arc<dyn DiagnosticSink>,
        track: Arc<Track>,
        speed: SpeedSpec,
    ) -> Self {
        let (state, _) = watch::channel(AnimationState::idle());
        Self {
            context,
            geometry,
            sink,
            track,
            speed,
            state: Arc::new(state),
            name: "track-animator".to_string(),
        }
    }

    /// Names the driver task (for logging).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Latest published state.
    pub fn state(&self) -> AnimationState {
        self.state.borrow().clone()
    }

    /// Latest published marker position.
    pub fn current_position(&self) -> Option<GeoPoint> {
        self.state.borrow().position
    }

    /// Watch handle for renderers that only need the newest value.
    pub fn watch(&self) -> watch::Receiver<AnimationState> {
        self.state.subscribe()
    }

    /// Planned timer for every segment, without running anything.
    pub fn segment_delays(&self) -> Result<Vec<SegmentPlan>, AnimationError> {
        self.speed.validate(self.track.segment_count())?;
        (0..self.track.segment_count())
            .map(|segment| plan_segment(self.geometry.as_ref(), &self.track, &self.speed, segment))
            .collect()
    }

    /// Starts the run and returns its position stream.
    ///
    /// - Fewer than two points: returns an already-closed stream.
    /// - Invalid speed spec: fails before anything is emitted.
    /// - Otherwise emits `track[0]` immediately and spawns the driver.
    pub fn start(&mut self) -> Result<PositionStream, AnimationError> {
        if self.state.borrow().phase != AnimationPhase::Idle {
            return Err(AnimationError::AlreadyStarted);
        }

        if !self.track.is_animatable() {
            self.sink.report(Diagnostic::TrackTooShort {
                points: self.track.len(),
            });
            self.state.send_modify(|s| s.phase = AnimationPhase::Completed);
            return Ok(PositionStream::closed());
        }

        if let Err(e) = self.speed.validate(self.track.segment_count()) {
            self.sink.report(Diagnostic::AnimationFailed {
                index: 0,
                reason: e.to_string(),
            });
            self.state.send_modify(|s| s.phase = AnimationPhase::Failed);
            return Err(e);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let started_at = self.context.now();
        let first = self.track.points()[0];

        self.state.send_modify(|s| {
            s.index = 0;
            s.position = Some(first);
            s.phase = AnimationPhase::Running;
        });
        let _ = tx.send(PositionUpdate {
            index: 0,
            position: first,
            elapsed: Duration::ZERO,
        });

        info!(
            animator = %self.name,
            points = self.track.len(),
            constant_speed = self.speed.is_constant(),
            "Animation started"
        );

        let driver = Driver {
            context: Arc::clone(&self.context),
            geometry: Arc::clone(&self.geometry),
            sink: Arc::clone(&self.sink),
            track: Arc::clone(&self.track),
            speed: self.speed.clone(),
            state: Arc::clone(&self.state),
            updates: tx,
            started_at,
        };
        self.context.spawn(&self.name, driver.run());

        Ok(PositionStream { rx })
    }

    /// Cancels the run. The pending timer is abandoned and nothing is
    /// emitted afterwards. No-op once terminal.
    pub fn cancel(&self) {
        cancel_state(&self.state);
    }

    pub fn is_finished(&self) -> bool {
        self.state.borrow().phase.is_terminal()
    }

    /// Resolves once the run reaches a terminal phase.
    pub async fn finished(&self) -> AnimationState {
        let mut rx = self.state.subscribe();
        until_terminal(&mut rx).await;
        let state = rx.borrow().clone();
        state
    }
}

impl<Ctx, G> Drop for TrackAnimator<Ctx, G>
where
    Ctx: TrackContext,
    G: Geometry,
{
    fn drop(&mut self) {
        cancel_state(&self.state);
    }
}

/// Waits until the watched state is terminal (or the cell is gone).
async fn until_terminal(rx: &mut watch::Receiver<AnimationState>) {
    loop {
        if rx.borrow_and_update().phase.is_terminal() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Flips a running state to `Cancelled`, returning true if it did.
fn cancel_state(state: &watch::Sender<AnimationState>) -> bool {
    state.send_if_modified(|s| {
        if s.phase == AnimationPhase::Running {
            s.phase = AnimationPhase::Cancelled;
            true
        } else {
            false
        }
    })
}

/// The spawned half of a run. Owns the only writer of `index`.
struct Driver<Ctx, G>
where
    Ctx: TrackContext,
    G: Geometry,
{
    context: Arc<Ctx>,
    geometry: Arc<G>,
    sink: Arc<dyn DiagnosticSink>,
    track: Arc<Track>,
    speed: SpeedSpec,
    state: Arc<watch::Sender<AnimationState>>,
    updates: mpsc::UnboundedSender<PositionUpdate>,
    started_at: Duration,
}

enum Wake {
    Timer,
    Stopped,
}

impl<Ctx, G> Driver<Ctx, G>
where
    Ctx: TrackContext,
    G: Geometry,
{
    async fn run(self) {
        let last = self.track.len() - 1;
        let mut index = 0;
        let mut terminal = self.state.subscribe();

        while index < last {
            let plan = match plan_segment(self.geometry.as_ref(), &self.track, &self.speed, index) {
                Ok(plan) => plan,
                Err(e) => {
                    self.fail(index, &e);
                    return;
                }
            };

            debug!(
                from = index,
                to = index + 1,
                distance_m = format_args!("{:.2}", plan.distance_m),
                speed_mps = plan.speed_mps,
                travel_ms = format_args!("{:.2}", plan.delay_ms()),
                "Moving to next waypoint"
            );

            // One timer in flight; cancellation or a dropped consumer
            // abandons it
            let wake = tokio::select! {
                biased;
                _ = until_terminal(&mut terminal) => Wake::Stopped,
                _ = self.updates.closed() => Wake::Stopped,
                _ = self.context.sleep(plan.delay) => Wake::Timer,
            };

            if let Wake::Stopped = wake {
                break;
            }

            index += 1;
            if !self.advance(index, last) {
                break;
            }
        }

        self.finish(index);
    }

    /// Publishes `track[index]` unless the run was stopped meanwhile.
    /// Returns false when the run is no longer live.
    fn advance(&self, index: usize, last: usize) -> bool {
        let position = self.track.points()[index];
        let elapsed = self.context.now().saturating_sub(self.started_at);

        self.state.send_if_modified(|s| {
            if s.phase != AnimationPhase::Running {
                return false;
            }
            s.index = index;
            s.position = Some(position);
            if index == last {
                s.phase = AnimationPhase::Completed;
            }
            // Sent under the state lock so cancel() cannot interleave
            if self
                .updates
                .send(PositionUpdate {
                    index,
                    position,
                    elapsed,
                })
                .is_err()
            {
                s.phase = AnimationPhase::Cancelled;
            }
            true
        });

        self.state.borrow().phase == AnimationPhase::Running
    }

    fn finish(&self, index: usize) {
        // A consumer that went away without cancelling still ends the run
        cancel_state(&self.state);

        let state = self.state.borrow().clone();
        match state.phase {
            AnimationPhase::Completed => self.sink.report(Diagnostic::AnimationCompleted {
                points: self.track.len(),
            }),
            AnimationPhase::Cancelled => {
                debug!(index, "Driver stopped");
                self.sink.report(Diagnostic::AnimationCancelled { index: state.index });
            }
            _ => {}
        }
    }

    fn fail(&self, index: usize, error: &AnimationError) {
        let failed = self.state.send_if_modified(|s| {
            if s.phase == AnimationPhase::Running {
                s.phase = AnimationPhase::Failed;
                true
            } else {
                false
            }
        });
        if failed {
            self.sink.report(Diagnostic::AnimationFailed {
                index,
                reason: error.to_string(),
            });
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
