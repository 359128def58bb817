//! Simulation context implementing TrackContext for deterministic replays.

use async_trait::async_trait;
use globetrack_env::TrackContext;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Simulation context backed by a virtual clock.
///
/// This implements `TrackContext` using:
/// - A virtual clock that only moves when something sleeps (or is advanced manually)
/// - A sleep log recording every timer the animator armed
pub struct SimContext {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Every requested sleep, in order
    sleep_log: Arc<Mutex<Vec<Duration>>>,

    /// Epoch offset (virtual time 0 maps to this wall-clock time)
    epoch: SystemTime,
}

impl SimContext {
    /// Creates a new SimContext starting at virtual time zero.
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
            epoch: UNIX_EPOCH + Duration::from_secs(1704067200), // 2024-01-01 00:00:00 UTC
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap()
    }

    /// Every sleep requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleep_log.lock().unwrap().clone()
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            sleep_log: Arc::clone(&self.sleep_log),
            epoch: self.epoch,
        }
    }
}

#[async_trait]
impl TrackContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(*self.virtual_time_ns.lock().unwrap())
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        // Sleep advances virtual time, then yields so cancellation can
        // interleave with the driver
        self.sleep_log.lock().unwrap().push(duration);
        self.advance_time(duration);
        tokio::task::yield_now().await;
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tracing::trace!(task = name, "spawning simulated task");
        tokio::spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_context_time() {
        let ctx = SimContext::new();
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(1));
        assert_eq!(ctx.now(), Duration::from_secs(1));

        ctx.advance_time(Duration::from_millis(500));
        assert_eq!(ctx.now(), Duration::from_millis(1500));
        assert_eq!(ctx.time_ns(), 1_500_000_000);
    }

    #[tokio::test]
    async fn test_sim_sleep_is_virtual() {
        let ctx = SimContext::new();
        let wall = std::time::Instant::now();

        ctx.sleep(Duration::from_secs(3600)).await;

        assert_eq!(ctx.now(), Duration::from_secs(3600));
        assert_eq!(ctx.sleeps(), vec![Duration::from_secs(3600)]);
        assert!(wall.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_sim_system_time_follows_clock() {
        let ctx = SimContext::new();
        let t0 = ctx.system_time();
        ctx.advance_time(Duration::from_secs(10));
        assert_eq!(ctx.system_time().duration_since(t0).unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_sim_context_clone_shares_time() {
        let ctx1 = SimContext::new();
        let ctx2 = ctx1.clone();

        ctx1.advance_time(Duration::from_secs(5));

        // Both should see the same time
        assert_eq!(ctx1.now(), ctx2.now());
    }
}
