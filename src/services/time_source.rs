//! Clock abstraction for the ingest loop.
//!
//! The aggregator stamps every sample and times every render pass through a
//! `TimeSource`, so tests can drive the render cadence and the time axis with
//! a clock that only moves when told to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic instants.
pub trait TimeSource: Send + Sync + std::fmt::Debug {
    /// Get the current instant for measuring elapsed time.
    fn now(&self) -> Instant;

    /// Calculate elapsed time since an earlier instant.
    fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

/// Type alias for shared time source.
pub type SharedTimeSource = Arc<dyn TimeSource>;

/// Wall-clock implementation backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeSource;

impl RealTimeSource {
    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> SharedTimeSource {
        Arc::new(Self)
    }
}

impl TimeSource for RealTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
///
/// `now()` is a fixed base instant plus the logical time accumulated through
/// [`TestTimeSource::advance`]. A recording render surface can hold a clone
/// of the `Arc` and advance it to simulate slow render passes.
///
/// # Example
///
/// ```
/// use livechart::services::time_source::{TestTimeSource, TimeSource};
/// use std::time::Duration;
///
/// let time = TestTimeSource::new();
/// let start = time.now();
/// time.advance(Duration::from_millis(1500));
/// assert_eq!(time.elapsed_since(start), Duration::from_millis(1500));
/// ```
#[derive(Debug)]
pub struct TestTimeSource {
    logical_nanos: AtomicU64,
    base_instant: Instant,
}

impl Default for TestTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTimeSource {
    pub fn new() -> Self {
        Self {
            logical_nanos: AtomicU64::new(0),
            base_instant: Instant::now(),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Move logical time forward.
    pub fn advance(&self, duration: Duration) {
        self.logical_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Logical time elapsed since creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.logical_nanos.load(Ordering::SeqCst))
    }
}

impl TimeSource for TestTimeSource {
    fn now(&self) -> Instant {
        self.base_instant + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_time_source_now_advances() {
        let ts = RealTimeSource::new();
        let t1 = ts.now();
        std::thread::sleep(Duration::from_millis(1));
        assert!(ts.now() > t1);
    }

    #[test]
    fn test_time_source_only_moves_when_advanced() {
        let ts = TestTimeSource::new();
        let start = ts.now();
        assert_eq!(ts.now(), start);

        ts.advance(Duration::from_secs(2));
        assert_eq!(ts.elapsed(), Duration::from_secs(2));
        assert_eq!(ts.elapsed_since(start), Duration::from_secs(2));
    }

    #[test]
    fn elapsed_since_later_instant_saturates() {
        let ts = TestTimeSource::new();
        let later = ts.now() + Duration::from_secs(1);
        assert_eq!(ts.elapsed_since(later), Duration::ZERO);
    }

    #[test]
    fn shared_time_sources_coerce_to_trait_object() {
        let test = TestTimeSource::shared();
        let shared: SharedTimeSource = test.clone();
        test.advance(Duration::from_millis(5));
        assert_eq!(shared.elapsed_since(shared.now()), Duration::ZERO);
        let _ = RealTimeSource::shared().now();
    }
}
