use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::clock::Clock;
use crate::limiter::RateLimiter;

/// Sliding window rate limiter
///
/// Keeps a log of admission timestamps and enforces a hard cap on how many
/// fall inside the trailing window. Entries older than the window are
/// pruned before every decision, including denied ones, so the log never
/// grows past the cap.
pub struct SlidingWindow {
    /// Admission timestamps in nanos, oldest first
    log: Mutex<VecDeque<u64>>,

    /// Maximum admissions inside the window
    max_requests: u32,

    /// Window length in nanoseconds
    window_nanos: u64,

    /// Time source for pruning
    clock: Clock,
}

impl SlidingWindow {
    /// Create a new sliding window rate limiter
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Clock::monotonic())
    }

    pub(crate) fn with_clock(max_requests: u32, window: Duration, clock: Clock) -> Self {
        assert!(max_requests > 0, "Max requests must be greater than 0");
        assert!(!window.is_zero(), "Window duration must be greater than 0");

        Self {
            log: Mutex::new(VecDeque::with_capacity(max_requests as usize)),
            max_requests,
            window_nanos: window.as_nanos() as u64,
            clock,
        }
    }

    /// Create a sliding window limiter with a per-second cap
    pub fn per_second(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    /// Create a builder for configuring a sliding window limiter
    pub fn builder() -> SlidingWindowBuilder {
        SlidingWindowBuilder::new()
    }

    /// Drop log entries strictly older than the window
    ///
    /// Timestamps are non-decreasing, so stale entries form a prefix.
    fn prune(&self, now: u64, log: &mut VecDeque<u64>) {
        while log.front().is_some_and(|&t| now.saturating_sub(t) > self.window_nanos) {
            log.pop_front();
        }
    }

    /// Count admissions currently inside the window
    ///
    /// Prunes stale entries first, so this is a mutating read rather than a
    /// pure one.
    pub fn current_requests(&self) -> usize {
        let now = self.clock.now_nanos();
        let mut log = self.log.lock();
        self.prune(now, &mut log);
        log.len()
    }
}

impl RateLimiter for SlidingWindow {
    fn try_acquire(&self, permits: u32) -> bool {
        if permits == 0 {
            return true;
        }

        let now = self.clock.now_nanos();
        let mut log = self.log.lock();
        self.prune(now, &mut log);

        if log.len() + permits as usize <= self.max_requests as usize {
            for _ in 0..permits {
                log.push_back(now);
            }
            true
        } else {
            trace!(permits, in_window = log.len(), "sliding window denied");
            false
        }
    }

    fn available(&self) -> u32 {
        let now = self.clock.now_nanos();
        let mut log = self.log.lock();
        self.prune(now, &mut log);
        self.max_requests - log.len() as u32
    }

    fn capacity(&self) -> u32 {
        self.max_requests
    }

    fn reset(&self) {
        self.log.lock().clear();
    }
}

/// Builder for configuring a sliding window rate limiter
pub struct SlidingWindowBuilder {
    max_requests: Option<u32>,
    window: Option<Duration>,
}

impl SlidingWindowBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { max_requests: None, window: None }
    }

    /// Set the cap (max requests per window)
    pub fn max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = Some(max_requests);
        self
    }

    /// Set the window duration
    pub fn window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    /// Set a per-second cap
    pub fn per_second(mut self, max_requests: u32) -> Self {
        self.max_requests = Some(max_requests);
        self.window = Some(Duration::from_secs(1));
        self
    }

    /// Build the sliding window limiter
    ///
    /// # Panics
    /// Panics if the cap or window is not set
    pub fn build(self) -> SlidingWindow {
        let max_requests = self.max_requests.expect("Max requests must be set");
        let window = self.window.expect("Window must be set");
        SlidingWindow::new(max_requests, window)
    }
}

impl Default for SlidingWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_creation() {
        let window = SlidingWindow::per_second(100);
        assert_eq!(window.capacity(), 100);
        assert_eq!(window.available(), 100);
        assert_eq!(window.current_requests(), 0);
    }

    #[test]
    fn test_cap_enforced_within_window() {
        let clock = ManualClock::new();
        let window = SlidingWindow::with_clock(5, Duration::from_secs(1), clock.clock());

        // Five admissions at the same instant all succeed
        for _ in 0..5 {
            assert!(window.try_acquire_one());
        }

        // The sixth is denied immediately
        assert!(!window.try_acquire_one());
        assert_eq!(window.current_requests(), 5);

        // Once the window has fully passed, admissions resume
        clock.advance(Duration::from_millis(1050));
        assert!(window.try_acquire_one());
    }

    #[test]
    fn test_entries_expire_individually() {
        let clock = ManualClock::new();
        let window = SlidingWindow::with_clock(5, Duration::from_secs(1), clock.clock());

        assert!(window.try_acquire(3));
        clock.advance(Duration::from_millis(600));
        assert!(window.try_acquire(2));

        // t=1.1s: only the first three entries have left the window
        clock.advance(Duration::from_millis(500));
        assert_eq!(window.current_requests(), 2);
        assert!(window.try_acquire(3));
        assert!(!window.try_acquire_one());
    }

    #[test]
    fn test_pruning_happens_on_denial() {
        let clock = ManualClock::new();
        let window = SlidingWindow::with_clock(2, Duration::from_secs(1), clock.clock());

        assert!(window.try_acquire(2));
        clock.advance(Duration::from_millis(500));
        assert!(!window.try_acquire_one());

        // The denied call still pruned; the stale entries drop out later
        clock.advance(Duration::from_millis(600));
        assert_eq!(window.current_requests(), 0);
    }

    #[test]
    fn test_entry_at_exact_window_age_is_kept() {
        let clock = ManualClock::new();
        let window = SlidingWindow::with_clock(1, Duration::from_secs(1), clock.clock());

        assert!(window.try_acquire_one());

        // Exactly window-old entries are not yet stale
        clock.advance(Duration::from_secs(1));
        assert_eq!(window.current_requests(), 1);

        clock.advance(Duration::from_nanos(1));
        assert_eq!(window.current_requests(), 0);
    }

    #[test]
    fn test_acquire_many_is_all_or_nothing() {
        let window = SlidingWindow::per_second(5);

        assert!(window.try_acquire(3));
        assert!(!window.try_acquire(3));
        assert_eq!(window.current_requests(), 3);
        assert!(window.try_acquire(2));
    }

    #[test]
    fn test_zero_permits() {
        let window = SlidingWindow::per_second(5);
        assert!(window.try_acquire(0));
        assert_eq!(window.current_requests(), 0);
    }

    #[test]
    fn test_reset() {
        let window = SlidingWindow::per_second(5);

        assert!(window.try_acquire(5));
        assert_eq!(window.available(), 0);

        window.reset();
        assert_eq!(window.available(), 5);
    }

    #[test]
    fn test_builder() {
        let window = SlidingWindow::builder().max_requests(10).window(Duration::from_secs(60)).build();

        assert_eq!(window.capacity(), 10);
    }

    #[test]
    fn test_builder_per_second() {
        let window = SlidingWindow::builder().per_second(5).build();

        assert_eq!(window.capacity(), 5);
    }

    #[test]
    #[should_panic(expected = "Max requests must be greater than 0")]
    fn test_zero_cap_rejected() {
        let _ = SlidingWindow::per_second(0);
    }

    #[test]
    #[should_panic(expected = "Window duration must be greater than 0")]
    fn test_zero_window_rejected() {
        let _ = SlidingWindow::new(5, Duration::ZERO);
    }

    #[test]
    fn test_concurrent_admissions_match_cap() {
        use std::sync::Arc;

        let window = Arc::new(SlidingWindow::new(100, Duration::from_secs(3600)));
        let mut handles = vec![];

        for _ in 0..10 {
            let window_clone = Arc::clone(&window);
            let handle = std::thread::spawn(move || {
                let mut acquired = 0;
                for _ in 0..50 {
                    if window_clone.try_acquire_one() {
                        acquired += 1;
                    }
                }
                acquired
            });
            handles.push(handle);
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(total, 100);
    }
}
