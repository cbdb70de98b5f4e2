use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

/// Time tracking for rate limiters
///
/// Production limiters read monotonic time from an `Instant` epoch with
/// nanosecond precision. Tests swap in a manually advanced clock so
/// elapsed-time behavior is deterministic instead of slept for.
#[derive(Debug, Clone)]
pub(crate) enum Clock {
    /// Monotonic time relative to a fixed epoch
    Monotonic { epoch: Instant },

    /// Manually advanced time, shared with a `ManualClock` handle
    Manual { nanos: Arc<AtomicU64> },
}

impl Clock {
    /// Create a monotonic clock with the current time as epoch
    pub fn monotonic() -> Self {
        Self::Monotonic { epoch: Instant::now() }
    }

    /// Get current time in nanoseconds since epoch
    #[inline(always)]
    pub fn now_nanos(&self) -> u64 {
        match self {
            Self::Monotonic { epoch } => epoch.elapsed().as_nanos() as u64,
            Self::Manual { nanos } => nanos.load(Ordering::Acquire),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::monotonic()
    }
}

/// Handle that drives a manual clock forward
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a manual clock starting at zero
    pub fn new() -> Self {
        Self { nanos: Arc::new(AtomicU64::new(0)) }
    }

    /// Get a `Clock` that reads this handle's time
    pub fn clock(&self) -> Clock {
        Clock::Manual { nanos: Arc::clone(&self.nanos) }
    }

    /// Advance the clock
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::Release);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}
