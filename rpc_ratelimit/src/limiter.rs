/// Core trait for all rate limiting implementations
///
/// Implementations decide, without blocking or suspending, whether a
/// request may proceed right now. Denial is an ordinary outcome reported as
/// `false`; turning a denial plus a wait hint into an actual retry loop is
/// the caller's job.
pub trait RateLimiter: Send + Sync {
    /// Try to admit `permits` requests at once without blocking
    fn try_acquire(&self, permits: u32) -> bool;

    /// Try to admit a single request without blocking
    fn try_acquire_one(&self) -> bool {
        self.try_acquire(1)
    }

    /// Get the number of requests that could currently be admitted
    fn available(&self) -> u32;

    /// Get the maximum burst capacity
    fn capacity(&self) -> u32;

    /// Reset the limiter to its freshly constructed state
    fn reset(&self);
}
