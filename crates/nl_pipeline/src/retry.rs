use std::time::Duration;

/// Bounds for re-running a failed pipeline step. Three attempts with
/// exponential backoff starting at 500ms; both knobs are tunables.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following `attempt` (zero-based):
    /// `base_delay * 2^attempt`, capped at 30s.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.base_delay * 2u32.saturating_pow(attempt);
        delay.min(Duration::from_secs(30))
    }
}
