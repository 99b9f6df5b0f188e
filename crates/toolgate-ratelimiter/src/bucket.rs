//! Per-tenant token bucket state.

use std::time::Instant;

/// A single tenant's token bucket.
///
/// `tokens` is real-valued so fractional refill amounts accumulate exactly
/// between checks instead of being rounded away.
pub(crate) struct Bucket {
    tokens: f64,
    last_refill: Instant,
    pub(crate) violations: u64,
    pub(crate) last_checked: Instant,
}

impl Bucket {
    pub(crate) fn new(burst_size: f64) -> Self {
        let now = Instant::now();
        Self {
            tokens: burst_size,
            last_refill: now,
            violations: 0,
            last_checked: now,
        }
    }

    fn refill(&mut self, requests_per_minute: f64, burst_size: f64, now: Instant) {
        let elapsed_secs = now.duration_since(self.last_refill).as_secs_f64();
        let rate_per_sec = requests_per_minute / 60.0;
        self.tokens = (self.tokens + elapsed_secs * rate_per_sec).min(burst_size);
        self.last_refill = now;
    }

    /// Attempts to admit one request, refilling the bucket first.
    ///
    /// Returns `Ok(tokens_remaining)` on admission, or `Err(retry_after_secs)`
    /// — the time until at least one token is available — on rejection.
    pub(crate) fn try_acquire(
        &mut self,
        requests_per_minute: f64,
        burst_size: f64,
    ) -> Result<f64, f64> {
        let now = Instant::now();
        self.last_checked = now;
        self.refill(requests_per_minute, burst_size, now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(self.tokens)
        } else {
            self.violations += 1;
            let rate_per_sec = requests_per_minute / 60.0;
            let retry_after_secs = if rate_per_sec > 0.0 {
                (1.0 - self.tokens) / rate_per_sec
            } else {
                f64::INFINITY
            };
            Err(retry_after_secs)
        }
    }

    pub(crate) fn idle_for(&self, now: Instant) -> std::time::Duration {
        now.duration_since(self.last_checked)
    }
}
