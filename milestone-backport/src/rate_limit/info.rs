//! Rate limit snapshot and wait calculation.

use std::time::Duration;

/// Maximum time to wait for a rate limit reset (1 hour).
pub(crate) const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
///
/// A backport run writes a handful of labels and comments per milestone, so a
/// small cushion is enough.
pub(crate) const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Core API rate limit state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// How long to sleep before the next write, if at all.
    ///
    /// Returns `None` while enough requests remain or once the window has
    /// already reset. Waits are capped at [`MAX_WAIT_SECS`].
    #[must_use]
    pub fn wait_duration(&self, now_unix_secs: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now_unix_secs {
            return None;
        }

        let wait_secs = (self.reset - now_unix_secs).min(MAX_WAIT_SECS);
        Some(Duration::from_secs(wait_secs))
    }
}
