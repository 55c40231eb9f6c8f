//! Randomized refresh scheduling.
//!
//! After a fresh placement, the next scheduled refresh deadline is drawn
//! uniformly from the configured window. After a scheduled cancel, the
//! deadline advances by a short fixed cooldown instead, so the rule does
//! not re-trigger before replacement orders are up.

use rand::Rng;

/// Cooldown applied after a scheduled refresh cancel (ms). Independent
/// of the randomized window.
pub const REFRESH_COOLDOWN_MS: i64 = 5_000;

/// Draws refresh deadlines from a uniform window.
///
/// The RNG is injected by the caller so tests can pass a seeded source.
#[derive(Debug, Clone, Copy)]
pub struct RefreshScheduler {
    min_ms: u64,
    max_ms: u64,
}

impl RefreshScheduler {
    /// Window bounds in milliseconds, `min_ms <= max_ms`.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        debug_assert!(min_ms <= max_ms);
        Self { min_ms, max_ms }
    }

    /// Absolute deadline for the next scheduled refresh, drawn uniformly
    /// from `[now + min, now + max]`.
    pub fn draw_deadline<R: Rng>(&self, rng: &mut R, now_ms: i64) -> i64 {
        now_ms + rng.gen_range(self.min_ms..=self.max_ms) as i64
    }

    /// Deadline after a scheduled cancel: `now + fixed cooldown`.
    pub fn cooldown_deadline(&self, now_ms: i64) -> i64 {
        now_ms + REFRESH_COOLDOWN_MS
    }
}
