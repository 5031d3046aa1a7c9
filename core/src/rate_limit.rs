//! Admission control over a rolling fixed window.
//!
//! The window restarts lazily: the first check that finds it older than the
//! window length resets the count and moves the window start to "now". Only
//! recorded successes count against the budget.
//!
//! Concurrent callers go through [`RateLimiter::try_acquire`], which reserves
//! an in-flight slot under the same lock as the check. A reservation turns
//! into a recorded success via [`AdmissionPermit::record_success`] and is
//! released when the permit is dropped otherwise, so failed dispatches never
//! consume budget and a window can never record more than its budget.

use crate::traits::{Clock, SystemClock};
use crate::types::RateLimitStatus;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
struct RateWindowState {
    request_count: u32,
    in_flight: u32,
    window_start: DateTime<Utc>,
}

/// Request budget shared by every caller of a gateway
pub struct RateLimiter {
    state: Mutex<RateWindowState>,
    max_requests: u32,
    window_ms: i64,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter backed by the system clock
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    /// Create a limiter reading time from `clock`
    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now();
        Self {
            state: Mutex::new(RateWindowState {
                request_count: 0,
                in_flight: 0,
                window_start,
            }),
            max_requests,
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RateWindowState> {
        // The state is a pair of counters; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn roll_window(&self, state: &mut RateWindowState, now: DateTime<Utc>) {
        let elapsed = now.signed_duration_since(state.window_start).num_milliseconds();
        if elapsed > self.window_ms {
            debug!(
                "Rate window expired after {}ms with {} recorded requests, resetting",
                elapsed, state.request_count
            );
            state.request_count = 0;
            state.window_start = now;
        }
    }

    fn has_capacity(&self, state: &RateWindowState) -> bool {
        state.request_count.saturating_add(state.in_flight) < self.max_requests
    }

    /// Whether a new call may proceed under the current window.
    ///
    /// Resets an expired window but never reserves or counts anything.
    /// Capacity is `recorded + in_flight < max`, so while `max` calls are
    /// still in flight (a hanging remote can hold them for the full retry
    /// cycle) this returns `false` even though `status()` reports zero
    /// recorded requests.
    pub fn admit(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();
        self.roll_window(&mut state, now);
        self.has_capacity(&state)
    }

    /// Admit a call and reserve a slot for it until it settles
    pub fn try_acquire(self: &Arc<Self>) -> Option<AdmissionPermit> {
        let now = self.clock.now();
        let mut state = self.lock();
        self.roll_window(&mut state, now);
        if !self.has_capacity(&state) {
            return None;
        }
        state.in_flight += 1;
        Some(AdmissionPermit {
            limiter: Arc::clone(self),
            settled: false,
        })
    }

    /// Count one successful dispatch against the current window
    pub fn record_success(&self) {
        let mut state = self.lock();
        state.request_count = state.request_count.saturating_add(1);
    }

    /// Snapshot of the window; never mutates state
    pub fn status(&self) -> RateLimitStatus {
        let now = self.clock.now();
        let state = self.lock();
        let elapsed = now.signed_duration_since(state.window_start).num_milliseconds();
        RateLimitStatus {
            current_requests: state.request_count,
            max_requests: self.max_requests,
            millis_until_reset: (self.window_ms - elapsed).max(0) as u64,
        }
    }

    fn settle(&self, success: bool) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if success {
            state.request_count = state.request_count.saturating_add(1);
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("window_ms", &self.window_ms)
            .field("state", &*self.lock())
            .finish()
    }
}

/// A reserved admission slot
#[must_use = "dropping a permit releases its slot without recording a success"]
pub struct AdmissionPermit {
    limiter: Arc<RateLimiter>,
    settled: bool,
}

impl AdmissionPermit {
    /// Turn the reservation into a recorded success
    pub fn record_success(mut self) {
        self.settled = true;
        self.limiter.settle(true);
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        if !self.settled {
            self.limiter.settle(false);
        }
    }
}
