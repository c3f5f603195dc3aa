//! Refresh rate limiting.
//!
//! Portable scheduling state without async/await or platform timers: the
//! caller passes the current time in and gets a decision back. Requests that
//! arrive faster than the configured maximum refresh rate are coalesced, so
//! only the latest buffer state is ever sent.

use embassy_time::{Duration, Instant};

/// What the driver should do with a pending refresh right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Nothing is pending
    Idle,
    /// Send a frame now
    Transmit,
    /// A refresh is pending but the minimum interval hasn't elapsed yet
    Wait(Duration),
}

/// Tracks refresh requests and the minimum inter-frame interval.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = RefreshScheduler::new(Some(Duration::from_millis(10)));
///
/// scheduler.request_refresh();
/// if scheduler.poll(now) == RefreshDecision::Transmit {
///     send_frame();
///     scheduler.mark_transmitted(now);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    min_interval: Option<Duration>,
    last_refresh: Option<Instant>,
    pending: bool,
}

impl RefreshScheduler {
    /// Create a scheduler.
    ///
    /// `None` or a zero interval disables throttling.
    pub fn new(max_refresh_rate: Option<Duration>) -> Self {
        Self {
            min_interval: max_refresh_rate.filter(|interval| interval.as_ticks() != 0),
            last_refresh: None,
            pending: false,
        }
    }

    /// Minimum interval between frames, if throttling is enabled
    pub const fn min_interval(&self) -> Option<Duration> {
        self.min_interval
    }

    /// Instant of the last completed transmission
    pub const fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mark the buffer as needing a new frame.
    ///
    /// Multiple requests before the next transmission collapse into one.
    pub fn request_refresh(&mut self) {
        self.pending = true;
    }

    /// Decide whether a frame may go out at `now`
    pub fn poll(&self, now: Instant) -> RefreshDecision {
        if !self.pending {
            return RefreshDecision::Idle;
        }
        let (Some(min_interval), Some(last_refresh)) = (self.min_interval, self.last_refresh)
        else {
            return RefreshDecision::Transmit;
        };
        // A clock that went backwards can't be trusted for throttling
        let Some(elapsed) = now.checked_duration_since(last_refresh) else {
            return RefreshDecision::Transmit;
        };
        if elapsed < min_interval {
            RefreshDecision::Wait(min_interval - elapsed)
        } else {
            RefreshDecision::Transmit
        }
    }

    /// Record a completed transmission
    pub fn mark_transmitted(&mut self, now: Instant) {
        self.last_refresh = Some(now);
        self.pending = false;
    }

    /// Drop the pending request without transmitting
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Earliest instant the pending request may be sent.
    ///
    /// `None` if nothing is pending.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        match self.poll(now) {
            RefreshDecision::Idle => None,
            RefreshDecision::Transmit => Some(now),
            RefreshDecision::Wait(delay) => Some(now + delay),
        }
    }
}
