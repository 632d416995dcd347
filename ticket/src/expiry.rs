//! Validity countdown for the active ticket.
//!
//! The clock never reads the time itself: every [`ExpiryClock::tick`] is
//! handed "now" by its owner. That keeps it deterministic and lets tests
//! jump straight to expiry.

use chrono::{DateTime, Duration, Utc};

/// Default low-time warning threshold
pub const DEFAULT_LOW_TIME_THRESHOLD: Duration = Duration::minutes(5);

/// Transition reported by a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    /// Remaining time reached zero; reported exactly once per start
    Expired,
}

/// Result of one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockReading {
    /// Time left, never negative
    pub remaining: Duration,
    /// Remaining time is below the warning threshold
    pub low_time: bool,
    /// Set on the tick that reaches zero
    pub event: Option<ClockEvent>,
}

/// Countdown towards a ticket's `expires_at`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpiryClock {
    low_time_threshold: Duration,
    expires_at: Option<DateTime<Utc>>,
    remaining: Option<Duration>,
    running: bool,
}

impl ExpiryClock {
    /// Creates a stopped clock
    #[must_use]
    pub const fn new(low_time_threshold: Duration) -> Self {
        Self {
            low_time_threshold,
            expires_at: None,
            remaining: None,
            running: false,
        }
    }

    /// Starts counting down towards `expires_at`, discarding any prior run
    pub fn start(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
        self.remaining = None;
        self.running = true;
    }

    /// Recomputes the remaining time at `now`
    ///
    /// Returns `None` if the clock is not running. The reading that reaches
    /// zero carries [`ClockEvent::Expired`] and stops the clock, so later
    /// ticks return `None`. Remaining time never goes up, even if `now`
    /// moves backwards.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ClockReading> {
        if !self.running {
            return None;
        }
        let expires_at = self.expires_at?;

        let computed = (expires_at - now).max(Duration::zero());
        let remaining = self.remaining.map_or(computed, |prev| prev.min(computed));
        self.remaining = Some(remaining);

        let event = if remaining.is_zero() {
            self.running = false;
            Some(ClockEvent::Expired)
        } else {
            None
        };

        Some(ClockReading {
            remaining,
            low_time: remaining < self.low_time_threshold,
            event,
        })
    }

    /// Stops ticking without reporting expiry
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Last computed remaining time, zero before the first tick
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining.unwrap_or_else(Duration::zero)
    }

    /// Checks if the last reading was below the warning threshold
    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.remaining
            .is_some_and(|remaining| remaining < self.low_time_threshold)
    }

    /// Checks if the clock is counting down
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Instant the current run counts towards
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Warning threshold
    #[must_use]
    pub const fn low_time_threshold(&self) -> Duration {
        self.low_time_threshold
    }
}

impl Default for ExpiryClock {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_TIME_THRESHOLD)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use greed_ticket_core::environment::Clock;
    use greed_ticket_testing::test_clock;

    fn started(validity: Duration) -> (ExpiryClock, DateTime<Utc>) {
        let t0 = test_clock().now();
        let mut clock = ExpiryClock::default();
        clock.start(t0 + validity);
        (clock, t0)
    }

    #[test]
    fn stopped_clock_does_not_tick() {
        let mut clock = ExpiryClock::default();
        assert!(!clock.is_running());
        assert_eq!(clock.tick(test_clock().now()), None);
        assert_eq!(clock.remaining(), Duration::zero());
    }

    #[test]
    fn reports_remaining_and_low_time() {
        let (mut clock, t0) = started(Duration::minutes(30));

        let reading = clock.tick(t0).unwrap();
        assert_eq!(reading.remaining, Duration::minutes(30));
        assert!(!reading.low_time);
        assert_eq!(reading.event, None);

        let reading = clock.tick(t0 + Duration::minutes(25)).unwrap();
        assert_eq!(reading.remaining, Duration::minutes(5));
        assert!(!reading.low_time, "threshold is exclusive");

        let reading = clock.tick(t0 + Duration::minutes(25) + Duration::seconds(1)).unwrap();
        assert!(reading.low_time);
        assert!(clock.is_low_time());
    }

    #[test]
    fn expires_exactly_once() {
        let (mut clock, t0) = started(Duration::minutes(30));

        let reading = clock.tick(t0 + Duration::minutes(31)).unwrap();
        assert_eq!(reading.remaining, Duration::zero());
        assert_eq!(reading.event, Some(ClockEvent::Expired));
        assert!(!clock.is_running());

        assert_eq!(clock.tick(t0 + Duration::minutes(32)), None);
    }

    #[test]
    fn stop_suppresses_expiry() {
        let (mut clock, t0) = started(Duration::seconds(10));
        clock.tick(t0);
        clock.stop();

        assert_eq!(clock.tick(t0 + Duration::minutes(1)), None);
        assert_eq!(clock.remaining(), Duration::seconds(10));
    }

    #[test]
    fn remaining_never_increases_when_time_moves_backwards() {
        let (mut clock, t0) = started(Duration::minutes(30));
        clock.tick(t0 + Duration::minutes(10));

        let reading = clock.tick(t0).unwrap();
        assert_eq!(reading.remaining, Duration::minutes(20));
    }

    #[test]
    fn restart_resets_the_reading() {
        let (mut clock, t0) = started(Duration::seconds(1));
        clock.tick(t0 + Duration::seconds(5));
        assert!(!clock.is_running());

        clock.start(t0 + Duration::minutes(35));
        let reading = clock.tick(t0 + Duration::seconds(5)).unwrap();
        assert!(reading.remaining > Duration::minutes(34));
        assert_eq!(reading.event, None);
    }
}
