//! Start-to-start periodic deadlines on the engine's monotonic clock.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    period: Duration,
    next_due: Duration,
}

/// Result of polling an interval at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fire {
    NotDue,
    /// The interval fired once; `skipped` deadlines passed unserved.
    Due { skipped: u32 },
}

impl Interval {
    /// First deadline one period after `start`.
    #[must_use]
    pub fn starting_at(start: Duration, period: Duration) -> Self {
        Self {
            period,
            next_due: start + period,
        }
    }

    #[must_use]
    pub fn next_due(&self) -> Duration {
        self.next_due
    }

    /// Fires at most once per call. Missed deadlines are coalesced and the
    /// schedule stays aligned to its initial phase.
    pub fn poll(&mut self, now: Duration) -> Fire {
        if now < self.next_due {
            return Fire::NotDue;
        }
        let period = self.period.as_nanos().max(1);
        let late = (now - self.next_due).as_nanos();
        let elapsed = late / period + 1;
        let skipped = u32::try_from(elapsed - 1).unwrap_or(u32::MAX);
        let advance = u64::try_from(period * elapsed).unwrap_or(u64::MAX);
        self.next_due += Duration::from_nanos(advance);
        Fire::Due { skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fires_on_each_period_boundary() {
        let mut interval = Interval::starting_at(ms(0), ms(100));
        assert_eq!(interval.poll(ms(99)), Fire::NotDue);
        assert_eq!(interval.poll(ms(100)), Fire::Due { skipped: 0 });
        assert_eq!(interval.poll(ms(150)), Fire::NotDue);
        assert_eq!(interval.poll(ms(200)), Fire::Due { skipped: 0 });
        assert_eq!(interval.next_due(), ms(300));
    }

    #[test]
    fn late_poll_coalesces_and_keeps_phase() {
        let mut interval = Interval::starting_at(ms(50), ms(100));
        assert_eq!(interval.poll(ms(420)), Fire::Due { skipped: 2 });
        assert_eq!(interval.next_due(), ms(450));
        assert_eq!(interval.poll(ms(449)), Fire::NotDue);
    }
}
