//! Time source used by the repository and the derived views.

use crate::timestamp::local_offset;
use std::cell::Cell;
use time::{Duration, OffsetDateTime};

/// Supplies "now" in the caller's local offset.
///
/// Everything that compares against the current time (id assignment,
/// due-status bands, upcoming/overdue views, calendar-day history
/// filtering) reads it through this trait so tests can pin it.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(local_offset())
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use time::Duration;
    use time::macros::datetime;

    #[test]
    fn fixed_clock_advances_only_on_request() {
        let clock = FixedClock::new(datetime!(2024-01-01 12:00 UTC));
        assert_eq!(clock.now(), datetime!(2024-01-01 12:00 UTC));

        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), datetime!(2024-01-01 13:30 UTC));

        let borrowed = &clock;
        assert_eq!(borrowed.now(), clock.now());
    }
}
