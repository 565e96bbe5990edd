//! Time sources and the single-slot timer behind the seek debounce.

use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::time::Duration;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + to_delta(by));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

fn to_delta(duration: Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: TimerTicket,
    deadline: DateTime<Utc>,
}

/// Holds at most one pending deadline; scheduling again supersedes it.
///
/// Two ways to drive it: poll [`fire_if_due`](Self::fire_if_due) against a
/// clock, or sleep for the delay on the event loop and then
/// [`claim`](Self::claim) the ticket. Either way a ticket fires at most once,
/// and never after it was superseded or cancelled.
#[derive(Debug, Default)]
pub struct SingleSlotTimer {
    pending: Option<Pending>,
    issued: u64,
}

impl SingleSlotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: DateTime<Utc>, delay: Duration) -> TimerTicket {
        self.issued = self.issued.wrapping_add(1);
        let ticket = TimerTicket(self.issued);
        self.pending = Some(Pending {
            ticket,
            deadline: now + to_delta(delay),
        });
        ticket
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.map(|pending| pending.deadline)
    }

    pub fn fire_if_due(&mut self, now: DateTime<Utc>) -> Option<TimerTicket> {
        match self.pending {
            Some(pending) if pending.deadline <= now => {
                self.pending = None;
                Some(pending.ticket)
            }
            _ => None,
        }
    }

    pub fn claim(&mut self, ticket: TimerTicket) -> bool {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn fires_once_at_deadline() {
        let clock = ManualClock::new(start());
        let mut timer = SingleSlotTimer::new();
        let ticket = timer.schedule(clock.now(), Duration::from_millis(1500));
        assert_eq!(
            timer.deadline(),
            Some(start() + chrono::Duration::milliseconds(1500))
        );

        clock.advance(Duration::from_millis(1499));
        assert_eq!(timer.fire_if_due(clock.now()), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(timer.fire_if_due(clock.now()), Some(ticket));
        assert_eq!(timer.fire_if_due(clock.now()), None);
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn rescheduling_supersedes_the_previous_ticket() {
        let clock = ManualClock::new(start());
        let mut timer = SingleSlotTimer::new();
        let first = timer.schedule(clock.now(), Duration::from_millis(1500));
        clock.advance(Duration::from_millis(1000));
        let second = timer.schedule(clock.now(), Duration::from_millis(1500));

        assert!(!timer.claim(first));
        clock.advance(Duration::from_millis(1000));
        assert_eq!(timer.fire_if_due(clock.now()), None);
        assert!(timer.claim(second));
        assert!(!timer.claim(second));
    }

    #[test]
    fn cancelled_ticket_never_fires() {
        let mut timer = SingleSlotTimer::new();
        let ticket = timer.schedule(start(), Duration::from_millis(10));
        timer.cancel();
        assert!(!timer.is_pending());
        assert_eq!(timer.deadline(), None);
        assert!(!timer.claim(ticket));
        assert_eq!(timer.fire_if_due(start() + chrono::Duration::seconds(5)), None);
    }
}
