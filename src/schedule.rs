use crate::AutosaveConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a save happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveTrigger {
    /// Requested by the user
    Explicit,
    /// Quiet period after the last mutation elapsed
    Debounced,
    /// Fixed-interval safety net
    Periodic,
}

/// Debounce and periodic save timers
///
/// Time is whatever monotonic `Duration` the host passes in; the scheduler
/// never reads a clock. Both timers are inactive until [`start`](Self::start)
/// and after [`cancel`](Self::cancel).
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    config: AutosaveConfig,
    debounce_due: Option<Duration>,
    periodic_due: Option<Duration>,
}

impl SaveScheduler {
    pub fn new(config: AutosaveConfig) -> Self {
        Self {
            config,
            debounce_due: None,
            periodic_due: None,
        }
    }

    /// Arm the periodic timer from `now`, dropping any pending debounce
    pub fn start(&mut self, now: Duration) {
        self.debounce_due = None;
        self.periodic_due = Some(now + self.config.period());
    }

    /// Cancel both timers
    pub fn cancel(&mut self) {
        self.debounce_due = None;
        self.periodic_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.periodic_due.is_some()
    }

    /// Push the debounced save out to `now + debounce`
    ///
    /// Ignored while the scheduler is not running.
    pub fn note_mutation(&mut self, now: Duration) {
        if self.is_active() {
            self.debounce_due = Some(now + self.config.debounce());
        }
    }

    pub fn pending_debounce(&self) -> Option<Duration> {
        self.debounce_due
    }

    pub fn next_periodic(&self) -> Option<Duration> {
        self.periodic_due
    }

    /// Earliest moment anything is due, for hosts that sleep between frames
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.debounce_due, self.periodic_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Collect the triggers that are due at `now` and re-arm the periodic timer
    ///
    /// Periods missed entirely (a host that stopped ticking) fire once.
    pub fn poll(&mut self, now: Duration) -> Vec<SaveTrigger> {
        let mut fired = Vec::new();

        if self.debounce_due.is_some_and(|due| now >= due) {
            self.debounce_due = None;
            fired.push(SaveTrigger::Debounced);
        }

        if let Some(due) = self.periodic_due {
            if now >= due {
                fired.push(SaveTrigger::Periodic);
                let period = self.config.period().max(Duration::from_millis(1));
                let mut next = due + period;
                while next <= now {
                    next += period;
                }
                self.periodic_due = Some(next);
            }
        }

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn started() -> SaveScheduler {
        let mut scheduler = SaveScheduler::new(AutosaveConfig::default());
        scheduler.start(ms(0));
        scheduler
    }

    #[test]
    fn test_debounce_reschedules() {
        let mut scheduler = started();
        scheduler.note_mutation(ms(100));
        scheduler.note_mutation(ms(600));

        assert_eq!(scheduler.pending_debounce(), Some(ms(1_600)));
        assert!(scheduler.poll(ms(1_599)).is_empty());
        assert_eq!(scheduler.poll(ms(1_600)), vec![SaveTrigger::Debounced]);
        assert!(scheduler.poll(ms(5_000)).is_empty());
    }

    #[test]
    fn test_periodic_fires_every_period() {
        let mut scheduler = started();

        assert!(scheduler.poll(ms(29_999)).is_empty());
        assert_eq!(scheduler.poll(ms(30_000)), vec![SaveTrigger::Periodic]);
        assert_eq!(scheduler.next_periodic(), Some(ms(60_000)));
    }

    #[test]
    fn test_missed_periods_collapse() {
        let mut scheduler = started();

        assert_eq!(scheduler.poll(ms(95_000)), vec![SaveTrigger::Periodic]);
        assert_eq!(scheduler.next_periodic(), Some(ms(120_000)));
    }

    #[test]
    fn test_both_due_in_one_poll() {
        let mut scheduler = started();
        scheduler.note_mutation(ms(29_500));

        assert_eq!(
            scheduler.poll(ms(30_500)),
            vec![SaveTrigger::Debounced, SaveTrigger::Periodic]
        );
    }

    #[test]
    fn test_cancel_stops_everything() {
        let mut scheduler = started();
        scheduler.note_mutation(ms(10));
        scheduler.cancel();

        assert!(!scheduler.is_active());
        assert_eq!(scheduler.next_deadline(), None);
        assert!(scheduler.poll(ms(100_000)).is_empty());

        scheduler.note_mutation(ms(200));
        assert_eq!(scheduler.pending_debounce(), None);
    }

    #[test]
    fn test_next_deadline() {
        let mut scheduler = started();
        assert_eq!(scheduler.next_deadline(), Some(ms(30_000)));

        scheduler.note_mutation(ms(2_000));
        assert_eq!(scheduler.next_deadline(), Some(ms(3_000)));
    }
}
