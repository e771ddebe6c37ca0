use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Repeating countdown deadline. Unarmed means no ticks are pending.
#[derive(Clone, Debug)]
pub struct Countdown {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Countdown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Schedule the first tick one interval after `now`. No-op when armed.
    pub fn arm(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Consume one due tick, if `now` has reached the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(due + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_never_fires() {
        let mut countdown = Countdown::default();
        let now = Instant::now();
        assert!(!countdown.poll(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_fires_once_per_interval() {
        let mut countdown = Countdown::default();
        let t0 = Instant::now();
        countdown.arm(t0);

        assert!(!countdown.poll(t0 + Duration::from_millis(999)));
        assert!(countdown.poll(t0 + Duration::from_secs(1)));
        assert!(!countdown.poll(t0 + Duration::from_millis(1500)));
        assert!(countdown.poll(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn test_catches_up_missed_ticks() {
        let mut countdown = Countdown::default();
        let t0 = Instant::now();
        countdown.arm(t0);

        let later = t0 + Duration::from_millis(3500);
        let mut fired = 0;
        while countdown.poll(later) {
            fired += 1;
        }
        assert_eq!(fired, 3);
    }

    #[test]
    fn test_rearm_is_noop() {
        let mut countdown = Countdown::default();
        let t0 = Instant::now();
        countdown.arm(t0);
        countdown.arm(t0 + Duration::from_millis(900));

        assert!(countdown.poll(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_disarm_drops_pending() {
        let mut countdown = Countdown::default();
        let t0 = Instant::now();
        countdown.arm(t0);
        countdown.disarm();

        assert!(!countdown.is_armed());
        assert!(!countdown.poll(t0 + Duration::from_secs(5)));
    }
}
