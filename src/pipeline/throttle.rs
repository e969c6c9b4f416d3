//! Minimum spacing between fetches.

use std::time::{Duration, Instant};

/// Lets an action through at most once per `min_interval`.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Claim a slot at `now`. Returns false while still inside the window.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last
            && now.saturating_duration_since(last) < self.min_interval
        {
            return false;
        }
        self.last = Some(now);
        true
    }

    /// Time left until the next slot opens.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_passes() {
        let mut throttle = Throttle::new(Duration::from_secs(60));
        assert!(throttle.try_acquire(Instant::now()));
    }

    #[test]
    fn test_blocks_inside_window() {
        let mut throttle = Throttle::new(Duration::from_secs(60));
        let start = Instant::now();
        assert!(throttle.try_acquire(start));
        assert!(!throttle.try_acquire(start + Duration::from_secs(59)));
        assert_eq!(
            throttle.remaining(start + Duration::from_secs(50)),
            Duration::from_secs(10)
        );
        assert!(throttle.try_acquire(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_rejected_call_does_not_extend_window() {
        let mut throttle = Throttle::new(Duration::from_secs(10));
        let start = Instant::now();
        assert!(throttle.try_acquire(start));
        assert!(!throttle.try_acquire(start + Duration::from_secs(5)));
        assert!(throttle.try_acquire(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_interval_never_blocks() {
        let mut throttle = Throttle::new(Duration::ZERO);
        let now = Instant::now();
        assert!(throttle.try_acquire(now));
        assert!(throttle.try_acquire(now));
    }
}
