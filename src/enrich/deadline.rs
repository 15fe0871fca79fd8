//! Deadline composition for nested time budgets.
//!
//! The sync orchestrator runs a fetch budget inside a master budget; the
//! effective limit at any point is "the earlier of the two". Modeling that
//! as a value type keeps cancellation uniform no matter which deadline
//! fires first.

use std::time::{Duration, Instant};

/// A point in time work must not outlive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// The sooner of two deadlines.
    pub fn earliest(self, other: Deadline) -> Deadline {
        if self.at <= other.at {
            self
        } else {
            other
        }
    }

    /// Time left before the deadline, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining() == Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earliest_picks_the_sooner_deadline() {
        let soon = Deadline::after(Duration::from_millis(10));
        let late = Deadline::after(Duration::from_secs(60));
        assert_eq!(soon.earliest(late), soon);
        assert_eq!(late.earliest(soon), soon);
    }

    #[test]
    fn test_remaining_is_bounded_by_budget() {
        let deadline = Deadline::after(Duration::from_secs(5));
        assert!(deadline.remaining() <= Duration::from_secs(5));
        assert!(!deadline.is_expired());
    }

    #[test]
    fn test_elapsed_deadline_saturates_to_zero() {
        let deadline = Deadline::after(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(deadline.remaining(), Duration::ZERO);
        assert!(deadline.is_expired());
    }

    #[test]
    fn test_composed_deadline_never_exceeds_master() {
        let master = Deadline::after(Duration::from_millis(50));
        let fetch = master.earliest(Deadline::after(Duration::from_secs(10)));
        assert_eq!(fetch, master);
    }
}
