use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);

/// One-second countdown source for the round currently on screen.
///
/// The controller owns it: arm when a word round starts, cancel when the
/// round ends or the playing screen goes away. A cancelled timer never
/// reports ticks, so nothing fires against a discarded round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTimer {
    /// Instant of the last whole second handed out, if armed
    anchor: Option<Instant>,
}

impl RoundTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start counting from `now`
    pub fn arm(&mut self, now: Instant) {
        self.anchor = Some(now);
    }

    pub fn cancel(&mut self) {
        self.anchor = None;
    }

    pub fn is_armed(&self) -> bool {
        self.anchor.is_some()
    }

    /// Whole seconds elapsed since the last call, consuming them.
    ///
    /// Sub-second remainders stay on the clock for the next call.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(anchor);
        let ticks = (elapsed.as_millis() / TICK.as_millis()) as u32;
        if ticks > 0 {
            self.anchor = Some(anchor + TICK * ticks);
        }
        ticks
    }

    /// Time until the next tick is due, if armed
    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.anchor
            .map(|anchor| (anchor + TICK).saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_timer_never_ticks() {
        let mut t = RoundTimer::new();
        assert!(!t.is_armed());
        assert_eq!(t.due_ticks(Instant::now() + Duration::from_secs(10)), 0);
        assert_eq!(t.until_next_tick(Instant::now()), None);
    }

    #[test]
    fn test_ticks_once_per_whole_second() {
        let start = Instant::now();
        let mut t = RoundTimer::new();
        t.arm(start);

        assert_eq!(t.due_ticks(start + Duration::from_millis(999)), 0);
        assert_eq!(t.due_ticks(start + Duration::from_millis(1000)), 1);
        assert_eq!(t.due_ticks(start + Duration::from_millis(1500)), 0);
        assert_eq!(t.due_ticks(start + Duration::from_millis(2100)), 1);
    }

    #[test]
    fn test_catches_up_after_a_stall() {
        let start = Instant::now();
        let mut t = RoundTimer::new();
        t.arm(start);

        assert_eq!(t.due_ticks(start + Duration::from_millis(3400)), 3);
        // The 400ms remainder is kept
        assert_eq!(t.due_ticks(start + Duration::from_millis(4000)), 1);
    }

    #[test]
    fn test_cancel_stops_ticks_and_rearm_restarts() {
        let start = Instant::now();
        let mut t = RoundTimer::new();
        t.arm(start);
        t.cancel();
        assert!(!t.is_armed());
        assert_eq!(t.due_ticks(start + Duration::from_secs(5)), 0);

        let later = start + Duration::from_secs(5);
        t.arm(later);
        assert_eq!(t.due_ticks(later + Duration::from_millis(500)), 0);
        assert_eq!(
            t.until_next_tick(later + Duration::from_millis(500)),
            Some(Duration::from_millis(500))
        );
        assert_eq!(t.due_ticks(later + Duration::from_secs(1)), 1);
    }
}
