//! Round timer driven by one-second ticks.
//!
//! The tick source (a UI frame loop, a thread, the terminal front end)
//! lives outside this module. It receives a [`TimerHandle`] from
//! [`RoundTimer::start`] and passes it back with every tick. Starting
//! again or stopping invalidates earlier handles, so an old tick source
//! can never advance a newer round's clock.

use tracing::{debug, instrument, trace};

/// Identifies one start of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Elapsed-seconds counter for the round in progress.
#[derive(Debug, Clone, Default)]
pub struct RoundTimer {
    generation: u64,
    active: bool,
    elapsed_seconds: u64,
}

impl RoundTimer {
    /// Creates a stopped timer at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting from zero and returns the handle ticks must carry.
    ///
    /// Any previously issued handle stops working.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> TimerHandle {
        self.generation += 1;
        self.active = true;
        self.elapsed_seconds = 0;
        debug!(generation = self.generation, "Timer started");
        TimerHandle(self.generation)
    }

    /// Stops counting, keeping the elapsed time. Outstanding handles are
    /// invalidated.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> u64 {
        if self.active {
            self.generation += 1;
            self.active = false;
            debug!(elapsed = self.elapsed_seconds, "Timer stopped");
        }
        self.elapsed_seconds
    }

    /// Continues counting after a [`stop`](Self::stop), keeping the
    /// elapsed seconds. Returns a new handle; earlier ones stay invalid.
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> TimerHandle {
        if !self.active {
            self.generation += 1;
            self.active = true;
            debug!(
                generation = self.generation,
                elapsed = self.elapsed_seconds,
                "Timer resumed"
            );
        }
        TimerHandle(self.generation)
    }

    /// Stops and zeroes the counter.
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed_seconds = 0;
    }

    /// Advances one second if `handle` belongs to the running timer.
    ///
    /// Returns `false` for stale handles and while stopped.
    pub fn tick(&mut self, handle: TimerHandle) -> bool {
        if !self.active || handle.0 != self.generation {
            trace!(?handle, "Stale tick ignored");
            return false;
        }
        self.elapsed_seconds += 1;
        true
    }

    /// True while counting.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds counted since the last start.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Handle of the running timer, if any.
    pub fn handle(&self) -> Option<TimerHandle> {
        self.active.then_some(TimerHandle(self.generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_count_while_active() {
        let mut timer = RoundTimer::new();
        let handle = timer.start();
        assert!(timer.tick(handle));
        assert!(timer.tick(handle));
        assert_eq!(timer.stop(), 2);
        assert!(!timer.tick(handle));
        assert_eq!(timer.elapsed_seconds(), 2);
    }

    #[test]
    fn test_restart_invalidates_old_handle() {
        let mut timer = RoundTimer::new();
        let old = timer.start();
        timer.tick(old);
        let new = timer.start();
        assert_ne!(old, new);
        assert!(!timer.tick(old));
        assert!(timer.tick(new));
        assert_eq!(timer.elapsed_seconds(), 1);
    }

    #[test]
    fn test_stop_then_start_issues_fresh_handle() {
        let mut timer = RoundTimer::new();
        let first = timer.start();
        timer.stop();
        let second = timer.start();
        assert_ne!(first, second);
        assert_eq!(timer.handle(), Some(second));
    }

    #[test]
    fn test_resume_keeps_elapsed_with_new_handle() {
        let mut timer = RoundTimer::new();
        let old = timer.start();
        timer.tick(old);
        timer.stop();
        let resumed = timer.resume();
        assert_ne!(old, resumed);
        assert!(!timer.tick(old));
        assert!(timer.tick(resumed));
        assert_eq!(timer.elapsed_seconds(), 2);
    }

    #[test]
    fn test_resume_while_running_keeps_handle() {
        let mut timer = RoundTimer::new();
        let handle = timer.start();
        assert_eq!(timer.resume(), handle);
        assert!(timer.tick(handle));
    }

    #[test]
    fn test_reset_zeroes() {
        let mut timer = RoundTimer::new();
        let handle = timer.start();
        timer.tick(handle);
        timer.reset();
        assert!(!timer.is_active());
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.handle(), None);
    }
}
