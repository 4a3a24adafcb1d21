//! Cooperative loop scheduling
//!
//! The station runs one cooperative loop. Periodic work is gated by
//! [`PeriodicTimer`]s measured against a monotonic millisecond counter; the
//! [`Scheduler`] checks all of them on each pass and reports which tasks
//! are due, in a fixed order.
//!
//! Elapsed time is computed with saturating subtraction, so a timestamp
//! that steps backwards never fires a timer early.

use heapless::Vec;

use crate::config::StationConfig;
use crate::time::Timestamp;

/// Fires once per interval when polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodicTimer {
    interval_ms: u64,
    last_fired: Timestamp,
}

impl PeriodicTimer {
    /// Timer whose first period starts at `start`
    pub const fn new(interval_ms: u64, start: Timestamp) -> Self {
        Self {
            interval_ms,
            last_fired: start,
        }
    }

    /// More than one full interval has passed since the last firing
    pub fn is_due(&self, now: Timestamp) -> bool {
        now.saturating_sub(self.last_fired) > self.interval_ms
    }

    /// Restart the period at `now` regardless of elapsed time
    pub fn fire(&mut self, now: Timestamp) {
        self.last_fired = now;
    }

    /// Fire if due, restarting the period at `now`
    pub fn poll(&mut self, now: Timestamp) -> bool {
        if self.is_due(now) {
            self.fire(now);
            true
        } else {
            false
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    pub fn last_fired(&self) -> Timestamp {
        self.last_fired
    }
}

/// Periodic loop work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Task {
    /// Supervise the network link
    CheckNetwork,
    /// Poll the chat bot for new messages
    PollMessages,
    /// Sample and append a reading to the history ledger
    SaveHistory,
}

impl Task {
    pub const COUNT: usize = 3;
    pub const ALL: [Task; Task::COUNT] = [Task::CheckNetwork, Task::PollMessages, Task::SaveHistory];
}

/// Timers for every [`Task`]
#[derive(Debug, Clone)]
pub struct Scheduler {
    timers: [(Task, PeriodicTimer); Task::COUNT],
}

impl Scheduler {
    pub fn new(config: &StationConfig, start: Timestamp) -> Self {
        let timers = Task::ALL.map(|task| {
            let interval = match task {
                Task::CheckNetwork => config.network_check_interval_ms,
                Task::PollMessages => config.message_poll_interval_ms,
                Task::SaveHistory => config.history_save_interval_ms,
            };
            (task, PeriodicTimer::new(interval, start))
        });

        Self { timers }
    }

    /// Tasks due at `now`, in [`Task::ALL`] order; each is re-armed
    pub fn due(&mut self, now: Timestamp) -> Vec<Task, { Task::COUNT }> {
        let mut due = Vec::new();
        for (task, timer) in self.timers.iter_mut() {
            if timer.poll(now) {
                // Capacity matches the number of timers
                let _ = due.push(*task);
            }
        }
        due
    }

    pub fn timer(&self, task: Task) -> Option<&PeriodicTimer> {
        self.timers.iter().find(|(t, _)| *t == task).map(|(_, timer)| timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_after_interval() {
        let mut timer = PeriodicTimer::new(1_000, 0);

        assert!(!timer.poll(1_000));
        assert!(timer.poll(1_001));
        assert!(!timer.poll(1_500));
        assert!(timer.poll(2_002));
        assert_eq!(timer.last_fired(), 2_002);
    }

    #[test]
    fn fire_restarts_period() {
        let mut timer = PeriodicTimer::new(1_000, 0);
        timer.fire(800);

        assert!(!timer.is_due(1_500));
        assert!(timer.is_due(1_801));
    }

    #[test]
    fn backwards_time_never_fires() {
        let mut timer = PeriodicTimer::new(1_000, 50_000);
        assert!(!timer.poll(10));
    }

    #[test]
    fn scheduler_reports_in_order() {
        let config = StationConfig::default();
        let mut scheduler = Scheduler::new(&config, 0);

        assert!(scheduler.due(500).is_empty());
        assert_eq!(scheduler.due(1_001).as_slice(), &[Task::PollMessages]);

        let due = scheduler.due(300_001);
        assert_eq!(
            due.as_slice(),
            &[Task::CheckNetwork, Task::PollMessages, Task::SaveHistory]
        );
    }

    #[test]
    fn timer_lookup() {
        let scheduler = Scheduler::new(&StationConfig::default(), 0);
        let timer = scheduler.timer(Task::SaveHistory).unwrap();
        assert_eq!(timer.interval_ms(), 300_000);
    }
}
