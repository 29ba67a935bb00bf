//! Deferred, cancellable tasks on the simulation clock.
//!
//! Activation delays, patrol pauses and flee timers are all scheduled here.
//! Tasks fire on the first drain whose clock has reached their due time.
//! Dropping the scheduler cancels everything it holds.

use serde::{Deserialize, Serialize};

/// Handle used to cancel a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    due_at: f64,
    handle: TaskHandle,
    payload: T,
}

/// Queue of timed payloads.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    tasks: Vec<ScheduledTask<T>>,
    next_handle: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_handle: 1,
        }
    }

    /// Schedules `payload` to fire at `due_at`.
    pub fn schedule(&mut self, due_at: f64, payload: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.tasks.push(ScheduledTask {
            due_at,
            handle,
            payload,
        });
        handle
    }

    /// Cancels a task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.handle != handle);
        self.tasks.len() != before
    }

    /// Checks whether a task is still waiting.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|task| task.handle == handle)
    }

    /// Cancels every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Number of waiting tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest due time, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<f64> {
        self.tasks
            .iter()
            .map(|task| task.due_at)
            .min_by(f64::total_cmp)
    }

    /// Removes and returns every task due at `now`, earliest first. Ties keep
    /// scheduling order.
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.due_at <= now);
        self.tasks = pending;

        due.sort_by(|a, b| {
            a.due_at
                .total_cmp(&b.due_at)
                .then_with(|| a.handle.cmp(&b.handle))
        });
        due.into_iter().map(|task| task.payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_respects_due_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1.0, "late");
        scheduler.schedule(0.5, "early");

        assert!(scheduler.drain_due(0.4).is_empty());
        assert_eq!(scheduler.drain_due(0.5), vec!["early"]);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.drain_due(2.0), vec!["late"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_drain_orders_by_due_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2.0, 3);
        scheduler.schedule(1.0, 1);
        scheduler.schedule(1.0, 2);

        assert_eq!(scheduler.drain_due(5.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(1.0, "keep");
        let drop = scheduler.schedule(1.0, "drop");

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert!(scheduler.is_pending(keep));
        assert!(!scheduler.is_pending(drop));
        assert_eq!(scheduler.next_due(), Some(1.0));
        assert_eq!(scheduler.drain_due(1.0), vec!["keep"]);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, ());
        scheduler.schedule(1.0, ());
        scheduler.clear();
        assert!(scheduler.drain_due(10.0).is_empty());
        assert_eq!(scheduler.next_due(), None);
    }
}
