use crate::error::ConfigError;
use heapless::Vec;
use serde::{Deserialize, Serialize};

const MAX_SCHEDULED_TASKS: usize = 16;

/// Opaque handle for a scheduled periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle(u32);

#[derive(Debug, Clone)]
struct TaskEntry {
    handle: TaskHandle,
    interval_ms: u64,
    next_due_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchedulerStats {
    pub total_scheduled: u32,
    pub total_fired: u32,
    pub total_cancelled: u32,
    pub currently_scheduled: u8,
}

/// Periodic task registry over virtual time.
///
/// The caller supplies `now_ms` to [`TickScheduler::advance`], which returns
/// each due handle at most once per call: ticks of one task are strictly
/// sequential and a task that fell behind collapses its backlog into a
/// single firing rather than bursting. No ordering is guaranteed between
/// distinct tasks beyond registration order.
#[derive(Debug)]
pub struct TickScheduler {
    tasks: Vec<TaskEntry, MAX_SCHEDULED_TASKS>,
    next_handle: u32,
    last_now_ms: u64,
    stats: SchedulerStats,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_handle: 1,
            last_now_ms: 0,
            stats: SchedulerStats::default(),
        }
    }

    /// Register a task firing every `interval_ms`, first due one full
    /// interval from the current virtual time.
    pub fn schedule(&mut self, interval_ms: u64) -> Result<TaskHandle, ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        let handle = TaskHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);

        let entry = TaskEntry {
            handle,
            interval_ms,
            next_due_ms: self.last_now_ms + interval_ms,
        };

        if self.tasks.push(entry).is_err() {
            return Err(ConfigError::InvalidInterval);
        }

        self.stats.total_scheduled += 1;
        self.stats.currently_scheduled = self.tasks.len() as u8;
        Ok(handle)
    }

    /// Cancel a task. Unknown or already-cancelled handles are a no-op,
    /// never an error; a cancelled task is never returned by `advance`
    /// again.
    pub fn cancel(&mut self, handle: TaskHandle) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);

        if self.tasks.len() < before {
            self.stats.total_cancelled += 1;
        }
        self.stats.currently_scheduled = self.tasks.len() as u8;
    }

    /// Cancel every registered task (subsystem teardown).
    pub fn clear(&mut self) {
        self.stats.total_cancelled += self.tasks.len() as u32;
        self.tasks.clear();
        self.stats.currently_scheduled = 0;
    }

    /// Move virtual time forward and collect the handles due by `now_ms`,
    /// in registration order.
    pub fn advance(&mut self, now_ms: u64) -> Vec<TaskHandle, MAX_SCHEDULED_TASKS> {
        let mut due: Vec<TaskHandle, MAX_SCHEDULED_TASKS> = Vec::new();

        if now_ms < self.last_now_ms {
            // Time never runs backwards; ignore stale timestamps.
            return due;
        }
        self.last_now_ms = now_ms;

        for task in &mut self.tasks {
            if task.next_due_ms <= now_ms {
                // Collapse any backlog into one firing.
                while task.next_due_ms <= now_ms {
                    task.next_due_ms += task.interval_ms;
                }
                let _ = due.push(task.handle);
                self.stats.total_fired += 1;
            }
        }

        due
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_creation() {
        let scheduler = TickScheduler::new();
        assert_eq!(scheduler.stats().total_scheduled, 0);
        assert_eq!(scheduler.stats().currently_scheduled, 0);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut scheduler = TickScheduler::new();
        assert_eq!(scheduler.schedule(0), Err(ConfigError::InvalidInterval));
    }

    #[test]
    fn test_task_fires_after_interval() {
        let mut scheduler = TickScheduler::new();
        let handle = scheduler.schedule(1000).unwrap();

        // Not due yet.
        assert!(scheduler.advance(999).is_empty());

        let due = scheduler.advance(1000);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0], handle);

        // Same instant does not fire twice.
        assert!(scheduler.advance(1000).is_empty());
    }

    #[test]
    fn test_backlog_collapses_to_single_firing() {
        let mut scheduler = TickScheduler::new();
        let handle = scheduler.schedule(100).unwrap();

        // 10 intervals elapsed at once: exactly one firing.
        let due = scheduler.advance(1000);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0], handle);

        // Next firing resumes from the catch-up point.
        assert!(scheduler.advance(1050).is_empty());
        assert_eq!(scheduler.advance(1100).len(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut scheduler = TickScheduler::new();
        let handle = scheduler.schedule(500).unwrap();

        scheduler.cancel(handle);
        assert!(!scheduler.is_scheduled(handle));
        assert_eq!(scheduler.stats().total_cancelled, 1);

        // Cancelling again, or cancelling something unknown, is a no-op.
        scheduler.cancel(handle);
        scheduler.cancel(TaskHandle(999));
        assert_eq!(scheduler.stats().total_cancelled, 1);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut scheduler = TickScheduler::new();
        let handle = scheduler.schedule(100).unwrap();
        scheduler.cancel(handle);

        for now in (100..2000).step_by(100) {
            assert!(scheduler.advance(now).is_empty());
        }
        assert_eq!(scheduler.stats().total_fired, 0);
    }

    #[test]
    fn test_independent_intervals() {
        let mut scheduler = TickScheduler::new();
        let fast = scheduler.schedule(100).unwrap();
        let slow = scheduler.schedule(300).unwrap();

        assert_eq!(scheduler.advance(100).as_slice(), &[fast]);
        assert_eq!(scheduler.advance(200).as_slice(), &[fast]);
        let due = scheduler.advance(300);
        assert!(due.contains(&fast));
        assert!(due.contains(&slow));
    }

    #[test]
    fn test_time_never_runs_backwards() {
        let mut scheduler = TickScheduler::new();
        let _handle = scheduler.schedule(100).unwrap();
        assert_eq!(scheduler.advance(500).len(), 1);
        assert!(scheduler.advance(400).is_empty());
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut scheduler = TickScheduler::new();
        let a = scheduler.schedule(100).unwrap();
        let b = scheduler.schedule(200).unwrap();

        scheduler.clear();
        assert!(!scheduler.is_scheduled(a));
        assert!(!scheduler.is_scheduled(b));
        assert!(scheduler.advance(10_000).is_empty());
    }
}
