use std::time::Duration;
use tracing::trace;

use crate::surface::SurfaceId;

/// Deferred work owned by one overlay. Each kind may have at most one
/// pending instance per surface; use [`Scheduler::replace`] to keep it so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    UpdateProgress(SurfaceId),
    Hide(SurfaceId),
}

impl Task {
    pub fn surface(&self) -> SurfaceId {
        match self {
            Task::UpdateProgress(surface) | Task::Hide(surface) => *surface,
        }
    }
}

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
}

/// Single-threaded post/post-delayed queue. Nothing runs on its own: the
/// owner drains due tasks with [`Scheduler::pop_due`].
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, task: Task, now: Duration) {
        self.post_delayed(task, now, Duration::ZERO);
    }

    pub fn post_delayed(&mut self, task: Task, now: Duration, delay: Duration) {
        let due = now + delay;
        trace!("Scheduling {:?} at {:?}", task, due);
        self.pending.push(Scheduled {
            due,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    /// Cancel every pending instance of `task`. Returns whether any existed.
    pub fn remove(&mut self, task: Task) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.task != task);
        before != self.pending.len()
    }

    /// Cancel then post, so at most one instance is ever pending.
    pub fn replace(&mut self, task: Task, now: Duration, delay: Duration) {
        self.remove(task);
        self.post_delayed(task, now, delay);
    }

    /// Cancel everything belonging to a surface.
    pub fn remove_surface(&mut self, surface: SurfaceId) {
        self.pending.retain(|s| s.task.surface() != surface);
    }

    pub fn is_pending(&self, task: Task) -> bool {
        self.pending.iter().any(|s| s.task == task)
    }

    pub fn pending_count(&self, task: Task) -> usize {
        self.pending.iter().filter(|s| s.task == task).count()
    }

    pub fn due_time(&self, task: Task) -> Option<Duration> {
        self.pending
            .iter()
            .filter(|s| s.task == task)
            .map(|s| s.due)
            .min()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|s| s.due).min()
    }

    /// Remove and return the earliest task due at or before `now`.
    /// Ties run in posting order.
    pub fn pop_due(&mut self, now: Duration) -> Option<Task> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(i, _)| i)?;
        Some(self.pending.swap_remove(index).task)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
