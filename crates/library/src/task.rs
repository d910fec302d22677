//! Progress and cancellation plumbing for long-running library operations.
//!
//! Operations run synchronously on the caller's thread. A front end that
//! wants a responsive UI moves the call to a worker thread and keeps a clone
//! of the [`CancelToken`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives percentages in `0..=100` as an operation advances.
pub trait ProgressSink {
    /// Called with the new overall percentage.
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8) {}
}

/// Cooperative cancellation flag shared between threads.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Operations stop before their next item.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`CancelToken::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of an operation that may be cancelled part-way.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum TaskOutcome<T> {
    /// The operation ran to the end.
    Completed(T),
    /// The operation stopped early; partial work is not reported as success.
    Cancelled,
}

impl<T> TaskOutcome<T> {
    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            TaskOutcome::Cancelled => None,
        }
    }

    /// True when the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled)
    }

    /// Transform the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TaskOutcome<U> {
        match self {
            TaskOutcome::Completed(value) => TaskOutcome::Completed(f(value)),
            TaskOutcome::Cancelled => TaskOutcome::Cancelled,
        }
    }
}

/// `start + span * done / total`, treating an empty phase as finished.
pub(crate) fn phase_percent(start: u8, span: u8, done: usize, total: usize) -> u8 {
    if total == 0 {
        return start.saturating_add(span);
    }
    let fraction = done.min(total) as f32 / total as f32;
    start.saturating_add((fraction * f32::from(span)) as u8)
}
