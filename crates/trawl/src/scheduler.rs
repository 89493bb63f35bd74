//! Batched, resumable execution of search tasks.
//!
//! Tasks are queued up front and drained last-in first-out. Draining can be
//! paused from inside a task (through a [`MatchingProcess`] handle held by
//! the sink) and resumed later. Clearing the schedule runs the end action and
//! closes the batch exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::cancellation::CancellationToken;
use crate::error::{MatchError, TaskError};

const SCHEDULER_TARGET: &str = "trawl::scheduler";

/// Where a scheduler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    /// Not yet initialised.
    Idle = 0,
    /// Draining tasks.
    Running = 1,
    /// Paused with tasks still queued.
    Suspended = 2,
    /// Finished, stopped, or cancelled.
    Ended = 3,
}

impl SchedulerState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Suspended,
            3 => Self::Ended,
            _ => Self::Idle,
        }
    }
}

/// Shared handle for pausing or stopping a running search.
///
/// Clones control the same scheduler.
#[derive(Debug, Clone)]
pub struct MatchingProcess {
    state: Arc<AtomicU8>,
}

impl Default for MatchingProcess {
    fn default() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(SchedulerState::Idle as u8)),
        }
    }
}

impl MatchingProcess {
    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        SchedulerState::from_raw(self.state.load(Ordering::SeqCst))
    }

    /// Suspends draining after the current task. Only a running search can
    /// be paused.
    pub fn pause(&self) {
        if !self.transition(SchedulerState::Running, SchedulerState::Suspended) {
            tracing::trace!(target: SCHEDULER_TARGET, event = "pause_ignored");
        }
    }

    /// Ends the search. Queued tasks are discarded.
    pub fn stop(&self) {
        self.set(SchedulerState::Ended);
    }

    fn transition(&self, from: SchedulerState, to: SchedulerState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn set(&self, state: SchedulerState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

/// Executes tasks on behalf of a [`TaskScheduler`].
pub trait TaskRunner<T> {
    /// Runs one task.
    ///
    /// # Errors
    ///
    /// Non-fatal errors are logged and skipped; fatal ones end the search.
    fn run(&mut self, task: T) -> Result<(), TaskError>;

    /// Called when a schedule is initialised.
    fn start_batch_processing(&mut self) {}

    /// Called once when a schedule is cleared.
    fn finish_batch_processing(&mut self) {}
}

type EndAction<C> = Box<dyn FnOnce(&mut C)>;

/// LIFO task queue with pause, resume, and stop.
pub struct TaskScheduler<T, C> {
    process: MatchingProcess,
    tasks: Option<Vec<T>>,
    end_action: Option<EndAction<C>>,
    cancellation: CancellationToken,
}

impl<T, C> std::fmt::Debug for TaskScheduler<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("state", &self.process.state())
            .field("pending", &self.pending())
            .field("has_end_action", &self.end_action.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, C> TaskScheduler<T, C> {
    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.process.state()
    }

    /// Returns the number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.as_ref().map_or(0, Vec::len)
    }
}

impl<T, C: TaskRunner<T>> TaskScheduler<T, C> {
    /// Creates an idle scheduler that observes `cancellation`.
    #[must_use]
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            process: MatchingProcess::default(),
            tasks: None,
            end_action: None,
            cancellation,
        }
    }

    /// Replaces the cancellation token.
    pub fn set_cancellation(&mut self, cancellation: CancellationToken) {
        self.cancellation = cancellation;
    }

    /// Returns a handle that can pause or stop this scheduler.
    #[must_use]
    pub fn matching_process(&self) -> MatchingProcess {
        self.process.clone()
    }

    /// Starts a new schedule and opens a batch on `runner`.
    pub fn init(&mut self, runner: &mut C) {
        self.process.set(SchedulerState::Running);
        self.tasks = Some(Vec::new());
        self.end_action = None;
        runner.start_batch_processing();
    }

    /// Queues a task. Ignored when no schedule is active.
    pub fn add_one_task(&mut self, task: T) {
        if let Some(tasks) = self.tasks.as_mut() {
            tasks.push(task);
        }
    }

    /// Sets the action run when the schedule is cleared.
    pub fn set_end_action(&mut self, action: impl FnOnce(&mut C) + 'static) {
        self.end_action = Some(Box::new(action));
    }

    /// Suspends draining. See [`MatchingProcess::pause`].
    pub fn pause(&self) {
        self.process.pause();
    }

    /// Resumes a suspended schedule and keeps draining. Does nothing unless
    /// the scheduler is suspended.
    ///
    /// # Errors
    ///
    /// As for [`execute_next`](Self::execute_next).
    pub fn resume(&mut self, runner: &mut C) -> Result<(), MatchError> {
        if self
            .process
            .transition(SchedulerState::Suspended, SchedulerState::Running)
        {
            self.execute_next(runner)
        } else {
            Ok(())
        }
    }

    /// Ends the schedule, discarding queued tasks and running the end action.
    pub fn stop(&mut self, runner: &mut C) {
        self.process.stop();
        self.clear_schedule(runner);
    }

    /// Drains tasks until the queue is empty, the scheduler is paused or
    /// stopped, or cancellation is observed.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Cancelled`] when cancelled, or the error carried
    /// by a [`TaskError::Fatal`]. The schedule is cleared in both cases.
    pub fn execute_next(&mut self, runner: &mut C) -> Result<(), MatchError> {
        loop {
            match self.process.state() {
                SchedulerState::Running => {}
                SchedulerState::Suspended => return Ok(()),
                SchedulerState::Idle | SchedulerState::Ended => break,
            }
            if self.cancellation.is_cancelled() {
                tracing::info!(target: SCHEDULER_TARGET, event = "search_cancelled");
                self.stop(runner);
                return Err(MatchError::Cancelled);
            }
            let Some(task) = self.tasks.as_mut().and_then(Vec::pop) else {
                self.process.set(SchedulerState::Ended);
                break;
            };
            if let Err(error) = runner.run(task) {
                if error.is_fatal() {
                    self.stop(runner);
                    return Err(error.into_match_error());
                }
                tracing::warn!(
                    target: SCHEDULER_TARGET,
                    event = "task_failed",
                    error = %error,
                );
            }
        }
        if self.process.state() == SchedulerState::Ended {
            self.clear_schedule(runner);
        }
        Ok(())
    }

    fn clear_schedule(&mut self, runner: &mut C) {
        if self.tasks.take().is_some() {
            if let Some(action) = self.end_action.take() {
                action(runner);
            }
            runner.finish_batch_processing();
            tracing::debug!(target: SCHEDULER_TARGET, event = "schedule_cleared");
        }
    }
}
