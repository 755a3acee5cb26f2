//! Per-run context shared by all stages.

use std::time::{Duration, Instant};

use crate::port::{NoopProgress, ProgressSink};

/// Outer time budget for a pipeline run, checked between batches.
#[derive(Debug, Clone, Copy)]
pub struct RunDeadline {
    started: Instant,
    budget: Duration,
}

impl RunDeadline {
    #[must_use]
    pub fn starting_now(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.budget
    }
}

/// Progress sink and optional deadline for one run.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub progress: &'a dyn ProgressSink,
    pub deadline: Option<RunDeadline>,
}

impl<'a> RunContext<'a> {
    #[must_use]
    pub fn new(progress: &'a dyn ProgressSink) -> Self {
        Self {
            progress,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<RunDeadline>) -> Self {
        self.deadline = deadline;
        self
    }
}

impl Default for RunContext<'static> {
    fn default() -> Self {
        Self::new(&NoopProgress)
    }
}
