//! Progress sink that records every update.

use parking_lot::Mutex;

use crate::domain::Stage;
use crate::port::{ProgressSink, ProgressUpdate};

#[derive(Debug, Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().clone()
    }

    /// Updates emitted for one stage, in emission order.
    pub fn for_stage(&self, stage: Stage) -> Vec<ProgressUpdate> {
        self.updates
            .lock()
            .iter()
            .filter(|u| u.stage == stage)
            .copied()
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_progress(&self, update: ProgressUpdate) {
        self.updates.lock().push(update);
    }
}
