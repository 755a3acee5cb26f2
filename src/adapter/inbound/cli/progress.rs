//! Batch progress rendered as one terminal bar per stage.

use indicatif::ProgressBar;
use parking_lot::Mutex;

use super::output;
use crate::domain::Stage;
use crate::port::{ProgressSink, ProgressUpdate};

/// [`ProgressSink`] drawing an `indicatif` bar for the running stage.
///
/// A bar is replaced when the stage changes and cleared by [`finish`].
///
/// [`finish`]: TerminalProgress::finish
#[derive(Default)]
pub struct TerminalProgress {
    current: Mutex<Option<(Stage, ProgressBar)>>,
}

impl TerminalProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the active bar, if any.
    pub fn finish(&self) {
        if let Some((_, bar)) = self.current.lock().take() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn on_progress(&self, update: ProgressUpdate) {
        let mut current = self.current.lock();
        let stale = current
            .as_ref()
            .map_or(true, |(stage, _)| *stage != update.stage);
        if stale {
            if let Some((_, bar)) = current.take() {
                bar.finish_and_clear();
            }
            let bar = output::progress_bar(update.total as u64, &update.stage.to_string());
            *current = Some((update.stage, bar));
        }
        if let Some((_, bar)) = current.as_ref() {
            bar.set_position(update.completed as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(stage: Stage, completed: usize, total: usize) -> ProgressUpdate {
        ProgressUpdate {
            stage,
            batch: 1,
            total_batches: 1,
            completed,
            total,
        }
    }

    #[test]
    fn replaces_bar_when_stage_changes() {
        let progress = TerminalProgress::new();
        progress.on_progress(update(Stage::Discovery, 2, 4));
        progress.on_progress(update(Stage::Discovery, 4, 4));
        progress.on_progress(update(Stage::Enrichment, 1, 3));

        let current = progress.current.lock();
        let (stage, bar) = current.as_ref().unwrap();
        assert_eq!(*stage, Stage::Enrichment);
        assert_eq!(bar.position(), 1);
        drop(current);

        progress.finish();
        assert!(progress.current.lock().is_none());
    }
}
