//! Terminal progress display for the scan loop.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use topicaudit_core::ProgressIndicator;

/// Spinner showing how many messages were processed.
pub struct SpinnerProgress(ProgressBar);

impl SpinnerProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.green} {human_pos} messages processed ({per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self(spinner)
    }
}

impl ProgressIndicator for SpinnerProgress {
    fn inc(&self, delta: u64) {
        self.0.inc(delta);
    }

    fn finish(&self) {
        self.0.finish();
    }
}
