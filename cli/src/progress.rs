//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for loading and comparing tables
#[derive(Debug)]
pub struct ProgressReporter {
    pub step_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create a progress reporter; a hidden one prints nothing
    pub fn new(show_progress: bool) -> Self {
        Self {
            step_pb: None,
            show_progress,
        }
    }

    /// Start a spinner for the next step, finishing any previous one
    pub fn start(&mut self, message: &str) {
        if !self.show_progress {
            return;
        }
        if let Some(pb) = self.step_pb.take() {
            pb.finish_and_clear();
        }
        self.step_pb = Some(create_spinner(message));
    }

    /// Finish the current step with a completion message
    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.step_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.step_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
