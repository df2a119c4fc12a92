use indicatif::{ProgressBar, ProgressStyle};

use super::ProgressObserver;

/// Position units per percent, so the bar moves in hundredths of a percent
const SCALE: f64 = 100.0;

/// Renders progress updates on the terminal
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new((100.0 * SCALE) as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn finish(&self, succeeded: bool) {
        if succeeded {
            self.bar.finish_with_message("done");
        } else {
            self.bar.abandon_with_message("failed");
        }
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_progress(&mut self, percentage: f64, speed: f64, eta: &str) {
        // The bar cannot go outside its range; the message shows the raw value
        let position = (percentage.clamp(0.0, 100.0) * SCALE) as u64;
        self.bar.set_position(position);
        self.bar.set_message(format!("{:.2}% | speed {:.2}x | ETA {}", percentage, speed, eta));
    }
}
