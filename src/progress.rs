//! Progress indicators for gcpboot CLI.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::thread;
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Finish a spinner with a success mark
pub fn finish_success(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    println!("  {} {}", "✓".green(), message);
}

/// Block for `duration`, showing a spinner with a countdown
pub fn wait(duration: Duration, message: &str) {
    if duration.is_zero() {
        return;
    }

    let pb = spinner(message);
    let tick = Duration::from_millis(250);
    let mut remaining = duration;
    while !remaining.is_zero() {
        pb.set_message(format!("{message} ({}s)", remaining.as_secs_f32().ceil() as u64));
        let step = remaining.min(tick);
        thread::sleep(step);
        remaining -= step;
    }
    finish_success(&pb, message);
}
