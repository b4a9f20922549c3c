//! Execution reporting - gcpboot's terminal UI for the declarative executor

use colored::Colorize;
use declarative::{ApplyResult, ExecuteSummary, ProgressCallback, StepOutcome};

use crate::ui;

/// Progress callback printing one line per step
pub struct TerminalProgress {
    quiet: bool,
}

impl TerminalProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

/// One-line rendering of a step outcome
fn outcome_line(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Success(ApplyResult::NoChange) => {
            format!("{} already in place", "○".dimmed())
        }
        StepOutcome::Success(ApplyResult::Created) => format!("{} created", "✓".green()),
        StepOutcome::Success(ApplyResult::Modified) => format!("{} updated", "✓".green()),
        StepOutcome::Success(ApplyResult::Skipped { reason }) => {
            format!("{} skipped ({reason})", "⊘".dimmed())
        }
        StepOutcome::Success(ApplyResult::Failed { error }) | StepOutcome::Fatal(error) => {
            format!("{} {}", "✗".red(), error.red())
        }
        StepOutcome::Warning(reason) => format!("{} {}", "⚠".yellow(), reason.yellow()),
        StepOutcome::NotRun => format!("{} not run", "-".dimmed()),
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_plan_start(&mut self, total: usize) {
        if !self.quiet {
            println!();
            println!("  {} Applying {} steps...", "→".cyan(), total);
        }
    }

    fn on_resource_start(&mut self, index: usize, total: usize, _id: &str, description: &str) {
        log::debug!("Starting step {index}/{total}: {description}");
        if !self.quiet {
            ui::step(index, total, description);
        }
    }

    fn on_resource_complete(&mut self, id: &str, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Warning(reason) => log::warn!("{id}: {reason}"),
            StepOutcome::Fatal(reason) => log::error!("{id}: {reason}"),
            _ => {}
        }
        // Failures are shown even in quiet mode
        if !self.quiet || matches!(outcome, StepOutcome::Warning(_) | StepOutcome::Fatal(_)) {
            println!("      {}", outcome_line(outcome));
        }
    }

    fn on_plan_complete(&mut self) {}
}

/// Print the execution summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!(
            "  {} {} created, {} updated, {} unchanged",
            "✓".green(),
            summary.created,
            summary.modified,
            summary.no_change
        );
    } else {
        println!(
            "  {} {} created, {} updated, {} failed, {} not run",
            "✗".red(),
            summary.created,
            summary.modified,
            summary.failed,
            summary.not_run
        );
    }

    if summary.skipped > 0 {
        println!("  {} {} skipped", "⊘".dimmed(), summary.skipped);
    }

    let warnings: Vec<_> = summary
        .steps
        .iter()
        .filter_map(|s| match &s.outcome {
            StepOutcome::Warning(reason) => Some((s, reason)),
            _ => None,
        })
        .collect();
    if !warnings.is_empty() {
        println!(
            "  {} {} advisory step(s) failed (check warnings above):",
            "⚠".yellow(),
            warnings.len()
        );
        for (step, reason) in warnings {
            println!("      • {}: {}", step.description, reason.dimmed());
        }
    }

    if let Some(step) = summary.halted_at() {
        ui::error(&format!("Bootstrap halted at: {}", step.description));
    }
}
