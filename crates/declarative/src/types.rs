//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a failure of a resource affects the rest of the plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Later resources depend on this one; a failure halts the plan
    #[default]
    Structural,
    /// A failure is reported as a warning and the plan continues
    Advisory,
}

/// Current or desired state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
    /// Resource exists but differs from desired
    Modified { from: String, to: String },
    /// State cannot be determined
    Unknown,
}

impl ResourceState {
    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Check if state represents absence
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified)
    }
}

/// Tagged outcome of one step in a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The step converged (or had nothing to do)
    Success(ApplyResult),
    /// An advisory step failed; the plan continued
    Warning(String),
    /// A structural step failed; the plan halted here
    Fatal(String),
    /// The step never ran because an earlier step was fatal
    NotRun,
}

impl StepOutcome {
    /// Classify an apply result according to the resource's severity
    pub fn from_result(result: ApplyResult, severity: Severity) -> Self {
        match (result, severity) {
            (ApplyResult::Failed { error }, Severity::Structural) => Self::Fatal(error),
            (ApplyResult::Failed { error }, Severity::Advisory) => Self::Warning(error),
            (result, _) => Self::Success(result),
        }
    }

    /// Check if this outcome stops the plan
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Report for a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// Resource identifier
    pub id: String,
    /// Resource type
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// What happened
    pub outcome: StepOutcome,
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub failed: usize,
    pub no_change: usize,
    pub not_run: usize,
    /// Per-step reports, in plan order
    pub steps: Vec<StepReport>,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified
    }

    /// Check if execution was fully successful (no fatal failure)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created
            + self.modified
            + self.skipped
            + self.warnings
            + self.failed
            + self.no_change
            + self.not_run
    }

    /// The step that halted the plan, if any
    pub fn halted_at(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.outcome.is_fatal())
    }

    /// Record a step report and count its outcome
    pub fn record(&mut self, report: StepReport) {
        match &report.outcome {
            StepOutcome::Success(ApplyResult::NoChange) => self.no_change += 1,
            StepOutcome::Success(ApplyResult::Created) => self.created += 1,
            StepOutcome::Success(ApplyResult::Modified) => self.modified += 1,
            StepOutcome::Success(ApplyResult::Skipped { .. }) => self.skipped += 1,
            StepOutcome::Success(ApplyResult::Failed { .. }) | StepOutcome::Fatal(_) => {
                self.failed += 1;
            }
            StepOutcome::Warning(_) => self.warnings += 1,
            StepOutcome::NotRun => self.not_run += 1,
        }
        self.steps.push(report);
    }

    /// Turn a halted run into an error
    pub fn ensure_success(&self) -> Result<(), ExecuteError> {
        match self.halted_at() {
            Some(step) => Err(ExecuteError::Halted {
                id: step.id.clone(),
                description: step.description.clone(),
                reason: match &step.outcome {
                    StepOutcome::Fatal(reason) => reason.clone(),
                    _ => String::new(),
                },
            }),
            None => Ok(()),
        }
    }
}

/// Error returned when a plan did not complete
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// A structural step failed and later steps were not applied
    #[error("{description} ({id}) failed: {reason}")]
    Halted {
        id: String,
        description: String,
        reason: String,
    },
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}
