//! Execution engine - applies resources in order with a severity-based failure policy

use crate::context::{ApplyContext, NoProgress, ProgressCallback};
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, StepOutcome, StepReport};
use anyhow::Result;

/// Execute a plan with the given options and progress callback
///
/// Resources are applied one at a time, in plan order. An error from an
/// advisory resource is recorded as a warning and execution continues; an
/// error from a structural resource halts the plan and every remaining
/// resource is reported as not run.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, verbose)
/// * `progress` - Progress callback
///
/// # Returns
/// Summary of execution results. A halted plan is not an `Err`; use
/// [`ExecuteSummary::ensure_success`] to turn it into one.
pub fn execute<P>(
    plan: &ExecutionPlan,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback + ?Sized,
{
    let mut summary = ExecuteSummary::default();
    let total = plan.len();

    if total == 0 {
        return Ok(summary);
    }

    progress.on_plan_start(total);

    let mut halted = false;
    for (index, resource) in plan.iter().enumerate() {
        let outcome = if halted {
            StepOutcome::NotRun
        } else {
            progress.on_resource_start(index + 1, total, &resource.id(), &resource.description());
            let result = apply_resource(resource, opts);
            let outcome = StepOutcome::from_result(result, resource.severity());
            progress.on_resource_complete(&resource.id(), &outcome);
            halted = outcome.is_fatal();
            outcome
        };

        summary.record(StepReport {
            id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            outcome,
        });
    }

    progress.on_plan_complete();

    Ok(summary)
}

/// Apply a single resource
fn apply_resource(resource: &dyn Resource, opts: &ExecuteOptions) -> ApplyResult {
    let mut ctx = ApplyContext::new(opts.dry_run, opts.verbose);

    match resource.apply(&mut ctx) {
        Ok(result) => result,
        Err(e) => ApplyResult::Failed {
            error: format!("{e:#}"),
        },
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress reporting.
pub fn execute_simple(plan: &ExecutionPlan, opts: &ExecuteOptions) -> Result<ExecuteSummary> {
    execute(plan, opts, &mut NoProgress)
}
