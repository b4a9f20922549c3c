//! `gcpboot apply` - bootstrap the project for Terraform

use anyhow::Result;
use declarative::{
    AutoConfirm, ConfirmCallback, ExecuteOptions, ExecuteSummary, ProgressCallback, execute,
};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::config::BootstrapConfig;
use crate::confirm::{PromptConfirm, confirm_execution, print_summary};
use crate::engine::{TerminalProgress, build_plan};
use crate::resource::SharedBackend;
use crate::ui;

/// What happened to a bootstrap request
#[derive(Debug)]
pub enum Outcome {
    /// The operator declined; nothing was changed
    Aborted,
    /// The plan ran (possibly halted; check the summary)
    Completed(ExecuteSummary),
}

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    // Config problems are reported before gcloud is touched
    let config = super::load_config(&args.config)?;
    let backend = super::connect(ctx.quiet)?;

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        verbose: ctx.verbose > 0,
    };
    let mut confirm: Box<dyn ConfirmCallback> = if args.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm)
    };
    let mut progress = TerminalProgress::new(ctx.quiet);

    match bootstrap(&config, &backend, &opts, confirm.as_mut(), &mut progress)? {
        Outcome::Aborted => {
            ui::info("Aborted by user. No changes were made.");
            Ok(())
        }
        Outcome::Completed(summary) => {
            crate::engine::print_summary(&summary);
            summary.ensure_success()?;

            if args.dry_run {
                println!();
                ui::info("Dry run - no changes made");
            } else {
                println!();
                ui::success("GCP bootstrap process completed successfully!");
                print_next_steps(&config);
            }
            Ok(())
        }
    }
}

/// Confirm with the operator, then run the bootstrap plan
///
/// A dry run prints the summary and walks the plan without prompting; no
/// resource mutates anything in that mode.
pub fn bootstrap<C, P>(
    config: &BootstrapConfig,
    backend: &SharedBackend,
    opts: &ExecuteOptions,
    confirm: &mut C,
    progress: &mut P,
) -> Result<Outcome>
where
    C: ConfirmCallback + ?Sized,
    P: ProgressCallback + ?Sized,
{
    if opts.dry_run {
        print_summary(config);
    } else if !confirm_execution(config, confirm)? {
        return Ok(Outcome::Aborted);
    }

    log::info!("Starting GCP bootstrap");
    let plan = build_plan(config, backend);
    let summary = execute(&plan, opts, progress)?;
    Ok(Outcome::Completed(summary))
}

/// Follow-up instructions once the project is ready for Terraform
pub fn next_steps(config: &BootstrapConfig) -> Vec<String> {
    let mut steps = vec![
        format!(
            "1. Configure your Terraform backend ('backend \"gcs\" {{}}') using bucket: {}",
            config.tf_state_bucket_name
        ),
        "2. Configure Terraform GCP provider authentication:".to_string(),
    ];
    if let Some(path) = config.key_path() {
        steps.push(format!(
            "   - Using generated key: export GOOGLE_APPLICATION_CREDENTIALS=\"{}\"",
            path.display()
        ));
    }
    steps.push(
        "   - Using your user credentials (for local dev): 'gcloud auth application-default login'"
            .to_string(),
    );
    steps.push(format!(
        "   - Using impersonation (local dev): 'gcloud auth application-default login --impersonate-service-account={}'",
        config.tf_service_account_email
    ));
    steps.push(
        "   - Using Workload Identity Federation (recommended for CI/CD): configure a WIF pool/provider and use 'google-github-actions/auth'"
            .to_string(),
    );
    steps.push(
        "3. Run 'terraform init' and then 'terraform apply' to deploy your infrastructure."
            .to_string(),
    );
    steps
}

fn print_next_steps(config: &BootstrapConfig) {
    ui::section("Next Steps");
    for line in next_steps(config) {
        println!("  {line}");
    }
}
