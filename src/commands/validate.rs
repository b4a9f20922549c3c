//! `gcpboot validate` - check the config and list the plan offline

use anyhow::Result;
use colored::Colorize;
use declarative::Severity;
use gcloudkit::backend::gcloud::GcloudBackend;

use crate::Context;
use crate::cli::ConfigArgs;
use crate::config::BootstrapConfig;
use crate::confirm::print_summary;
use crate::engine::build_plan;
use crate::resource::SharedBackend;
use crate::ui;

/// A planned step, as shown by `validate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub resource_type: &'static str,
    pub description: String,
    pub severity: Severity,
}

pub fn run(ctx: &Context, args: &ConfigArgs) -> Result<()> {
    let config = super::load_config(args)?;

    if !ctx.quiet {
        print_summary(&config);

        let steps = planned_steps(&config);
        ui::section("Planned Steps");
        for (i, step) in steps.iter().enumerate() {
            let tag = match step.severity {
                Severity::Structural => String::new(),
                Severity::Advisory => format!(" {}", "[advisory]".dimmed()),
            };
            ui::step(i + 1, steps.len(), &format!("{}{tag}", step.description));
        }
        println!();
        ui::dim("Run 'gcpboot status' to compare against the live project");
        println!();
    }

    ui::success("Configuration is valid");
    Ok(())
}

/// The steps `apply` would walk, in order
///
/// Nothing here queries gcloud: only step identity is read from the plan.
pub fn planned_steps(config: &BootstrapConfig) -> Vec<PlannedStep> {
    let offline = SharedBackend::new(GcloudBackend::with_path("gcloud"));
    build_plan(config, &offline)
        .iter()
        .map(|r| PlannedStep {
            resource_type: r.resource_type(),
            description: r.description(),
            severity: r.severity(),
        })
        .collect()
}
