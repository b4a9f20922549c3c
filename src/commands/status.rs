//! `gcpboot status` - show what apply would change

use anyhow::{Context as AnyhowContext, Result};
use declarative::{DiffSummary, ResourceDiff, compute_diffs};

use crate::Context;
use crate::cli::StatusArgs;
use crate::config::BootstrapConfig;
use crate::engine::{build_plan, display_diff};
use crate::resource::SharedBackend;
use crate::ui;

pub fn run(ctx: &Context, args: StatusArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    // Keep stdout clean for JSON consumers
    let backend = super::connect(ctx.quiet || args.json)?;

    let diffs = collect_diffs(&config, &backend, args.target.as_deref());

    if args.json {
        let json = serde_json::to_string_pretty(&diffs).context("Failed to serialize diff")?;
        println!("{json}");
        return Ok(());
    }

    ui::header(&format!("Bootstrap Status: {}", config.project_id));
    display_diff(&diffs);

    let summary = DiffSummary::from_diffs(&diffs);
    if summary.unknown > 0 {
        println!();
        ui::warn("Some state could not be read; apply will retry those steps");
    } else if summary.has_changes() {
        println!();
        ui::info("Run 'gcpboot apply' to converge");
    }

    Ok(())
}

/// Diff the planned steps against the live project
///
/// `target` narrows the plan to one step type, or `type.name` where the
/// name matches part of the step id.
pub fn collect_diffs(
    config: &BootstrapConfig,
    backend: &SharedBackend,
    target: Option<&str>,
) -> Vec<ResourceDiff> {
    let plan = build_plan(config, backend).filter_by_target(target);
    compute_diffs(&plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::apply::bootstrap;
    use crate::config::tests::valid_config;
    use crate::resource::testing::FakeBackend;
    use declarative::{AutoConfirm, ExecuteOptions, NoProgress, ResourceState};
    use gcloudkit::ErrorCategory;

    #[test]
    fn test_fresh_project_needs_everything() {
        let fake = FakeBackend::new();
        let diffs = collect_diffs(&valid_config(), &fake.shared(), None);

        assert_eq!(diffs.len(), 10);
        assert_eq!(diffs[0].resource_type, "project_context");
        assert!(diffs.iter().all(|d| !d.is_unknown()));
        assert!(fake.mutations().is_empty());
    }

    #[test]
    fn test_converged_project_has_no_diffs() {
        let mut config = valid_config();
        config.api_propagation_delay_secs = 0;
        let fake = FakeBackend::new();
        bootstrap(
            &config,
            &fake.shared(),
            &ExecuteOptions::default(),
            &mut AutoConfirm,
            &mut NoProgress,
        )
        .unwrap();

        assert!(collect_diffs(&config, &fake.shared(), None).is_empty());
    }

    #[test]
    fn test_unreadable_state_is_unknown() {
        let fake = FakeBackend::new();
        fake.fail("bucket_exists", ErrorCategory::Permission);

        let diffs = collect_diffs(&valid_config(), &fake.shared(), None);
        let bucket = diffs.iter().find(|d| d.resource_type == "bucket").unwrap();
        assert_eq!(bucket.current, ResourceState::Unknown);
        assert!(bucket.error.as_deref().unwrap().contains("PERMISSION_DENIED"));
    }

    #[test]
    fn test_target_narrows_diff() {
        let fake = FakeBackend::new();
        let diffs = collect_diffs(&valid_config(), &fake.shared(), Some("project_role"));
        assert_eq!(diffs.len(), 2);

        let diffs = collect_diffs(
            &valid_config(),
            &fake.shared(),
            Some("project_role.storage"),
        );
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].resource_id, "acme-infra:roles/storage.admin");
    }

    #[test]
    fn test_diffs_serialize() {
        let fake = FakeBackend::new();
        let diffs = collect_diffs(&valid_config(), &fake.shared(), None);
        let json = serde_json::to_string(&diffs).unwrap();
        assert!(json.contains("\"resource_type\":\"bucket\""));
    }
}
