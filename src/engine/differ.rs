//! Diff display - gcpboot-specific UI

use colored::Colorize;
use declarative::{DiffSummary, ResourceDiff, ResourceState, Severity, group_by_type};

/// Heading for a resource type
fn type_name(resource_type: &str) -> &str {
    match resource_type {
        "project_context" => "gcloud context",
        "project" => "Project",
        "billing_link" => "Billing",
        "services" => "Service APIs",
        "service_account" => "Service account",
        "project_role" => "Project roles",
        "billing_role" => "Billing roles",
        "bucket" => "State bucket",
        "bucket_versioning" => "Bucket versioning",
        "service_account_key" => "Service account key",
        other => other,
    }
}

/// Short description of the change a diff represents
fn change_desc(diff: &ResourceDiff) -> String {
    match (&diff.current, &diff.desired) {
        (ResourceState::Unknown, _) => format!(
            "(could not read state: {})",
            diff.error.as_deref().unwrap_or("unknown error")
        ),
        (ResourceState::Absent, _) => "(will create)".to_string(),
        (ResourceState::Modified { from, to }, _) => format!("{from} → {to}"),
        (ResourceState::Present { details: from }, ResourceState::Present { details: to }) => {
            format!(
                "{} → {}",
                from.as_deref().unwrap_or("current"),
                to.as_deref().unwrap_or("desired")
            )
        }
        _ => String::new(),
    }
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Bootstrap Diff".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in group_by_type(diffs) {
        println!("│ {}", type_name(&resource_type).bold());

        for diff in type_diffs {
            let symbol = if diff.is_unknown() {
                "?".dimmed()
            } else if diff.is_addition() {
                "+".green()
            } else {
                "~".yellow()
            };

            let advisory = if diff.severity == Severity::Advisory {
                " [advisory]".dimmed().to_string()
            } else {
                String::new()
            };

            println!(
                "│   {} {:<45} {}{}",
                symbol,
                diff.resource_id,
                change_desc(diff).dimmed(),
                advisory
            );
        }
        println!("│");
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} to create, {} to modify, {} unknown)",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.unknown.to_string().dimmed()
    );
    println!("└─────────────────────────────────────────────────────┘");
}
