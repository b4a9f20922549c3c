//! Diff computation for resources

use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ResourceState, Severity};
use serde::{Deserialize, Serialize};

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
    /// Failure policy of the resource
    pub severity: Severity,
    /// Why the current state could not be read, if it could not
    pub error: Option<String>,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning None if no changes needed
    ///
    /// A failing state query yields a diff with `ResourceState::Unknown`.
    pub fn from_resource(resource: &dyn Resource) -> Option<Self> {
        let (current, error) = match resource.current_state() {
            Ok(state) => (state, None),
            Err(e) => (ResourceState::Unknown, Some(format!("{e:#}"))),
        };
        let desired = resource.desired_state();

        if current == desired {
            return None;
        }

        Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
            severity: resource.severity(),
            error,
        })
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    /// Check if this diff represents a modification
    pub fn is_modification(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Modified { .. }, _) | (_, ResourceState::Modified { .. })
        ) || matches!(
            (&self.current, &self.desired),
            (
                ResourceState::Present { details: Some(_) },
                ResourceState::Present { details: Some(_) }
            )
        )
    }

    /// Check if the current state could not be determined
    pub fn is_unknown(&self) -> bool {
        matches!(self.current, ResourceState::Unknown)
    }
}

/// Compute diffs for every resource in a plan
///
/// Returns only resources that have differences between current and desired state.
pub fn compute_diffs(plan: &ExecutionPlan) -> Vec<ResourceDiff> {
    plan.iter()
        .filter_map(|r| ResourceDiff::from_resource(r))
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to modify
    pub modifications: usize,
    /// Number of resources whose state could not be read
    pub unknown: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_unknown() {
                summary.unknown += 1;
            } else if diff.is_addition() {
                summary.additions += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.unknown
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type, preserving first-seen order
pub fn group_by_type(diffs: &[ResourceDiff]) -> Vec<(String, Vec<&ResourceDiff>)> {
    let mut groups: Vec<(String, Vec<&ResourceDiff>)> = Vec::new();
    for diff in diffs {
        match groups.iter_mut().find(|(t, _)| *t == diff.resource_type) {
            Some((_, members)) => members.push(diff),
            None => groups.push((diff.resource_type.clone(), vec![diff])),
        }
    }
    groups
}
