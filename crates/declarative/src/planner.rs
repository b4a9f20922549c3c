//! Execution planner - ordered resource plans

use crate::resource::{BoxedResource, Resource};

/// An ordered execution plan
///
/// Resources run in insertion order; a resource may rely on every
/// resource before it having converged.
#[derive(Default)]
pub struct ExecutionPlan {
    /// Resources in apply order
    pub steps: Vec<BoxedResource>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a resource to the end of the plan
    pub fn add_resource(&mut self, resource: BoxedResource) {
        self.steps.push(resource);
    }

    /// Number of resources in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over resources in apply order
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Resource + 'static)> {
        self.steps.iter().map(|r| r.as_ref())
    }

    /// Filter plan to only include resources matching a predicate
    ///
    /// Relative order is preserved.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            steps: self
                .steps
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        let Some(target) = target else {
            return self;
        };

        let (type_filter, name_filter) = match target.split_once('.') {
            Some((t, n)) => (t, Some(n)),
            None => (target, None),
        };

        self.filter(|r| {
            r.resource_type() == type_filter && name_filter.is_none_or(|n| r.id().contains(n))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApplyContext;
    use crate::types::{ApplyResult, ResourceState};
    use anyhow::Result;

    #[derive(Debug)]
    struct Named(&'static str, &'static str);

    impl Resource for Named {
        fn id(&self) -> String {
            self.1.to_string()
        }
        fn description(&self) -> String {
            self.1.to_string()
        }
        fn resource_type(&self) -> &'static str {
            self.0
        }
        fn current_state(&self) -> Result<ResourceState> {
            Ok(ResourceState::Absent)
        }
        fn desired_state(&self) -> ResourceState {
            ResourceState::Present { details: None }
        }
        fn apply(&self, _ctx: &mut ApplyContext) -> Result<ApplyResult> {
            Ok(ApplyResult::Created)
        }
    }

    fn sample() -> ExecutionPlan {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(Named("project", "acme")));
        plan.add_resource(Box::new(Named("iam_binding", "roles/editor")));
        plan.add_resource(Box::new(Named("iam_binding", "roles/storage.admin")));
        plan.add_resource(Box::new(Named("bucket", "gs://acme-tf")));
        plan
    }

    #[test]
    fn test_filter_by_type_keeps_order() {
        let plan = sample().filter_by_target(Some("iam_binding"));
        let ids: Vec<String> = plan.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["roles/editor", "roles/storage.admin"]);
    }

    #[test]
    fn test_filter_by_type_and_name() {
        let plan = sample().filter_by_target(Some("iam_binding.storage"));
        assert_eq!(plan.len(), 1);
        assert!(sample().filter_by_target(Some("nope")).is_empty());
        assert_eq!(sample().filter_by_target(None).len(), 4);
    }
}
