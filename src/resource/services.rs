//! Service API enablement resource

use anyhow::{Context, Result};
use std::time::Duration;

use super::{ApplyContext, ApplyResult, Resource, ResourceState, Severity, SharedBackend, dry_run};
use crate::progress;

/// The set of service APIs enabled on the project
///
/// Enablement is submitted asynchronously; after a submission the step
/// waits once so the APIs can propagate before dependent steps run.
#[derive(Debug, Clone)]
pub struct Services {
    backend: SharedBackend,
    project_id: String,
    apis: Vec<String>,
    propagation_delay: Duration,
}

impl Services {
    pub fn new(
        backend: SharedBackend,
        project_id: &str,
        apis: &[String],
        propagation_delay: Duration,
    ) -> Self {
        Self {
            backend,
            project_id: project_id.to_string(),
            apis: apis.to_vec(),
            propagation_delay,
        }
    }

    /// Requested APIs not enabled yet, in config order
    fn missing(&self) -> Result<Vec<String>> {
        let enabled = self
            .backend
            .enabled_services(&self.project_id)
            .context("Failed to list enabled services")?;
        Ok(self
            .apis
            .iter()
            .filter(|api| !enabled.contains(api))
            .cloned()
            .collect())
    }
}

impl Resource for Services {
    fn id(&self) -> String {
        self.project_id.clone()
    }

    fn description(&self) -> String {
        format!("Enable {} service APIs", self.apis.len())
    }

    fn resource_type(&self) -> &'static str {
        "services"
    }

    fn severity(&self) -> Severity {
        Severity::Advisory
    }

    fn current_state(&self) -> Result<ResourceState> {
        let missing = self.missing()?;
        if missing.is_empty() {
            return Ok(self.desired_state());
        }
        Ok(ResourceState::Modified {
            from: format!("missing {}", missing.join(", ")),
            to: "all enabled".to_string(),
        })
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some(self.apis.join(", ")),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if self.apis.is_empty() {
            log::warn!("No APIs specified in config to enable");
            return Ok(ApplyResult::NoChange);
        }

        let missing = match self.missing() {
            Ok(missing) => missing,
            Err(e) => {
                log::warn!("{e:#}. Submitting every requested API");
                self.apis.clone()
            }
        };
        if missing.is_empty() {
            log::info!("All requested APIs are already enabled");
            return Ok(ApplyResult::NoChange);
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        self.backend
            .enable_services(&self.project_id, &missing)
            .context(
                "Failed to submit API enablement request (run 'gcloud services list --enabled' later to verify)",
            )?;

        log::info!(
            "API enablement submitted asynchronously for: {}",
            missing.join(", ")
        );
        log::info!("APIs may take a few minutes to become fully active");

        progress::wait(self.propagation_delay, "Waiting for API propagation");
        Ok(ApplyResult::Modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::FakeBackend;
    use gcloudkit::ErrorCategory;

    fn apis(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_enables_only_missing() {
        let fake = FakeBackend::new();
        fake.state()
            .services
            .insert("p".into(), apis(&["iam.googleapis.com"]));
        let services = Services::new(
            fake.shared(),
            "p",
            &apis(&["iam.googleapis.com", "storage.googleapis.com"]),
            Duration::ZERO,
        );
        let mut ctx = ApplyContext::default();

        assert_eq!(services.apply(&mut ctx).unwrap(), ApplyResult::Modified);
        assert_eq!(services.apply(&mut ctx).unwrap(), ApplyResult::NoChange);
        assert_eq!(
            fake.mutations(),
            vec!["enable_services storage.googleapis.com"]
        );
    }

    #[test]
    fn test_empty_list_is_noop() {
        let fake = FakeBackend::new();
        let services = Services::new(fake.shared(), "p", &[], Duration::ZERO);
        assert_eq!(
            services.apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::NoChange
        );
        assert!(fake.mutations().is_empty());
    }

    #[test]
    fn test_submission_failure_is_advisory_error() {
        let fake = FakeBackend::new();
        fake.fail("enable_services", ErrorCategory::Permission);
        let services = Services::new(fake.shared(), "p", &apis(&["iam.googleapis.com"]), Duration::ZERO);

        assert_eq!(services.severity(), Severity::Advisory);
        assert!(services.apply(&mut ApplyContext::default()).is_err());
    }

    #[test]
    fn test_list_failure_submits_everything() {
        let fake = FakeBackend::new();
        fake.fail("enabled_services", ErrorCategory::Network);
        let services = Services::new(
            fake.shared(),
            "p",
            &apis(&["iam.googleapis.com", "storage.googleapis.com"]),
            Duration::ZERO,
        );
        services.apply(&mut ApplyContext::default()).unwrap();
        assert_eq!(
            fake.mutations(),
            vec!["enable_services iam.googleapis.com,storage.googleapis.com"]
        );
    }
}
