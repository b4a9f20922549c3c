//! IAM role binding resource

use anyhow::{Context, Result};
use gcloudkit::{IamScope, service_account_member};

use super::{
    ApplyContext, ApplyResult, Resource, ResourceState, Severity, SharedBackend, dry_run, presence,
};

/// One role granted to the Terraform service account
///
/// Grants are advisory: a failed grant is reported and the plan continues.
#[derive(Debug, Clone)]
pub struct IamBinding {
    backend: SharedBackend,
    scope: IamScope,
    member: String,
    role: String,
}

impl IamBinding {
    pub fn new(backend: SharedBackend, scope: IamScope, email: &str, role: &str) -> Self {
        Self {
            backend,
            scope,
            member: service_account_member(email),
            role: role.to_string(),
        }
    }

    fn granted(&self) -> Result<bool> {
        let policy = self
            .backend
            .iam_policy(&self.scope)
            .with_context(|| format!("Failed to read IAM policy of {}", self.scope))?;
        Ok(policy.has_binding(&self.role, &self.member))
    }
}

impl Resource for IamBinding {
    fn id(&self) -> String {
        format!("{}:{}", self.scope.id(), self.role)
    }

    fn description(&self) -> String {
        format!("Grant {} on {}", self.role, self.scope)
    }

    fn resource_type(&self) -> &'static str {
        match self.scope {
            IamScope::Project(_) => "project_role",
            IamScope::BillingAccount(_) => "billing_role",
        }
    }

    fn severity(&self) -> Severity {
        Severity::Advisory
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(presence(self.granted()?))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        match self.granted() {
            Ok(true) => {
                log::info!("Role '{}' already granted on {}", self.role, self.scope);
                return Ok(ApplyResult::NoChange);
            }
            Ok(false) => {}
            // Granting is idempotent on the control plane, so try anyway
            Err(e) => log::debug!("{e:#}"),
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        log::info!("Granting {} role '{}'", self.scope.kind(), self.role);
        match self
            .backend
            .add_iam_binding(&self.scope, &self.member, &self.role)
        {
            Ok(()) => Ok(ApplyResult::Created),
            Err(e) if e.is_conflict() => Ok(ApplyResult::NoChange),
            Err(e) => Err(e).with_context(|| {
                format!(
                    "Failed to grant {} role {} (may already exist or permissions issue)",
                    self.scope.kind(),
                    self.role
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::FakeBackend;
    use gcloudkit::ErrorCategory;

    const EMAIL: &str = "terraform@acme-infra.iam.gserviceaccount.com";

    #[test]
    fn test_grants_once() {
        let fake = FakeBackend::new();
        let binding = IamBinding::new(
            fake.shared(),
            IamScope::Project("acme-infra".into()),
            EMAIL,
            "roles/editor",
        );
        let mut ctx = ApplyContext::default();

        assert_eq!(binding.apply(&mut ctx).unwrap(), ApplyResult::Created);
        assert_eq!(binding.apply(&mut ctx).unwrap(), ApplyResult::NoChange);
        assert_eq!(
            fake.mutations(),
            vec!["add_iam_binding acme-infra:roles/editor"]
        );
    }

    #[test]
    fn test_policy_read_failure_still_grants() {
        let fake = FakeBackend::new();
        fake.fail("iam_policy", ErrorCategory::Permission);
        let binding = IamBinding::new(
            fake.shared(),
            IamScope::BillingAccount("01ABCD".into()),
            EMAIL,
            "roles/billing.user",
        );

        assert_eq!(binding.resource_type(), "billing_role");
        assert_eq!(
            binding.apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::Created
        );
    }

    #[test]
    fn test_grant_failure_is_advisory() {
        let fake = FakeBackend::new();
        fake.fail("add_iam_binding", ErrorCategory::Permission);
        let binding = IamBinding::new(
            fake.shared(),
            IamScope::Project("acme-infra".into()),
            EMAIL,
            "roles/owner",
        );

        assert_eq!(binding.severity(), Severity::Advisory);
        let err = binding.apply(&mut ApplyContext::default()).unwrap_err();
        assert!(err.to_string().contains("roles/owner"));
    }
}
