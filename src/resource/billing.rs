//! Billing account link resource

use anyhow::{Context, Result};

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SharedBackend, dry_run};

/// Link between the project and its billing account
#[derive(Debug, Clone)]
pub struct BillingLink {
    backend: SharedBackend,
    project_id: String,
    billing_account_id: String,
}

impl BillingLink {
    pub fn new(backend: SharedBackend, project_id: &str, billing_account_id: &str) -> Self {
        Self {
            backend,
            project_id: project_id.to_string(),
            billing_account_id: billing_account_id.to_string(),
        }
    }

    fn state_for(&self, linked: Option<String>) -> ResourceState {
        match linked {
            Some(account) if account == self.billing_account_id => ResourceState::Present {
                details: Some(account),
            },
            Some(account) => ResourceState::Modified {
                from: account,
                to: self.billing_account_id.clone(),
            },
            None => ResourceState::Absent,
        }
    }
}

impl Resource for BillingLink {
    fn id(&self) -> String {
        self.billing_account_id.clone()
    }

    fn description(&self) -> String {
        format!(
            "Link project {} to billing account {}",
            self.project_id, self.billing_account_id
        )
    }

    fn resource_type(&self) -> &'static str {
        "billing_link"
    }

    fn current_state(&self) -> Result<ResourceState> {
        let linked = self
            .backend
            .billing_account(&self.project_id)
            .context("Failed to check billing status")?;
        Ok(self.state_for(linked))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some(self.billing_account_id.clone()),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let current = match self.current_state() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("{e:#}. Proceeding with billing link");
                ResourceState::Unknown
            }
        };
        if current == self.desired_state() {
            log::info!("Billing account already linked");
            return Ok(ApplyResult::NoChange);
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        match self
            .backend
            .link_billing(&self.project_id, &self.billing_account_id)
        {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                log::warn!(
                    "Project '{}' is already linked to a billing account. Continuing",
                    self.project_id
                );
                return Ok(ApplyResult::NoChange);
            }
            Err(e) => return Err(e).context("Failed to link billing account"),
        }

        log::info!("Billing account linked");
        Ok(match current {
            ResourceState::Modified { .. } => ApplyResult::Modified,
            _ => ApplyResult::Created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::FakeBackend;
    use gcloudkit::ErrorCategory;

    const ACCOUNT: &str = "01ABCD-234567-89EFGH";

    #[test]
    fn test_links_once() {
        let fake = FakeBackend::new();
        let link = BillingLink::new(fake.shared(), "acme-infra", ACCOUNT);
        let mut ctx = ApplyContext::default();

        assert_eq!(link.apply(&mut ctx).unwrap(), ApplyResult::Created);
        assert_eq!(link.apply(&mut ctx).unwrap(), ApplyResult::NoChange);
        assert_eq!(fake.mutations(), vec!["link_billing acme-infra"]);
    }

    #[test]
    fn test_relinks_other_account() {
        let fake = FakeBackend::new();
        fake.state()
            .billing
            .insert("acme-infra".into(), "OTHER".into());
        let link = BillingLink::new(fake.shared(), "acme-infra", ACCOUNT);

        assert!(matches!(
            link.current_state().unwrap(),
            ResourceState::Modified { .. }
        ));
        assert_eq!(
            link.apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::Modified
        );
    }

    #[test]
    fn test_check_failure_proceeds_to_link() {
        let fake = FakeBackend::new();
        fake.fail("billing_account", ErrorCategory::Other);
        let link = BillingLink::new(fake.shared(), "acme-infra", ACCOUNT);

        assert!(link.current_state().is_err());
        assert_eq!(
            link.apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::Created
        );
    }

    #[test]
    fn test_already_associated_is_success() {
        let fake = FakeBackend::new();
        fake.conflict("link_billing");
        let link = BillingLink::new(fake.shared(), "acme-infra", ACCOUNT);
        assert_eq!(
            link.apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::NoChange
        );
    }
}
