//! Service account resource

use anyhow::{Context, Result};
use gcloudkit::{ErrorCategory, ServiceAccountSpec};

use super::{
    ApplyContext, ApplyResult, Resource, ResourceState, SharedBackend, dry_run, presence,
    tolerate_conflict,
};

/// The service account Terraform runs as
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    backend: SharedBackend,
    project_id: String,
    spec: ServiceAccountSpec,
}

impl ServiceAccount {
    pub fn new(backend: SharedBackend, project_id: &str, spec: ServiceAccountSpec) -> Self {
        Self {
            backend,
            project_id: project_id.to_string(),
            spec,
        }
    }

    fn email(&self) -> String {
        self.spec.email(&self.project_id)
    }

    /// A denied lookup counts as "absent"; the create call then decides
    ///
    /// gcloud answers PERMISSION_DENIED for accounts in a project that does
    /// not exist yet, or whose IAM API is still propagating.
    fn exists(&self) -> Result<bool> {
        match self
            .backend
            .service_account_exists(&self.project_id, &self.email())
        {
            Ok(exists) => Ok(exists),
            Err(e) if e.category() == ErrorCategory::Permission => {
                log::warn!("Could not definitively check service account existence: {e}");
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to check service account"),
        }
    }
}

impl Resource for ServiceAccount {
    fn id(&self) -> String {
        self.email()
    }

    fn description(&self) -> String {
        format!("Create service account {}", self.email())
    }

    fn resource_type(&self) -> &'static str {
        "service_account"
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(presence(self.exists()?))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if self.exists()? {
            log::info!("Service account '{}' already exists", self.email());
            return Ok(ApplyResult::NoChange);
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        let what = format!("service account '{}'", self.spec.name);
        tolerate_conflict(
            self.backend
                .create_service_account(&self.project_id, &self.spec),
            &what,
        )
        .context("Failed to create service account")
    }
}
