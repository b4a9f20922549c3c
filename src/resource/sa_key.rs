//! Service account key file resource

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SharedBackend, dry_run, presence};

/// A JSON key for the Terraform service account, written to a local file
///
/// An existing file at the path counts as the key already being exported,
/// so re-running never mints a second key.
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    backend: SharedBackend,
    project_id: String,
    email: String,
    path: PathBuf,
}

impl ServiceAccountKey {
    pub fn new(backend: SharedBackend, project_id: &str, email: &str, path: PathBuf) -> Self {
        Self {
            backend,
            project_id: project_id.to_string(),
            email: email.to_string(),
            path,
        }
    }
}

impl Resource for ServiceAccountKey {
    fn id(&self) -> String {
        self.path.display().to_string()
    }

    fn description(&self) -> String {
        format!("Export key for {} to {}", self.email, self.path.display())
    }

    fn resource_type(&self) -> &'static str {
        "service_account_key"
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(presence(self.path.exists()))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if self.path.exists() {
            log::info!(
                "Key file '{}' already exists, not generating another key",
                self.path.display()
            );
            return Ok(ApplyResult::NoChange);
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        log::info!("Generating service account key");
        self.backend
            .create_service_account_key(&self.project_id, &self.email, &self.path)
            .context("Failed to generate service account key")?;

        log::warn!(
            "Service account key saved to '{}'. HANDLE THIS FILE SECURELY!",
            self.path.display()
        );
        log::warn!("Consider adding it to .gitignore if not already done.");
        log::warn!("Using Workload Identity Federation is recommended over keys for CI/CD.");
        Ok(ApplyResult::Created)
    }
}
