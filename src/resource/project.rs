//! Cloud project resource

use anyhow::{Context, Result};
use gcloudkit::ProjectSpec;

use super::{
    ApplyContext, ApplyResult, Resource, ResourceState, SharedBackend, dry_run, presence,
    tolerate_conflict,
};

/// The project that will hold Terraform state and its service account
#[derive(Debug, Clone)]
pub struct Project {
    backend: SharedBackend,
    spec: ProjectSpec,
}

impl Project {
    pub fn new(backend: SharedBackend, spec: ProjectSpec) -> Self {
        Self { backend, spec }
    }

    /// A failed lookup is treated as "absent"; the create call then decides
    fn exists(&self) -> bool {
        match self.backend.project_exists(&self.spec.project_id) {
            Ok(exists) => exists,
            Err(e) => {
                log::warn!("Could not definitively check project existence: {e}");
                false
            }
        }
    }
}

impl Resource for Project {
    fn id(&self) -> String {
        self.spec.project_id.clone()
    }

    fn description(&self) -> String {
        match &self.spec.organization_id {
            Some(org) => format!(
                "Create project {} ({}) in organization {org}",
                self.spec.project_id, self.spec.name
            ),
            None => format!("Create project {} ({})", self.spec.project_id, self.spec.name),
        }
    }

    fn resource_type(&self) -> &'static str {
        "project"
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(presence(self.exists()))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if self.exists() {
            log::info!("Project '{}' already exists", self.spec.project_id);
            return Ok(ApplyResult::NoChange);
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        let what = format!("project '{}'", self.spec.project_id);
        tolerate_conflict(self.backend.create_project(&self.spec), &what)
            .context("Failed to create project")
    }
}
