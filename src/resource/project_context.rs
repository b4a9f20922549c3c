//! Active gcloud project resource

use anyhow::{Context, Result};

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SharedBackend, dry_run};

/// The project gcloud commands default to
#[derive(Debug, Clone)]
pub struct ProjectContext {
    backend: SharedBackend,
    project_id: String,
}

impl ProjectContext {
    pub fn new(backend: SharedBackend, project_id: &str) -> Self {
        Self {
            backend,
            project_id: project_id.to_string(),
        }
    }
}

impl Resource for ProjectContext {
    fn id(&self) -> String {
        self.project_id.clone()
    }

    fn description(&self) -> String {
        format!("Set gcloud project context to {}", self.project_id)
    }

    fn resource_type(&self) -> &'static str {
        "project_context"
    }

    fn current_state(&self) -> Result<ResourceState> {
        let active = self
            .backend
            .active_project()
            .context("Failed to read gcloud project context")?;
        Ok(match active {
            Some(p) if p == self.project_id => ResourceState::Present { details: Some(p) },
            Some(p) => ResourceState::Modified {
                from: p,
                to: self.project_id.clone(),
            },
            None => ResourceState::Absent,
        })
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some(self.project_id.clone()),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let current = self.current_state()?;
        if current == self.desired_state() {
            return Ok(ApplyResult::NoChange);
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        self.backend
            .set_active_project(&self.project_id)
            .context("Failed to set gcloud project context")?;

        Ok(match current {
            ResourceState::Modified { .. } => ApplyResult::Modified,
            _ => ApplyResult::Created,
        })
    }
}
