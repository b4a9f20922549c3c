//! Bucket object versioning resource

use anyhow::{Context, Result};
use gcloudkit::bucket_url;

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SharedBackend, dry_run, presence};

/// Object versioning on the state bucket
#[derive(Debug, Clone)]
pub struct BucketVersioning {
    backend: SharedBackend,
    project_id: String,
    bucket: String,
}

impl BucketVersioning {
    pub fn new(backend: SharedBackend, project_id: &str, bucket: &str) -> Self {
        Self {
            backend,
            project_id: project_id.to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn enabled(&self) -> Result<bool> {
        self.backend
            .versioning_enabled(&self.project_id, &self.bucket)
            .context("Failed to check bucket versioning")
    }
}

impl Resource for BucketVersioning {
    fn id(&self) -> String {
        bucket_url(&self.bucket)
    }

    fn description(&self) -> String {
        format!("Enable versioning on {}", bucket_url(&self.bucket))
    }

    fn resource_type(&self) -> &'static str {
        "bucket_versioning"
    }

    fn current_state(&self) -> Result<ResourceState> {
        // Versioning of a bucket that does not exist yet is simply off
        let bucket_exists = self
            .backend
            .bucket_exists(&self.project_id, &self.bucket)
            .context("Failed to check bucket existence")?;
        if !bucket_exists {
            return Ok(ResourceState::Absent);
        }
        Ok(presence(self.enabled()?))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            if self.current_state()?.is_present() {
                return Ok(ApplyResult::NoChange);
            }
            return Ok(dry_run());
        }

        if self.enabled()? {
            log::info!("Versioning already enabled");
            return Ok(ApplyResult::NoChange);
        }

        self.backend
            .enable_versioning(&self.project_id, &self.bucket)
            .context("Failed to enable versioning")?;
        log::info!("Versioning enabled");
        Ok(ApplyResult::Modified)
    }
}
