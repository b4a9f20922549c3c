//! Terraform state bucket resource

use anyhow::{Context, Result};
use gcloudkit::{BucketSpec, bucket_url};

use super::{
    ApplyContext, ApplyResult, Resource, ResourceState, SharedBackend, dry_run, presence,
    tolerate_conflict,
};

/// The bucket holding Terraform state, with uniform bucket-level access
#[derive(Debug, Clone)]
pub struct StateBucket {
    backend: SharedBackend,
    project_id: String,
    spec: BucketSpec,
}

impl StateBucket {
    pub fn new(backend: SharedBackend, project_id: &str, spec: BucketSpec) -> Self {
        Self {
            backend,
            project_id: project_id.to_string(),
            spec,
        }
    }

    /// "Not found" means absent; any other lookup failure is an error
    fn exists(&self) -> Result<bool> {
        self.backend
            .bucket_exists(&self.project_id, &self.spec.name)
            .context("Failed to check bucket existence")
    }
}

impl Resource for StateBucket {
    fn id(&self) -> String {
        bucket_url(&self.spec.name)
    }

    fn description(&self) -> String {
        format!(
            "Create bucket {} in {}",
            bucket_url(&self.spec.name),
            self.spec.location
        )
    }

    fn resource_type(&self) -> &'static str {
        "bucket"
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(presence(self.exists()?))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let url = bucket_url(&self.spec.name);
        if self.exists()? {
            log::info!("Bucket '{url}' already exists");
            return Ok(ApplyResult::NoChange);
        }
        if ctx.dry_run {
            return Ok(dry_run());
        }

        tolerate_conflict(
            self.backend.create_bucket(&self.project_id, &self.spec),
            &format!("bucket '{url}'"),
        )
        .context("Failed to create bucket")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::FakeBackend;
    use gcloudkit::ErrorCategory;

    fn bucket(fake: &std::sync::Arc<FakeBackend>) -> StateBucket {
        StateBucket::new(
            fake.shared(),
            "acme-infra",
            BucketSpec {
                name: "acme-tfstate".into(),
                location: "europe-west1".into(),
                uniform_access: true,
            },
        )
    }

    #[test]
    fn test_creates_once() {
        let fake = FakeBackend::new();
        let bucket = bucket(&fake);
        let mut ctx = ApplyContext::default();

        assert_eq!(bucket.id(), "gs://acme-tfstate");
        assert_eq!(bucket.apply(&mut ctx).unwrap(), ApplyResult::Created);
        assert_eq!(bucket.apply(&mut ctx).unwrap(), ApplyResult::NoChange);
        assert_eq!(fake.mutations(), vec!["create_bucket acme-tfstate"]);
    }

    #[test]
    fn test_conflict_is_success() {
        let fake = FakeBackend::new();
        fake.conflict("create_bucket");
        assert_eq!(
            bucket(&fake).apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::NoChange
        );
    }

    #[test]
    fn test_lookup_error_is_fatal() {
        let fake = FakeBackend::new();
        fake.fail("bucket_exists", ErrorCategory::Network);
        assert!(bucket(&fake).apply(&mut ApplyContext::default()).is_err());
        assert!(fake.mutations().is_empty());
    }

    #[test]
    fn test_dry_run_skips_create() {
        let fake = FakeBackend::new();
        let mut ctx = ApplyContext::new(true, false);
        assert!(matches!(
            bucket(&fake).apply(&mut ctx).unwrap(),
            ApplyResult::Skipped { .. }
        ));
        assert!(fake.mutations().is_empty());
    }
}
