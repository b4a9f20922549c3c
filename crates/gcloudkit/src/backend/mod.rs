//! Backend abstraction for control-plane operations.
//!
//! The [`Backend`] trait defines every read and mutation the provisioning
//! steps need, allowing for different implementations (real `gcloud` CLI,
//! in-memory doubles for testing).

pub mod gcloud;

use crate::error::Result;
use crate::types::{BucketSpec, IamPolicy, IamScope, ProjectSpec, ServiceAccountSpec};
use std::path::Path;

/// Backend trait for control-plane operations.
///
/// Query methods never mutate remote state. Mutating methods fail with
/// [`Error::AlreadyExists`](crate::Error::AlreadyExists) when the target is
/// already there, so callers can treat creation races as success.
pub trait Backend: Send + Sync {
    /// Account gcloud is currently authenticated as, if any.
    fn active_account(&self) -> Result<Option<String>>;

    /// Project set in the gcloud configuration, if any.
    fn active_project(&self) -> Result<Option<String>>;

    /// Set the project used by subsequent gcloud commands.
    fn set_active_project(&self, project_id: &str) -> Result<()>;

    /// Check whether a project is visible to the caller.
    fn project_exists(&self, project_id: &str) -> Result<bool>;

    /// Create a project.
    fn create_project(&self, project: &ProjectSpec) -> Result<()>;

    /// Billing account linked to a project, if any.
    fn billing_account(&self, project_id: &str) -> Result<Option<String>>;

    /// Link a project to a billing account.
    fn link_billing(&self, project_id: &str, billing_account_id: &str) -> Result<()>;

    /// Names of the services enabled on a project.
    fn enabled_services(&self, project_id: &str) -> Result<Vec<String>>;

    /// Submit enablement of services without waiting for completion.
    fn enable_services(&self, project_id: &str, services: &[String]) -> Result<()>;

    /// Check whether a service account exists.
    fn service_account_exists(&self, project_id: &str, email: &str) -> Result<bool>;

    /// Create a service account.
    fn create_service_account(&self, project_id: &str, account: &ServiceAccountSpec)
    -> Result<()>;

    /// Read the IAM policy of a project or billing account.
    fn iam_policy(&self, scope: &IamScope) -> Result<IamPolicy>;

    /// Add an unconditional role binding.
    fn add_iam_binding(&self, scope: &IamScope, member: &str, role: &str) -> Result<()>;

    /// Check whether a bucket exists.
    fn bucket_exists(&self, project_id: &str, bucket: &str) -> Result<bool>;

    /// Create a bucket.
    fn create_bucket(&self, project_id: &str, bucket: &BucketSpec) -> Result<()>;

    /// Whether object versioning is enabled on a bucket.
    fn versioning_enabled(&self, project_id: &str, bucket: &str) -> Result<bool>;

    /// Turn on object versioning for a bucket.
    fn enable_versioning(&self, project_id: &str, bucket: &str) -> Result<()>;

    /// Create a JSON key for a service account and write it to `path`.
    fn create_service_account_key(&self, project_id: &str, email: &str, path: &Path)
    -> Result<()>;
}

/// Get the default backend (real gcloud CLI).
pub fn default_backend() -> Result<gcloud::GcloudBackend> {
    gcloud::GcloudBackend::new()
}
