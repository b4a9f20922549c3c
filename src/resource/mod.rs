//! Provisioning resources for the bootstrap plan
//!
//! Every step of the bootstrap is modeled as a Resource with:
//! - State detection through a read-only control-plane query
//! - Apply function issuing the mutation only when the query says it is needed
//! - Severity: structural steps halt the plan on failure, advisory steps warn

use anyhow::Result;
use gcloudkit::Backend;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

pub mod billing;
pub mod bucket;
pub mod iam_binding;
pub mod project;
pub mod project_context;
pub mod sa_key;
pub mod service_account;
pub mod services;
pub mod versioning;

#[cfg(test)]
pub mod testing;

pub use billing::BillingLink;
pub use bucket::StateBucket;
pub use iam_binding::IamBinding;
pub use project::Project;
pub use project_context::ProjectContext;
pub use sa_key::ServiceAccountKey;
pub use service_account::ServiceAccount;
pub use services::Services;
pub use versioning::BucketVersioning;

pub use declarative::{ApplyContext, ApplyResult, Resource, ResourceState, Severity};

/// Control-plane backend shared by every resource in a plan
#[derive(Clone)]
pub struct SharedBackend(Arc<dyn Backend>);

impl SharedBackend {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self(Arc::new(backend))
    }

    pub fn from_arc(backend: Arc<dyn Backend>) -> Self {
        Self(backend)
    }
}

impl Deref for SharedBackend {
    type Target = dyn Backend;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for SharedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Backend")
    }
}

/// Map a create call to an apply result, treating "already exists" as success
///
/// The check before the call can race with another writer, or miss a
/// resource the caller cannot see yet.
pub(crate) fn tolerate_conflict(result: gcloudkit::Result<()>, what: &str) -> Result<ApplyResult> {
    match result {
        Ok(()) => Ok(ApplyResult::Created),
        Err(e) if e.is_conflict() => {
            log::warn!("Creation of {what} reported that it already exists. Continuing");
            Ok(ApplyResult::NoChange)
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn dry_run() -> ApplyResult {
    ApplyResult::Skipped {
        reason: "Dry run".to_string(),
    }
}

pub(crate) fn presence(present: bool) -> ResourceState {
    if present {
        ResourceState::Present { details: None }
    } else {
        ResourceState::Absent
    }
}
