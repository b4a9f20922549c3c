//! Core types for gcloud provisioning.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain suffix of user-managed service accounts.
pub const SERVICE_ACCOUNT_DOMAIN: &str = "iam.gserviceaccount.com";

/// Build the email of a user-managed service account.
pub fn service_account_email(name: &str, project_id: &str) -> String {
    format!("{name}@{project_id}.{SERVICE_ACCOUNT_DOMAIN}")
}

/// A project to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    /// Globally unique project ID
    pub project_id: String,
    /// Display name
    pub name: String,
    /// Parent organization, if any
    pub organization_id: Option<String>,
}

/// A service account to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountSpec {
    /// Account ID (the part before `@`)
    pub name: String,
    /// Display name shown in the console
    pub display_name: String,
}

impl ServiceAccountSpec {
    /// Email of this account inside `project_id`.
    pub fn email(&self, project_id: &str) -> String {
        service_account_email(&self.name, project_id)
    }
}

/// A Cloud Storage bucket to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSpec {
    /// Bucket name without the `gs://` scheme
    pub name: String,
    /// Location (region) of the bucket
    pub location: String,
    /// Enforce uniform bucket-level access
    pub uniform_access: bool,
}

/// Format a bucket name as a `gs://` URL.
pub fn bucket_url(name: &str) -> String {
    format!("gs://{name}")
}

/// The resource an IAM policy is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IamScope {
    /// A project, by ID
    Project(String),
    /// A billing account, by ID
    BillingAccount(String),
}

impl IamScope {
    /// Short label used in messages ("project", "billing account").
    pub fn kind(&self) -> &'static str {
        match self {
            IamScope::Project(_) => "project",
            IamScope::BillingAccount(_) => "billing account",
        }
    }

    /// The scoped resource ID.
    pub fn id(&self) -> &str {
        match self {
            IamScope::Project(id) | IamScope::BillingAccount(id) => id,
        }
    }
}

impl fmt::Display for IamScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// IAM member string for a service account (`serviceAccount:EMAIL`).
pub fn service_account_member(email: &str) -> String {
    format!("serviceAccount:{email}")
}

/// An IAM policy as printed by `get-iam-policy --format=json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamPolicy {
    /// Role bindings
    #[serde(default)]
    pub bindings: Vec<IamBinding>,
    /// Concurrency tag
    #[serde(default)]
    pub etag: Option<String>,
    /// Policy schema version
    #[serde(default)]
    pub version: Option<u32>,
}

/// A single role binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamBinding {
    /// Role name, e.g. `roles/editor`
    pub role: String,
    /// Members holding the role
    #[serde(default)]
    pub members: Vec<String>,
    /// Optional IAM condition
    #[serde(default)]
    pub condition: Option<serde_json::Value>,
}

impl IamPolicy {
    /// Parse the JSON output of `get-iam-policy`.
    ///
    /// gcloud prints nothing at all for an empty policy.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Whether `member` holds `role` unconditionally.
    pub fn has_binding(&self, role: &str, member: &str) -> bool {
        self.bindings
            .iter()
            .filter(|b| b.role == role && b.condition.is_none())
            .any(|b| b.members.iter().any(|m| m == member))
    }
}

/// Extract the billing account ID from `billingAccountName`
/// (`billingAccounts/0X0X0X-XXXXXX-XXXXXX`).
pub fn parse_billing_account_name(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let id = value.rsplit('/').next().unwrap_or(value);
    (!id.is_empty()).then(|| id.to_string())
}
