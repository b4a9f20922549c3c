//! Real control-plane backend using `gcloud` commands.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::exec::{run_captured, run_streaming};
use crate::types::{
    BucketSpec, IamPolicy, IamScope, ProjectSpec, ServiceAccountSpec, bucket_url,
    parse_billing_account_name,
};
use std::path::Path;
use std::process::Command;

/// Backend that executes real `gcloud` commands.
pub struct GcloudBackend {
    /// Path to the gcloud executable
    gcloud_path: String,
}

impl GcloudBackend {
    /// Create a new GcloudBackend.
    ///
    /// Returns an error if gcloud is not installed.
    pub fn new() -> Result<Self> {
        let gcloud_path = find_gcloud()?;
        Ok(Self { gcloud_path })
    }

    /// Create a backend for a specific gcloud executable.
    pub fn with_path(gcloud_path: impl Into<String>) -> Self {
        Self {
            gcloud_path: gcloud_path.into(),
        }
    }

    /// Path of the gcloud executable in use.
    pub fn path(&self) -> &str {
        &self.gcloud_path
    }

    fn query(&self, args: &[&str], subject: Option<&str>) -> Result<String> {
        run_captured(&self.gcloud_path, args, subject)
    }

    fn mutate(&self, args: &[&str], subject: Option<&str>) -> Result<()> {
        run_streaming(&self.gcloud_path, args, subject)
    }
}

impl Backend for GcloudBackend {
    fn active_account(&self) -> Result<Option<String>> {
        let output = self.query(
            &[
                "auth",
                "list",
                "--filter=status:ACTIVE",
                "--format=value(account)",
            ],
            None,
        )?;
        Ok(output
            .lines()
            .map(str::trim)
            .find(|a| !a.is_empty())
            .map(String::from))
    }

    fn active_project(&self) -> Result<Option<String>> {
        let output = self.query(&["config", "get-value", "project"], None)?;
        let project = output.trim();
        if project.is_empty() || project == "(unset)" {
            return Ok(None);
        }
        Ok(Some(project.to_string()))
    }

    fn set_active_project(&self, project_id: &str) -> Result<()> {
        self.mutate(&["config", "set", "project", project_id], Some(project_id))
    }

    fn project_exists(&self, project_id: &str) -> Result<bool> {
        let filter = format!("project_id={project_id}");
        let output = self.query(
            &[
                "projects",
                "list",
                "--filter",
                &filter,
                "--format=value(project_id)",
                "--quiet",
            ],
            Some(project_id),
        )?;
        Ok(output.lines().any(|l| l.trim() == project_id))
    }

    fn create_project(&self, project: &ProjectSpec) -> Result<()> {
        let mut args = vec![
            "projects",
            "create",
            project.project_id.as_str(),
            "--name",
            project.name.as_str(),
        ];
        if let Some(org) = project.organization_id.as_deref() {
            args.extend(["--organization", org]);
        }
        self.mutate(&args, Some(project.project_id.as_str()))
    }

    fn billing_account(&self, project_id: &str) -> Result<Option<String>> {
        let result = self.query(
            &[
                "beta",
                "billing",
                "projects",
                "describe",
                project_id,
                "--format=value(billingAccountName)",
            ],
            Some(project_id),
        );

        match result {
            Ok(output) => Ok(parse_billing_account_name(&output)),
            Err(Error::CommandFailed { stderr, .. })
                if stderr.contains("must be associated with a billing account") =>
            {
                Ok(None)
            }
            // A freshly created project can take a moment to become describable
            Err(e @ (Error::NotFound { .. } | Error::Permission { .. })) => {
                log::warn!("Could not describe project billing yet: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn link_billing(&self, project_id: &str, billing_account_id: &str) -> Result<()> {
        self.mutate(
            &[
                "beta",
                "billing",
                "projects",
                "link",
                project_id,
                "--billing-account",
                billing_account_id,
            ],
            Some(project_id),
        )
    }

    fn enabled_services(&self, project_id: &str) -> Result<Vec<String>> {
        let output = self.query(
            &[
                "services",
                "list",
                "--enabled",
                "--project",
                project_id,
                "--format=value(config.name)",
            ],
            Some(project_id),
        )?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn enable_services(&self, project_id: &str, services: &[String]) -> Result<()> {
        let mut args = vec!["services", "enable"];
        args.extend(services.iter().map(String::as_str));
        args.extend(["--project", project_id, "--async"]);
        self.mutate(&args, Some(project_id))
    }

    fn service_account_exists(&self, project_id: &str, email: &str) -> Result<bool> {
        let result = self.query(
            &[
                "iam",
                "service-accounts",
                "describe",
                email,
                "--project",
                project_id,
                "--format=value(email)",
            ],
            Some(email),
        );
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_service_account(
        &self,
        project_id: &str,
        account: &ServiceAccountSpec,
    ) -> Result<()> {
        self.mutate(
            &[
                "iam",
                "service-accounts",
                "create",
                account.name.as_str(),
                "--display-name",
                account.display_name.as_str(),
                "--project",
                project_id,
            ],
            Some(account.name.as_str()),
        )
    }

    fn iam_policy(&self, scope: &IamScope) -> Result<IamPolicy> {
        let id = scope.id();
        let output = match scope {
            IamScope::Project(_) => {
                self.query(&["projects", "get-iam-policy", id, "--format=json"], Some(id))?
            }
            IamScope::BillingAccount(_) => self.query(
                &[
                    "beta",
                    "billing",
                    "accounts",
                    "get-iam-policy",
                    id,
                    "--format=json",
                ],
                Some(id),
            )?,
        };
        IamPolicy::from_json(&output)
    }

    fn add_iam_binding(&self, scope: &IamScope, member: &str, role: &str) -> Result<()> {
        let id = scope.id();
        match scope {
            IamScope::Project(_) => self.mutate(
                &[
                    "projects",
                    "add-iam-policy-binding",
                    id,
                    "--member",
                    member,
                    "--role",
                    role,
                    "--condition=None",
                ],
                Some(role),
            ),
            IamScope::BillingAccount(_) => self.mutate(
                &[
                    "beta",
                    "billing",
                    "accounts",
                    "add-iam-policy-binding",
                    id,
                    "--member",
                    member,
                    "--role",
                    role,
                ],
                Some(role),
            ),
        }
    }

    fn bucket_exists(&self, project_id: &str, bucket: &str) -> Result<bool> {
        let url = bucket_url(bucket);
        let result = self.query(
            &["storage", "buckets", "describe", &url, "--project", project_id],
            Some(url.as_str()),
        );
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_bucket(&self, project_id: &str, bucket: &BucketSpec) -> Result<()> {
        let url = bucket_url(&bucket.name);
        let mut args = vec![
            "storage",
            "buckets",
            "create",
            url.as_str(),
            "--project",
            project_id,
            "--location",
            bucket.location.as_str(),
        ];
        if bucket.uniform_access {
            args.push("--uniform-bucket-level-access");
        }
        self.mutate(&args, Some(url.as_str()))
    }

    fn versioning_enabled(&self, project_id: &str, bucket: &str) -> Result<bool> {
        let url = bucket_url(bucket);
        let output = self.query(
            &[
                "storage",
                "buckets",
                "describe",
                &url,
                "--format=value(versioning.enabled)",
                "--project",
                project_id,
            ],
            Some(url.as_str()),
        )?;
        Ok(output.trim().eq_ignore_ascii_case("true"))
    }

    fn enable_versioning(&self, project_id: &str, bucket: &str) -> Result<()> {
        let url = bucket_url(bucket);
        self.mutate(
            &[
                "storage",
                "buckets",
                "update",
                &url,
                "--versioning",
                "--project",
                project_id,
            ],
            Some(url.as_str()),
        )
    }

    fn create_service_account_key(
        &self,
        project_id: &str,
        email: &str,
        path: &Path,
    ) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| Error::LocalPath {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let path_str = path.to_str().ok_or_else(|| {
            Error::Other(format!("key path is not valid UTF-8: {}", path.display()))
        })?;

        self.mutate(
            &[
                "iam",
                "service-accounts",
                "keys",
                "create",
                path_str,
                "--iam-account",
                email,
                "--project",
                project_id,
            ],
            Some(email),
        )
    }
}

/// Find the gcloud executable path.
fn find_gcloud() -> Result<String> {
    let output = Command::new("which")
        .arg("gcloud")
        .output()
        .map_err(|_| Error::GcloudNotFound)?;

    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !path.is_empty() {
            return Ok(path);
        }
    }

    // Default install location of the SDK's interactive installer
    if let Some(home) = std::env::var_os("HOME") {
        let candidate = Path::new(&home).join("google-cloud-sdk/bin/gcloud");
        if candidate.exists() {
            return Ok(candidate.to_string_lossy().into_owned());
        }
    }

    Err(Error::GcloudNotFound)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Write a fake gcloud script that prints `stdout`, writes `stderr`, and exits with `code`.
    fn fake_gcloud(dir: &TempDir, stdout: &str, stderr: &str, code: i32) -> GcloudBackend {
        let path = dir.path().join("gcloud");
        let script = format!(
            "#!/bin/sh\nprintf '%s' '{stdout}'\nprintf '%s' '{stderr}' >&2\nexit {code}\n"
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        GcloudBackend::with_path(path.to_string_lossy().into_owned())
    }

    #[test]
    fn test_active_account() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "ops@example.com\n", "", 0);
        assert_eq!(
            backend.active_account().unwrap(),
            Some("ops@example.com".to_string())
        );

        let backend = fake_gcloud(&dir, "", "", 0);
        assert_eq!(backend.active_account().unwrap(), None);
    }

    #[test]
    fn test_active_project_unset() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "(unset)", "", 0);
        assert_eq!(backend.active_project().unwrap(), None);
    }

    #[test]
    fn test_project_exists_matches_exact_id() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "acme-infra\n", "", 0);
        assert!(backend.project_exists("acme-infra").unwrap());
        assert!(!backend.project_exists("acme").unwrap());
    }

    #[test]
    fn test_billing_not_associated_is_unlinked() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(
            &dir,
            "",
            "ERROR: The project must be associated with a billing account",
            1,
        );
        assert_eq!(backend.billing_account("p1").unwrap(), None);
    }

    #[test]
    fn test_billing_account_parsed() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "billingAccounts/01AB-23CD-45EF", "", 0);
        assert_eq!(
            backend.billing_account("p1").unwrap(),
            Some("01AB-23CD-45EF".to_string())
        );
    }

    #[test]
    fn test_bucket_missing_vs_error() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "", "ERROR: gs://b not found: 404.", 1);
        assert!(!backend.bucket_exists("p1", "b").unwrap());

        let backend = fake_gcloud(&dir, "", "ERROR: PERMISSION_DENIED: nope", 1);
        assert!(backend.bucket_exists("p1", "b").is_err());
    }

    #[test]
    fn test_versioning_enabled_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "True\n", "", 0);
        assert!(backend.versioning_enabled("p1", "b").unwrap());

        let backend = fake_gcloud(&dir, "", "", 0);
        assert!(!backend.versioning_enabled("p1", "b").unwrap());
    }

    #[test]
    fn test_create_conflict_is_classified() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "", "ERROR: HTTPError 409: you already own it.", 1);
        let bucket = BucketSpec {
            name: "b".into(),
            location: "us-central1".into(),
            uniform_access: true,
        };
        assert!(backend.create_bucket("p1", &bucket).unwrap_err().is_conflict());
    }

    #[test]
    fn test_key_creation_makes_parent_dir() {
        let dir = TempDir::new().unwrap();
        let backend = fake_gcloud(&dir, "", "", 0);
        let key = dir.path().join("keys/nested/sa.json");
        backend
            .create_service_account_key("p1", "tf@p1.iam.gserviceaccount.com", &key)
            .unwrap();
        assert!(key.parent().unwrap().is_dir());
    }
}
