//! In-memory control plane for tests
//!
//! Records every mutating call so tests can assert on exactly what a plan
//! changed. Failures and creation conflicts can be injected per operation.

use gcloudkit::{
    Backend, BucketSpec, Error, ErrorCategory, IamBinding, IamPolicy, IamScope, ProjectSpec,
    Result, ServiceAccountSpec,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::SharedBackend;

#[derive(Debug, Default)]
pub struct FakeState {
    pub account: Option<String>,
    pub active_project: Option<String>,
    pub projects: HashSet<String>,
    pub billing: HashMap<String, String>,
    pub services: HashMap<String, Vec<String>>,
    pub service_accounts: HashSet<String>,
    pub policies: HashMap<IamScope, IamPolicy>,
    pub buckets: HashSet<String>,
    pub versioned: HashSet<String>,
    /// Mutating calls, in order, as "operation target"
    pub mutations: Vec<String>,
    failures: HashMap<&'static str, ErrorCategory>,
    conflicts: HashSet<&'static str>,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let fake = Self::default();
        fake.state().account = Some("admin@example.com".to_string());
        Arc::new(fake)
    }

    pub fn shared(self: &Arc<Self>) -> SharedBackend {
        SharedBackend::from_arc(Arc::clone(self) as Arc<dyn Backend>)
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Make every call to `op` fail with an error of `category`
    pub fn fail(&self, op: &'static str, category: ErrorCategory) {
        self.state().failures.insert(op, category);
    }

    /// Make the create call `op` succeed remotely but report "already exists"
    pub fn conflict(&self, op: &'static str) {
        self.state().conflicts.insert(op);
    }

    pub fn mutations(&self) -> Vec<String> {
        self.state().mutations.clone()
    }

    fn check(&self, op: &'static str) -> Result<()> {
        let Some(category) = self.state().failures.get(op).copied() else {
            return Ok(());
        };
        Err(match category {
            ErrorCategory::NotFound => Error::NotFound {
                subject: op.to_string(),
            },
            ErrorCategory::AlreadyExists => Error::AlreadyExists {
                subject: op.to_string(),
            },
            ErrorCategory::Permission => Error::Permission {
                message: format!("PERMISSION_DENIED: {op}"),
            },
            ErrorCategory::Network => Error::Network {
                message: format!("UNAVAILABLE: {op}"),
            },
            ErrorCategory::GcloudNotFound => Error::GcloudNotFound,
            ErrorCategory::Other => Error::CommandFailed {
                command: format!("gcloud {op}"),
                stderr: "boom".to_string(),
            },
        })
    }

    /// Record a mutation, then apply `change` unless the call fails
    fn mutate(
        &self,
        op: &'static str,
        target: &str,
        change: impl FnOnce(&mut FakeState),
    ) -> Result<()> {
        self.state().mutations.push(format!("{op} {target}"));
        self.check(op)?;

        let mut state = self.state();
        change(&mut state);
        if state.conflicts.contains(op) {
            return Err(Error::AlreadyExists {
                subject: target.to_string(),
            });
        }
        Ok(())
    }
}

impl Backend for FakeBackend {
    fn active_account(&self) -> Result<Option<String>> {
        self.check("active_account")?;
        Ok(self.state().account.clone())
    }

    fn active_project(&self) -> Result<Option<String>> {
        self.check("active_project")?;
        Ok(self.state().active_project.clone())
    }

    fn set_active_project(&self, project_id: &str) -> Result<()> {
        self.mutate("set_active_project", project_id, |s| {
            s.active_project = Some(project_id.to_string());
        })
    }

    fn project_exists(&self, project_id: &str) -> Result<bool> {
        self.check("project_exists")?;
        Ok(self.state().projects.contains(project_id))
    }

    fn create_project(&self, project: &ProjectSpec) -> Result<()> {
        self.mutate("create_project", &project.project_id, |s| {
            s.projects.insert(project.project_id.clone());
        })
    }

    fn billing_account(&self, project_id: &str) -> Result<Option<String>> {
        self.check("billing_account")?;
        Ok(self.state().billing.get(project_id).cloned())
    }

    fn link_billing(&self, project_id: &str, billing_account_id: &str) -> Result<()> {
        self.mutate("link_billing", project_id, |s| {
            s.billing
                .insert(project_id.to_string(), billing_account_id.to_string());
        })
    }

    fn enabled_services(&self, project_id: &str) -> Result<Vec<String>> {
        self.check("enabled_services")?;
        Ok(self
            .state()
            .services
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    fn enable_services(&self, project_id: &str, services: &[String]) -> Result<()> {
        self.mutate("enable_services", &services.join(","), |s| {
            let enabled = s.services.entry(project_id.to_string()).or_default();
            for service in services {
                if !enabled.contains(service) {
                    enabled.push(service.clone());
                }
            }
        })
    }

    fn service_account_exists(&self, _project_id: &str, email: &str) -> Result<bool> {
        self.check("service_account_exists")?;
        Ok(self.state().service_accounts.contains(email))
    }

    fn create_service_account(&self, project_id: &str, account: &ServiceAccountSpec) -> Result<()> {
        let email = account.email(project_id);
        self.mutate("create_service_account", &email, |s| {
            s.service_accounts.insert(email.clone());
        })
    }

    fn iam_policy(&self, scope: &IamScope) -> Result<IamPolicy> {
        self.check("iam_policy")?;
        Ok(self.state().policies.get(scope).cloned().unwrap_or_default())
    }

    fn add_iam_binding(&self, scope: &IamScope, member: &str, role: &str) -> Result<()> {
        self.mutate("add_iam_binding", &format!("{}:{role}", scope.id()), |s| {
            let policy = s.policies.entry(scope.clone()).or_default();
            match policy
                .bindings
                .iter_mut()
                .find(|b| b.role == role && b.condition.is_none())
            {
                Some(binding) => binding.members.push(member.to_string()),
                None => policy.bindings.push(IamBinding {
                    role: role.to_string(),
                    members: vec![member.to_string()],
                    condition: None,
                }),
            }
        })
    }

    fn bucket_exists(&self, _project_id: &str, bucket: &str) -> Result<bool> {
        self.check("bucket_exists")?;
        Ok(self.state().buckets.contains(bucket))
    }

    fn create_bucket(&self, _project_id: &str, bucket: &BucketSpec) -> Result<()> {
        self.mutate("create_bucket", &bucket.name, |s| {
            s.buckets.insert(bucket.name.clone());
        })
    }

    fn versioning_enabled(&self, _project_id: &str, bucket: &str) -> Result<bool> {
        self.check("versioning_enabled")?;
        Ok(self.state().versioned.contains(bucket))
    }

    fn enable_versioning(&self, _project_id: &str, bucket: &str) -> Result<()> {
        self.mutate("enable_versioning", bucket, |s| {
            s.versioned.insert(bucket.to_string());
        })
    }

    fn create_service_account_key(&self, _project_id: &str, email: &str, path: &Path) -> Result<()> {
        self.mutate("create_service_account_key", email, |_| {})?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, format!("{{\"client_email\": \"{email}\"}}"))?;
        Ok(())
    }
}
