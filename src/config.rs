//! Bootstrap configuration (`config.yaml`)
//!
//! The document is read once, validated, and never modified afterwards.
//! Validation stops at the first failing field, in document order.

use gcloudkit::{BucketSpec, IamScope, ProjectSpec, ServiceAccountSpec, service_account_email};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Seconds to wait after submitting API enablement
pub const DEFAULT_PROPAGATION_DELAY_SECS: u64 = 5;

/// Display name given to the Terraform service account
pub const SERVICE_ACCOUNT_DISPLAY_NAME: &str = "Terraform Admin Service Account";

const PLACEHOLDER_BILLING_ACCOUNT: &str = "0X0X0X-XXXXXX-XXXXXX";
const PLACEHOLDER_PROJECT_ID: &str = "your-unique-project-id";
const PLACEHOLDER_BUCKET: &str = "your-unique-tfstate-bucket-name-xyz";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "configuration file not found at {}. Copy config.yaml.example to config.yaml and fill it out",
        .path.display()
    )]
    NotFound { path: PathBuf },

    #[error("error reading config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{field} {reason} in {}", .path.display())]
    Validation {
        field: &'static str,
        reason: &'static str,
        path: PathBuf,
    },
}

impl ConfigError {
    /// Name of the offending field, for validation failures
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Desired state of the Terraform bootstrap project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub billing_account_id: String,
    pub organization_id: Option<String>,

    pub project_id: String,
    pub project_name: String,
    pub project_region: String,

    pub tf_state_bucket_name: String,

    pub tf_service_account_name: String,

    pub generate_tf_sa_key: bool,
    pub tf_sa_key_path: Option<String>,

    pub enable_apis: Vec<String>,

    pub tf_service_account_project_roles: Vec<String>,
    pub tf_service_account_billing_role: Option<String>,

    pub api_propagation_delay_secs: u64,

    /// `{name}@{project_id}.iam.gserviceaccount.com`, derived on load
    #[serde(skip)]
    pub tf_service_account_email: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            billing_account_id: String::new(),
            organization_id: None,
            project_id: String::new(),
            project_name: String::new(),
            project_region: String::new(),
            tf_state_bucket_name: String::new(),
            tf_service_account_name: String::new(),
            generate_tf_sa_key: false,
            tf_sa_key_path: None,
            enable_apis: Vec::new(),
            tf_service_account_project_roles: Vec::new(),
            tf_service_account_billing_role: None,
            api_propagation_delay_secs: DEFAULT_PROPAGATION_DELAY_SECS,
            tf_service_account_email: String::new(),
        }
    }
}

impl BootstrapConfig {
    /// Load and validate a config file
    ///
    /// Relative paths are resolved against the working directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = resolve_path(path);
        log::info!("Reading configuration from {}", path.display());

        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let config = Self::parse(&content, &path)?;
        log::info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate a YAML document; `path` is only used in errors
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.normalize();
        config.validate(path)?;

        for warning in config.warnings() {
            log::warn!("{warning}");
        }

        config.tf_service_account_email =
            service_account_email(&config.tf_service_account_name, &config.project_id);
        Ok(config)
    }

    /// Trim values and fold blank optional fields into `None`
    fn normalize(&mut self) {
        fn blank_to_none(value: &mut Option<String>) {
            *value = value
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }

        for value in [
            &mut self.billing_account_id,
            &mut self.project_id,
            &mut self.project_name,
            &mut self.project_region,
            &mut self.tf_state_bucket_name,
            &mut self.tf_service_account_name,
        ] {
            *value = value.trim().to_string();
        }

        blank_to_none(&mut self.organization_id);
        blank_to_none(&mut self.tf_sa_key_path);
        blank_to_none(&mut self.tf_service_account_billing_role);

        self.enable_apis.retain(|api| !api.trim().is_empty());
        self.tf_service_account_project_roles
            .retain(|role| !role.trim().is_empty());
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field, reason| ConfigError::Validation {
            field,
            reason,
            path: path.to_path_buf(),
        };
        let required = |field, value: &str, placeholder: Option<&str>| {
            if value.is_empty() {
                return Err(invalid(field, "is not set"));
            }
            if placeholder == Some(value) {
                return Err(invalid(field, "is still the placeholder value"));
            }
            Ok(())
        };

        required(
            "billing_account_id",
            &self.billing_account_id,
            Some(PLACEHOLDER_BILLING_ACCOUNT),
        )?;
        required("project_id", &self.project_id, Some(PLACEHOLDER_PROJECT_ID))?;
        required("project_name", &self.project_name, None)?;
        required("project_region", &self.project_region, None)?;
        required(
            "tf_state_bucket_name",
            &self.tf_state_bucket_name,
            Some(PLACEHOLDER_BUCKET),
        )?;
        required("tf_service_account_name", &self.tf_service_account_name, None)?;

        if self.generate_tf_sa_key && self.tf_sa_key_path.is_none() {
            return Err(invalid(
                "tf_sa_key_path",
                "must be set when generate_tf_sa_key is true",
            ));
        }

        if self.tf_service_account_project_roles.is_empty() {
            return Err(invalid("tf_service_account_project_roles", "is empty"));
        }

        Ok(())
    }

    /// Non-fatal problems worth telling the operator about
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.enable_apis.is_empty() {
            warnings.push(
                "No APIs listed under 'enable_apis' in config. Ensure essential APIs are enabled.",
            );
        }
        if self.tf_service_account_billing_role.is_none() {
            warnings.push(
                "tf_service_account_billing_role is not set in config. Terraform SA won't be able to link other projects to billing.",
            );
        }
        warnings
    }

    pub fn project(&self) -> ProjectSpec {
        ProjectSpec {
            project_id: self.project_id.clone(),
            name: self.project_name.clone(),
            organization_id: self.organization_id.clone(),
        }
    }

    pub fn service_account(&self) -> ServiceAccountSpec {
        ServiceAccountSpec {
            name: self.tf_service_account_name.clone(),
            display_name: SERVICE_ACCOUNT_DISPLAY_NAME.to_string(),
        }
    }

    pub fn state_bucket(&self) -> BucketSpec {
        BucketSpec {
            name: self.tf_state_bucket_name.clone(),
            location: self.project_region.clone(),
            uniform_access: true,
        }
    }

    pub fn project_scope(&self) -> IamScope {
        IamScope::Project(self.project_id.clone())
    }

    pub fn billing_scope(&self) -> IamScope {
        IamScope::BillingAccount(self.billing_account_id.clone())
    }

    /// Key file location with `~` expanded, when key export is enabled
    pub fn key_path(&self) -> Option<PathBuf> {
        if !self.generate_tf_sa_key {
            return None;
        }
        self.tf_sa_key_path
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }
}

/// Resolve a possibly relative path against the working directory
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
