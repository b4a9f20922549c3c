//! Execution planner - the fixed bootstrap order

use declarative::ExecutionPlan;
use std::time::Duration;

use crate::config::BootstrapConfig;
use crate::resource::{
    BillingLink, BucketVersioning, IamBinding, Project, ProjectContext, ServiceAccount,
    ServiceAccountKey, Services, SharedBackend, StateBucket,
};

/// Build the bootstrap plan
///
/// Order matters: APIs come before the service account, the account before
/// its role grants, and the bucket before its versioning. The billing role
/// and key export steps are only planned when configured.
pub fn build_plan(config: &BootstrapConfig, backend: &SharedBackend) -> ExecutionPlan {
    let project_id = config.project_id.as_str();
    let email = config.tf_service_account_email.as_str();
    let mut plan = ExecutionPlan::new();

    plan.add_resource(Box::new(ProjectContext::new(backend.clone(), project_id)));
    plan.add_resource(Box::new(Project::new(backend.clone(), config.project())));
    plan.add_resource(Box::new(BillingLink::new(
        backend.clone(),
        project_id,
        &config.billing_account_id,
    )));
    plan.add_resource(Box::new(Services::new(
        backend.clone(),
        project_id,
        &config.enable_apis,
        Duration::from_secs(config.api_propagation_delay_secs),
    )));
    plan.add_resource(Box::new(ServiceAccount::new(
        backend.clone(),
        project_id,
        config.service_account(),
    )));

    for role in &config.tf_service_account_project_roles {
        plan.add_resource(Box::new(IamBinding::new(
            backend.clone(),
            config.project_scope(),
            email,
            role,
        )));
    }
    if let Some(role) = &config.tf_service_account_billing_role {
        plan.add_resource(Box::new(IamBinding::new(
            backend.clone(),
            config.billing_scope(),
            email,
            role,
        )));
    }

    plan.add_resource(Box::new(StateBucket::new(
        backend.clone(),
        project_id,
        config.state_bucket(),
    )));
    plan.add_resource(Box::new(BucketVersioning::new(
        backend.clone(),
        project_id,
        &config.tf_state_bucket_name,
    )));

    if let Some(path) = config.key_path() {
        plan.add_resource(Box::new(ServiceAccountKey::new(
            backend.clone(),
            project_id,
            email,
            path,
        )));
    }

    plan
}
