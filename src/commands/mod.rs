pub mod apply;
pub mod status;
pub mod validate;

use anyhow::{Context as AnyhowContext, Result};
use gcloudkit::{Backend, Error as GcloudError};

use crate::cli::ConfigArgs;
use crate::config::BootstrapConfig;
use crate::resource::SharedBackend;
use crate::ui;

/// Load and validate the config named on the command line
pub fn load_config(args: &ConfigArgs) -> Result<BootstrapConfig> {
    BootstrapConfig::load(&args.config).context("Failed to load configuration")
}

/// Check that gcloud is installed and has an active account
///
/// Returns the account gcloud is authenticated as.
pub fn preflight(backend: &dyn Backend) -> Result<String> {
    log::info!("Checking gcloud installation and authentication");
    let account = backend
        .active_account()
        .context("Failed to check gcloud authentication status")?
        .ok_or(GcloudError::NotAuthenticated)?;
    log::info!("gcloud authenticated as: {account}");
    Ok(account)
}

/// Locate gcloud, run the preflight checks, and share the backend
pub fn connect(quiet: bool) -> Result<SharedBackend> {
    let gcloud = gcloudkit::default_backend()?;
    let account = preflight(&gcloud)?;
    if !quiet {
        ui::kv("gcloud account", &account);
    }
    Ok(SharedBackend::new(gcloud))
}
