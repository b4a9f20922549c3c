//! Confirmation gate shown before any mutating call

use anyhow::{Context as AnyhowContext, Result};
use declarative::ConfirmCallback;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::config::BootstrapConfig;
use crate::ui;

pub const PROMPT: &str = "Proceed with bootstrapping using these settings? (yes/no)";

/// Print every setting that will drive the bootstrap
///
/// Optional settings are only shown when set.
pub fn print_summary(config: &BootstrapConfig) {
    ui::header("GCP Bootstrap Configuration Summary");
    ui::kv("Project ID", &config.project_id);
    ui::kv("Project Name", &config.project_name);
    ui::kv("Project Region", &config.project_region);
    ui::kv("Billing Account ID", &config.billing_account_id);
    if let Some(org) = &config.organization_id {
        ui::kv("Organization ID", org);
    }
    ui::kv(
        "TF State Bucket",
        &gcloudkit::bucket_url(&config.tf_state_bucket_name),
    );
    ui::kv("TF Service Account Name", &config.tf_service_account_name);
    ui::kv("TF Service Account Email", &config.tf_service_account_email);
    ui::kv("Generate TF SA Key", ui::yes_no(config.generate_tf_sa_key));
    if let Some(path) = config.key_path() {
        ui::kv("TF SA Key Path", &path.display().to_string());
    }
    ui::kv("APIs to Enable", &ui::format_list(&config.enable_apis));
    ui::kv(
        "TF SA Project Roles",
        &ui::format_list(&config.tf_service_account_project_roles),
    );
    if let Some(role) = &config.tf_service_account_billing_role {
        ui::kv("TF SA Billing Role", role);
    }
    println!();
}

/// Only an exact "yes" (any case, surrounding whitespace ignored) proceeds
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Reads the answer from the terminal
///
/// When stdin is not a terminal the answer is read as a plain line, so an
/// empty pipe (EOF) counts as a refusal.
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = if io::stdin().is_terminal() {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .context("Failed to read confirmation")?
        } else {
            print!("{prompt}: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read confirmation")?;
            line
        };
        Ok(is_affirmative(&answer))
    }
}

/// Show the summary and ask the operator to proceed
pub fn confirm_execution<C>(config: &BootstrapConfig, confirm: &mut C) -> Result<bool>
where
    C: ConfirmCallback + ?Sized,
{
    print_summary(config);
    let proceed = confirm.confirm(PROMPT)?;
    if proceed {
        log::info!("User confirmed. Starting bootstrap process");
    } else {
        log::info!("Aborted by user");
    }
    Ok(proceed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::valid_config;

    struct Answer(&'static str);

    impl ConfirmCallback for Answer {
        fn confirm(&mut self, prompt: &str) -> Result<bool> {
            assert_eq!(prompt, PROMPT);
            Ok(is_affirmative(self.0))
        }
    }

    #[test]
    fn test_only_yes_is_affirmative() {
        for answer in ["yes", "YES", "Yes", "  yes\n", "yEs"] {
            assert!(is_affirmative(answer), "{answer:?}");
        }
        for answer in ["", "y", "no", "yes please", "ye s", "oui", "\n"] {
            assert!(!is_affirmative(answer), "{answer:?}");
        }
    }

    #[test]
    fn test_confirm_execution_uses_answer() {
        let config = valid_config();
        assert!(confirm_execution(&config, &mut Answer("yes")).unwrap());
        assert!(!confirm_execution(&config, &mut Answer("y")).unwrap());
    }
}
