use std::path::Path;

use dialoguer::Confirm;

use crate::app::api;
use crate::domain::AppError;

pub fn run_destroy(
    root: &Path,
    name: &str,
    targets: &[String],
    remove_directory: bool,
    yes: bool,
) -> Result<(), AppError> {
    if remove_directory && !yes {
        if !api::deployment_exists_at(root, name)? {
            return Err(AppError::DeploymentNotFound(name.to_string()));
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Destroy all resources of '{}' and delete deployments/{}/ afterwards?",
                name, name
            ))
            .default(false)
            .interact()
            .map_err(|err| AppError::Prompt(format!("Failed to confirm: {}", err)))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let result = api::destroy_at(root, name, targets, remove_directory)?;
    result.outcome.into_result("terraform")?;
    println!("✅ Destroyed resources of '{}'", name);
    if result.removed_directory {
        println!("✅ Removed deployments/{}/", name);
    }
    Ok(())
}
