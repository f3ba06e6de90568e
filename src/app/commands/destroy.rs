use tracing::info;

use crate::app::AppContext;
use crate::domain::{AppError, DeploymentName, ToolOutcome};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

#[derive(Debug)]
pub struct DestroyOutcome {
    pub outcome: ToolOutcome,
    pub removed_directory: bool,
}

/// `terraform destroy`. With `remove_directory` the deployment directory is
/// deleted afterwards, only if the destroy succeeded.
pub fn execute<S, T, R>(
    ctx: &AppContext<S, T, R>,
    name: &str,
    targets: &[String],
    remove_directory: bool,
) -> Result<DestroyOutcome, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    let mut deployment = ctx.load_deployment(name)?;
    let outcome = deployment.destroy(targets)?;

    let removed_directory = remove_directory && outcome.is_success();
    if removed_directory {
        let name = DeploymentName::new(name)?;
        ctx.store().remove(&name)?;
        info!(deployment = %name, "Removed deployment directory");
    }
    Ok(DestroyOutcome { outcome, removed_directory })
}
