use crate::app::AppContext;
use crate::domain::{AppError, ToolOutcome};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

/// `terraform init` in the deployment's terraform directory.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>, name: &str) -> Result<ToolOutcome, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    Ok(ctx.load_deployment(name)?.init())
}
