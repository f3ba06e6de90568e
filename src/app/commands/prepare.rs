use crate::app::AppContext;
use crate::domain::{AppError, ToolOutcome};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

/// `terraform init`, then create the IAM resources `build-ami` depends on.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>, name: &str) -> Result<ToolOutcome, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    let mut deployment = ctx.load_deployment(name)?;
    deployment.persist_generated()?;
    deployment.prepare()
}
