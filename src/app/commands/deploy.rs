use crate::app::AppContext;
use crate::domain::{AppError, ToolOutcome};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

/// `terraform apply`. A fresh saved plan is applied as-is when no targets are given.
pub fn execute<S, T, R>(
    ctx: &AppContext<S, T, R>,
    name: &str,
    targets: &[String],
) -> Result<ToolOutcome, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    let mut deployment = ctx.load_deployment(name)?;
    deployment.persist_generated()?;
    deployment.apply(targets)
}
