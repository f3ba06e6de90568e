use crate::app::AppContext;
use crate::domain::AppError;
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

/// `docker run` command that starts a build agent for the deployment.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>, name: &str) -> Result<String, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    ctx.load_deployment(name)?.agent_command()
}
