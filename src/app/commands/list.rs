use crate::app::AppContext;
use crate::domain::AppError;
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

/// Names of all deployments, sorted.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>) -> Result<Vec<String>, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    ctx.store().list()
}
