use std::path::PathBuf;

use tracing::info;

use crate::app::AppContext;
use crate::domain::{AppError, DeploymentName};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

#[derive(Debug)]
pub struct NewOutcome {
    pub name: String,
    pub dir: PathBuf,
}

/// Scaffold `deployments/<name>/` and persist its generated values.
///
/// An existing deployment is never overwritten.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>, name: &str) -> Result<NewOutcome, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    let name = DeploymentName::new(name)?;
    let files = ctx.templates().deployment_files(&name)?;
    let dir = ctx.store().create(&name, &files)?;
    info!(deployment = %name, files = files.len(), "Scaffolded deployment");

    let mut deployment = ctx.load_deployment(&name)?;
    deployment.save()?;

    Ok(NewOutcome { name: name.into(), dir })
}
