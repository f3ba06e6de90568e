use crate::app::AppContext;
use crate::domain::{AppError, BuildArtifactRecord, ToolOutcome};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

#[derive(Debug)]
pub struct BuildAmiOutcome {
    pub outcome: ToolOutcome,
    /// Manifest contents after the build, whatever its result.
    pub artifacts: BuildArtifactRecord,
}

/// Run the deployment's AMI build script.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>, name: &str) -> Result<BuildAmiOutcome, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    let mut deployment = ctx.load_deployment(name)?;
    deployment.persist_generated()?;
    let outcome = deployment.build_ami();
    Ok(BuildAmiOutcome { outcome, artifacts: deployment.packer().artifacts().clone() })
}
