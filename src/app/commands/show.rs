use std::path::PathBuf;

use crate::app::AppContext;
use crate::domain::{AppError, DeploymentStatus};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

#[derive(Debug)]
pub struct ShowOutput {
    pub config_path: PathBuf,
    /// The config document with this run's resolved values applied.
    pub config: String,
    pub status: DeploymentStatus,
}

/// Resolved configuration and status of one deployment. Nothing is written.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>, name: &str) -> Result<ShowOutput, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    let deployment = ctx.load_deployment(name)?;
    Ok(ShowOutput {
        config_path: deployment.layout().config_path(),
        config: deployment.document().render(),
        status: deployment.status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::new;
    use crate::domain::status::{BuildState, ProvisioningState};
    use crate::testing::TestProject;
    use std::collections::BTreeMap;
    use std::fs;

    #[test]
    fn unknown_deployment_is_not_found() {
        let project = TestProject::new();
        let err = execute(&project.ctx, "ghost").unwrap_err();
        assert!(matches!(err, AppError::DeploymentNotFound(_)));
    }

    #[test]
    fn shows_resolved_config_without_saving() {
        let mut host = BTreeMap::new();
        host.insert("DRONE_SERVER_INSTANCE_TYPE".to_string(), "t3.small".to_string());
        let project = TestProject::with_host(host);
        new::execute(&project.ctx, "acme").unwrap();
        let config_path = project.deployment_dir("acme").join("config.yaml");
        let before = fs::read_to_string(&config_path).unwrap();

        let output = execute(&project.ctx, "acme").unwrap();
        assert!(output.config.contains("drone_server_instance_type: t3.small"));
        assert_eq!(output.status.build, BuildState::NotBuilt);
        assert_eq!(output.status.provisioning, ProvisioningState::NotDeployed);
        assert_eq!(fs::read_to_string(&config_path).unwrap(), before);
    }
}
