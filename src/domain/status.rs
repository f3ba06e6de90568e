//! Human-readable deployment status and the agent launch command.

use std::fmt;

use minijinja::context;

use crate::domain::AppError;
use crate::domain::artifacts::{BuildArtifactRecord, ProvisioningStateRecord};
use crate::domain::paths::{MANIFEST_FILE, PACKER_DIR, STATE_FILE, TERRAFORM_DIR};
use crate::domain::template::render_template;

const AGENT_COMMAND_TEMPLATE: &str = "\
# Run the following command on a host running docker to launch a build agent:

docker run -v /var/run/docker.sock:/var/run/docker.sock \\
    -e DRONE_RPC_SERVER=https://{{ deployment }} \\
    -e DRONE_RUNNER_CAPACITY=1 \\
    -e DRONE_RPC_SECRET={{ rpc_secret }} \\
    -d {{ agent_image }}
";

/// `docker run` command that starts a build agent for `deployment`.
pub fn agent_command(deployment: &str, rpc_secret: &str, agent_image: &str) -> Result<String, AppError> {
    render_template(
        "agent-command",
        AGENT_COMMAND_TEMPLATE,
        context! { deployment, rpc_secret, agent_image },
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState {
    NotBuilt,
    Built { server_ami: String, deployment_id: String },
    Corrupt { details: String },
}

impl From<&BuildArtifactRecord> for BuildState {
    fn from(record: &BuildArtifactRecord) -> Self {
        if let Some(details) = &record.corrupt {
            BuildState::Corrupt { details: details.clone() }
        } else if record.new_build {
            BuildState::NotBuilt
        } else {
            BuildState::Built {
                server_ami: record.server_ami.clone(),
                deployment_id: record.deployment_id.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningState {
    NotDeployed,
    Deployed { resources: usize },
    Corrupt { details: String },
}

impl From<&ProvisioningStateRecord> for ProvisioningState {
    fn from(record: &ProvisioningStateRecord) -> Self {
        if let Some(details) = &record.corrupt {
            ProvisioningState::Corrupt { details: details.clone() }
        } else if record.is_deployed() {
            ProvisioningState::Deployed { resources: record.resource_count() }
        } else {
            ProvisioningState::NotDeployed
        }
    }
}

/// Server endpoint of a deployed instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAccess {
    pub server_url: String,
}

impl ClientAccess {
    /// `None` until both the machine name and hosted zone are known.
    pub fn new(proto: &str, machine_name: &str, hosted_zone: &str) -> Option<Self> {
        if machine_name.is_empty() || hosted_zone.is_empty() {
            return None;
        }
        let proto = if proto.is_empty() { "https" } else { proto };
        Some(Self { server_url: format!("{}://{}.{}", proto, machine_name, hosted_zone) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStatus {
    pub deployment: String,
    pub identity: String,
    pub build: BuildState,
    pub provisioning: ProvisioningState,
    pub client: Option<ClientAccess>,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.deployment;
        match &self.build {
            BuildState::NotBuilt => writeln!(
                f,
                "AMI has not been built. Run 'drone-deploy prepare {name}' and 'drone-deploy build-ami {name}' to build."
            )?,
            BuildState::Built { server_ami, deployment_id } => {
                writeln!(f, "AMI {} has been built (deployment id {}).", server_ami, deployment_id)?
            }
            BuildState::Corrupt { details } => writeln!(
                f,
                "⚠️ Couldn't read {PACKER_DIR}/{MANIFEST_FILE}: {details}\n   Inspect, fix or remove the file, then run 'drone-deploy build-ami {name}'."
            )?,
        }

        match &self.provisioning {
            ProvisioningState::NotDeployed => writeln!(
                f,
                "{} has not been deployed. Run 'drone-deploy deploy {name}' to deploy.",
                self.identity
            )?,
            ProvisioningState::Deployed { resources } => {
                writeln!(f, "{} is deployed ({} resources).", self.identity, resources)?;
                if let Some(client) = &self.client {
                    writeln!(f)?;
                    writeln!(f, "Point the drone CLI at this deployment with:")?;
                    writeln!(f, "    export DRONE_SERVER={}", client.server_url)?;
                    writeln!(f, "    export DRONE_TOKEN=<token from {}/account>", client.server_url)?;
                }
            }
            ProvisioningState::Corrupt { details } => writeln!(
                f,
                "⚠️ Couldn't read {TERRAFORM_DIR}/{STATE_FILE}: {details}\n   Inspect or restore the file before running terraform again."
            )?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifacts::ArtifactLoad;

    fn status(build: BuildState, provisioning: ProvisioningState) -> DeploymentStatus {
        DeploymentStatus {
            deployment: "foo".into(),
            identity: "drone-foo".into(),
            build,
            provisioning,
            client: ClientAccess::new("https", "ci", "acme.com"),
        }
    }

    #[test]
    fn fresh_deployment_reports_nothing_built() {
        let text = status(BuildState::NotBuilt, ProvisioningState::NotDeployed).to_string();
        assert!(text.contains("AMI has not been built"));
        assert!(text.contains("drone-foo has not been deployed"));
        assert!(!text.contains("DRONE_SERVER"));
    }

    #[test]
    fn deployed_status_includes_client_snippet() {
        let text = status(
            BuildState::Built { server_ami: "ami-1".into(), deployment_id: "abc".into() },
            ProvisioningState::Deployed { resources: 3 },
        )
        .to_string();
        assert!(text.contains("AMI ami-1 has been built"));
        assert!(text.contains("export DRONE_SERVER=https://ci.acme.com"));
        assert!(text.contains("export DRONE_TOKEN=<token from https://ci.acme.com/account>"));
    }

    #[test]
    fn corrupt_manifest_gives_guidance() {
        let record = BuildArtifactRecord::from_load(ArtifactLoad::Loaded("}".into()));
        let text = status(BuildState::from(&record), ProvisioningState::NotDeployed).to_string();
        assert!(text.contains("packer/manifest.json"));
        assert!(text.contains("Inspect, fix or remove"));
    }

    #[test]
    fn client_access_needs_machine_and_zone() {
        assert!(ClientAccess::new("https", "", "acme.com").is_none());
        assert_eq!(ClientAccess::new("", "ci", "acme.com").unwrap().server_url, "https://ci.acme.com");
    }

    #[test]
    fn agent_command_mentions_server_and_secret() {
        let command = agent_command("acme", "s3cr3t", "drone/agent:1").unwrap();
        assert!(command.contains("docker run"));
        assert!(command.contains("DRONE_RPC_SERVER=https://acme"));
        assert!(command.contains("DRONE_RPC_SECRET=s3cr3t"));
        assert!(command.contains("-d drone/agent:1"));
    }
}
