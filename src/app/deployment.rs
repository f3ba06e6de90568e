//! One deployment: its config document, resolved values and both tool adapters.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::app::settings::ToolSettings;
use crate::domain::parameters::{
    AGENT_IMAGE, DEPLOYMENT_NAME, HOSTED_ZONE, MACHINE_NAME, RPC_SECRET, SERVER_PROTO,
};
use crate::domain::status::ClientAccess;
use crate::domain::{
    AdapterOutputs, AppError, ConfigDocument, DeploymentIdentity, DeploymentLayout,
    DeploymentStatus, ResolvedEnvironment, ToolOutcome, ValueResolver, ValueSource,
    agent_command,
};
use crate::ports::CommandRunner;
use crate::services::{PackerAdapter, TerraformAdapter};

/// Resources the image builder needs before `build-ami` can run.
pub const BUILDER_IAM_TARGETS: [&str; 5] = [
    "aws_iam_policy.drone-builder-ec2",
    "aws_iam_policy.drone-builder-s3",
    "aws_iam_policy_attachment.ec2",
    "aws_iam_policy_attachment.s3",
    "aws_iam_instance_profile.drone-builder",
];

pub struct Deployment<R: CommandRunner + Clone> {
    layout: DeploymentLayout,
    document: ConfigDocument,
    resolver: ValueResolver,
    terraform: TerraformAdapter<R>,
    packer: PackerAdapter<R>,
}

impl<R: CommandRunner + Clone> Deployment<R> {
    /// Load the deployment in `dir`.
    ///
    /// Independent parameters are resolved first, then the adapters read their
    /// artifacts, then the parameters that fall back to adapter outputs.
    pub fn load(
        dir: &Path,
        settings: &ToolSettings,
        host: BTreeMap<String, String>,
        runner: R,
    ) -> Result<Self, AppError> {
        let layout = DeploymentLayout::new(dir);
        let config_path = layout.config_path();
        if !config_path.is_file() {
            return Err(AppError::DeploymentNotFound(layout.name()));
        }

        let mut document = ConfigDocument::load(&config_path)?;
        let identity = DeploymentIdentity::derive(&layout.name());
        let mut resolver = ValueResolver::new(ResolvedEnvironment::from_host(host), identity);
        resolver.resolve_independent(&mut document);

        let mut terraform =
            TerraformAdapter::new(runner.clone(), &settings.terraform_bin, layout.terraform_dir())
                .with_supported_version(&settings.terraform_version);
        terraform.refresh();
        let mut packer = PackerAdapter::new(runner, &settings.builder_script, layout.packer_dir());
        packer.refresh();

        let outputs = AdapterOutputs {
            builder_role_arn: terraform.builder_role_arn().to_string(),
            deployment_id: packer.deployment_id().to_string(),
            server_ami: packer.server_ami().to_string(),
        };
        resolver.resolve_adapter_derived(&mut document, &outputs);

        let environment = resolver.environment().subprocess_env();
        terraform.set_variables(resolver.variables().clone(), environment.clone());
        packer.set_variables(resolver.variables().clone(), environment);

        debug!(deployment = %layout.name(), identity = %resolver.identity(), "Loaded deployment");
        Ok(Self { layout, document, resolver, terraform, packer })
    }

    pub fn name(&self) -> String {
        self.layout.name()
    }

    pub fn layout(&self) -> &DeploymentLayout {
        &self.layout
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn resolver(&self) -> &ValueResolver {
        &self.resolver
    }

    pub fn terraform(&self) -> &TerraformAdapter<R> {
        &self.terraform
    }

    pub fn packer(&self) -> &PackerAdapter<R> {
        &self.packer
    }

    pub fn init(&mut self) -> ToolOutcome {
        self.terraform.init()
    }

    pub fn plan(&mut self, targets: &[String]) -> Result<ToolOutcome, AppError> {
        self.terraform.plan(targets)
    }

    /// `terraform apply`, reusing a fresh saved plan when no targets are given.
    pub fn apply(&mut self, targets: &[String]) -> Result<ToolOutcome, AppError> {
        self.terraform.apply(targets)
    }

    pub fn destroy(&mut self, targets: &[String]) -> Result<ToolOutcome, AppError> {
        self.terraform.destroy(targets)
    }

    /// Initialize terraform and create only the IAM resources the image builder assumes.
    pub fn prepare(&mut self) -> Result<ToolOutcome, AppError> {
        let outcome = self.terraform.init();
        if !outcome.is_success() {
            return Ok(outcome);
        }
        let targets: Vec<String> = BUILDER_IAM_TARGETS.iter().map(|t| t.to_string()).collect();
        self.terraform.apply(&targets)
    }

    /// Run the AMI build script. The manifest is re-read afterwards but the
    /// resolved values of this run are left as they were.
    pub fn build_ami(&mut self) -> ToolOutcome {
        self.packer.build()
    }

    pub fn status(&self) -> DeploymentStatus {
        let identity = match self.resolver.text(DEPLOYMENT_NAME) {
            "" => self.resolver.identity().to_string(),
            name => name.to_string(),
        };
        DeploymentStatus {
            deployment: self.name(),
            identity,
            build: self.packer.artifacts().into(),
            provisioning: self.terraform.state().into(),
            client: ClientAccess::new(
                self.resolver.text(SERVER_PROTO),
                self.resolver.text(MACHINE_NAME),
                self.resolver.text(HOSTED_ZONE),
            ),
        }
    }

    pub fn agent_command(&self) -> Result<String, AppError> {
        agent_command(
            &self.name(),
            self.resolver.text(RPC_SECRET),
            self.resolver.text(AGENT_IMAGE),
        )
    }

    /// Write resolved values back to `config.yaml`.
    ///
    /// Environment overrides only apply to the current run and values read
    /// from tool artifacts are picked up again on the next one, so neither
    /// is written.
    pub fn save(&mut self) -> Result<(), AppError> {
        for parameter in self.resolver.resolved() {
            if matches!(parameter.source, ValueSource::Environment | ValueSource::AdapterOutput) {
                self.document.revert(parameter.name);
            }
        }
        if !self.document.is_dirty() {
            return Ok(());
        }
        self.document.save()?;
        info!(path = %self.layout.config_path().display(), "Saved deployment config");
        Ok(())
    }

    /// Save only when this run generated a value that later runs must reuse.
    pub fn persist_generated(&mut self) -> Result<bool, AppError> {
        if !self.resolver.generated_values() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
