//! Provisioner adapter wrapping the `terraform` CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::domain::paths::{PLAN_FILE, PLAN_FINGERPRINT_FILE, STATE_FILE};
use crate::domain::{AppError, ProvisioningStateRecord, ToolOutcome, ToolVariables};
use crate::ports::{CommandRunner, ToolCommand};
use crate::services::adapters::artifact_file::{read_artifact, remove_if_present};

/// The only Terraform release whose configuration language the templates use.
pub const SUPPORTED_TERRAFORM_VERSION: &str = "Terraform v0.11.14";

/// Recorded next to `tfplan` so a later apply can tell whether the plan is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFingerprint {
    pub fingerprint: String,
    pub targets: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// SHA-256 over the formatted variable list and the target list.
pub fn plan_fingerprint(variables: &ToolVariables, targets: &[String]) -> String {
    let mut hasher = Sha256::new();
    for var in variables.iter() {
        hasher.update(var.name.as_bytes());
        hasher.update(b"=");
        hasher.update(var.literal.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"\0targets\n");
    for target in targets {
        hasher.update(target.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

fn version_message(supported: &str) -> String {
    format!(
        "{supported} is the only version of Terraform currently supported, as the deployment \
         templates use the v0.11 configuration language, which later releases do not accept.\n\n\
         Please install {supported} and try again."
    )
}

pub struct TerraformAdapter<R: CommandRunner> {
    runner: R,
    binary: String,
    supported_version: String,
    working_dir: PathBuf,
    variables: ToolVariables,
    environment: BTreeMap<String, String>,
    state: ProvisioningStateRecord,
}

impl<R: CommandRunner> TerraformAdapter<R> {
    /// Creating the adapter does no I/O; call [`refresh`](Self::refresh) to read the state file.
    pub fn new(runner: R, binary: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            binary: binary.into(),
            supported_version: SUPPORTED_TERRAFORM_VERSION.to_string(),
            working_dir: working_dir.into(),
            variables: ToolVariables::new(),
            environment: BTreeMap::new(),
            state: ProvisioningStateRecord::default(),
        }
    }

    pub fn with_supported_version(mut self, version: impl Into<String>) -> Self {
        self.supported_version = version.into();
        self
    }

    /// Variables passed as `-var` arguments and environment layered over every launch.
    pub fn set_variables(&mut self, variables: ToolVariables, environment: BTreeMap<String, String>) {
        self.variables = variables;
        self.environment = environment;
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Re-read `terraform.tfstate`.
    pub fn refresh(&mut self) -> &ProvisioningStateRecord {
        let path = self.working_dir.join(STATE_FILE);
        self.state = ProvisioningStateRecord::from_load(read_artifact(&path));
        if let Some(details) = &self.state.corrupt {
            warn!(
                path = %path.display(),
                error = %details,
                "Couldn't parse the terraform state file; inspect or restore it"
            );
        }
        &self.state
    }

    pub fn state(&self) -> &ProvisioningStateRecord {
        &self.state
    }

    pub fn has_state(&self) -> bool {
        self.state.has_state
    }

    /// `DRONE_BUILDER_ROLE_ARN` output, empty until the IAM resources exist.
    pub fn builder_role_arn(&self) -> &str {
        &self.state.builder_role_arn
    }

    pub fn plan_path(&self) -> PathBuf {
        self.working_dir.join(PLAN_FILE)
    }

    fn fingerprint_path(&self) -> PathBuf {
        self.working_dir.join(PLAN_FINGERPRINT_FILE)
    }

    pub fn init(&mut self) -> ToolOutcome {
        let command = self.command("init");
        self.run(command)
    }

    /// `terraform plan -out=tfplan`, recording a fingerprint of the inputs on success.
    pub fn plan(&mut self, targets: &[String]) -> Result<ToolOutcome, AppError> {
        remove_if_present(&self.fingerprint_path())?;

        let command = self
            .command("plan")
            .arg(format!("-out={}", PLAN_FILE))
            .args(self.variable_args())
            .args(target_args(targets));
        let outcome = self.run(command);

        if outcome.is_success() {
            let record = PlanFingerprint {
                fingerprint: plan_fingerprint(&self.variables, targets),
                targets: targets.to_vec(),
                created_at: Utc::now(),
            };
            let json = serde_json::to_string_pretty(&record).map_err(std::io::Error::from)?;
            fs::write(self.fingerprint_path(), json)?;
            debug!(fingerprint = %record.fingerprint, "Recorded plan fingerprint");
        }
        Ok(outcome)
    }

    /// Whether `tfplan` was produced from the current variables with no targets.
    pub fn has_fresh_plan(&self) -> bool {
        if !self.plan_path().exists() {
            return false;
        }
        let Ok(text) = fs::read_to_string(self.fingerprint_path()) else {
            return false;
        };
        match serde_json::from_str::<PlanFingerprint>(&text) {
            Ok(record) => {
                record.targets.is_empty()
                    && record.fingerprint == plan_fingerprint(&self.variables, &[])
            }
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable plan fingerprint");
                false
            }
        }
    }

    /// Apply the saved plan when it is fresh and no targets are given,
    /// otherwise a full `terraform apply` with variables.
    pub fn apply(&mut self, targets: &[String]) -> Result<ToolOutcome, AppError> {
        let reuse_plan = targets.is_empty() && self.has_fresh_plan();

        let command = if reuse_plan {
            info!(plan = %self.plan_path().display(), "Applying saved plan");
            self.command("apply").arg(PLAN_FILE)
        } else {
            if self.plan_path().exists() {
                info!("Saved plan does not match the current settings; running a fresh apply");
            }
            self.command("apply").args(self.variable_args()).args(target_args(targets))
        };

        let outcome = self.run(command);
        if outcome.is_success() {
            self.discard_plan()?;
        }
        self.refresh();
        Ok(outcome)
    }

    /// `terraform destroy`. Any saved plan describes state that no longer
    /// exists afterwards, so it is discarded whatever the outcome.
    pub fn destroy(&mut self, targets: &[String]) -> Result<ToolOutcome, AppError> {
        let command =
            self.command("destroy").args(self.variable_args()).args(target_args(targets));
        let outcome = self.run(command);
        self.discard_plan()?;
        self.refresh();
        Ok(outcome)
    }

    fn discard_plan(&self) -> Result<(), AppError> {
        remove_if_present(&self.plan_path())?;
        remove_if_present(&self.fingerprint_path())?;
        Ok(())
    }

    fn command(&self, subcommand: &str) -> ToolCommand {
        ToolCommand::new(&self.binary, &self.working_dir).arg(subcommand).envs(&self.environment)
    }

    fn variable_args(&self) -> Vec<String> {
        self.variables
            .iter()
            .flat_map(|var| ["-var".to_string(), format!("{}={}", var.name, var.literal)])
            .collect()
    }

    fn run(&self, command: ToolCommand) -> ToolOutcome {
        let subcommand = command.args.first().map(String::as_str).unwrap_or_default();
        info!(dir = %self.working_dir.display(), subcommand, "Running terraform");
        match self.runner.stream(&command) {
            Ok(Some(0)) => ToolOutcome::Succeeded,
            Ok(code) => self.check_version(code),
            Err(err) => ToolOutcome::from_run_error(err),
        }
    }

    /// After a failure, tell an unsupported installation apart from an ordinary error.
    fn check_version(&self, code: Option<i32>) -> ToolOutcome {
        println!("Terraform version check...");
        let command = ToolCommand::new(&self.binary, &self.working_dir).arg("version");
        let installed = match self.runner.capture(&command) {
            Ok(output) => output.stdout.lines().next().unwrap_or("").trim().to_string(),
            Err(err) => {
                warn!(error = %err, "Couldn't query the terraform version");
                return ToolOutcome::Failed { code };
            }
        };

        if installed == self.supported_version {
            ToolOutcome::Failed { code }
        } else {
            println!("⚠️ {}", version_message(&self.supported_version));
            ToolOutcome::UnsupportedVersion {
                installed,
                supported: self.supported_version.clone(),
            }
        }
    }
}

fn target_args(targets: &[String]) -> Vec<String> {
    targets.iter().map(|target| format!("-target={}", target)).collect()
}
