//! Image builder adapter: runs the deployment's AMI build script and reads
//! the Packer manifest it leaves behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::paths::MANIFEST_FILE;
use crate::domain::{BuildArtifactRecord, ToolOutcome, ToolVariables};
use crate::ports::{CommandRunner, ToolCommand};
use crate::services::adapters::artifact_file::read_artifact;

pub struct PackerAdapter<R: CommandRunner> {
    runner: R,
    script: String,
    working_dir: PathBuf,
    variables: ToolVariables,
    environment: BTreeMap<String, String>,
    artifacts: BuildArtifactRecord,
}

impl<R: CommandRunner> PackerAdapter<R> {
    /// `working_dir` is the deployment's `packer/` directory. No I/O until
    /// [`refresh`](Self::refresh).
    pub fn new(runner: R, script: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            script: script.into(),
            working_dir: working_dir.into(),
            variables: ToolVariables::new(),
            environment: BTreeMap::new(),
            artifacts: BuildArtifactRecord::new_build(),
        }
    }

    pub fn set_variables(&mut self, variables: ToolVariables, environment: BTreeMap<String, String>) {
        self.variables = variables;
        self.environment = environment;
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The deployment directory the build script runs from.
    pub fn build_dir(&self) -> &Path {
        self.working_dir.parent().unwrap_or(&self.working_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.working_dir.join(MANIFEST_FILE)
    }

    /// Re-read `manifest.json`. A corrupt manifest leaves the derived values empty.
    pub fn refresh(&mut self) -> &BuildArtifactRecord {
        let path = self.manifest_path();
        self.artifacts = BuildArtifactRecord::from_load(read_artifact(&path));
        if let Some(details) = &self.artifacts.corrupt {
            warn!(
                path = %path.display(),
                error = %details,
                "Couldn't parse the packer manifest; inspect, fix or remove it and rebuild"
            );
        }
        &self.artifacts
    }

    pub fn artifacts(&self) -> &BuildArtifactRecord {
        &self.artifacts
    }

    pub fn new_build(&self) -> bool {
        self.artifacts.new_build
    }

    pub fn server_ami(&self) -> &str {
        &self.artifacts.server_ami
    }

    pub fn deployment_id(&self) -> &str {
        &self.artifacts.deployment_id
    }

    /// Run `<script> -p -var name=value ...` and reload the manifest whatever the result.
    pub fn build(&mut self) -> ToolOutcome {
        let build_dir = self.build_dir().to_path_buf();
        let program = build_dir.join(&self.script).display().to_string();
        let command = ToolCommand::new(program, &build_dir)
            .arg("-p")
            .args(
                self.variables
                    .iter()
                    .flat_map(|var| ["-var".to_string(), format!("{}={}", var.name, var.bare_value())]),
            )
            .envs(&self.environment);

        info!(dir = %build_dir.display(), "Building server AMI");
        let outcome = match self.runner.stream(&command) {
            Ok(code) => ToolOutcome::from_exit_code(code),
            Err(err) => ToolOutcome::from_run_error(err),
        };

        self.refresh();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCommandRunner;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "builds": [
    {
      "artifact_id": "us-east-1:ami-0edf58c4682eddea0",
      "packer_run_uuid": "adc2e76b-0ecd-465f-7cdf-4fbb61473a7d",
      "custom_data": {"drone_deployment_id": "fb8b32847f4f9569d9094d966af7a0cb"}
    }
  ],
  "last_run_uuid": "adc2e76b-0ecd-465f-7cdf-4fbb61473a7d"
}"#;

    fn setup() -> (TempDir, PathBuf, FakeCommandRunner) {
        let dir = TempDir::new().unwrap();
        let packer_dir = dir.path().join("packer");
        fs::create_dir_all(&packer_dir).unwrap();
        (dir, packer_dir, FakeCommandRunner::new())
    }

    fn adapter(packer_dir: &Path, runner: &FakeCommandRunner) -> PackerAdapter<FakeCommandRunner> {
        let mut adapter = PackerAdapter::new(runner.clone(), "build-drone-server-ami.sh", packer_dir);
        let variables = [
            ("drone_server_instance_type".to_string(), "\"t2.micro\"".to_string()),
            ("drone_server_allow_ssh".to_string(), "[\"10.0.0.1/32\"]".to_string()),
        ]
        .into_iter()
        .collect();
        adapter.set_variables(variables, BTreeMap::new());
        adapter.refresh();
        adapter
    }

    #[test]
    fn empty_working_dir_is_a_new_build() {
        let (_dir, packer_dir, runner) = setup();
        let adapter = adapter(&packer_dir, &runner);
        assert!(adapter.new_build());
        assert_eq!(adapter.server_ami(), "");
        assert_eq!(adapter.deployment_id(), "");
    }

    #[test]
    fn manifest_is_read_on_refresh() {
        let (_dir, packer_dir, runner) = setup();
        fs::write(packer_dir.join(MANIFEST_FILE), MANIFEST).unwrap();
        let adapter = adapter(&packer_dir, &runner);
        assert!(!adapter.new_build());
        assert_eq!(adapter.server_ami(), "ami-0edf58c4682eddea0");
        assert_eq!(adapter.deployment_id(), "fb8b32847f4f9569d9094d966af7a0cb");
    }

    #[test]
    fn corrupt_manifest_does_not_fail_construction() {
        let (_dir, packer_dir, runner) = setup();
        fs::write(packer_dir.join(MANIFEST_FILE), "}garbilygook}").unwrap();
        let adapter = adapter(&packer_dir, &runner);
        assert!(adapter.new_build());
        assert!(adapter.artifacts().corrupt.is_some());
    }

    #[test]
    fn build_runs_script_from_deployment_dir_with_bare_values() {
        let (dir, packer_dir, runner) = setup();
        let mut adapter = adapter(&packer_dir, &runner);
        assert!(adapter.build().is_success());

        let command = &runner.streamed()[0];
        assert_eq!(command.cwd, dir.path());
        assert!(command.program.ends_with("build-drone-server-ami.sh"));
        assert_eq!(
            command.args,
            vec![
                "-p",
                "-var",
                "drone_server_instance_type=t2.micro",
                "-var",
                "drone_server_allow_ssh=[\"10.0.0.1/32\"]",
            ]
        );
    }

    #[test]
    fn build_reloads_manifest() {
        let (_dir, packer_dir, runner) = setup();
        let mut adapter = adapter(&packer_dir, &runner);
        runner.produce_on_next_run(packer_dir.join(MANIFEST_FILE), MANIFEST);
        adapter.build();
        assert_eq!(adapter.deployment_id(), "fb8b32847f4f9569d9094d966af7a0cb");
    }

    #[test]
    fn failed_build_still_reloads_manifest() {
        let (_dir, packer_dir, runner) = setup();
        let mut adapter = adapter(&packer_dir, &runner);
        runner.set_exit_code(Some(1));
        runner.produce_on_next_run(packer_dir.join(MANIFEST_FILE), MANIFEST);
        assert_eq!(adapter.build(), ToolOutcome::Failed { code: Some(1) });
        assert_eq!(adapter.server_ami(), "ami-0edf58c4682eddea0");
    }

    #[test]
    fn launch_failure_is_not_fatal() {
        let (_dir, packer_dir, runner) = setup();
        let mut adapter = adapter(&packer_dir, &runner);
        runner.fail_launch("permission denied");
        assert!(matches!(adapter.build(), ToolOutcome::LaunchFailed { .. }));
        assert!(adapter.new_build());
    }
}
