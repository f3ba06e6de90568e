//! Shared testing utilities for drone-deploy CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fake `terraform` that logs its arguments and writes `-out=` plan files.
pub const FAKE_TERRAFORM: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TOOL_LOG"
echo "TF_VAR_drone_deployment_name=$TF_VAR_drone_deployment_name" >> "$FAKE_TOOL_LOG"
case "$1" in
  version)
    echo "Terraform v0.11.14"
    exit 0
    ;;
  plan)
    for arg in "$@"; do
      case "$arg" in
        -out=*) echo "fake plan" > "${arg#-out=}" ;;
      esac
    done
    ;;
esac
echo "fake terraform $1" >&2
exit "${FAKE_TOOL_EXIT:-0}"
"#;

/// Fake AMI build script that leaves a packer manifest behind.
pub const FAKE_BUILDER: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TOOL_LOG"
cat > packer/manifest.json <<'JSON'
{"builds": [{"artifact_id": "us-east-1:ami-0fake", "packer_run_uuid": "r1", "custom_data": {"drone_deployment_id": "feedface"}}], "last_run_uuid": "r1"}
JSON
exit 0
"#;

/// Testing harness providing an isolated project root for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    /// Project root used for CLI invocations.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Directory outside the project for helper scripts and logs.
    pub fn scratch_dir(&self) -> &Path {
        self.root.path()
    }

    /// Build a command for invoking the compiled binary within the project root.
    pub fn cli(&self) -> Command {
        self.cli_in(self.work_dir())
    }

    /// Build a command for invoking the compiled binary within a custom directory.
    pub fn cli_in<P: AsRef<Path>>(&self, dir: P) -> Command {
        let mut cmd =
            Command::cargo_bin("drone-deploy").expect("Failed to locate drone-deploy binary");
        cmd.current_dir(dir.as_ref())
            .env_remove("DRONE_DEPLOY_ROOT")
            .env_remove("DRONE_DEPLOY_TERRAFORM_BIN")
            .env_remove("DRONE_DEPLOY_BUILDER_SCRIPT")
            .env_remove("EDITOR")
            .env_remove("RUST_LOG")
            .env_remove("COMPLETE")
            .env("FAKE_TOOL_LOG", self.tool_log_path());
        cmd
    }

    pub fn deployment_dir(&self, name: &str) -> PathBuf {
        self.work_dir.join("deployments").join(name)
    }

    pub fn config_path(&self, name: &str) -> PathBuf {
        self.deployment_dir(name).join("config.yaml")
    }

    pub fn read_config(&self, name: &str) -> String {
        fs::read_to_string(self.config_path(name)).expect("Failed to read config.yaml")
    }

    /// Run `new <name>` and assert it succeeds.
    pub fn create_deployment(&self, name: &str) {
        self.cli().args(["new", name]).assert().success();
    }

    pub fn tool_log_path(&self) -> PathBuf {
        self.root.path().join("tool.log")
    }

    /// Lines the fake tools logged so far.
    pub fn tool_log(&self) -> Vec<String> {
        fs::read_to_string(self.tool_log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Write an executable script into the scratch directory.
    #[cfg(unix)]
    pub fn write_script(&self, name: &str, content: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.root.path().join(name);
        fs::write(&path, content).expect("Failed to write script");
        let mut perms = fs::metadata(&path).expect("Failed to stat script").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("Failed to chmod script");
        path
    }
}
