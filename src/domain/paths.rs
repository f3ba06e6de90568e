use std::path::{Path, PathBuf};

/// Directory holding one subdirectory per deployment.
pub const DEPLOYMENTS_DIR: &str = "deployments";
pub const CONFIG_FILE: &str = "config.yaml";
pub const TERRAFORM_DIR: &str = "terraform";
pub const PACKER_DIR: &str = "packer";
pub const STATE_FILE: &str = "terraform.tfstate";
pub const PLAN_FILE: &str = "tfplan";
pub const PLAN_FINGERPRINT_FILE: &str = "tfplan.fingerprint.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const BUILDER_SCRIPT: &str = "build-drone-server-ami.sh";
/// Optional tool settings in the project root.
pub const SETTINGS_FILE: &str = "drone-deploy.toml";
pub const ENV_FILE: &str = ".env";

/// `deployments/`
pub fn deployments_dir(root: &Path) -> PathBuf {
    root.join(DEPLOYMENTS_DIR)
}

/// `deployments/<name>/`
pub fn deployment_dir(root: &Path, name: &str) -> PathBuf {
    deployments_dir(root).join(name)
}

/// Files belonging to one deployment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentLayout {
    dir: PathBuf,
}

impl DeploymentLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory name, used to derive the deployment identity.
    pub fn name(&self) -> String {
        self.dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// `terraform/`
    pub fn terraform_dir(&self) -> PathBuf {
        self.dir.join(TERRAFORM_DIR)
    }

    /// `packer/`
    pub fn packer_dir(&self) -> PathBuf {
        self.dir.join(PACKER_DIR)
    }

    pub fn state_path(&self) -> PathBuf {
        self.terraform_dir().join(STATE_FILE)
    }

    pub fn plan_path(&self) -> PathBuf {
        self.terraform_dir().join(PLAN_FILE)
    }

    pub fn plan_fingerprint_path(&self) -> PathBuf {
        self.terraform_dir().join(PLAN_FINGERPRINT_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.packer_dir().join(MANIFEST_FILE)
    }

    pub fn builder_script_path(&self) -> PathBuf {
        self.dir.join(BUILDER_SCRIPT)
    }
}
