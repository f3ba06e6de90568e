use std::path::{Path, PathBuf};

use crate::domain::{AppError, DeploymentName};
use crate::ports::ScaffoldFile;

/// Port for the `deployments/` directory tree.
pub trait DeploymentStore {
    /// Project root holding `deployments/`.
    fn root(&self) -> &Path;

    /// `deployments/<name>/`
    fn deployment_dir(&self, name: &DeploymentName) -> PathBuf;

    fn exists(&self, name: &DeploymentName) -> bool;

    /// Create `deployments/<name>/` and write `files` into it.
    ///
    /// Fails with [`AppError::DeploymentExists`] without touching anything
    /// when the directory is already there.
    fn create(&self, name: &DeploymentName, files: &[ScaffoldFile]) -> Result<PathBuf, AppError>;

    /// Names of all deployment directories, sorted.
    fn list(&self) -> Result<Vec<String>, AppError>;

    /// Delete `deployments/<name>/` and everything in it.
    fn remove(&self, name: &DeploymentName) -> Result<(), AppError>;
}
