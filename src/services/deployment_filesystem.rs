use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::paths::{deployment_dir, deployments_dir};
use crate::domain::{AppError, DeploymentName};
use crate::ports::{DeploymentStore, ScaffoldFile};

/// Deployments stored under `<root>/deployments/`.
#[derive(Debug, Clone)]
pub struct FilesystemDeploymentStore {
    root: PathBuf,
}

impl FilesystemDeploymentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl DeploymentStore for FilesystemDeploymentStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn deployment_dir(&self, name: &DeploymentName) -> PathBuf {
        deployment_dir(&self.root, name.as_str())
    }

    fn exists(&self, name: &DeploymentName) -> bool {
        self.deployment_dir(name).exists()
    }

    fn create(&self, name: &DeploymentName, files: &[ScaffoldFile]) -> Result<PathBuf, AppError> {
        fs::create_dir_all(deployments_dir(&self.root))?;

        let dir = self.deployment_dir(name);
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(AppError::DeploymentExists(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        for file in files {
            let path = dir.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &file.content)?;
            if file.executable {
                make_executable(&path)?;
            }
            debug!(path = %path.display(), "Wrote scaffold file");
        }

        Ok(dir)
    }

    fn list(&self) -> Result<Vec<String>, AppError> {
        let dir = deployments_dir(&self.root);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn remove(&self, name: &DeploymentName) -> Result<(), AppError> {
        let dir = self.deployment_dir(name);
        if !dir.exists() {
            return Err(AppError::DeploymentNotFound(name.to_string()));
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
