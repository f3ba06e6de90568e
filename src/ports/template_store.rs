use crate::domain::{AppError, DeploymentName};

/// A file written when a deployment is scaffolded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFile {
    /// Path relative to the deployment directory.
    pub path: String,
    pub content: String,
    pub executable: bool,
}

/// Port for the files a new deployment starts from.
pub trait TemplateStore {
    fn deployment_files(&self, name: &DeploymentName) -> Result<Vec<ScaffoldFile>, AppError>;
}
