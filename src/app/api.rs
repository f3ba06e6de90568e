//! API Facade for the application.
//!
//! Each operation comes in two forms: one rooted at the current directory
//! and an `_at` variant taking an explicit project root.

use std::path::{Path, PathBuf};

use crate::app::commands::{
    agent_command, build_ami, deploy, destroy, edit, init, list, new, plan, prepare, show,
};
use crate::app::settings::{ToolSettings, host_environment};
use crate::app::AppContext;
use crate::domain::DeploymentName;
use crate::ports::DeploymentStore;
use crate::services::{EmbeddedTemplateStore, FilesystemDeploymentStore, ProcessCommandRunner};

pub use crate::app::commands::build_ami::BuildAmiOutcome;
pub use crate::app::commands::destroy::DestroyOutcome;
pub use crate::app::commands::edit::EditOutcome;
pub use crate::app::commands::new::NewOutcome;
pub use crate::app::commands::show::ShowOutput;
pub use crate::domain::{AppError, ToolOutcome};

type ProcessContext =
    AppContext<FilesystemDeploymentStore, EmbeddedTemplateStore, ProcessCommandRunner>;

/// Create an `AppContext` for a project root, reading `.env` and `drone-deploy.toml` there.
fn create_context(root: &Path) -> Result<ProcessContext, AppError> {
    let host = host_environment(root)?;
    let settings = ToolSettings::load(root, &host)?;
    Ok(AppContext::new(
        FilesystemDeploymentStore::new(root.to_path_buf()),
        EmbeddedTemplateStore::new(),
        ProcessCommandRunner::new(),
        settings,
        host,
    ))
}

fn current_root() -> Result<PathBuf, AppError> {
    Ok(std::env::current_dir()?)
}

/// Scaffold a new deployment in the current directory.
pub fn new_deployment(name: &str) -> Result<NewOutcome, AppError> {
    new_deployment_at(current_root()?, name)
}

pub fn new_deployment_at(root: impl AsRef<Path>, name: &str) -> Result<NewOutcome, AppError> {
    new::execute(&create_context(root.as_ref())?, name)
}

pub fn list() -> Result<Vec<String>, AppError> {
    list_at(current_root()?)
}

pub fn list_at(root: impl AsRef<Path>) -> Result<Vec<String>, AppError> {
    list::execute(&create_context(root.as_ref())?)
}

pub fn show(name: &str) -> Result<ShowOutput, AppError> {
    show_at(current_root()?, name)
}

pub fn show_at(root: impl AsRef<Path>, name: &str) -> Result<ShowOutput, AppError> {
    show::execute(&create_context(root.as_ref())?, name)
}

pub fn show_agent_command(name: &str) -> Result<String, AppError> {
    show_agent_command_at(current_root()?, name)
}

pub fn show_agent_command_at(root: impl AsRef<Path>, name: &str) -> Result<String, AppError> {
    agent_command::execute(&create_context(root.as_ref())?, name)
}

pub fn edit(name: &str) -> Result<EditOutcome, AppError> {
    edit_at(current_root()?, name)
}

pub fn edit_at(root: impl AsRef<Path>, name: &str) -> Result<EditOutcome, AppError> {
    edit::execute(&create_context(root.as_ref())?, name)
}

pub fn init(name: &str) -> Result<ToolOutcome, AppError> {
    init_at(current_root()?, name)
}

pub fn init_at(root: impl AsRef<Path>, name: &str) -> Result<ToolOutcome, AppError> {
    init::execute(&create_context(root.as_ref())?, name)
}

pub fn prepare(name: &str) -> Result<ToolOutcome, AppError> {
    prepare_at(current_root()?, name)
}

pub fn prepare_at(root: impl AsRef<Path>, name: &str) -> Result<ToolOutcome, AppError> {
    prepare::execute(&create_context(root.as_ref())?, name)
}

pub fn plan(name: &str, targets: &[String]) -> Result<ToolOutcome, AppError> {
    plan_at(current_root()?, name, targets)
}

pub fn plan_at(
    root: impl AsRef<Path>,
    name: &str,
    targets: &[String],
) -> Result<ToolOutcome, AppError> {
    plan::execute(&create_context(root.as_ref())?, name, targets)
}

pub fn deploy(name: &str, targets: &[String]) -> Result<ToolOutcome, AppError> {
    deploy_at(current_root()?, name, targets)
}

pub fn deploy_at(
    root: impl AsRef<Path>,
    name: &str,
    targets: &[String],
) -> Result<ToolOutcome, AppError> {
    deploy::execute(&create_context(root.as_ref())?, name, targets)
}

pub fn build_ami(name: &str) -> Result<BuildAmiOutcome, AppError> {
    build_ami_at(current_root()?, name)
}

pub fn build_ami_at(root: impl AsRef<Path>, name: &str) -> Result<BuildAmiOutcome, AppError> {
    build_ami::execute(&create_context(root.as_ref())?, name)
}

pub fn destroy(
    name: &str,
    targets: &[String],
    remove_directory: bool,
) -> Result<DestroyOutcome, AppError> {
    destroy_at(current_root()?, name, targets, remove_directory)
}

pub fn destroy_at(
    root: impl AsRef<Path>,
    name: &str,
    targets: &[String],
    remove_directory: bool,
) -> Result<DestroyOutcome, AppError> {
    destroy::execute(&create_context(root.as_ref())?, name, targets, remove_directory)
}

/// Whether `name` has a deployment directory under `root`.
pub fn deployment_exists_at(root: impl AsRef<Path>, name: &str) -> Result<bool, AppError> {
    let name = DeploymentName::new(name)?;
    Ok(FilesystemDeploymentStore::new(root.as_ref().to_path_buf()).exists(&name))
}
