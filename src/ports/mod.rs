mod command_runner;
mod deployment_store;
mod template_store;

pub use command_runner::{CapturedOutput, CommandRunner, ToolCommand};
pub use deployment_store::DeploymentStore;
pub use template_store::{ScaffoldFile, TemplateStore};
