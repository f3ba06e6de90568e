pub mod adapters;
mod deployment_filesystem;
mod embedded_template_store;

pub use adapters::packer::PackerAdapter;
pub use adapters::process_runner::ProcessCommandRunner;
pub use adapters::terraform::{SUPPORTED_TERRAFORM_VERSION, TerraformAdapter};
pub use deployment_filesystem::FilesystemDeploymentStore;
pub use embedded_template_store::EmbeddedTemplateStore;
