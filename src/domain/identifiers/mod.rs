mod deployment_name;
pub mod validation;

pub use deployment_name::DeploymentName;
