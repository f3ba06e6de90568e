use crate::domain::AppError;
use crate::impl_validated_name;

/// A validated deployment name, used verbatim as the directory under `deployments/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentName(String);

impl_validated_name!(DeploymentName, AppError::InvalidDeploymentName);

impl From<DeploymentName> for String {
    fn from(val: DeploymentName) -> Self {
        val.0
    }
}
