pub mod artifacts;
pub mod config_document;
pub mod error;
pub mod identifiers;
pub mod identity;
pub mod parameters;
pub mod paths;
pub mod resolver;
pub mod secret;
pub mod status;
pub mod template;
pub mod tool_outcome;

pub use artifacts::{ArtifactLoad, BuildArtifactRecord, ProvisioningStateRecord};
pub use config_document::{ConfigDocument, ParamValue};
pub use error::AppError;
pub use identifiers::DeploymentName;
pub use identity::DeploymentIdentity;
pub use paths::DeploymentLayout;
pub use resolver::{
    AdapterOutputs, ResolvedEnvironment, ResolvedParameter, ToolVariable, ToolVariables,
    ValueResolver, ValueSource,
};
pub use status::{DeploymentStatus, agent_command};
pub use tool_outcome::ToolOutcome;
