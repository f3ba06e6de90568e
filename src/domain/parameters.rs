//! Catalog of the deployment parameters understood by drone-deploy.
//!
//! The order of [`PARAMETERS`] is significant: later parameters may be derived
//! from earlier ones (the data bucket name needs the machine name and hosted
//! zone), and the adapter variable list is emitted in this order.

/// Name prefix shared by every resource this tool manages.
pub const PRODUCT_PREFIX: &str = "drone";

/// How a parameter's value is obtained once the environment and the document
/// have both been consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Environment, then document. Nothing else.
    Plain,
    /// Ordered list of strings (CIDR blocks and the like).
    List,
    /// Comma-joined for the tools, kept as a list in the document.
    UserFilter,
    /// Shared secret, generated when empty.
    Secret,
    /// Resource name prefix derived from the deployment directory.
    DeploymentName,
    /// Data bucket, derived from machine name and hosted zone.
    BucketName,
    /// Provisioner output: role assumed by the image builder.
    BuilderRoleArn,
    /// Builder output: internal id stamped on the image.
    DeploymentId,
    /// Builder output: image id.
    ServerAmi,
}

impl ParameterKind {
    /// Whether the value can only be known after an adapter has read its artifacts.
    pub fn is_adapter_derived(self) -> bool {
        matches!(
            self,
            ParameterKind::BuilderRoleArn | ParameterKind::DeploymentId | ParameterKind::ServerAmi
        )
    }

    /// Whether the document holds this parameter as a list.
    pub fn is_list(self) -> bool {
        matches!(self, ParameterKind::List | ParameterKind::UserFilter)
    }
}

/// A recognized parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterKind,
}

const fn param(name: &'static str, kind: ParameterKind) -> ParameterSpec {
    ParameterSpec { name, kind }
}

pub const AWS_REGION: &str = "drone_aws_region";
pub const MACHINE_NAME: &str = "drone_server_machine_name";
pub const HOSTED_ZONE: &str = "drone_server_hosted_zone";
pub const SERVER_PROTO: &str = "drone_server_proto";
pub const RPC_SECRET: &str = "drone_rpc_secret";
pub const AGENT_IMAGE: &str = "drone_agent_docker_image";
pub const DEPLOYMENT_NAME: &str = "drone_deployment_name";
pub const S3_BUCKET: &str = "drone_s3_bucket";
pub const BUILDER_ROLE_ARN: &str = "drone_builder_role_arn";
pub const DEPLOYMENT_ID: &str = "drone_deployment_id";
pub const SERVER_AMI: &str = "drone_server_ami";

/// Every recognized parameter, in resolution order.
pub const PARAMETERS: &[ParameterSpec] = &[
    param(AWS_REGION, ParameterKind::Plain),
    param("drone_vpc_id", ParameterKind::Plain),
    param(MACHINE_NAME, ParameterKind::Plain),
    param(HOSTED_ZONE, ParameterKind::Plain),
    param("drone_server_key_pair_name", ParameterKind::Plain),
    param("drone_server_instance_type", ParameterKind::Plain),
    param("drone_docker_compose_version", ParameterKind::Plain),
    param("drone_server_allow_http", ParameterKind::List),
    param("drone_server_allow_https", ParameterKind::List),
    param("drone_server_allow_ssh", ParameterKind::List),
    param("drone_open", ParameterKind::Plain),
    param("drone_admin", ParameterKind::Plain),
    param("drone_admin_email", ParameterKind::Plain),
    param("drone_user_filter", ParameterKind::UserFilter),
    param("drone_github_server", ParameterKind::Plain),
    param("drone_github_client_id", ParameterKind::Plain),
    param("drone_github_client_secret", ParameterKind::Plain),
    param("drone_agents_enabled", ParameterKind::Plain),
    param("drone_tls_autocert", ParameterKind::Plain),
    param(SERVER_PROTO, ParameterKind::Plain),
    param("drone_server_host", ParameterKind::Plain),
    param("drone_cli_version", ParameterKind::Plain),
    param("drone_server_docker_image", ParameterKind::Plain),
    param(AGENT_IMAGE, ParameterKind::Plain),
    param("aws_cli_base_image", ParameterKind::Plain),
    param("drone_server_base_ami", ParameterKind::Plain),
    param(RPC_SECRET, ParameterKind::Secret),
    param(DEPLOYMENT_NAME, ParameterKind::DeploymentName),
    param(S3_BUCKET, ParameterKind::BucketName),
    param(BUILDER_ROLE_ARN, ParameterKind::BuilderRoleArn),
    param(DEPLOYMENT_ID, ParameterKind::DeploymentId),
    param(SERVER_AMI, ParameterKind::ServerAmi),
];

/// Parameters resolvable from the environment, the document, and generators alone.
pub fn independent() -> impl Iterator<Item = &'static ParameterSpec> {
    PARAMETERS.iter().filter(|spec| !spec.kind.is_adapter_derived())
}

/// Parameters that need the adapters' artifacts.
pub fn adapter_derived() -> impl Iterator<Item = &'static ParameterSpec> {
    PARAMETERS.iter().filter(|spec| spec.kind.is_adapter_derived())
}

pub fn lookup(name: &str) -> Option<&'static ParameterSpec> {
    PARAMETERS.iter().find(|spec| spec.name == name)
}

pub fn is_recognized(name: &str) -> bool {
    lookup(name).is_some()
}

/// Environment variable consulted as an override for `name`.
pub fn override_var(name: &str) -> String {
    name.to_uppercase()
}

/// Environment variable through which the provisioner reads `name`.
pub fn tf_var(name: &str) -> String {
    format!("TF_VAR_{}", name.to_lowercase())
}
