//! drone-deploy: build and deploy Drone CI servers on AWS.
//!
//! Each deployment lives in `deployments/<name>/` with a `config.yaml`, a
//! terraform directory and a packer directory. Configuration values are
//! resolved from the environment, the config file and the tools' own
//! artifacts, then handed to `terraform` and the AMI build script.

pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{
    BuildAmiOutcome, DestroyOutcome, EditOutcome, NewOutcome, ShowOutput, build_ami_at, deploy_at,
    destroy_at, edit_at, init_at, list_at, new_deployment_at, plan_at, prepare_at,
    show_agent_command_at, show_at,
};
pub use domain::{AppError, ToolOutcome};
