pub mod agent_command;
pub mod build_ami;
pub mod deploy;
pub mod destroy;
pub mod edit;
pub mod init;
pub mod list;
pub mod new;
pub mod plan;
pub mod prepare;
pub mod show;
