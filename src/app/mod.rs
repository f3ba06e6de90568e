pub mod api;
pub mod cli;
pub mod commands;
mod context;
pub mod deployment;
pub mod settings;

pub use context::AppContext;
pub use deployment::Deployment;
