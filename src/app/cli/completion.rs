//! Dynamic shell completion.
//!
//! `source <(COMPLETE=bash drone-deploy)` (or zsh, fish, elvish, powershell)
//! registers the completer; deployment-name arguments are completed from the
//! `deployments/` directory of the project root.

use std::path::{Path, PathBuf};

use clap_complete::engine::{ArgValueCandidates, CompletionCandidate};

use crate::ports::DeploymentStore;
use crate::services::FilesystemDeploymentStore;

/// Attach to every positional deployment-name argument.
pub fn deployment_names() -> ArgValueCandidates {
    ArgValueCandidates::new(|| {
        completion_root().map(|root| candidates_in(&root)).unwrap_or_default()
    })
}

/// `DRONE_DEPLOY_ROOT` when set, like `--root`, otherwise the current directory.
fn completion_root() -> Option<PathBuf> {
    std::env::var_os("DRONE_DEPLOY_ROOT")
        .filter(|root| !root.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
}

fn candidates_in(root: &Path) -> Vec<CompletionCandidate> {
    FilesystemDeploymentStore::new(root.to_path_buf())
        .list()
        .unwrap_or_default()
        .into_iter()
        .map(CompletionCandidate::new)
        .collect()
}
