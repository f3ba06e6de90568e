//! Tool settings and the host environment snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::AppError;
use crate::domain::paths::{BUILDER_SCRIPT, ENV_FILE, SETTINGS_FILE};
use crate::services::SUPPORTED_TERRAFORM_VERSION;

pub const TERRAFORM_BIN_ENV: &str = "DRONE_DEPLOY_TERRAFORM_BIN";
pub const BUILDER_SCRIPT_ENV: &str = "DRONE_DEPLOY_BUILDER_SCRIPT";

/// Where the external tools live.
///
/// Defaults, then `drone-deploy.toml` in the project root, then environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub terraform_bin: String,
    /// Relative paths are resolved against the deployment directory.
    pub builder_script: String,
    pub terraform_version: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            terraform_bin: "terraform".to_string(),
            builder_script: BUILDER_SCRIPT.to_string(),
            terraform_version: SUPPORTED_TERRAFORM_VERSION.to_string(),
        }
    }
}

impl ToolSettings {
    pub fn load(root: &Path, host: &BTreeMap<String, String>) -> Result<Self, AppError> {
        let path = root.join(SETTINGS_FILE);
        let mut settings = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| {
                AppError::Settings(format!("{}: {}", path.display(), e))
            })?
        } else {
            Self::default()
        };

        if let Some(bin) = host.get(TERRAFORM_BIN_ENV).filter(|v| !v.is_empty()) {
            settings.terraform_bin = bin.clone();
        }
        if let Some(script) = host.get(BUILDER_SCRIPT_ENV).filter(|v| !v.is_empty()) {
            settings.builder_script = script.clone();
        }

        if settings.terraform_bin.trim().is_empty() {
            return Err(AppError::Settings("terraform_bin must not be empty".into()));
        }
        debug!(?settings, "Loaded tool settings");
        Ok(settings)
    }
}

/// Process environment plus `<root>/.env`; variables already set in the process win.
pub fn host_environment(root: &Path) -> Result<BTreeMap<String, String>, AppError> {
    let mut env: BTreeMap<String, String> = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();

    let path = root.join(ENV_FILE);
    if path.exists() {
        let entries = dotenvy::from_path_iter(&path)
            .map_err(|e| AppError::Settings(format!("{}: {}", path.display(), e)))?;
        for entry in entries {
            let (key, value) =
                entry.map_err(|e| AppError::Settings(format!("{}: {}", path.display(), e)))?;
            env.entry(key).or_insert(value);
        }
        debug!(path = %path.display(), "Loaded .env file");
    }

    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let settings = ToolSettings::load(dir.path(), &BTreeMap::new()).unwrap();
        assert_eq!(settings, ToolSettings::default());
        assert_eq!(settings.terraform_version, "Terraform v0.11.14");
    }

    #[test]
    fn file_then_environment() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "terraform_bin = \"/opt/tf/terraform\"\nbuilder_script = \"custom.sh\"\n",
        )
        .unwrap();

        let settings = ToolSettings::load(dir.path(), &BTreeMap::new()).unwrap();
        assert_eq!(settings.terraform_bin, "/opt/tf/terraform");
        assert_eq!(settings.builder_script, "custom.sh");

        let mut host = BTreeMap::new();
        host.insert(TERRAFORM_BIN_ENV.to_string(), "/usr/bin/terraform".to_string());
        let settings = ToolSettings::load(dir.path(), &host).unwrap();
        assert_eq!(settings.terraform_bin, "/usr/bin/terraform");
        assert_eq!(settings.builder_script, "custom.sh");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "packer = \"x\"\n").unwrap();
        let err = ToolSettings::load(dir.path(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Settings(_)));
    }

    #[test]
    #[serial]
    fn env_file_fills_gaps_only() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(ENV_FILE),
            "DRONE_DEPLOY_TEST_ONLY_IN_FILE=from-file\nPATH=/not/used\n",
        )
        .unwrap();

        let env = host_environment(dir.path()).unwrap();
        assert_eq!(env.get("DRONE_DEPLOY_TEST_ONLY_IN_FILE").map(String::as_str), Some("from-file"));
        assert_ne!(env.get("PATH").map(String::as_str), Some("/not/used"));
    }
}
