use std::collections::BTreeMap;

use crate::app::deployment::Deployment;
use crate::app::settings::ToolSettings;
use crate::domain::{AppError, DeploymentName};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore};

/// Application context holding dependencies for command execution.
pub struct AppContext<S: DeploymentStore, T: TemplateStore, R: CommandRunner + Clone> {
    store: S,
    templates: T,
    runner: R,
    settings: ToolSettings,
    host: BTreeMap<String, String>,
}

impl<S: DeploymentStore, T: TemplateStore, R: CommandRunner + Clone> AppContext<S, T, R> {
    /// Create a new application context.
    pub fn new(
        store: S,
        templates: T,
        runner: R,
        settings: ToolSettings,
        host: BTreeMap<String, String>,
    ) -> Self {
        Self { store, templates, runner, settings, host }
    }

    /// Get a reference to the deployment store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the scaffold template store.
    pub fn templates(&self) -> &T {
        &self.templates
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Host environment snapshot taken at startup.
    pub fn host(&self) -> &BTreeMap<String, String> {
        &self.host
    }

    /// Load an existing deployment by name.
    pub fn load_deployment(&self, name: &str) -> Result<Deployment<R>, AppError> {
        let name = DeploymentName::new(name)?;
        if !self.store.exists(&name) {
            return Err(AppError::DeploymentNotFound(name.to_string()));
        }
        Deployment::load(
            &self.store.deployment_dir(&name),
            &self.settings,
            self.host.clone(),
            self.runner.clone(),
        )
    }
}
