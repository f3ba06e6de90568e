use std::path::PathBuf;

use crate::app::AppContext;
use crate::domain::{AppError, DeploymentLayout, DeploymentName, ToolOutcome};
use crate::ports::{CommandRunner, DeploymentStore, TemplateStore, ToolCommand};

#[derive(Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Edited(PathBuf),
    /// `EDITOR` is unset; the caller shows the path instead.
    NoEditor(PathBuf),
}

/// Open the deployment's `config.yaml` in `$EDITOR`.
pub fn execute<S, T, R>(ctx: &AppContext<S, T, R>, name: &str) -> Result<EditOutcome, AppError>
where
    S: DeploymentStore,
    T: TemplateStore,
    R: CommandRunner + Clone,
{
    let name = DeploymentName::new(name)?;
    if !ctx.store().exists(&name) {
        return Err(AppError::DeploymentNotFound(name.to_string()));
    }
    let config_path = DeploymentLayout::new(ctx.store().deployment_dir(&name)).config_path();

    let editor = ctx.host().get("EDITOR").map(|e| e.trim()).unwrap_or_default();
    let mut words = editor.split_whitespace();
    let Some(program) = words.next() else {
        return Ok(EditOutcome::NoEditor(config_path));
    };

    let command = ToolCommand::new(program, ctx.store().root())
        .args(words)
        .arg(config_path.display().to_string());
    let code = ctx.runner().stream(&command)?;
    ToolOutcome::from_exit_code(code).into_result(program)?;
    Ok(EditOutcome::Edited(config_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::new;
    use crate::testing::TestProject;
    use std::collections::BTreeMap;

    #[test]
    fn without_editor_returns_path() {
        let project = TestProject::new();
        new::execute(&project.ctx, "acme").unwrap();

        let outcome = execute(&project.ctx, "acme").unwrap();
        assert_eq!(
            outcome,
            EditOutcome::NoEditor(project.deployment_dir("acme").join("config.yaml"))
        );
        assert!(project.runner.streamed().is_empty());
    }

    #[test]
    fn editor_with_arguments_is_split() {
        let mut host = BTreeMap::new();
        host.insert("EDITOR".to_string(), "code --wait".to_string());
        let project = TestProject::with_host(host);
        new::execute(&project.ctx, "acme").unwrap();

        execute(&project.ctx, "acme").unwrap();
        let command = &project.runner.streamed()[0];
        assert_eq!(command.program, "code");
        assert_eq!(command.args[0], "--wait");
        assert!(command.args[1].ends_with("config.yaml"));
    }

    #[test]
    fn unknown_deployment_is_not_found() {
        let project = TestProject::new();
        assert!(matches!(execute(&project.ctx, "ghost"), Err(AppError::DeploymentNotFound(_))));
    }
}
