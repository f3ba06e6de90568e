use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::domain::AppError;

/// Render a Jinja template; undefined variables are errors.
pub fn render_template<S: Serialize>(name: &str, source: &str, context: S) -> Result<String, AppError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);

    env.add_template(name, source)
        .map_err(|err| AppError::Template(format!("Failed to load template {}: {}", name, err)))?;
    env.get_template(name)
        .map_err(|err| AppError::Template(format!("Failed to access template {}: {}", name, err)))?
        .render(context)
        .map_err(|err| AppError::Template(format!("Failed to render template {}: {}", name, err)))
}
