use include_dir::{Dir, DirEntry, include_dir};
use minijinja::context;

use crate::domain::paths::{BUILDER_SCRIPT, CONFIG_FILE};
use crate::domain::template::render_template;
use crate::domain::{AppError, DeploymentName};
use crate::ports::{ScaffoldFile, TemplateStore};

static DEPLOYMENT_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/deployment");

/// Scaffold files compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedTemplateStore;

impl EmbeddedTemplateStore {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateStore for EmbeddedTemplateStore {
    fn deployment_files(&self, name: &DeploymentName) -> Result<Vec<ScaffoldFile>, AppError> {
        let mut files = Vec::new();
        collect_files(&DEPLOYMENT_DIR, &mut files);
        files.sort_by(|a, b| a.path.cmp(&b.path));

        for file in &mut files {
            if file.path == CONFIG_FILE {
                file.content = render_template(
                    CONFIG_FILE,
                    &file.content,
                    context! { deployment => name.as_str() },
                )?;
            }
        }
        Ok(files)
    }
}

fn collect_files(dir: &'static Dir, files: &mut Vec<ScaffoldFile>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::File(file) => {
                if let Some(content) = file.contents_utf8() {
                    let path = file.path().to_string_lossy().replace('\\', "/");
                    let executable = path.ends_with(".sh");
                    files.push(ScaffoldFile { path, content: content.to_string(), executable });
                }
            }
            DirEntry::Dir(subdir) => collect_files(subdir, files),
        }
    }
}
