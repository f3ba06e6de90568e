use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::app::AppContext;
use crate::app::settings::ToolSettings;
use crate::domain::paths::deployment_dir;
use crate::services::{EmbeddedTemplateStore, FilesystemDeploymentStore};
use crate::testing::FakeCommandRunner;

pub type TestContext = AppContext<FilesystemDeploymentStore, EmbeddedTemplateStore, FakeCommandRunner>;

/// Temporary project root wired to real stores and a fake tool runner.
#[allow(dead_code)]
pub struct TestProject {
    dir: TempDir,
    pub runner: FakeCommandRunner,
    pub ctx: TestContext,
}

#[allow(dead_code)]
impl TestProject {
    pub fn new() -> Self {
        Self::with_host(BTreeMap::new())
    }

    pub fn with_host(host: BTreeMap<String, String>) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let runner = FakeCommandRunner::new();
        let ctx = AppContext::new(
            FilesystemDeploymentStore::new(dir.path().to_path_buf()),
            EmbeddedTemplateStore::new(),
            runner.clone(),
            ToolSettings::default(),
            host,
        );
        Self { dir, runner, ctx }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn deployment_dir(&self, name: &str) -> PathBuf {
        deployment_dir(self.dir.path(), name)
    }
}
