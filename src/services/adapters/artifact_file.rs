use std::fs;
use std::io;
use std::path::Path;

use crate::domain::ArtifactLoad;

/// Read an artifact that may not have been produced yet.
pub(crate) fn read_artifact(path: &Path) -> ArtifactLoad<String> {
    match fs::read_to_string(path) {
        Ok(text) => ArtifactLoad::Loaded(text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => ArtifactLoad::Missing,
        Err(err) => ArtifactLoad::Corrupt(err.to_string()),
    }
}

/// Delete `path`, treating an already-missing file as success.
pub(crate) fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
