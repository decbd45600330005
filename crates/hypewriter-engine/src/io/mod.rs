use crate::models::Project;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of project files.
pub const PROJECT_EXTENSION: &str = "hype";

#[derive(Debug, thiserror::Error)]
pub enum ProjectIoError {
    #[error("Project file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid project file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a project file
pub fn read_project(path: &Path) -> Result<Project, ProjectIoError> {
    if !path.exists() {
        return Err(ProjectIoError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| ProjectIoError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a project file as pretty JSON, touching its modification time
pub fn write_project(path: &Path, project: &mut Project) -> Result<(), ProjectIoError> {
    project.metadata.modified = Utc::now();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(project).map_err(|source| ProjectIoError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json)?;
    Ok(())
}

/// Open a project, creating a fresh one named after the file if missing
pub fn open_or_create_project(path: &Path) -> Result<Project, ProjectIoError> {
    match read_project(path) {
        Err(ProjectIoError::NotFound(_)) => {
            let title = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("Untitled");
            let mut project = Project::new(title);
            write_project(path, &mut project)?;
            Ok(project)
        }
        other => other,
    }
}
