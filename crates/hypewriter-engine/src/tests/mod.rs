use tempfile::TempDir;

/// Create a temporary directory for project files
pub fn create_test_projects_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}
