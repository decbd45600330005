pub mod project;

pub use project::{Chapter, Footnote, PROJECT_FORMAT_VERSION, Project, ProjectMetadata, ProjectSettings};
