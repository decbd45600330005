use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PROJECT_FORMAT_VERSION: &str = "1.0";

/// A writing project: metadata, typography settings and chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub version: String,
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub font: String,
    pub font_size: u32,
    pub line_height: f32,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            font: "Pretendard".to_string(),
            font_size: 16,
            line_height: 1.8,
        }
    }
}

/// One chapter. `content` holds the document in its HTML wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub footnotes: Vec<Footnote>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Footnote ids are opaque strings chosen by whoever wrote the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footnote {
    pub id: String,
    pub marker: String,
    pub content: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            footnotes: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }
}

impl Project {
    /// A new project with a single empty chapter.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: PROJECT_FORMAT_VERSION.to_string(),
            metadata: ProjectMetadata {
                title: title.into(),
                author: String::new(),
                created: now,
                modified: now,
            },
            settings: ProjectSettings::default(),
            chapters: vec![Chapter::new("Chapter 1")],
        }
    }

    pub fn chapter(&self, id: Uuid) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id == id)
    }

    pub fn chapter_index(&self, id: Uuid) -> Option<usize> {
        self.chapters.iter().position(|chapter| chapter.id == id)
    }

    /// Append a chapter and return its id.
    pub fn add_chapter(&mut self, title: impl Into<String>) -> Uuid {
        let chapter = Chapter::new(title);
        let id = chapter.id;
        self.chapters.push(chapter);
        id
    }

    /// Remove a chapter. Returns the chapter to select next: the one
    /// before the removed chapter, or the new first chapter.
    pub fn delete_chapter(&mut self, id: Uuid) -> Option<Uuid> {
        let index = self.chapter_index(id)?;
        self.chapters.remove(index);
        let next = index.saturating_sub(1);
        self.chapters.get(next).map(|chapter| chapter.id)
    }

    /// Replace a chapter's content. Returns `false` for an unknown id.
    pub fn update_chapter_content(&mut self, id: Uuid, html: impl Into<String>) -> bool {
        match self.chapters.iter_mut().find(|chapter| chapter.id == id) {
            Some(chapter) => {
                chapter.content = html.into();
                chapter.modified_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn rename_chapter(&mut self, id: Uuid, title: impl Into<String>) -> bool {
        match self.chapters.iter_mut().find(|chapter| chapter.id == id) {
            Some(chapter) => {
                chapter.title = title.into();
                chapter.modified_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Move the chapter at `from` to index `to`.
    pub fn reorder_chapters(&mut self, from: usize, to: usize) -> bool {
        if from >= self.chapters.len() || to >= self.chapters.len() {
            return false;
        }
        let chapter = self.chapters.remove(from);
        self.chapters.insert(to, chapter);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titles(project: &Project) -> Vec<&str> {
        project.chapters.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn new_project_has_defaults_and_one_chapter() {
        let project = Project::new("Novel");
        assert_eq!(project.metadata.title, "Novel");
        assert_eq!(project.settings.font, "Pretendard");
        assert_eq!(project.settings.font_size, 16);
        assert_eq!(titles(&project), vec!["Chapter 1"]);
    }

    #[test]
    fn deleting_selects_the_previous_chapter() {
        let mut project = Project::new("Novel");
        let first = project.chapters[0].id;
        let second = project.add_chapter("Two");
        let third = project.add_chapter("Three");

        assert_eq!(project.delete_chapter(third), Some(second));
        assert_eq!(project.delete_chapter(first), Some(second));
        assert_eq!(project.delete_chapter(second), None);
        assert!(project.chapters.is_empty());
        assert_eq!(project.delete_chapter(second), None);
    }

    #[test]
    fn update_content_touches_the_chapter() {
        let mut project = Project::new("Novel");
        let id = project.chapters[0].id;
        let before = project.chapters[0].modified_at;

        assert!(project.update_chapter_content(id, "<p>Hi</p>"));
        assert_eq!(project.chapter(id).unwrap().content, "<p>Hi</p>");
        assert!(project.chapter(id).unwrap().modified_at >= before);
        assert!(!project.update_chapter_content(Uuid::new_v4(), "x"));
    }

    #[test]
    fn reorder_moves_a_chapter() {
        let mut project = Project::new("Novel");
        project.add_chapter("Two");
        project.add_chapter("Three");

        assert!(project.reorder_chapters(2, 0));
        assert_eq!(titles(&project), vec!["Three", "Chapter 1", "Two"]);
        assert!(!project.reorder_chapters(0, 3));
    }

    #[test]
    fn json_uses_camel_case() {
        let project = Project::new("Novel");
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["settings"]["fontSize"], 16);
        assert!(json["chapters"][0]["createdAt"].is_string());
        assert!(json["chapters"][0].get("modifiedAt").is_some());

        let back: Project = serde_json::from_value(json).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn footnote_ids_are_free_form() {
        let mut project = Project::new("Novel");
        let mut json = serde_json::to_value(&project).unwrap();
        json["chapters"][0]["footnotes"] = serde_json::json!([
            { "id": "fn-1", "marker": "*", "content": "A note" }
        ]);

        let loaded: Project = serde_json::from_value(json).unwrap();
        project.chapters[0].footnotes.push(Footnote {
            id: "fn-1".to_string(),
            marker: "*".to_string(),
            content: "A note".to_string(),
        });
        assert_eq!(loaded, project);
    }
}
