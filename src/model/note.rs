use serde::{Deserialize, Serialize};

/// Tag that marks a note as a task
pub const TASK_TAG: &str = "task";
/// Tag that marks a note as a project
pub const PROJECT_TAG: &str = "project";

/// Identity shared by every note, derived from its filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Denote identifier, e.g. `20250114T093000`
    pub id: String,
    /// Title slug as written in the filename (hyphenated)
    pub slug: String,
    /// Display title: frontmatter `title` if present, else the slug with spaces
    pub title: String,
    /// Tags from the filename, in written order
    pub tags: Vec<String>,
}

impl Note {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_task(&self) -> bool {
        self.has_tag(TASK_TAG)
    }

    pub fn is_project(&self) -> bool {
        self.has_tag(PROJECT_TAG)
    }

    /// Replace the filename-derived title when the frontmatter carries one
    pub fn apply_title(&mut self, title: Option<&str>) {
        if let Some(t) = title.map(str::trim)
            && !t.is_empty()
        {
            self.title = t.to_string();
        }
    }
}
