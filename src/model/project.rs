use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::note::Note;
use super::task::{Priority, non_empty, null_as_default};

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Paused,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::Paused,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Paused => "paused",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<ProjectStatus> {
        let s = s.trim();
        ProjectStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
    }

    /// active, paused, completed, cancelled
    pub fn sort_rank(self) -> u8 {
        match self {
            ProjectStatus::Active => 0,
            ProjectStatus::Paused => 1,
            ProjectStatus::Completed => 2,
            ProjectStatus::Cancelled => 3,
        }
    }

    /// Completed and cancelled projects are closed
    pub fn is_closed(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed frontmatter of a project note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Allocator-issued project number; 0 means missing
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_id: u64,
    /// Key that tasks put in their `project` field
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl ProjectMetadata {
    pub fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.identifier = non_empty(self.identifier);
        self.area = non_empty(self.area);
        self
    }

    pub fn fallback() -> Self {
        ProjectMetadata {
            status: Some(ProjectStatus::Active),
            ..Default::default()
        }
    }
}

/// A project note
#[derive(Debug, Clone)]
pub struct Project {
    pub note: Note,
    pub meta: ProjectMetadata,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub content: String,
}

impl Project {
    pub fn title(&self) -> &str {
        &self.note.title
    }

    /// The key tasks use to reference this project: the frontmatter
    /// `identifier`, or the Denote identifier when that is missing
    pub fn key(&self) -> &str {
        self.meta.identifier.as_deref().unwrap_or(&self.note.id)
    }
}
