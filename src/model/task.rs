use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::note::Note;

/// Allowed story-point estimates. `0` means unestimated.
pub const ESTIMATES: [u32; 7] = [0, 1, 2, 3, 5, 8, 13];

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
    Paused,
    Delegated,
    Dropped,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Open,
        TaskStatus::Done,
        TaskStatus::Paused,
        TaskStatus::Delegated,
        TaskStatus::Dropped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Done => "done",
            TaskStatus::Paused => "paused",
            TaskStatus::Delegated => "delegated",
            TaskStatus::Dropped => "dropped",
        }
    }

    /// Parse a status word, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<TaskStatus> {
        let s = s.trim();
        TaskStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
    }

    /// Position in the status sort order: open, paused, delegated, done, dropped
    pub fn sort_rank(self) -> u8 {
        match self {
            TaskStatus::Open => 0,
            TaskStatus::Paused => 1,
            TaskStatus::Delegated => 2,
            TaskStatus::Done => 3,
            TaskStatus::Dropped => 4,
        }
    }

    /// Open, paused and delegated tasks still need attention
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TaskStatus::Open | TaskStatus::Paused | TaskStatus::Delegated
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority shared by tasks and projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::P1 => "p1",
            Priority::P2 => "p2",
            Priority::P3 => "p3",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p1" => Some(Priority::P1),
            "p2" => Some(Priority::P2),
            "p3" => Some(Priority::P3),
            _ => None,
        }
    }

    /// Unset priorities sort after p3
    pub fn rank(p: Option<Priority>) -> u8 {
        match p {
            Some(Priority::P1) => 1,
            Some(Priority::P2) => 2,
            Some(Priority::P3) => 3,
            None => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed frontmatter of a task note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Allocator-issued task number; 0 means missing
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_id: u64,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Story points; 0 means unestimated
    #[serde(default, deserialize_with = "null_as_default")]
    pub estimate: u32,
    /// Identifier of the owning project
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl TaskMetadata {
    /// Collapse empty free-text fields to `None`
    pub fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.project = non_empty(self.project);
        self.area = non_empty(self.area);
        self.assignee = non_empty(self.assignee);
        self
    }

    /// Defaults used when a task note has no usable frontmatter
    pub fn fallback() -> Self {
        TaskMetadata {
            status: Some(TaskStatus::Open),
            ..Default::default()
        }
    }
}

/// A task note: filename identity, frontmatter, and file attributes
#[derive(Debug, Clone)]
pub struct Task {
    pub note: Note,
    pub meta: TaskMetadata,
    /// Absolute path of the note file
    pub path: PathBuf,
    /// Last modification time of the file
    pub modified: DateTime<Utc>,
    /// Raw file content as read, kept for later rewrites
    pub content: String,
}

impl Task {
    pub fn title(&self) -> &str {
        &self.note.title
    }

    pub fn is_done(&self) -> bool {
        self.meta.status == Some(TaskStatus::Done)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.note == other.note && self.meta == other.meta && self.path == other.path
    }
}

impl Eq for Task {}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Treat an explicit YAML `null` (e.g. `estimate:`) like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
