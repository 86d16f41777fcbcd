use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};

use crate::io::id_counter::{AllocError, IdAllocator};
use crate::io::note_io::{self, NoteError, WriteOutcome};
use crate::model::note::{PROJECT_TAG, TASK_TAG};
use crate::model::project::{Project, ProjectStatus};
use crate::model::task::{ESTIMATES, Priority, Task, TaskStatus};
use crate::parse::filename;
use crate::parse::frontmatter::{self, DELIMITER};
use crate::parse::frontmatter_editor::{field_line, tags_block};
use crate::parse::metadata_parser;

/// Input rejected before any file is touched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid status '{0}' (expected open, done, paused, delegated or dropped)")]
    Status(String),
    #[error("invalid project status '{0}' (expected active, completed, paused or cancelled)")]
    ProjectStatus(String),
    #[error("invalid priority '{0}' (expected p1, p2, p3 or empty)")]
    Priority(String),
    #[error("invalid estimate '{0}' (expected one of 0, 1, 2, 3, 5, 8, 13)")]
    Estimate(String),
    #[error("invalid date '{0}' (expected YYYY-MM-DD or empty)")]
    Date(String),
    #[error("unknown field '{0}'")]
    Field(String),
    #[error("title cannot be empty")]
    EmptyTitle,
}

/// Error type for task and project operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error("task not found: {0}")]
    NotFound(u64),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_status(value: &str) -> Result<TaskStatus, ValidationError> {
    TaskStatus::parse(value).ok_or_else(|| ValidationError::Status(value.to_string()))
}

pub fn validate_project_status(value: &str) -> Result<ProjectStatus, ValidationError> {
    ProjectStatus::parse(value).ok_or_else(|| ValidationError::ProjectStatus(value.to_string()))
}

/// `p1`/`p2`/`p3`, or empty for no priority
pub fn validate_priority(value: &str) -> Result<Option<Priority>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Priority::parse(value)
        .map(Some)
        .ok_or_else(|| ValidationError::Priority(value.to_string()))
}

/// One of [`ESTIMATES`]; empty means 0
pub fn validate_estimate(value: &str) -> Result<u32, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u32>()
        .ok()
        .filter(|n| ESTIMATES.contains(n))
        .ok_or_else(|| ValidationError::Estimate(value.to_string()))
}

/// ISO `YYYY-MM-DD`, or empty to clear
pub fn validate_date(value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::Date(value.to_string()))
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Field updates
// ---------------------------------------------------------------------------

pub fn set_status(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    let status = validate_status(value)?;
    Ok(note_io::set_field(path, "status", status.as_str())?)
}

pub fn mark_done(path: &Path) -> Result<WriteOutcome, TaskError> {
    set_status(path, TaskStatus::Done.as_str())
}

pub fn set_project_status(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    let status = validate_project_status(value)?;
    Ok(note_io::set_field(path, "status", status.as_str())?)
}

pub fn set_priority(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    let priority = validate_priority(value)?;
    let text = priority.map(Priority::as_str).unwrap_or("");
    Ok(note_io::set_field(path, "priority", text)?)
}

pub fn set_due_date(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    let date = validate_date(value)?;
    Ok(note_io::set_field(path, "due_date", &date_text(date))?)
}

pub fn set_start_date(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    let date = validate_date(value)?;
    Ok(note_io::set_field(path, "start_date", &date_text(date))?)
}

pub fn set_estimate(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    let estimate = validate_estimate(value)?;
    Ok(note_io::set_field(path, "estimate", &estimate.to_string())?)
}

pub fn set_project(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    Ok(note_io::set_field(path, "project", value.trim())?)
}

pub fn set_area(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    Ok(note_io::set_field(path, "area", value.trim())?)
}

pub fn set_assignee(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    Ok(note_io::set_field(path, "assignee", value.trim())?)
}

pub fn set_title(path: &Path, value: &str) -> Result<WriteOutcome, TaskError> {
    let title = value.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    Ok(note_io::set_field(path, "title", title)?)
}

/// Scalar fields `set_field` accepts
pub const SETTABLE_FIELDS: [&str; 9] = [
    "status",
    "priority",
    "due_date",
    "start_date",
    "estimate",
    "project",
    "area",
    "assignee",
    "title",
];

/// Dispatch a `field value` pair on a task note to its validated setter.
/// `due` and `start` are accepted for the date fields.
pub fn set_field(path: &Path, field: &str, value: &str) -> Result<WriteOutcome, TaskError> {
    match field {
        "status" => set_status(path, value),
        "priority" => set_priority(path, value),
        "due" | "due_date" => set_due_date(path, value),
        "start" | "start_date" => set_start_date(path, value),
        "estimate" => set_estimate(path, value),
        "project" => set_project(path, value),
        "area" => set_area(path, value),
        "assignee" => set_assignee(path, value),
        "title" => set_title(path, value),
        other => Err(ValidationError::Field(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Replace the frontmatter tag list, order kept as given.
pub fn set_tags(path: &Path, tags: &[String]) -> Result<(), TaskError> {
    Ok(note_io::set_tags(path, tags)?)
}

/// Current frontmatter tags of the note at `path`.
pub fn read_tags(path: &Path) -> Result<Vec<String>, TaskError> {
    let (content, _) = note_io::read_note_file(path)?;
    let Some((block, _)) = frontmatter::split_frontmatter(&content) else {
        return Ok(Vec::new());
    };
    metadata_parser::parse_tags(block).map_err(|e| {
        NoteError::Metadata {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

/// Append `tag` unless it is already there. Returns whether the file changed.
pub fn add_tag(path: &Path, tag: &str) -> Result<bool, TaskError> {
    let tag = tag.trim();
    let mut tags = read_tags(path)?;
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return Ok(false);
    }
    tags.push(tag.to_string());
    set_tags(path, &tags)?;
    Ok(true)
}

/// Drop every occurrence of `tag`. Returns whether the file changed.
pub fn remove_tag(path: &Path, tag: &str) -> Result<bool, TaskError> {
    let tag = tag.trim();
    let mut tags = read_tags(path)?;
    let before = tags.len();
    tags.retain(|t| t != tag);
    if tags.len() == before {
        return Ok(false);
    }
    set_tags(path, &tags)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Fields for a new task note. Text fields are validated by `create_task`.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    /// Extra tags; `task` is always added first
    pub tags: Vec<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub start_date: Option<String>,
    pub estimate: Option<String>,
    pub project: Option<String>,
    pub area: Option<String>,
    pub assignee: Option<String>,
}

/// Fields for a new project note
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub tags: Vec<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub start_date: Option<String>,
    pub area: Option<String>,
}

/// Create a task note stamped with the local clock.
pub fn create_task(dir: &Path, alloc: &IdAllocator, new: &NewTask) -> Result<Task, TaskError> {
    create_task_at(dir, alloc, new, Local::now().naive_local())
}

/// Create a task note whose Denote identifier is taken from `now`.
pub fn create_task_at(
    dir: &Path,
    alloc: &IdAllocator,
    new: &NewTask,
    now: NaiveDateTime,
) -> Result<Task, TaskError> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    let priority = validate_priority(new.priority.as_deref().unwrap_or(""))?;
    let due = validate_date(new.due_date.as_deref().unwrap_or(""))?;
    let start = validate_date(new.start_date.as_deref().unwrap_or(""))?;
    let estimate = validate_estimate(new.estimate.as_deref().unwrap_or(""))?;

    let task_id = alloc.next_task_id()?;
    let (id, tags) = identity(dir, now, TASK_TAG, &new.tags)?;

    let mut fields = vec![
        field_line("task_id", &task_id.to_string()),
        field_line("status", TaskStatus::Open.as_str()),
    ];
    if let Some(p) = priority {
        fields.push(field_line("priority", p.as_str()));
    }
    if due.is_some() {
        fields.push(field_line("due_date", &date_text(due)));
    }
    if start.is_some() {
        fields.push(field_line("start_date", &date_text(start)));
    }
    if estimate > 0 {
        fields.push(field_line("estimate", &estimate.to_string()));
    }
    for (key, value) in [
        ("project", &new.project),
        ("area", &new.area),
        ("assignee", &new.assignee),
    ] {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            fields.push(field_line(key, v));
        }
    }

    let path = dir.join(filename::to_filename(&id, &slug_for(title), &tags));
    note_io::create_note(&path, &render(title, now, &tags, &fields))?;
    tracing::info!(task_id, path = %path.display(), "created task");
    Ok(note_io::load_task(&path)?)
}

/// Create a project note stamped with the local clock.
pub fn create_project(
    dir: &Path,
    alloc: &IdAllocator,
    new: &NewProject,
) -> Result<Project, TaskError> {
    create_project_at(dir, alloc, new, Local::now().naive_local())
}

/// Create a project note. Its `identifier` is the Denote identifier.
pub fn create_project_at(
    dir: &Path,
    alloc: &IdAllocator,
    new: &NewProject,
    now: NaiveDateTime,
) -> Result<Project, TaskError> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    let priority = validate_priority(new.priority.as_deref().unwrap_or(""))?;
    let due = validate_date(new.due_date.as_deref().unwrap_or(""))?;
    let start = validate_date(new.start_date.as_deref().unwrap_or(""))?;

    let project_id = alloc.next_project_id()?;
    let (id, tags) = identity(dir, now, PROJECT_TAG, &new.tags)?;

    let mut fields = vec![
        field_line("identifier", &id),
        field_line("project_id", &project_id.to_string()),
        field_line("status", ProjectStatus::Active.as_str()),
    ];
    if let Some(p) = priority {
        fields.push(field_line("priority", p.as_str()));
    }
    if due.is_some() {
        fields.push(field_line("due_date", &date_text(due)));
    }
    if start.is_some() {
        fields.push(field_line("start_date", &date_text(start)));
    }
    if let Some(area) = new.area.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        fields.push(field_line("area", area));
    }

    let path = dir.join(filename::to_filename(&id, &slug_for(title), &tags));
    note_io::create_note(&path, &render(title, now, &tags, &fields))?;
    tracing::info!(project_id, path = %path.display(), "created project");
    Ok(note_io::load_project(&path)?)
}

/// A free Denote identifier at or after `now` (one second steps), and the
/// sanitized tag list with `kind` first.
fn identity(
    dir: &Path,
    now: NaiveDateTime,
    kind: &str,
    extra: &[String],
) -> Result<(String, Vec<String>), NoteError> {
    let taken = taken_identifiers(dir)?;
    let mut at = now;
    let mut id = filename::denote_identifier(at);
    while taken.contains(&id) {
        at += TimeDelta::seconds(1);
        id = filename::denote_identifier(at);
    }

    let mut tags = vec![kind.to_string()];
    for tag in extra.iter().map(|t| filename::sanitize_tag(t)) {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok((id, tags))
}

fn taken_identifiers(dir: &Path) -> Result<HashSet<String>, NoteError> {
    let entries = fs::read_dir(dir).map_err(|e| NoteError::Read {
        path: dir.to_path_buf(),
        source: e,
    })?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path: PathBuf = entry.path();
            filename::parse_path(&path).ok().map(|note| note.id)
        })
        .collect())
}

fn slug_for(title: &str) -> String {
    let slug = filename::slugify(title);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

fn render(title: &str, now: NaiveDateTime, tags: &[String], fields: &[String]) -> String {
    let mut out = format!("{}\n", DELIMITER);
    out.push_str(&field_line("title", title));
    out.push('\n');
    out.push_str(&format!("date: {}\n", now.format("%Y-%m-%dT%H:%M:%S")));
    out.push_str(&tags_block(tags, "\n"));
    for line in fields {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out
}
