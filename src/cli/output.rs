use std::path::PathBuf;

use serde::Serialize;

use crate::model::config::Config;
use crate::model::project::{Project, ProjectStatus};
use crate::model::task::{Priority, Task, TaskStatus};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub task_id: u64,
    pub identifier: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Tags from the filename
    pub tags: Vec<String>,
    pub path: PathBuf,
    pub modified: String,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub project_id: u64,
    pub identifier: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub tags: Vec<String>,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ConfigJson<'a> {
    pub path: PathBuf,
    /// Directory in effect after `-C` and the config file are applied
    pub resolved_directory: PathBuf,
    #[serde(flatten)]
    pub config: &'a Config,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    let meta = &task.meta;
    TaskJson {
        task_id: meta.task_id,
        identifier: task.note.id.clone(),
        title: task.title().to_string(),
        status: meta.status,
        priority: meta.priority,
        due_date: meta.due_date.map(|d| d.to_string()),
        start_date: meta.start_date.map(|d| d.to_string()),
        estimate: (meta.estimate > 0).then_some(meta.estimate),
        project: meta.project.clone(),
        area: meta.area.clone(),
        assignee: meta.assignee.clone(),
        tags: task.note.tags.clone(),
        path: task.path.clone(),
        modified: task.modified.to_rfc3339(),
    }
}

pub fn project_to_json(project: &Project, tasks: &[&Task]) -> ProjectJson {
    let meta = &project.meta;
    ProjectJson {
        project_id: meta.project_id,
        identifier: project.key().to_string(),
        title: project.title().to_string(),
        status: meta.status,
        priority: meta.priority,
        due_date: meta.due_date.map(|d| d.to_string()),
        start_date: meta.start_date.map(|d| d.to_string()),
        area: meta.area.clone(),
        tags: project.note.tags.clone(),
        path: project.path.clone(),
        tasks: tasks.iter().map(|t| task_to_json(t)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn status_char(status: Option<TaskStatus>) -> char {
    match status {
        Some(TaskStatus::Open) | None => ' ',
        Some(TaskStatus::Done) => 'x',
        Some(TaskStatus::Paused) => '~',
        Some(TaskStatus::Delegated) => '>',
        Some(TaskStatus::Dropped) => '-',
    }
}

/// Extra tags, i.e. everything but the reserved kind tag
fn tags_suffix(tags: &[String], kind: &str) -> String {
    tags.iter()
        .filter(|t| t.as_str() != kind)
        .map(|t| format!(" #{}", t))
        .collect()
}

/// One-line task summary: `[x] 12 p1 Title (due 2025-01-31) #tag`
pub fn format_task_line(task: &Task) -> String {
    let meta = &task.meta;
    let priority = meta
        .priority
        .map(|p| format!("{} ", p))
        .unwrap_or_default();
    let due = meta
        .due_date
        .map(|d| format!(" (due {})", d))
        .unwrap_or_default();
    format!(
        "[{}] {} {}{}{}{}",
        status_char(meta.status),
        meta.task_id,
        priority,
        task.title(),
        due,
        tags_suffix(&task.note.tags, "task")
    )
}

/// Detailed task view, one line per set field
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let meta = &task.meta;
    let mut lines = vec![format!("{} {}", meta.task_id, task.title())];
    lines.push(format!("identifier: {}", task.note.id));
    if let Some(status) = meta.status {
        lines.push(format!("status: {}", status));
    }
    if let Some(priority) = meta.priority {
        lines.push(format!("priority: {}", priority));
    }
    if let Some(d) = meta.due_date {
        lines.push(format!("due: {}", d));
    }
    if let Some(d) = meta.start_date {
        lines.push(format!("start: {}", d));
    }
    if meta.estimate > 0 {
        lines.push(format!("estimate: {}", meta.estimate));
    }
    for (label, value) in [
        ("project", &meta.project),
        ("area", &meta.area),
        ("assignee", &meta.assignee),
    ] {
        if let Some(v) = value {
            lines.push(format!("{}: {}", label, v));
        }
    }
    if !task.note.tags.is_empty() {
        lines.push(format!("tags: {}", task.note.tags.join(", ")));
    }
    lines.push(format!("path: {}", task.path.display()));
    lines
}

/// One-line project summary: `#3 [active] Garden (20250101T090000)`
pub fn format_project_line(project: &Project) -> String {
    let status = project
        .meta
        .status
        .map(|s| s.as_str())
        .unwrap_or("-");
    let due = project
        .meta
        .due_date
        .map(|d| format!(" (due {})", d))
        .unwrap_or_default();
    format!(
        "#{} [{}] {} ({}){}{}",
        project.meta.project_id,
        status,
        project.title(),
        project.key(),
        due,
        tags_suffix(&project.note.tags, "project")
    )
}

/// Project header followed by its tasks
pub fn format_project_detail(project: &Project, tasks: &[&Task]) -> Vec<String> {
    let mut lines = vec![format_project_line(project)];
    if let Some(area) = &project.meta.area {
        lines.push(format!("area: {}", area));
    }
    if let Some(priority) = project.meta.priority {
        lines.push(format!("priority: {}", priority));
    }
    lines.push(format!("path: {}", project.path.display()));
    lines.push(String::new());
    if tasks.is_empty() {
        lines.push("no tasks".to_string());
    } else {
        lines.extend(tasks.iter().map(|t| format!("  {}", format_task_line(t))));
    }
    lines
}
