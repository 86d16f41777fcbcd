use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_yaml::Value;

use crate::model::project::{ProjectMetadata, ProjectStatus};
use crate::model::task::{Priority, TaskMetadata, TaskStatus};
use crate::parse::frontmatter::{self, BlockScan};

/// Untyped frontmatter fields in document order
pub type Fields = IndexMap<String, Value>;

/// Error type for frontmatter decoding
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("document has no frontmatter")]
    NoFrontmatter,
    #[error("frontmatter block is not properly closed")]
    Unclosed,
    #[error("could not decode frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Which record a frontmatter block decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Task,
    Project,
    Generic,
}

/// Decoded frontmatter
#[derive(Debug, Clone, PartialEq)]
pub enum Frontmatter {
    Task(TaskMetadata),
    Project(ProjectMetadata),
    Fields(Fields),
}

impl Frontmatter {
    pub fn kind(&self) -> MetadataKind {
        match self {
            Frontmatter::Task(_) => MetadataKind::Task,
            Frontmatter::Project(_) => MetadataKind::Project,
            Frontmatter::Fields(_) => MetadataKind::Generic,
        }
    }

    /// The `title` field, whatever the record kind
    pub fn title(&self) -> Option<&str> {
        let title = match self {
            Frontmatter::Task(m) => Some(m.title.as_str()),
            Frontmatter::Project(m) => Some(m.title.as_str()),
            Frontmatter::Fields(f) => f.get("title").and_then(Value::as_str),
        };
        title.filter(|t| !t.trim().is_empty())
    }
}

/// A document split into decoded frontmatter and body text
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Document {
    pub fn kind(&self) -> MetadataKind {
        self.frontmatter.kind()
    }
}

/// Split and decode a whole document. Fails when there is no usable block.
pub fn parse_document(content: &str) -> Result<Document, MetadataError> {
    match frontmatter::scan(content) {
        BlockScan::Absent => return Err(MetadataError::NoFrontmatter),
        BlockScan::Unclosed => return Err(MetadataError::Unclosed),
        BlockScan::Closed { .. } => {}
    }
    let (block, body) = frontmatter::split_frontmatter(content).ok_or(MetadataError::Unclosed)?;
    Ok(Document {
        frontmatter: decode(block)?,
        body: body.to_string(),
    })
}

/// Decode a block: a task if it carries a positive `task_id`, else a
/// project if it carries a positive `project_id`, else plain fields.
pub fn decode(block: &str) -> Result<Frontmatter, MetadataError> {
    if let Ok(meta) = serde_yaml::from_str::<TaskMetadata>(block)
        && meta.task_id > 0
    {
        return Ok(Frontmatter::Task(meta.normalize()));
    }
    if let Ok(meta) = serde_yaml::from_str::<ProjectMetadata>(block)
        && meta.project_id > 0
    {
        return Ok(Frontmatter::Project(meta.normalize()));
    }
    Ok(Frontmatter::Fields(parse_fields(block)?))
}

/// Decode a block as a mapping, keeping key order.
pub fn parse_fields(block: &str) -> Result<Fields, MetadataError> {
    if block.trim().is_empty() {
        return Ok(Fields::new());
    }
    match serde_yaml::from_str::<Option<Fields>>(block)? {
        Some(fields) => Ok(fields),
        None => Ok(Fields::new()),
    }
}

/// Decode a block as task metadata, lifting what it can from loose fields
/// when the strict decode fails.
pub fn parse_task_metadata(block: &str) -> Result<TaskMetadata, MetadataError> {
    if block.trim().is_empty() {
        return Ok(TaskMetadata::default());
    }
    if let Ok(meta) = serde_yaml::from_str::<TaskMetadata>(block) {
        return Ok(meta.normalize());
    }
    Ok(task_from_fields(&parse_fields(block)?))
}

/// Project counterpart of [`parse_task_metadata`].
pub fn parse_project_metadata(block: &str) -> Result<ProjectMetadata, MetadataError> {
    if block.trim().is_empty() {
        return Ok(ProjectMetadata::default());
    }
    if let Ok(meta) = serde_yaml::from_str::<ProjectMetadata>(block) {
        return Ok(meta.normalize());
    }
    Ok(project_from_fields(&parse_fields(block)?))
}

/// The `tags` list of a block, whatever kind of note it belongs to.
pub fn parse_tags(block: &str) -> Result<Vec<String>, MetadataError> {
    Ok(list_field(&parse_fields(block)?, "tags"))
}

pub fn task_from_fields(fields: &Fields) -> TaskMetadata {
    TaskMetadata {
        title: string_field(fields, "title").unwrap_or_default(),
        task_id: int_field(fields, "task_id").unwrap_or(0),
        status: string_field(fields, "status").and_then(|s| TaskStatus::parse(&s)),
        priority: string_field(fields, "priority").and_then(|s| Priority::parse(&s)),
        due_date: date_field(fields, "due_date"),
        start_date: date_field(fields, "start_date"),
        estimate: int_field(fields, "estimate")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        project: string_field(fields, "project"),
        area: string_field(fields, "area"),
        assignee: string_field(fields, "assignee"),
        tags: list_field(fields, "tags"),
    }
    .normalize()
}

pub fn project_from_fields(fields: &Fields) -> ProjectMetadata {
    ProjectMetadata {
        title: string_field(fields, "title").unwrap_or_default(),
        project_id: int_field(fields, "project_id").unwrap_or(0),
        identifier: string_field(fields, "identifier"),
        status: string_field(fields, "status").and_then(|s| ProjectStatus::parse(&s)),
        priority: string_field(fields, "priority").and_then(|s| Priority::parse(&s)),
        due_date: date_field(fields, "due_date"),
        start_date: date_field(fields, "start_date"),
        area: string_field(fields, "area"),
        tags: list_field(fields, "tags"),
    }
    .normalize()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).and_then(scalar_string)
}

fn int_field(fields: &Fields, key: &str) -> Option<u64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, also as the prefix of a longer timestamp.
fn date_field(fields: &Fields, key: &str) -> Option<NaiveDate> {
    let raw = string_field(fields, key)?;
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// A YAML list, or a single string of space/comma separated words.
fn list_field(fields: &Fields, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(Value::String(s)) => s
            .split([' ', ','])
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
