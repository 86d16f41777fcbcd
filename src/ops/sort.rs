use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::project::Project;
use crate::model::task::{Priority, Task};

/// Ordering for task and project listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// p1 < p2 < p3 < unset, then due date
    Priority,
    /// Dated before undated, earliest first
    Due,
    /// Status order, then priority
    Status,
    /// Integer task or project id
    Id,
    /// Denote identifier, i.e. creation time
    Created,
    /// Most recently modified first
    #[default]
    Modified,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Priority,
        SortKey::Due,
        SortKey::Status,
        SortKey::Id,
        SortKey::Created,
        SortKey::Modified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Priority => "priority",
            SortKey::Due => "due",
            SortKey::Status => "status",
            SortKey::Id => "id",
            SortKey::Created => "created",
            SortKey::Modified => "modified",
        }
    }

    pub fn parse(s: &str) -> Option<SortKey> {
        let s = s.trim().to_ascii_lowercase();
        SortKey::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::parse(s).ok_or_else(|| {
            let names: Vec<&str> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
            format!("unknown sort key '{}' (expected one of: {})", s, names.join(", "))
        })
    }
}

/// Dated before undated; two dates compare as their ISO strings do.
fn cmp_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_priority(a: Option<Priority>, b: Option<Priority>) -> Ordering {
    Priority::rank(a).cmp(&Priority::rank(b))
}

fn task_ordering(key: SortKey, a: &Task, b: &Task) -> Ordering {
    match key {
        SortKey::Priority => cmp_priority(a.meta.priority, b.meta.priority)
            .then_with(|| cmp_due(a.meta.due_date, b.meta.due_date)),
        SortKey::Due => cmp_due(a.meta.due_date, b.meta.due_date),
        SortKey::Status => status_rank(a)
            .cmp(&status_rank(b))
            .then_with(|| cmp_priority(a.meta.priority, b.meta.priority)),
        SortKey::Id => a.meta.task_id.cmp(&b.meta.task_id),
        SortKey::Created => a.note.id.cmp(&b.note.id),
        SortKey::Modified => b.modified.cmp(&a.modified),
    }
}

fn status_rank(task: &Task) -> u8 {
    task.meta.status.map_or(5, |s| s.sort_rank())
}

/// Sort tasks in place. The sort is stable; `reverse` flips the finished
/// order.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, reverse: bool) {
    tasks.sort_by(|a, b| task_ordering(key, a, b));
    if reverse {
        tasks.reverse();
    }
}

fn project_ordering(key: SortKey, a: &Project, b: &Project) -> Ordering {
    let status_rank = |p: &Project| p.meta.status.map_or(4, |s| s.sort_rank());
    match key {
        SortKey::Priority => cmp_priority(a.meta.priority, b.meta.priority)
            .then_with(|| cmp_due(a.meta.due_date, b.meta.due_date)),
        SortKey::Due => cmp_due(a.meta.due_date, b.meta.due_date),
        SortKey::Status => status_rank(a)
            .cmp(&status_rank(b))
            .then_with(|| cmp_priority(a.meta.priority, b.meta.priority)),
        SortKey::Id => a.meta.project_id.cmp(&b.meta.project_id),
        SortKey::Created => a.note.id.cmp(&b.note.id),
        SortKey::Modified => b.modified.cmp(&a.modified),
    }
}

/// Sort projects in place, same keys as [`sort_tasks`].
pub fn sort_projects(projects: &mut [Project], key: SortKey, reverse: bool) {
    projects.sort_by(|a, b| project_ordering(key, a, b));
    if reverse {
        projects.reverse();
    }
}
