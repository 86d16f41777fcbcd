use std::fmt;

use chrono::{Days, NaiveDate};

use crate::model::project::{Project, ProjectStatus};
use crate::model::task::{Priority, Task, TaskStatus};

/// A predicate over tasks. Date filters take "today" from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Status(TaskStatus),
    /// open, paused or delegated
    Active,
    Area(String),
    Project(String),
    Priority(Priority),
    /// Due before today and not done
    Overdue,
    /// Due today, whatever the status
    DueToday,
    /// Due within today..=today+7 and not done
    DueThisWeek,
}

impl TaskFilter {
    /// Parse a named filter: `all`, `active`, `overdue`, `today`, `week`,
    /// or a status name.
    pub fn parse(name: &str) -> Option<TaskFilter> {
        let name = name.trim().to_ascii_lowercase();
        let filter = match name.as_str() {
            "all" | "" => TaskFilter::All,
            "active" => TaskFilter::Active,
            "overdue" => TaskFilter::Overdue,
            "today" => TaskFilter::DueToday,
            "week" => TaskFilter::DueThisWeek,
            other => TaskFilter::Status(TaskStatus::parse(other)?),
        };
        Some(filter)
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        let meta = &task.meta;
        match self {
            TaskFilter::All => true,
            TaskFilter::Status(status) => meta.status == Some(*status),
            TaskFilter::Active => meta.status.is_some_and(TaskStatus::is_active),
            TaskFilter::Area(area) => meta.area.as_deref() == Some(area.as_str()),
            TaskFilter::Project(project) => meta.project.as_deref() == Some(project.as_str()),
            TaskFilter::Priority(priority) => meta.priority == Some(*priority),
            TaskFilter::Overdue => !task.is_done() && meta.due_date.is_some_and(|d| d < today),
            TaskFilter::DueToday => meta.due_date == Some(today),
            TaskFilter::DueThisWeek => !task.is_done() && due_within_week(meta.due_date, today),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFilter::All => f.write_str("all"),
            TaskFilter::Status(s) => write!(f, "{}", s),
            TaskFilter::Active => f.write_str("active"),
            TaskFilter::Area(a) => write!(f, "area={}", a),
            TaskFilter::Project(p) => write!(f, "project={}", p),
            TaskFilter::Priority(p) => write!(f, "priority={}", p),
            TaskFilter::Overdue => f.write_str("overdue"),
            TaskFilter::DueToday => f.write_str("today"),
            TaskFilter::DueThisWeek => f.write_str("week"),
        }
    }
}

fn due_within_week(due: Option<NaiveDate>, today: NaiveDate) -> bool {
    let Some(due) = due else {
        return false;
    };
    let end = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
    due >= today && due <= end
}

/// Keep the tasks matching every filter.
pub fn filter_tasks(tasks: Vec<Task>, filters: &[TaskFilter], today: NaiveDate) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| filters.iter().all(|f| f.matches(t, today)))
        .collect()
}

/// A predicate over projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    All,
    Status(ProjectStatus),
    /// active or paused
    Active,
    Area(String),
    Priority(Priority),
    /// Due before today and neither completed nor cancelled
    Overdue,
}

impl ProjectFilter {
    pub fn parse(name: &str) -> Option<ProjectFilter> {
        let name = name.trim().to_ascii_lowercase();
        let filter = match name.as_str() {
            "all" | "" => ProjectFilter::All,
            "open" => ProjectFilter::Active,
            "overdue" => ProjectFilter::Overdue,
            other => ProjectFilter::Status(ProjectStatus::parse(other)?),
        };
        Some(filter)
    }

    pub fn matches(&self, project: &Project, today: NaiveDate) -> bool {
        let meta = &project.meta;
        let closed = meta.status.is_some_and(ProjectStatus::is_closed);
        match self {
            ProjectFilter::All => true,
            ProjectFilter::Status(status) => meta.status == Some(*status),
            ProjectFilter::Active => meta.status.is_some() && !closed,
            ProjectFilter::Area(area) => meta.area.as_deref() == Some(area.as_str()),
            ProjectFilter::Priority(priority) => meta.priority == Some(*priority),
            ProjectFilter::Overdue => !closed && meta.due_date.is_some_and(|d| d < today),
        }
    }
}

/// Keep the projects matching every filter.
pub fn filter_projects(
    projects: Vec<Project>,
    filters: &[ProjectFilter],
    today: NaiveDate,
) -> Vec<Project> {
    projects
        .into_iter()
        .filter(|p| filters.iter().all(|f| f.matches(p, today)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::Note;
    use crate::model::project::ProjectMetadata;
    use crate::ops::sort::tests::task;
    use chrono::{DateTime, Utc};
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn due_in(days: i64, status: TaskStatus) -> Task {
        let mut t = task(1);
        t.meta.status = Some(status);
        t.meta.due_date = Some(today() + chrono::Duration::days(days));
        t
    }

    #[test]
    fn overdue_excludes_done() {
        let f = TaskFilter::Overdue;
        assert!(f.matches(&due_in(-1, TaskStatus::Open), today()));
        assert!(f.matches(&due_in(-30, TaskStatus::Paused), today()));
        assert!(!f.matches(&due_in(-1, TaskStatus::Done), today()));
        assert!(!f.matches(&due_in(0, TaskStatus::Open), today()));
        assert!(!f.matches(&task(1), today()));
    }

    #[test]
    fn week_is_inclusive_of_day_seven() {
        let f = TaskFilter::DueThisWeek;
        assert!(f.matches(&due_in(0, TaskStatus::Open), today()));
        assert!(f.matches(&due_in(7, TaskStatus::Open), today()));
        assert!(!f.matches(&due_in(8, TaskStatus::Open), today()));
        assert!(!f.matches(&due_in(-1, TaskStatus::Open), today()));
        assert!(!f.matches(&due_in(3, TaskStatus::Done), today()));
    }

    #[test]
    fn due_today_keeps_done_tasks() {
        let f = TaskFilter::DueToday;
        assert!(f.matches(&due_in(0, TaskStatus::Open), today()));
        assert!(f.matches(&due_in(0, TaskStatus::Done), today()));
        assert!(!f.matches(&due_in(1, TaskStatus::Open), today()));
    }

    #[test]
    fn active_and_status() {
        let open = due_in(0, TaskStatus::Open);
        let delegated = due_in(0, TaskStatus::Delegated);
        let dropped = due_in(0, TaskStatus::Dropped);
        let mut unset = task(2);
        unset.meta.status = None;

        assert!(TaskFilter::Active.matches(&open, today()));
        assert!(TaskFilter::Active.matches(&delegated, today()));
        assert!(!TaskFilter::Active.matches(&dropped, today()));
        assert!(!TaskFilter::Active.matches(&unset, today()));

        let done_only = TaskFilter::Status(TaskStatus::Done);
        assert!(!done_only.matches(&open, today()));
    }

    #[test]
    fn field_equality_filters() {
        let mut t = task(1);
        t.meta.area = Some("home".to_string());
        t.meta.project = Some("20250101T090000".to_string());
        t.meta.priority = Some(Priority::P2);

        assert!(TaskFilter::Area("home".to_string()).matches(&t, today()));
        assert!(!TaskFilter::Area("work".to_string()).matches(&t, today()));
        assert!(TaskFilter::Project("20250101T090000".to_string()).matches(&t, today()));
        assert!(TaskFilter::Priority(Priority::P2).matches(&t, today()));
        assert!(!TaskFilter::Priority(Priority::P1).matches(&t, today()));
    }

    #[test]
    fn filters_combine_with_and() {
        let mut a = due_in(-2, TaskStatus::Open);
        a.meta.area = Some("home".to_string());
        let b = due_in(-2, TaskStatus::Open);
        let kept = filter_tasks(
            vec![a.clone(), b],
            &[TaskFilter::Overdue, TaskFilter::Area("home".to_string())],
            today(),
        );
        assert_eq!(kept, vec![a]);
    }

    #[test]
    fn parse_names() {
        assert_eq!(TaskFilter::parse("all"), Some(TaskFilter::All));
        assert_eq!(TaskFilter::parse("Open"), Some(TaskFilter::Status(TaskStatus::Open)));
        assert_eq!(TaskFilter::parse("week"), Some(TaskFilter::DueThisWeek));
        assert_eq!(TaskFilter::parse("later"), None);
        assert_eq!(
            ProjectFilter::parse("completed"),
            Some(ProjectFilter::Status(ProjectStatus::Completed))
        );
    }

    #[test]
    fn project_overdue_ignores_closed() {
        let project = |status: ProjectStatus| Project {
            note: Note {
                id: "20250101T090000".to_string(),
                slug: "garden".to_string(),
                title: "garden".to_string(),
                tags: vec!["project".to_string()],
            },
            meta: ProjectMetadata {
                status: Some(status),
                due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                ..Default::default()
            },
            path: PathBuf::from("/notes/20250101T090000--garden__project.md"),
            modified: DateTime::<Utc>::UNIX_EPOCH,
            content: String::new(),
        };
        let f = ProjectFilter::Overdue;
        assert!(f.matches(&project(ProjectStatus::Active), today()));
        assert!(f.matches(&project(ProjectStatus::Paused), today()));
        assert!(!f.matches(&project(ProjectStatus::Completed), today()));
        assert!(!f.matches(&project(ProjectStatus::Cancelled), today()));
        assert!(ProjectFilter::Active.matches(&project(ProjectStatus::Paused), today()));
        assert!(!ProjectFilter::Active.matches(&project(ProjectStatus::Cancelled), today()));
    }
}
