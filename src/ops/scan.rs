//! Directory scanning: every task or project note in a notes directory.
//!
//! A scan never fails because of one file. Names outside the Denote grammar,
//! notes without the right tag and blocks that don't decode are skipped and
//! logged at debug level; only an unreadable directory is an error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::io::note_io::{self, NoteError};
use crate::model::project::Project;
use crate::model::task::Task;
use crate::parse::filename;

/// Paths of all `.md` files in `dir` whose names fit the Denote grammar,
/// in name order.
pub fn note_paths(dir: &Path) -> Result<Vec<PathBuf>, NoteError> {
    let entries = fs::read_dir(dir).map_err(|e| NoteError::Read {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && filename::parse_path(path).is_ok())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load every task note in `dir`.
pub fn scan_tasks(dir: &Path) -> Result<Vec<Task>, NoteError> {
    let mut tasks = Vec::new();
    for path in note_paths(dir)? {
        match note_io::load_task(&path) {
            Ok(task) => tasks.push(task),
            Err(NoteError::NotATask(_)) => {}
            Err(e) => skip(&path, &e),
        }
    }
    Ok(tasks)
}

/// Load every project note in `dir`.
pub fn scan_projects(dir: &Path) -> Result<Vec<Project>, NoteError> {
    let mut projects = Vec::new();
    for path in note_paths(dir)? {
        match note_io::load_project(&path) {
            Ok(project) => projects.push(project),
            Err(NoteError::NotAProject(_)) => {}
            Err(e) => skip(&path, &e),
        }
    }
    Ok(projects)
}

fn skip(path: &Path, error: &NoteError) {
    tracing::debug!(path = %path.display(), error = %error, "skipping unreadable note");
}

/// Highest `task_id` in the directory, 0 if there is none.
pub fn max_task_id(dir: &Path) -> Result<u64, NoteError> {
    Ok(scan_tasks(dir)?
        .iter()
        .map(|t| t.meta.task_id)
        .max()
        .unwrap_or(0))
}

/// Highest `project_id` in the directory, 0 if there is none.
pub fn max_project_id(dir: &Path) -> Result<u64, NoteError> {
    Ok(scan_projects(dir)?
        .iter()
        .map(|p| p.meta.project_id)
        .max()
        .unwrap_or(0))
}

/// The task carrying `task_id`. With duplicates, the first by filename wins.
pub fn find_task_by_id(dir: &Path, task_id: u64) -> Result<Option<Task>, NoteError> {
    Ok(scan_tasks(dir)?
        .into_iter()
        .find(|t| t.meta.task_id == task_id))
}

/// Look a project up by its `project_id` number, its `identifier`, or its
/// Denote identifier.
pub fn find_project(dir: &Path, key: &str) -> Result<Option<Project>, NoteError> {
    let key = key.trim();
    let number = key.parse::<u64>().ok().filter(|n| *n > 0);
    Ok(scan_projects(dir)?.into_iter().find(|p| {
        number == Some(p.meta.project_id) || p.key() == key || p.note.id == key
    }))
}

/// Tasks whose `project` field names this project.
pub fn tasks_for_project<'a>(tasks: &'a [Task], project: &Project) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.meta.project.as_deref() == Some(project.key()))
        .collect()
}
