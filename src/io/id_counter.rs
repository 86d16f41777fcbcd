//! Integer identifiers for tasks and projects.
//!
//! One [`IdAllocator`] per notes directory, created once by the application
//! and shared by reference. The next free numbers live in a small JSON file
//! in the directory and every allocation persists the incremented state
//! (temp file + rename) before handing the number out.
//!
//! The mutex only serializes callers inside this process. Two processes that
//! open the same directory can still read the same value and hand out the
//! same number; callers that need uniqueness across processes must hold an
//! external lock (see [`crate::io::lock::FileLock`]) around `open` + `next_*`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::io::atomic::atomic_write;
use crate::io::note_io::NoteError;
use crate::ops::scan;

/// Counter file name inside the notes directory
pub const COUNTER_FILE: &str = ".task-counter.json";

/// Persisted allocator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    pub next_task_id: u64,
    /// Seeded from the project files the first time a project id is needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_project_id: Option<u64>,
}

/// Error type for identifier allocation
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not scan notes directory: {0}")]
    Scan(#[from] NoteError),
    #[error("{kind:?} counter in {path} is exhausted")]
    Exhausted { kind: IdKind, path: PathBuf },
    #[error("identifier allocator lock poisoned")]
    Poisoned,
}

/// Which counter to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Task,
    Project,
}

/// Issues strictly increasing, never reused identifiers for one directory.
#[derive(Debug)]
pub struct IdAllocator {
    dir: PathBuf,
    path: PathBuf,
    state: Mutex<CounterState>,
}

impl IdAllocator {
    /// Load the counter file, or seed it from the highest `task_id` in the
    /// directory and persist it right away. An existing file is trusted.
    pub fn open(dir: &Path) -> Result<Self, AllocError> {
        let path = dir.join(COUNTER_FILE);
        let state = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| AllocError::Decode {
                path: path.clone(),
                source: e,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let max = scan::max_task_id(dir)?;
                let state = CounterState {
                    next_task_id: max.checked_add(1).ok_or_else(|| AllocError::Exhausted {
                        kind: IdKind::Task,
                        path: path.clone(),
                    })?,
                    next_project_id: None,
                };
                persist(&path, &state)?;
                tracing::info!(dir = %dir.display(), next = state.next_task_id, "seeded task counter");
                state
            }
            Err(e) => {
                return Err(AllocError::Read {
                    path: path.clone(),
                    source: e,
                });
            }
        };
        Ok(IdAllocator {
            dir: dir.to_path_buf(),
            path,
            state: Mutex::new(state),
        })
    }

    /// Path of the counter file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn next_task_id(&self) -> Result<u64, AllocError> {
        self.next(IdKind::Task)
    }

    pub fn next_project_id(&self) -> Result<u64, AllocError> {
        self.next(IdKind::Project)
    }

    /// Allocate one identifier. The incremented state is on disk before the
    /// number is returned; if persisting fails the in-memory state is rolled
    /// back and nothing is handed out.
    pub fn next(&self, kind: IdKind) -> Result<u64, AllocError> {
        let mut state = self.state.lock().map_err(|_| AllocError::Poisoned)?;
        let previous = *state;

        let exhausted = || AllocError::Exhausted {
            kind,
            path: self.path.clone(),
        };
        let id = match kind {
            IdKind::Task => {
                let id = state.next_task_id;
                state.next_task_id = id.checked_add(1).ok_or_else(exhausted)?;
                id
            }
            IdKind::Project => {
                let id = match state.next_project_id {
                    Some(n) => n,
                    None => scan::max_project_id(&self.dir)?
                        .checked_add(1)
                        .ok_or_else(exhausted)?,
                };
                state.next_project_id = Some(id.checked_add(1).ok_or_else(exhausted)?);
                id
            }
        };

        if let Err(e) = persist(&self.path, &state) {
            *state = previous;
            return Err(e);
        }
        tracing::debug!(?kind, id, "allocated identifier");
        Ok(id)
    }

    /// Current in-memory state
    pub fn snapshot(&self) -> Result<CounterState, AllocError> {
        Ok(*self.state.lock().map_err(|_| AllocError::Poisoned)?)
    }
}

fn persist(path: &Path, state: &CounterState) -> Result<(), AllocError> {
    let to_err = |e: std::io::Error| AllocError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    let json = serde_json::to_string(state).map_err(|e| to_err(std::io::Error::other(e)))?;
    atomic_write(path, json.as_bytes()).map_err(to_err)
}
