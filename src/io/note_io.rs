use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::io::atomic::atomic_write;
use crate::model::note::Note;
use crate::model::project::{Project, ProjectMetadata};
use crate::model::task::{Task, TaskMetadata};
use crate::parse::filename::{self, FilenameError};
use crate::parse::frontmatter;
use crate::parse::frontmatter_editor::{self, EditOutcome};
use crate::parse::metadata_parser::{self, Document, MetadataError};

/// Error type for note file operations
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
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
    #[error("could not stat {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Filename(#[from] FilenameError),
    #[error("{path}: {source}")]
    Metadata {
        path: PathBuf,
        source: MetadataError,
    },
    #[error("{0} is not a task note")]
    NotATask(PathBuf),
    #[error("{0} is not a project note")]
    NotAProject(PathBuf),
    #[error("frontmatter in {0} is not properly closed")]
    UnclosedFrontmatter(PathBuf),
}

/// What a scalar field write did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The frontmatter block never closes; the file was not touched
    Skipped,
}

/// Read a note's content and modification time.
pub fn read_note_file(path: &Path) -> Result<(String, DateTime<Utc>), NoteError> {
    let content = fs::read_to_string(path).map_err(|e| NoteError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| NoteError::Stat {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok((content, DateTime::<Utc>::from(modified)))
}

/// Read and decode a document's frontmatter. Missing or unclosed
/// frontmatter is an error here.
pub fn read_document(path: &Path) -> Result<Document, NoteError> {
    let (content, _) = read_note_file(path)?;
    metadata_parser::parse_document(&content).map_err(|e| NoteError::Metadata {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a task note. Without usable frontmatter the task gets default
/// metadata and its filename-derived title.
pub fn load_task(path: &Path) -> Result<Task, NoteError> {
    let mut note = filename::parse_path(path)?;
    if !note.is_task() {
        return Err(NoteError::NotATask(path.to_path_buf()));
    }
    let (content, modified) = read_note_file(path)?;
    let meta = match frontmatter::split_frontmatter(&content) {
        Some((block, _)) => {
            metadata_parser::parse_task_metadata(block).map_err(|e| NoteError::Metadata {
                path: path.to_path_buf(),
                source: e,
            })?
        }
        None => TaskMetadata::fallback(),
    };
    note.apply_title(Some(&meta.title));
    Ok(Task {
        note,
        meta,
        path: absolute(path),
        modified,
        content,
    })
}

/// Load a project note.
pub fn load_project(path: &Path) -> Result<Project, NoteError> {
    let mut note = filename::parse_path(path)?;
    if !note.is_project() {
        return Err(NoteError::NotAProject(path.to_path_buf()));
    }
    let (content, modified) = read_note_file(path)?;
    let meta = match frontmatter::split_frontmatter(&content) {
        Some((block, _)) => {
            metadata_parser::parse_project_metadata(block).map_err(|e| NoteError::Metadata {
                path: path.to_path_buf(),
                source: e,
            })?
        }
        None => ProjectMetadata::fallback(),
    };
    note.apply_title(Some(&meta.title));
    Ok(Project {
        note,
        meta,
        path: absolute(path),
        modified,
        content,
    })
}

/// Parse only the filename part of a note.
pub fn note_identity(path: &Path) -> Result<Note, NoteError> {
    Ok(filename::parse_path(path)?)
}

/// Set one frontmatter field in the file at `path`.
///
/// An unclosed frontmatter block leaves the file untouched and reports
/// [`WriteOutcome::Skipped`].
pub fn set_field(path: &Path, field: &str, value: &str) -> Result<WriteOutcome, NoteError> {
    let (content, _) = read_note_file(path)?;
    match frontmatter_editor::set_field(&content, field, value) {
        EditOutcome::Edited(updated) => {
            if updated != content {
                write_note(path, &updated)?;
            }
            Ok(WriteOutcome::Written)
        }
        EditOutcome::Unchanged => {
            tracing::warn!(
                path = %path.display(),
                field,
                "frontmatter is not properly closed; field not written"
            );
            Ok(WriteOutcome::Skipped)
        }
    }
}

/// Replace the tag list in the file at `path`. An unclosed frontmatter
/// block is an error.
pub fn set_tags(path: &Path, tags: &[String]) -> Result<(), NoteError> {
    let (content, _) = read_note_file(path)?;
    let updated = frontmatter_editor::set_tags(&content, tags).map_err(|e| match e {
        MetadataError::Unclosed => NoteError::UnclosedFrontmatter(path.to_path_buf()),
        other => NoteError::Metadata {
            path: path.to_path_buf(),
            source: other,
        },
    })?;
    if updated != content {
        write_note(path, &updated)?;
    }
    Ok(())
}

/// Create a new note file; fails if the file already exists.
pub fn create_note(path: &Path, content: &str) -> Result<(), NoteError> {
    let to_err = |e: std::io::Error| NoteError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(to_err)?;
    file.write_all(content.as_bytes()).map_err(to_err)?;
    file.sync_all().map_err(to_err)?;
    tracing::debug!(path = %path.display(), "created note");
    Ok(())
}

fn write_note(path: &Path, content: &str) -> Result<(), NoteError> {
    atomic_write(path, content.as_bytes()).map_err(|e| NoteError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskStatus;
    use crate::parse::metadata_parser::MetadataKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const TASK_NAME: &str = "20250114T093000--write-report__task_work.md";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_task_with_frontmatter() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            TASK_NAME,
            "---\ntitle: \"Write the Q1 report\"\ntask_id: 9\nstatus: delegated\n---\nbody\n",
        );
        let task = load_task(&path).unwrap();
        assert_eq!(task.title(), "Write the Q1 report");
        assert_eq!(task.note.id, "20250114T093000");
        assert_eq!(task.note.tags, vec!["task", "work"]);
        assert_eq!(task.meta.task_id, 9);
        assert_eq!(task.meta.status, Some(TaskStatus::Delegated));
        assert!(task.path.is_absolute());
        assert!(task.content.ends_with("body\n"));
    }

    #[test]
    fn load_task_without_frontmatter_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, TASK_NAME, "Just a body.\n\n---\n\nMore.\n");
        let task = load_task(&path).unwrap();
        assert_eq!(task.title(), "write report");
        assert_eq!(task.meta.status, Some(TaskStatus::Open));
        assert_eq!(task.meta.task_id, 0);
    }

    #[test]
    fn load_task_rejects_untagged_note() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "20250114T093000--idea__misc.md", "");
        assert!(matches!(load_task(&path), Err(NoteError::NotATask(_))));
        let path = write(&dir, "notes.md", "");
        assert!(matches!(load_task(&path), Err(NoteError::Filename(_))));
    }

    #[test]
    fn load_project_reads_identifier() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "20250101T090000--garden__project.md",
            "---\ntitle: Garden\nproject_id: 2\nidentifier: \"garden\"\n---\n",
        );
        let project = load_project(&path).unwrap();
        assert_eq!(project.meta.project_id, 2);
        assert_eq!(project.key(), "garden");
    }

    #[test]
    fn read_document_requires_frontmatter() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, TASK_NAME, "no block\n");
        assert!(matches!(
            read_document(&path),
            Err(NoteError::Metadata {
                source: MetadataError::NoFrontmatter,
                ..
            })
        ));
        let path = write(&dir, TASK_NAME, "---\ntask_id: 3\n---\nbody");
        assert_eq!(read_document(&path).unwrap().kind(), MetadataKind::Task);
    }

    #[test]
    fn read_missing_file_is_io_error_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TASK_NAME);
        let err = load_task(&path).unwrap_err();
        assert!(matches!(err, NoteError::Read { .. }));
        assert!(err.to_string().contains(TASK_NAME));
    }

    #[test]
    fn set_field_then_load_observes_value() {
        let dir = TempDir::new().unwrap();
        let original = "---\ntitle: \"A\"\ntask_id: 1\nstatus: open\n---\nbody\n";
        let path = write(&dir, TASK_NAME, original);
        assert_eq!(set_field(&path, "status", "done").unwrap(), WriteOutcome::Written);
        let task = load_task(&path).unwrap();
        assert_eq!(task.meta.status, Some(TaskStatus::Done));
        assert_eq!(task.content, original.replace("status: open", "status: done"));
    }

    #[test]
    fn set_field_on_unclosed_block_is_skipped() {
        let dir = TempDir::new().unwrap();
        let original = "---\nstatus: open\nprose here\n";
        let path = write(&dir, TASK_NAME, original);
        assert_eq!(set_field(&path, "status", "done").unwrap(), WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn set_tags_on_unclosed_block_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, TASK_NAME, "---\nstatus: open\nprose here\n");
        assert!(matches!(
            set_tags(&path, &["a".to_string()]),
            Err(NoteError::UnclosedFrontmatter(_))
        ));
    }

    #[test]
    fn set_tags_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, TASK_NAME, "---\ntask_id: 1\ntags:\n  - old\n---\n");
        let tags = vec!["b".to_string(), "a".to_string(), "c".to_string()];
        set_tags(&path, &tags).unwrap();
        assert_eq!(load_task(&path).unwrap().meta.tags, tags);
    }

    #[test]
    fn create_note_never_clobbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TASK_NAME);
        create_note(&path, "first").unwrap();
        assert!(matches!(
            create_note(&path, "second"),
            Err(NoteError::Write { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }
}
