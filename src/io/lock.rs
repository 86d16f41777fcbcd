use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lock file name inside the notes directory
pub const LOCK_FILE: &str = ".dt.lock";

/// Default wait before giving up on the lock
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory lock over a notes directory.
///
/// Held by `dt` around identifier allocation and note creation so that two
/// processes never hand out the same `task_id`. Uses flock on Unix.
///
/// The lock file stays in place after release; only the flock goes away,
/// with the file handle. Every holder must lock the same inode.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another dt process may be writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Acquire the lock for `notes_dir`, waiting up to `timeout`.
    pub fn acquire(notes_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = notes_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::Create {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    tracing::trace!(path = %lock_path.display(), "lock acquired");
                    return Ok(FileLock {
                        _file: file,
                        path: lock_path,
                    });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }

    pub fn acquire_default(notes_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(notes_dir, DEFAULT_TIMEOUT)
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
