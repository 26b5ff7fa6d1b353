//! Exclusive lock serializing compensating writes across `dtk` invocations.
//!
//! Two layers: a tokio mutex for callers sharing one `DevDb`, and an advisory
//! OS lock (`flock`/`LockFileEx` via `fs2`) on `<db>.lock` for other processes.
//! The OS releases the file lock when its holder exits, so a crashed process
//! never leaves a stale lock behind.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dt_config::LockConfig;
use fs2::FileExt;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to open lock file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to lock {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("timed out after {}ms waiting for the exclusive lock ({holder})", waited.as_millis())]
    Timeout { waited: Duration, holder: String },
}

/// How long and how often to retry a contended lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    /// `None` waits until the holder releases.
    pub wait_timeout: Option<Duration>,
    pub retry_delay: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            wait_timeout: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl From<&LockConfig> for LockSettings {
    fn from(config: &LockConfig) -> Self {
        Self {
            wait_timeout: config.wait_timeout(),
            retry_delay: config.retry_delay(),
        }
    }
}

pub struct ExclusiveLock {
    path: Option<PathBuf>,
    local: Mutex<()>,
    settings: LockSettings,
}

/// Held for the duration of a critical section; releases both layers on drop.
pub struct ExclusiveLockGuard<'a> {
    _local: MutexGuard<'a, ()>,
    file: Option<File>,
}

impl Drop for ExclusiveLockGuard<'_> {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

impl ExclusiveLock {
    /// Lock backed by a file at `path` (created if missing, never deleted).
    pub fn at_path(path: impl Into<PathBuf>, settings: LockSettings) -> Self {
        Self {
            path: Some(path.into()),
            local: Mutex::new(()),
            settings,
        }
    }

    /// Lock that only serializes callers inside this process.
    #[must_use]
    pub fn in_process(settings: LockSettings) -> Self {
        Self {
            path: None,
            local: Mutex::new(()),
            settings,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub const fn settings(&self) -> LockSettings {
        self.settings
    }

    /// Block until both lock layers are held.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Timeout` if a wait timeout is configured and
    /// expires, or an I/O variant if the lock file cannot be used.
    pub async fn acquire(&self) -> Result<ExclusiveLockGuard<'_>, LockError> {
        let started = Instant::now();

        let local = match self.settings.wait_timeout {
            Some(limit) => tokio::time::timeout(limit, self.local.lock())
                .await
                .map_err(|_| LockError::Timeout {
                    waited: started.elapsed(),
                    holder: "held within this process".to_string(),
                })?,
            None => self.local.lock().await,
        };

        let file = match &self.path {
            Some(path) => Some(self.acquire_file(path, started).await?),
            None => None,
        };

        Ok(ExclusiveLockGuard {
            _local: local,
            file,
        })
    }

    async fn acquire_file(&self, path: &Path, started: Instant) -> Result<File, LockError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| LockError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| LockError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    record_holder(&mut file);
                    return Ok(file);
                }
                Err(err) if is_contended(&err) => {
                    if let Some(limit) = self.settings.wait_timeout {
                        if started.elapsed() >= limit {
                            return Err(LockError::Timeout {
                                waited: started.elapsed(),
                                holder: describe_holder(&mut file, path),
                            });
                        }
                    }
                    tracing::debug!(path = %path.display(), "exclusive lock contended; retrying");
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(source) => {
                    return Err(LockError::Io {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Best effort: write our pid so a waiting process can name the holder.
fn record_holder(file: &mut File) {
    let pid = std::process::id();
    let _ = file
        .set_len(0)
        .and_then(|()| file.seek(SeekFrom::Start(0)))
        .and_then(|_| writeln!(file, "{pid}"));
}

fn describe_holder(file: &mut File, path: &Path) -> String {
    let mut contents = String::new();
    let pid = file
        .seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_string(&mut contents))
        .ok()
        .and_then(|_| contents.trim().parse::<u32>().ok());

    match pid {
        Some(pid) => format!("held by pid {pid} at {}", path.display()),
        None => format!("held at {}", path.display()),
    }
}
