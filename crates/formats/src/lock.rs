//! Output Directory Lock
//!
//! A coarse per-directory lock file that serializes writers of one output
//! directory. The lock is released when the guard is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Lock file name inside the guarded directory
pub const LOCK_FILE: &str = ".mosaicflow.lock";

/// Default lock timeout (1 minute)
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(60);

/// Default stale lock threshold (10 minutes)
pub const STALE_LOCK_THRESHOLD: Duration = Duration::from_secs(600);

/// Lock acquisition poll interval
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors for lock operations
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock acquisition timed out
    #[error("Timed out after {timeout_secs}s waiting for lock on '{}'", .dir.display())]
    Timeout {
        /// Guarded directory
        dir: PathBuf,
        /// Configured timeout
        timeout_secs: u64,
    },

    /// Lock file IO error
    #[error("Lock file error in '{}': {source}", .dir.display())]
    Io {
        /// Guarded directory
        dir: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Lock is held by another writer
    #[error("Lock held by process {pid} (acquired {age_secs}s ago)")]
    HeldByOther {
        /// Holder process id
        pid: u32,
        /// Seconds since acquisition
        age_secs: u64,
    },
}

/// Lock metadata stored in the lock file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockMetadata {
    /// Process ID that holds the lock
    pub pid: u32,
    /// Timestamp when lock was acquired
    pub acquired_at: u64,
    /// Who holds the lock, for diagnostics
    pub holder: String,
}

impl LockMetadata {
    fn serialize(&self) -> String {
        format!("{}:{}:{}", self.pid, self.acquired_at, self.holder)
    }

    fn deserialize(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, ':');
        Some(Self {
            pid: parts.next()?.parse().ok()?,
            acquired_at: parts.next()?.parse().ok()?,
            holder: parts.next()?.to_string(),
        })
    }
}

/// Lock for one output directory
#[derive(Debug, Clone)]
pub struct OutputLock {
    dir: PathBuf,
    timeout: Duration,
    stale_threshold: Duration,
}

impl OutputLock {
    /// Lock guarding `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timeout: DEFAULT_LOCK_TIMEOUT,
            stale_threshold: STALE_LOCK_THRESHOLD,
        }
    }

    /// Set the lock acquisition timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the age after which a lock is broken
    #[must_use]
    pub const fn with_stale_threshold(mut self, threshold: Duration) -> Self {
        self.stale_threshold = threshold;
        self
    }

    /// Acquire the lock, waiting up to the timeout.
    ///
    /// # Errors
    /// Returns `LockError::Timeout` if the lock stays held, or
    /// `LockError::Io` if the directory or lock file cannot be written.
    pub fn acquire(&self, holder: &str) -> Result<LockGuard, LockError> {
        fs::create_dir_all(&self.dir).map_err(|source| self.io(source))?;

        let start = Instant::now();
        let metadata = LockMetadata {
            pid: std::process::id(),
            acquired_at: current_timestamp(),
            holder: holder.to_string(),
        };

        loop {
            match self.try_lock(&metadata) {
                Ok(guard) => {
                    tracing::debug!(dir = %self.dir.display(), holder = %holder, "Acquired output lock");
                    return Ok(guard);
                }
                Err(LockError::HeldByOther { pid, age_secs }) => {
                    if Duration::from_secs(age_secs) > self.stale_threshold {
                        tracing::warn!(
                            dir = %self.dir.display(),
                            holder_pid = pid,
                            age_secs = age_secs,
                            "Breaking stale lock"
                        );
                        let _ = fs::remove_file(self.lock_path());
                        continue;
                    }

                    if start.elapsed() >= self.timeout {
                        return Err(LockError::Timeout {
                            dir: self.dir.clone(),
                            timeout_secs: self.timeout.as_secs(),
                        });
                    }

                    tracing::debug!(
                        dir = %self.dir.display(),
                        holder_pid = pid,
                        "Output directory locked by another writer, waiting..."
                    );
                }
                Err(e) => return Err(e),
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Try to acquire the lock without waiting.
    ///
    /// # Errors
    /// Returns `LockError::HeldByOther` if someone else holds it.
    pub fn try_acquire(&self, holder: &str) -> Result<LockGuard, LockError> {
        fs::create_dir_all(&self.dir).map_err(|source| self.io(source))?;
        self.try_lock(&LockMetadata {
            pid: std::process::id(),
            acquired_at: current_timestamp(),
            holder: holder.to_string(),
        })
    }

    /// Check if the lock is currently held
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock_path().exists()
    }

    /// Get information about the current holder
    #[must_use]
    pub fn lock_info(&self) -> Option<LockMetadata> {
        read_lock_metadata(&self.lock_path())
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    fn io(&self, source: io::Error) -> LockError {
        LockError::Io {
            dir: self.dir.clone(),
            source,
        }
    }

    fn try_lock(&self, metadata: &LockMetadata) -> Result<LockGuard, LockError> {
        let lock_path = self.lock_path();
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(mut file) => {
                if let Err(source) = file.write_all(metadata.serialize().as_bytes()) {
                    drop(file);
                    let _ = fs::remove_file(&lock_path);
                    return Err(self.io(source));
                }
                Ok(LockGuard {
                    lock_path,
                    dir: self.dir.clone(),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if let Some(existing) = read_lock_metadata(&lock_path) {
                    let age_secs = current_timestamp().saturating_sub(existing.acquired_at);
                    Err(LockError::HeldByOther {
                        pid: existing.pid,
                        age_secs,
                    })
                } else {
                    // Another writer may sit between create and write; age by mtime
                    Err(LockError::HeldByOther {
                        pid: 0,
                        age_secs: file_age_secs(&lock_path),
                    })
                }
            }
            Err(e) => Err(self.io(e)),
        }
    }
}

/// Guard that releases the lock when dropped
#[derive(Debug)]
pub struct LockGuard {
    lock_path: PathBuf,
    dir: PathBuf,
}

impl LockGuard {
    /// The guarded directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.lock_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Failed to release lock");
            }
        } else {
            tracing::debug!(dir = %self.dir.display(), "Released output lock");
        }
    }
}

fn read_lock_metadata(path: &Path) -> Option<LockMetadata> {
    let mut file = File::open(path).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    LockMetadata::deserialize(&contents)
}

fn file_age_secs(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .map_or(0, |age| age.as_secs())
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_metadata_serialization() {
        let metadata = LockMetadata {
            pid: 12345,
            acquired_at: 1_234_567_890,
            holder: "wfformat:run".to_string(),
        };
        let parsed = LockMetadata::deserialize(&metadata.serialize()).unwrap();
        assert_eq!(parsed, metadata);
        assert!(LockMetadata::deserialize("garbage").is_none());
    }

    #[test]
    fn test_lock_is_exclusive() {
        let tmp = TempDir::new().unwrap();
        let lock = OutputLock::new(tmp.path());

        let guard = lock.try_acquire("first").unwrap();
        assert!(lock.is_locked());
        assert!(matches!(
            lock.try_acquire("second"),
            Err(LockError::HeldByOther { .. })
        ));

        drop(guard);
        assert!(!lock.is_locked());
        let _again = lock.try_acquire("second").unwrap();
    }

    #[test]
    fn test_lock_info() {
        let tmp = TempDir::new().unwrap();
        let lock = OutputLock::new(tmp.path());
        let guard = lock.acquire("generate").unwrap();
        let info = lock.lock_info().unwrap();
        assert_eq!(info.holder, "generate");
        assert_eq!(info.pid, std::process::id());
        assert_eq!(guard.dir(), tmp.path());
    }

    #[test]
    fn test_timeout() {
        let tmp = TempDir::new().unwrap();
        let lock = OutputLock::new(tmp.path()).with_timeout(Duration::from_millis(150));
        let _held = lock.try_acquire("holder").unwrap();
        assert!(matches!(
            lock.acquire("waiter"),
            Err(LockError::Timeout { .. })
        ));
    }

    #[test]
    fn test_stale_lock_is_broken() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LOCK_FILE), "999999:1:crashed").unwrap();
        let lock = OutputLock::new(tmp.path()).with_timeout(Duration::from_millis(50));
        let _guard = lock.acquire("fresh").unwrap();
        assert_eq!(lock.lock_info().unwrap().holder, "fresh");
    }

    #[test]
    fn test_empty_lock_file_is_held() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LOCK_FILE), "").unwrap();
        let lock = OutputLock::new(tmp.path()).with_timeout(Duration::from_millis(300));

        assert!(matches!(
            lock.acquire("second"),
            Err(LockError::Timeout { .. })
        ));
        assert!(tmp.path().join(LOCK_FILE).exists());
        assert!(lock.lock_info().is_none());
    }

    #[test]
    fn test_old_unreadable_lock_is_broken() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LOCK_FILE), "").unwrap();
        thread::sleep(Duration::from_millis(1100));
        let lock = OutputLock::new(tmp.path())
            .with_timeout(Duration::from_millis(50))
            .with_stale_threshold(Duration::ZERO);

        let _guard = lock.acquire("fresh").unwrap();
        assert_eq!(lock.lock_info().unwrap().holder, "fresh");
    }

    #[test]
    fn test_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        let _guard = OutputLock::new(&nested).try_acquire("x").unwrap();
        assert!(nested.join(LOCK_FILE).exists());
    }
}
