use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::core::error::StorageError;

const INITIAL_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

static NONCE: AtomicU64 = AtomicU64::new(0);

/// Exclusive lock on one day file, held as a sibling `<file>.lock` that
/// carries the owner's token. Released when dropped, only if still owned.
#[derive(Debug)]
pub struct DayLock {
    path: PathBuf,
    token: String,
}

impl DayLock {
    pub fn lock_path(day_file: &Path) -> PathBuf {
        let mut name = day_file.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Take the lock for `day_file`, waiting up to `timeout`. A lock file older
    /// than `stale_after` is assumed abandoned and broken.
    pub fn acquire(
        day_file: &Path,
        timeout: Duration,
        stale_after: Duration,
    ) -> Result<Self, StorageError> {
        let path = Self::lock_path(day_file);
        let token = new_token();
        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;
        let mut contended = false;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    if let Err(source) = file.write_all(token.as_bytes()) {
                        drop(file);
                        let _ = std::fs::remove_file(&path);
                        return Err(StorageError::Lock { path, source });
                    }
                    if contended {
                        tracing::debug!(
                            lock = %path.display(),
                            waited_ms = started.elapsed().as_millis() as u64,
                            "acquired contended day lock"
                        );
                    }
                    return Ok(Self { path, token });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    contended = true;
                    if is_stale(&path, stale_after) {
                        if let Some(stale_token) = read_token(&path) {
                            tracing::warn!(lock = %path.display(), "breaking stale day lock");
                            remove_if_owned(&path, &stale_token, &token, Some(stale_after))
                                .map_err(|source| StorageError::Lock {
                                    path: path.clone(),
                                    source,
                                })?;
                            continue;
                        }
                    }
                    let waited = started.elapsed();
                    if waited >= timeout {
                        return Err(StorageError::LockTimeout {
                            path,
                            waited_ms: waited.as_millis() as u64,
                        });
                    }
                    std::thread::sleep(backoff);
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(source) => return Err(StorageError::Lock { path, source }),
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DayLock {
    fn drop(&mut self) {
        if let Err(e) = remove_if_owned(&self.path, &self.token, &self.token, None) {
            tracing::warn!(lock = %self.path.display(), "failed to release day lock: {}", e);
        }
    }
}

/// `<pid>-<nanos>-<counter>`, unique per acquisition on this host.
fn new_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!(
        "{}-{}-{}",
        std::process::id(),
        nanos,
        NONCE.fetch_add(1, Ordering::Relaxed)
    )
}

fn read_token(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

/// Remove the lock at `path` only if it still carries `expected` (and, when
/// breaking, is still older than `stale_after`). The file is first renamed
/// aside (`<lock>.<mover>`) so exactly one caller can take it; a lock that
/// changed hands in the meantime is linked back into place.
fn remove_if_owned(
    path: &Path,
    expected: &str,
    mover: &str,
    stale_after: Option<Duration>,
) -> std::io::Result<bool> {
    let mut aside = path.as_os_str().to_owned();
    aside.push(format!(".{}", mover));
    let aside = PathBuf::from(aside);

    match std::fs::rename(path, &aside) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    }

    let still_stale = stale_after.map_or(true, |d| is_stale(&aside, d));
    if still_stale && read_token(&aside).as_deref() == Some(expected) {
        std::fs::remove_file(&aside)?;
        return Ok(true);
    }

    // Not the lock we meant to remove: restore it unless a newer one exists.
    let _ = std::fs::hard_link(&aside, path);
    std::fs::remove_file(&aside)?;
    Ok(false)
}

fn is_stale(path: &Path, stale_after: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .map(|age| age > stale_after)
        .unwrap_or(false)
}
