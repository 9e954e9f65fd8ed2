//! Exclusive access to the deck file.
//!
//! Presentation editors keep the deck open while a slideshow runs and leave
//! an owner file named `~$<deck file name>` next to it. [`DeckLock`] polls
//! until the deck can be opened for writing and removes the owner file when
//! it goes out of scope, whatever the outcome of the run.

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bounded exponential backoff for lock polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Path of the editor owner file for `deck`.
pub fn owner_file_for(deck: &Path) -> PathBuf {
    let name = deck
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    deck.with_file_name(format!("~${}", name))
}

/// Scoped hold on the deck.
#[derive(Debug)]
pub struct DeckLock {
    path: PathBuf,
    owner_file: PathBuf,
    attempts: u32,
}

impl DeckLock {
    /// Wait until the deck can be opened for appending.
    pub async fn acquire(path: &Path, policy: &LockPolicy) -> Result<Self> {
        Self::acquire_with(path, policy, |p| OpenOptions::new().append(true).open(p).map(drop)).await
    }

    pub(crate) async fn acquire_with<F>(path: &Path, policy: &LockPolicy, mut probe: F) -> Result<Self>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let owner_file = owner_file_for(path);
        remove_owner_file(&owner_file);

        let started = Instant::now();
        let mut backoff = policy.initial_backoff;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match probe(path) {
                Ok(()) => {
                    info!(path = %path.display(), attempts, "deck lock acquired");
                    return Ok(Self {
                        path: path.to_path_buf(),
                        owner_file,
                        attempts,
                    });
                },
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(Error::DeckNotFound(path.to_path_buf()));
                },
                Err(e) => {
                    let waited = started.elapsed();
                    if waited >= policy.timeout {
                        warn!(path = %path.display(), attempts, error = %e, "deck still locked");
                        return Err(Error::LockTimeout {
                            path: path.to_path_buf(),
                            waited,
                        });
                    }
                    debug!(attempts, error = %e, ?backoff, "deck busy, retrying");
                    let remaining = policy.timeout - waited;
                    tokio::time::sleep(backoff.min(remaining)).await;
                    backoff = (backoff * 2).min(policy.max_backoff);
                },
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Probes needed before the deck was free.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Drop for DeckLock {
    fn drop(&mut self) {
        remove_owner_file(&self.owner_file);
        debug!(path = %self.path.display(), "deck lock released");
    }
}

fn remove_owner_file(owner_file: &Path) {
    match std::fs::remove_file(owner_file) {
        Ok(()) => debug!(path = %owner_file.display(), "removed owner file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => warn!(path = %owner_file.display(), error = %e, "cannot remove owner file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_policy() -> LockPolicy {
        LockPolicy {
            timeout: Duration::from_millis(200),
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
        }
    }

    fn busy() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "sharing violation")
    }

    #[test]
    fn test_owner_file_name() {
        assert_eq!(
            owner_file_for(Path::new("/signage/DisplayFinal.pptx")),
            PathBuf::from("/signage/~$DisplayFinal.pptx")
        );
    }

    #[tokio::test]
    async fn test_acquire_free_deck_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("DisplayFinal.pptx");
        std::fs::write(&deck, b"deck").unwrap();
        let owner = owner_file_for(&deck);
        std::fs::write(&owner, b"stale").unwrap();

        let lock = DeckLock::acquire(&deck, &quick_policy()).await.unwrap();
        assert_eq!(lock.attempts(), 1);
        assert!(!owner.exists());

        // An editor reopening the deck while we hold it
        std::fs::write(&owner, b"editor").unwrap();
        drop(lock);
        assert!(!owner.exists());
        assert_eq!(std::fs::read(&deck).unwrap(), b"deck");
    }

    #[tokio::test]
    async fn test_retries_until_free() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("deck.pptx");
        let mut calls = 0;

        let lock = DeckLock::acquire_with(&deck, &quick_policy(), |_| {
            calls += 1;
            if calls < 3 { Err(busy()) } else { Ok(()) }
        })
        .await
        .unwrap();
        assert_eq!(lock.attempts(), 3);
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("deck.pptx");
        let started = Instant::now();

        let err = DeckLock::acquire_with(&deck, &quick_policy(), |_| Err(busy()))
            .await
            .unwrap_err();
        match err {
            Error::LockTimeout { path, waited } => {
                assert_eq!(path, deck);
                assert!(waited >= Duration::from_millis(200));
            },
            other => panic!("unexpected error {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_deck_is_fatal_without_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("missing.pptx");
        let err = DeckLock::acquire(&deck, &quick_policy()).await.unwrap_err();
        assert!(matches!(err, Error::DeckNotFound(p) if p == deck));
    }
}
