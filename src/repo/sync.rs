// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Synchronization of prepared repositories.
//!
//! Synchronization is a fetch-only pass over a listing of entries. Every
//! entry gets exactly one [`SyncOutcome`], in input order, no matter how the
//! other entries fare.

use crate::{
    config::RepositoryEntry,
    credential::SecretBackend,
    path::PathError,
    repo::{
        git::{is_clean, GitError, GitSource},
        RepositoryManager,
    },
};

use git2::Repository;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{info, instrument, warn};

/// Reason an entry was not synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry is a local directory.
    NotARemote,

    /// Clone has uncommitted changes or untracked files.
    UncommittedChanges,

    /// Entry was prepared, but synchronization has not run yet.
    NotYetSynced,
}

impl SkipReason {
    /// Stable machine readable form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotARemote => "not-a-remote",
            Self::UncommittedChanges => "uncommitted-changes",
            Self::NotYetSynced => "not-yet-synced",
        }
    }
}

impl Display for SkipReason {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Result of synchronizing one entry.
#[derive(Debug)]
pub enum SyncOutcome {
    Success { elapsed: Duration },
    Failed { error: SyncError, elapsed: Duration },
    Skipped { reason: SkipReason, elapsed: Duration },
}

impl SyncOutcome {
    /// Outcome of an entry that has not been synchronized yet.
    pub fn not_yet_synced() -> Self {
        Self::Skipped {
            reason: SkipReason::NotYetSynced,
            elapsed: Duration::ZERO,
        }
    }

    /// Time spent on the entry.
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Success { elapsed }
            | Self::Failed { elapsed, .. }
            | Self::Skipped { elapsed, .. } => *elapsed,
        }
    }

    /// Check if synchronization failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Reason for skipping, if skipped.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl Display for SyncOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Success { elapsed } => write!(fmt, "synced in {elapsed:.2?}"),
            Self::Failed { error, elapsed } => {
                write!(fmt, "failed after {elapsed:.2?}: {error}")
            }
            Self::Skipped { reason, .. } => write!(fmt, "skipped ({reason})"),
        }
    }
}

impl<B> RepositoryManager<B>
where
    B: SecretBackend,
{
    /// Synchronize entries one after another.
    ///
    /// Returns one outcome per entry in input order. Local entries are
    /// skipped, dirty clones are skipped, clean clones are fetched and moved
    /// to their upstream commit.
    #[instrument(skip(self, entries), level = "debug")]
    pub fn sync_all(&self, entries: &[RepositoryEntry]) -> Vec<SyncOutcome> {
        entries.iter().map(|entry| self.sync_one(entry)).collect()
    }

    /// Synchronize a single entry.
    pub fn sync_one(&self, entry: &RepositoryEntry) -> SyncOutcome {
        let start = Instant::now();
        if !entry.is_remote() {
            return SyncOutcome::Skipped {
                reason: SkipReason::NotARemote,
                elapsed: start.elapsed(),
            };
        }

        let outcome = match self.try_sync(entry) {
            Ok(None) => SyncOutcome::Success {
                elapsed: start.elapsed(),
            },
            Ok(Some(reason)) => SyncOutcome::Skipped {
                reason,
                elapsed: start.elapsed(),
            },
            Err(error) => SyncOutcome::Failed {
                error,
                elapsed: start.elapsed(),
            },
        };

        match &outcome {
            SyncOutcome::Failed { error, .. } => {
                warn!("sync of {:?} failed: {error}", entry.name)
            }
            outcome => info!("sync of {:?}: {outcome}", entry.name),
        }

        outcome
    }

    fn try_sync(&self, entry: &RepositoryEntry) -> Result<Option<SkipReason>> {
        let path = self.paths.resolve(entry.path.trim())?;
        let status_err = |source| SyncError::Status {
            path: path.clone(),
            source,
        };

        let repo = Repository::open(&path).map_err(status_err)?;
        if !is_clean(&repo).map_err(status_err)? {
            return Ok(Some(SkipReason::UncommittedChanges));
        }

        GitSource::new(&self.paths, &self.credentials).refresh(&repo)?;

        Ok(None)
    }
}

/// Synchronization errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("cannot read status of {path:?}: {source}")]
    Status { path: PathBuf, source: git2::Error },

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Friendly result alias :3
type Result<T, E = SyncError> = std::result::Result<T, E>;
