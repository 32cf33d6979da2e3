// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository layer.
//!
//! Turn a user declared listing of central repositories into local directories
//! that are ready to read rule files from.
//!
//! # Central Repositories
//!
//! A __central repository__ is where a user keeps their collection of rule
//! files. It comes in two flavors:
//!
//! - __Local__: a plain directory the user manages on their own. Rulem only
//!   checks that it exists and is readable.
//! - __Remote Git__: a remote repository that rulem keeps a shallow clone of
//!   underneath its storage root.
//!
//! # Batch Preparation
//!
//! [`RepositoryManager::prepare_all`] is the main entry point. It works in
//! three phases:
//!
//! 1. Validate the whole listing. Any problem aborts the batch before rulem
//!    touches the file system or the network.
//! 2. Prepare each entry in input order. An entry that fails is reported with
//!    its id and name, and left out of the result. It never stops the others.
//! 3. Synchronize the prepared entries, but only when every entry was
//!    prepared. Otherwise the successes come back unsynchronized together
//!    with the failures.
//!
//! # See Also
//!
//! 1. [`classify`]
//! 2. [`git`]
//! 3. [`sync`]

pub mod classify;
pub mod git;
pub mod local;
pub mod sync;

use crate::{
    config::{RepositoryEntry, RepositoryKind},
    credential::{CredentialStore, KeyringBackend, SecretBackend},
    path::{NoWayHome, PathGuard},
    repo::{
        git::{GitError, GitSource},
        local::{LocalError, LocalSource},
        sync::SyncOutcome,
    },
    validate::{validate_batch, ValidationError},
};

use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};
use tracing::{info, instrument, warn};

/// Prepare and synchronize central repositories.
#[derive(Debug)]
pub struct RepositoryManager<B = KeyringBackend>
where
    B: SecretBackend,
{
    pub(crate) paths: PathGuard,
    pub(crate) credentials: CredentialStore<B>,
}

impl RepositoryManager<KeyringBackend> {
    /// Construct repository manager for the invoking user with the OS secret
    /// store.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory path cannot be determined.
    pub fn for_current_user() -> Result<Self, NoWayHome> {
        Ok(Self::new(
            PathGuard::new()?,
            CredentialStore::new(KeyringBackend::new()),
        ))
    }
}

impl<B> RepositoryManager<B>
where
    B: SecretBackend,
{
    /// Construct new repository manager.
    pub fn new(paths: PathGuard, credentials: CredentialStore<B>) -> Self {
        Self { paths, credentials }
    }

    /// Prepare a single entry.
    ///
    /// Local entries never touch the network. Remote entries get cloned or
    /// updated.
    ///
    /// # Errors
    ///
    /// - Return [`PrepareError`] attributed to the entry if its source fails.
    #[instrument(skip(self, entry), fields(id = %entry.id), level = "debug")]
    pub fn prepare(&self, entry: &RepositoryEntry) -> Result<PreparedRepository, PrepareError> {
        let attribute = |source: SourceError| PrepareError {
            id: entry.id.clone(),
            name: entry.name.clone(),
            source,
        };

        let (local_path, branch_warning) = match entry.kind {
            RepositoryKind::Local => {
                let path = LocalSource::new(&self.paths)
                    .prepare(&entry.path)
                    .map_err(|err| attribute(err.into()))?;
                (path, None)
            }
            RepositoryKind::RemoteGit => {
                let url = entry.remote_url.as_deref().unwrap_or_default();
                let prepared = GitSource::new(&self.paths, &self.credentials)
                    .prepare(url, entry.branch.as_deref(), &entry.path)
                    .map_err(|err| attribute(err.into()))?;
                (prepared.path, prepared.branch_warning)
            }
        };

        info!("prepared {:?} at {:?}", entry.name, local_path.display());
        Ok(PreparedRepository {
            entry: entry.clone(),
            local_path,
            sync: SyncOutcome::not_yet_synced(),
            branch_warning,
        })
    }

    /// Validate, prepare, and synchronize a listing of entries.
    ///
    /// Successfully prepared entries come back in input order together with
    /// their sync outcome. Entries that failed preparation are left out, and
    /// named in the report's error instead. Synchronization is skipped when
    /// any entry failed, so the successes stay `not-yet-synced`.
    ///
    /// # Errors
    ///
    /// - Return [`ValidationError`] if listing is invalid. Nothing is touched
    ///   in that case.
    #[instrument(skip(self, entries), level = "debug")]
    pub fn prepare_all(
        &self,
        entries: &[RepositoryEntry],
    ) -> Result<BatchReport, ValidationError> {
        validate_batch(entries)?;

        let mut repositories = Vec::new();
        let mut failures = Vec::new();
        for entry in entries {
            match self.prepare(entry) {
                Ok(prepared) => repositories.push(prepared),
                Err(err) => {
                    warn!("{err}");
                    failures.push(err);
                }
            }
        }

        if !failures.is_empty() {
            return Ok(BatchReport {
                repositories,
                error: Some(BatchError { failures }),
            });
        }

        if !repositories.is_empty() {
            let mut outcomes = entries
                .iter()
                .zip(self.sync_all(entries))
                .map(|(entry, outcome)| (entry.id.clone(), outcome))
                .collect::<HashMap<_, _>>();

            for prepared in &mut repositories {
                if let Some(outcome) = outcomes.remove(&prepared.entry.id) {
                    prepared.sync = outcome;
                }
            }
        }

        Ok(BatchReport {
            repositories,
            error: None,
        })
    }
}

/// Entry that is ready to read rule files from.
#[derive(Debug)]
pub struct PreparedRepository {
    /// Entry as declared by the user.
    pub entry: RepositoryEntry,

    /// Absolute, clean path to the repository's files.
    pub local_path: PathBuf,

    /// Outcome of synchronization.
    pub sync: SyncOutcome,

    /// Configured branch could not be checked out.
    pub branch_warning: Option<GitError>,
}

/// Outcome of batch preparation.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully prepared entries in input order.
    pub repositories: Vec<PreparedRepository>,

    /// Entries that failed preparation, if any.
    pub error: Option<BatchError>,
}

impl BatchReport {
    /// Check if any entry failed preparation or synchronization.
    pub fn has_failures(&self) -> bool {
        self.error.is_some() || self.repositories.iter().any(|repo| repo.sync.is_failed())
    }
}

/// Aggregated preparation failures of a batch.
#[derive(Debug)]
pub struct BatchError {
    /// Failures in input order.
    pub failures: Vec<PrepareError>,
}

impl Display for BatchError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "failed to prepare {} repositor{}:",
            self.failures.len(),
            if self.failures.len() == 1 { "y" } else { "ies" }
        )?;
        for failure in &self.failures {
            write!(fmt, "\n  - {failure}")?;
        }

        Ok(())
    }
}

impl std::error::Error for BatchError {}

/// Preparation failure attributed to an entry.
#[derive(Debug, thiserror::Error)]
#[error("repository {name:?} ({id}): {source}")]
pub struct PrepareError {
    pub id: String,
    pub name: String,
    #[source]
    pub source: SourceError,
}

/// Failure of the source an entry was dispatched to.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Local(#[from] LocalError),

    #[error(transparent)]
    Git(#[from] GitError),
}
