// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Local directory source.
//!
//! A local central repository is just a directory the user already manages.
//! Rulem only confirms that it exists and can be read; it never writes to it.

use crate::path::{PathError, PathGuard};

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Source for local directory repositories.
#[derive(Debug, Clone)]
pub struct LocalSource<'guard> {
    paths: &'guard PathGuard,
}

impl<'guard> LocalSource<'guard> {
    /// Construct new local source on top of a path guard.
    pub fn new(paths: &'guard PathGuard) -> Self {
        Self { paths }
    }

    /// Validate local directory, and return its absolute path.
    ///
    /// # Errors
    ///
    /// - Return [`LocalError::EmptyPath`] if path is blank.
    /// - Return [`LocalError::InvalidPath`] if path fails security checks.
    /// - Return [`LocalError::MissingDirectory`] if nothing exists at path.
    /// - Return [`LocalError::NotADirectory`] if path is not a directory.
    /// - Return [`LocalError::AccessDenied`] if directory cannot be read.
    #[instrument(skip(self, path), level = "debug")]
    pub fn prepare(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let raw = path.as_ref().to_string_lossy();
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LocalError::EmptyPath);
        }

        let path = self.paths.resolve(raw)?;
        let metadata = fs::metadata(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => LocalError::MissingDirectory { path: path.clone() },
            _ => LocalError::AccessDenied {
                path: path.clone(),
                source: err,
            },
        })?;

        if !metadata.is_dir() {
            return Err(LocalError::NotADirectory { path });
        }

        fs::read_dir(&path).map_err(|err| LocalError::AccessDenied {
            path: path.clone(),
            source: err,
        })?;

        debug!("local repository ready at {:?}", path.display());
        Ok(path)
    }
}

/// Local source errors.
#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    #[error("local repository path is empty")]
    EmptyPath,

    #[error("invalid local repository path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("local repository directory {path:?} does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("local repository path {path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("cannot read local repository directory {path:?}: {source}")]
    AccessDenied {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Friendly result alias :3
type Result<T, E = LocalError> = std::result::Result<T, E>;
