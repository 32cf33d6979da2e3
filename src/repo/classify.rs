// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory conflict classification.
//!
//! Before a remote repository gets cloned into a directory, rulem needs to
//! know what already sits there. The classifier only ever reads; deciding
//! what to do about the answer is left to the Git source.

use crate::url::same_remote;

use git2::{ErrorCode, Repository};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    io::ErrorKind,
    path::Path,
};
use tracing::{debug, instrument};

/// What occupies a prospective clone destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryClassification {
    /// Nothing there, or an empty directory. Safe to clone into.
    Empty,

    /// Git repository whose origin matches the expected remote.
    SameRepo,

    /// Git repository pointing at some other remote.
    DifferentRepo { found: String },

    /// Files that are not a Git repository.
    NonGitContent,

    /// Directory could not be inspected.
    Error(String),
}

impl Display for DirectoryClassification {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Empty => fmt.write_str("empty directory"),
            Self::SameRepo => fmt.write_str("clone of the same repository"),
            Self::DifferentRepo { found } => {
                write!(fmt, "clone of a different repository ({found})")
            }
            Self::NonGitContent => fmt.write_str("non-git content"),
            Self::Error(reason) => write!(fmt, "cannot inspect directory: {reason}"),
        }
    }
}

/// Classify what occupies `path` relative to the expected remote URL.
///
/// Origin URLs are compared in normalized `<host>/<owner>/<repo>` form, so an
/// SSH clone counts as the same repository as its HTTPS counterpart.
#[instrument(skip(path, expected_url), level = "debug")]
pub fn classify(path: impl AsRef<Path>, expected_url: &str) -> DirectoryClassification {
    let path = path.as_ref();
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return DirectoryClassification::Empty,
        Err(err) => return DirectoryClassification::Error(err.to_string()),
    };

    if !metadata.is_dir() {
        return DirectoryClassification::Error("not a directory".into());
    }

    match fs::read_dir(path) {
        Ok(mut entries) => {
            if entries.next().is_none() {
                return DirectoryClassification::Empty;
            }
        }
        Err(err) => return DirectoryClassification::Error(err.to_string()),
    }

    // INVARIANT: Only the directory itself counts, never a parent repository.
    let repo = match Repository::open(path) {
        Ok(repo) => repo,
        Err(err) if err.code() == ErrorCode::NotFound => {
            return DirectoryClassification::NonGitContent
        }
        Err(err) => return DirectoryClassification::Error(err.message().into()),
    };

    let remote = match repo.find_remote("origin") {
        Ok(remote) => remote,
        Err(_) => return DirectoryClassification::Error("repository has no origin remote".into()),
    };

    let Some(found) = remote.url() else {
        return DirectoryClassification::Error("origin remote has no URL".into());
    };

    debug!("compare origin {found:?} against {expected_url:?}");
    if same_remote(found, expected_url) {
        DirectoryClassification::SameRepo
    } else {
        DirectoryClassification::DifferentRepo {
            found: found.into(),
        }
    }
}
