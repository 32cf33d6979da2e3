// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git remote URL parsing.
//!
//! Rulem accepts remote repositories in two forms:
//!
//! - SSH: `git@<host>:<owner>/<repo>[.git]`
//! - HTTP(S): `http[s]://<host>/<owner>/<repo>[.git]`
//!
//! Both forms are broken down into a [`GitUrl`]. From there rulem derives
//! the HTTPS URL it actually clones from, the default clone path, and a
//! normalized `<host>/<owner>/<repo>` key that is only ever used to decide
//! whether two URLs name the same remote.

use regex::Regex;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};
use url::Url;

static SSH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@([^:/]+):([^/]+)/([^/]+?)(?:\.git)?/?$").expect("valid ssh url pattern")
});

/// Components of a Git remote URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GitUrl {
    /// Host name, lowercased, including a non-default port if present.
    pub host: String,

    /// Owner of the repository, e.g., user or organization.
    pub owner: String,

    /// Name of the repository without any ".git" extension.
    pub repo: String,
}

impl GitUrl {
    /// Normalized `<host>/<owner>/<repo>` form for equality checks.
    pub fn normalized(&self) -> String {
        format!("{}/{}/{}", self.host, self.owner, self.repo)
    }

    /// HTTPS URL used to clone and fetch the repository.
    pub fn https_url(&self) -> String {
        format!("https://{}/{}/{}.git", self.host, self.owner, self.repo)
    }

    /// Deterministic clone path underneath a storage root.
    ///
    /// Remotes that share a repository name map onto the same path. Such a
    /// collision is not resolved here; it surfaces as a directory conflict
    /// when the second remote is prepared.
    pub fn clone_path(&self, storage_root: impl AsRef<Path>) -> PathBuf {
        storage_root.as_ref().join(&self.repo)
    }
}

impl FromStr for GitUrl {
    type Err = UrlError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(UrlError::Empty);
        }

        if let Some(captures) = SSH_URL.captures(raw) {
            return Self::from_parts(raw, &captures[1], &captures[2], &captures[3]);
        }

        let invalid = || UrlError::Invalid { url: raw.into() };
        let url = Url::parse(raw).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid());
        }

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(invalid()),
        };

        let mut segments = url
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|segment| !segment.is_empty());
        let owner = segments.next().ok_or_else(invalid)?;
        let repo = segments.next().ok_or_else(invalid)?;

        Self::from_parts(raw, &host, owner, repo)
    }
}

impl GitUrl {
    fn from_parts(raw: &str, host: &str, owner: &str, repo: &str) -> Result<Self, UrlError> {
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if host.is_empty() || owner.is_empty() || repo.is_empty() {
            return Err(UrlError::Invalid { url: raw.into() });
        }

        Ok(Self {
            host: host.to_lowercase(),
            owner: owner.into(),
            repo: repo.into(),
        })
    }
}

impl Display for GitUrl {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.https_url())
    }
}

/// Normalize URL into its `<host>/<owner>/<repo>` form.
///
/// # Errors
///
/// - Return [`UrlError`] if URL cannot be parsed.
pub fn normalize(url: &str) -> Result<String, UrlError> {
    Ok(url.parse::<GitUrl>()?.normalized())
}

/// Comparison key for arbitrary remote URLs.
///
/// Falls back to the trimmed URL without a ".git" suffix when the URL is not
/// one of the accepted Git URL forms, e.g., a local file system remote.
pub fn comparison_key(url: &str) -> String {
    match normalize(url) {
        Ok(normalized) => normalized,
        Err(_) => {
            let url = url.trim().trim_end_matches('/');
            url.strip_suffix(".git").unwrap_or(url).to_string()
        }
    }
}

/// Determine if two URLs name the same remote repository.
pub fn same_remote(lhs: &str, rhs: &str) -> bool {
    comparison_key(lhs) == comparison_key(rhs)
}

/// URL parsing errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("remote URL is empty")]
    Empty,

    #[error("invalid Git URL {url:?}: expected git@<host>:<owner>/<repo> or https://<host>/<owner>/<repo>")]
    Invalid { url: String },
}
