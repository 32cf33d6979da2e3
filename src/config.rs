// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for rulem's configuration file to simplify the process
//! of serialization and deserialization. The configuration file is a plain
//! TOML listing of central repositories:
//!
//! ```toml
//! [[repository]]
//! id = "team-rules-1700000000"
//! name = "Team Rules"
//! type = "remote-git"
//! created_at = 1700000000
//! path = "$XDG_DATA_HOME/rulem/rules"
//! remote_url = "git@github.com:acme/rules.git"
//! branch = "main"
//! ```
//!
//! Environment variables in `path` fields are expanded when the file is
//! parsed. Everything else is taken verbatim; structural validation of the
//! entries happens in [`crate::validate`].

use crate::{
    path::{PathError, PathGuard},
    url::{GitUrl, UrlError},
    validate::{validate_batch, ValidationError},
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info, instrument};

/// Rulem configuration file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Central repositories in the order the user declared them.
    #[serde(rename = "repository", default)]
    pub repositories: Vec<RepositoryEntry>,
}

impl Config {
    /// Load configuration file.
    ///
    /// A missing configuration file is treated as an empty configuration.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Io`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file contents are malformed.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no configuration at {:?}, using empty one", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io {
                path: path.into(),
                source: err,
            }),
        }
    }

    /// Save configuration file.
    ///
    /// The parent directory is created inside the user's home directory when
    /// missing.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Path`] if parent directory is unsafe or
    ///   cannot be created.
    /// - Return [`ConfigError::Io`] if file cannot be written.
    #[instrument(skip(self, guard, path), level = "debug")]
    pub fn save(&self, guard: &PathGuard, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            guard.ensure_writable_dir(parent)?;
        }

        fs::write(path, self.to_string()).map_err(|err| ConfigError::Io {
            path: path.into(),
            source: err,
        })?;
        info!("configuration saved to {:?}", path.display());

        Ok(())
    }

    /// Append repository entry after validating it against existing ones.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Validation`] if resulting listing is invalid.
    pub fn add_repository(&mut self, entry: RepositoryEntry) -> Result<()> {
        let mut candidate = self.repositories.clone();
        candidate.push(entry);
        validate_batch(&candidate)?;
        self.repositories = candidate;

        Ok(())
    }

    /// Remove repository entry by id or name.
    ///
    /// Returns removed entry if any matched.
    pub fn remove_repository(&mut self, key: &str) -> Option<RepositoryEntry> {
        let index = self.repositories.iter().position(|entry| {
            entry.id == key || entry.name.trim().to_lowercase() == key.trim().to_lowercase()
        })?;
        Some(self.repositories.remove(index))
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on path fields.
        for entry in &mut config.repositories {
            entry.path = shellexpand::full(&entry.path)
                .map_err(ConfigError::ShellExpansion)?
                .into_owned();
        }

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Kind of central repository.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepositoryKind {
    /// Plain directory on the local file system.
    #[default]
    Local,

    /// Clone of a remote Git repository.
    RemoteGit,
}

impl Display for RepositoryKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Local => fmt.pad("local"),
            Self::RemoteGit => fmt.pad("remote-git"),
        }
    }
}

/// User declared central repository.
///
/// Optional remote fields are kept flat so that invalid combinations coming
/// out of a configuration file can be reported by validation instead of
/// failing deserialization with a vague message.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct RepositoryEntry {
    /// Stable identifier of the form `<slug>-<unix-timestamp>`.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Kind of repository.
    #[serde(rename = "type")]
    pub kind: RepositoryKind,

    /// Creation time as Unix timestamp.
    pub created_at: i64,

    /// Local directory, or clone destination for remote repositories.
    pub path: String,

    /// Remote URL to clone from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    /// Branch to check out instead of the remote's default branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Time of last successful synchronization. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<i64>,
}

impl RepositoryEntry {
    /// Construct new local repository entry.
    pub fn local(name: impl Into<String>, path: impl AsRef<Path>, created_at: i64) -> Self {
        let name = name.into();
        Self {
            id: generate_id(&name, created_at),
            name,
            kind: RepositoryKind::Local,
            created_at,
            path: path.as_ref().to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    /// Construct new remote repository entry.
    ///
    /// Clone destination defaults to `<storage_root>/<repo>` when no path is
    /// given.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Url`] if remote URL cannot be parsed.
    pub fn remote(
        name: impl Into<String>,
        url: impl Into<String>,
        branch: Option<String>,
        path: Option<PathBuf>,
        storage_root: impl AsRef<Path>,
        created_at: i64,
    ) -> Result<Self> {
        let name = name.into();
        let url = url.into();
        let path = match path {
            Some(path) => path,
            None => url.parse::<GitUrl>()?.clone_path(storage_root),
        };

        Ok(Self {
            id: generate_id(&name, created_at),
            name,
            kind: RepositoryKind::RemoteGit,
            created_at,
            path: path.to_string_lossy().into_owned(),
            remote_url: Some(url),
            branch,
            last_sync_time: None,
        })
    }

    /// Check if entry is a remote Git repository.
    pub fn is_remote(&self) -> bool {
        self.kind == RepositoryKind::RemoteGit
    }
}

/// Generate repository id from display name and timestamp.
///
/// The name is reduced to a lowercase slug of `[a-z0-9-]`, falling back to
/// "repo" when nothing usable remains.
pub fn generate_id(name: &str, timestamp: i64) -> String {
    let mut slug = String::new();
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "repo" } else { slug };

    format!("{slug}-{timestamp}")
}

/// Current time as Unix timestamp.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Configuration file cannot be read or written.
    #[error("cannot access configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration directory is unsafe or unusable.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Remote URL of new entry is malformed.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// Repository listing violates validation rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
