// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution and security utilities.
//!
//! Determine relevent path information for central rule repositories, and
//! make sure that any path handed to us by the user is safe to read from or
//! write into.
//!
//! # Path Security
//!
//! Every user supplied path goes through a [`PathGuard`] before rulem touches
//! it. The guard expands a leading `~` to the user's home directory, rejects
//! traversal through `..` components, embedded null bytes, relative paths, and
//! paths that point into reserved operating system directories. Equality
//! checks are lexical only, so symlinks are not resolved during validation.
//!
//! Setup-time directory creation is stricter. A directory created through
//! [`PathGuard::ensure_writable_dir`] must live inside the user's home
//! directory, both lexically and after symlink resolution, so a symlink placed
//! inside the home directory cannot redirect writes elsewhere.

use std::{
    fs::{self, DirBuilder, OpenOptions},
    io::{self, Write},
    path::{Component, Path, PathBuf},
};
use tracing::{debug, instrument};

/// Short application name used for storage and configuration directories.
pub const APP_NAME: &str = "rulem";

const SENTINEL_FILE: &str = ".rulem-write-probe";

#[cfg(unix)]
const RESERVED_ROOTS: &[&str] = &[
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/lib",
    "/lib32",
    "/lib64",
    "/proc",
    "/run",
    "/sbin",
    "/sys",
    "/usr",
    "/System",
    "/Library",
    "/private/etc",
];

#[cfg(windows)]
const RESERVED_ROOTS: &[&str] = &[r"C:\Windows", r"C:\Program Files", r"C:\Program Files (x86)"];

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf, NoWayHome> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to the central repository storage root.
///
/// Uses the platform's local data directory joined with [`APP_NAME`], e.g.,
/// `$XDG_DATA_HOME/rulem` on Linux. Remote repositories are cloned underneath
/// this directory unless the user picks another destination. Does not check
/// if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_storage_dir() -> Result<PathBuf, NoWayHome> {
    dirs::data_local_dir()
        .map(|path| path.join(APP_NAME))
        .ok_or(NoWayHome)
}

/// Determine default absolute path to rulem's configuration file.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_config_file() -> Result<PathBuf, NoWayHome> {
    dirs::config_dir()
        .map(|path| path.join(APP_NAME).join("config.toml"))
        .ok_or(NoWayHome)
}

/// Validate user supplied paths against a fixed home directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathGuard {
    home: PathBuf,
}

impl PathGuard {
    /// Construct new path guard for the invoking user.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory path cannot be determined.
    pub fn new() -> Result<Self, NoWayHome> {
        Ok(Self::with_home(home_dir()?))
    }

    /// Construct new path guard around an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: clean(home.into()),
        }
    }

    /// Home directory that `~` expands to.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Expand a leading `~` component to the home directory.
    ///
    /// Only a bare `~` or a `~/` prefix is expanded. Forms like `~user` are
    /// left untouched and later rejected as relative paths.
    pub fn expand(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let Some(raw) = path.to_str() else {
            return path.to_path_buf();
        };

        PathBuf::from(
            shellexpand::tilde_with_context(raw, || self.home.to_str()).as_ref(),
        )
    }

    /// Expand, clean, and security-validate a path.
    ///
    /// Returns the absolute, lexically clean form of the path. Does not touch
    /// the file system.
    ///
    /// # Errors
    ///
    /// - Return [`PathError::Empty`] if the path is empty.
    /// - Return [`PathError::NullByte`] if the path contains a null byte.
    /// - Return [`PathError::Traversal`] if the path contains `..`.
    /// - Return [`PathError::NotAbsolute`] if the path is relative after
    ///   expansion.
    /// - Return [`PathError::Reserved`] if the path lies in a reserved root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let raw = path.as_ref();
        if raw.as_os_str().is_empty() {
            return Err(PathError::Empty);
        }

        if raw.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(PathError::NullByte {
                path: raw.to_path_buf(),
            });
        }

        let expanded = self.expand(raw);
        if expanded
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(PathError::Traversal { path: expanded });
        }

        if !expanded.is_absolute() {
            return Err(PathError::NotAbsolute { path: expanded });
        }

        let cleaned = clean(expanded);
        if let Some(root) = reserved_root(&cleaned) {
            return Err(PathError::Reserved {
                path: cleaned,
                root,
            });
        }

        Ok(cleaned)
    }

    /// Resolve path, and require that it lives inside the home directory.
    ///
    /// # Errors
    ///
    /// - Return any error of [`PathGuard::resolve`].
    /// - Return [`PathError::OutsideHome`] if path is not inside home.
    pub fn resolve_in_home(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let resolved = self.resolve(path)?;
        if !resolved.starts_with(&self.home) {
            return Err(PathError::OutsideHome {
                path: resolved,
                home: self.home.clone(),
            });
        }

        Ok(resolved)
    }

    /// Make sure a directory inside the home directory exists and is writable.
    ///
    /// Missing directories are created with mode 0o755. Writability is probed
    /// by creating and removing a small sentinel file.
    ///
    /// # Errors
    ///
    /// - Return any error of [`PathGuard::resolve_in_home`].
    /// - Return [`PathError::SymlinkEscape`] if the path resolves outside home
    ///   once symlinks are followed.
    /// - Return [`PathError::Io`] if the directory cannot be created.
    /// - Return [`PathError::NotWritable`] if the sentinel probe fails.
    #[instrument(skip(self, path), level = "debug")]
    pub fn ensure_writable_dir(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let resolved = self.resolve_in_home(path)?;
        let real_home = fs::canonicalize(&self.home).map_err(|err| PathError::Io {
            path: self.home.clone(),
            source: err,
        })?;

        // INVARIANT: Nearest existing ancestor must already sit inside home.
        let ancestor = resolved
            .ancestors()
            .find(|ancestor| ancestor.exists())
            .unwrap_or(&self.home);
        self.confine(ancestor, &real_home, &resolved)?;

        if !resolved.exists() {
            debug!("create directory {:?}", resolved.display());
            create_dir_all(&resolved).map_err(|err| PathError::Io {
                path: resolved.clone(),
                source: err,
            })?;
        } else if !resolved.is_dir() {
            return Err(PathError::Io {
                path: resolved.clone(),
                source: io::Error::other("not a directory"),
            });
        }

        self.confine(&resolved, &real_home, &resolved)?;
        probe_writable(&resolved)?;

        Ok(resolved)
    }

    fn confine(&self, path: &Path, real_home: &Path, requested: &Path) -> Result<()> {
        let real = fs::canonicalize(path).map_err(|err| PathError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;

        if !real.starts_with(real_home) {
            return Err(PathError::SymlinkEscape {
                path: requested.to_path_buf(),
                target: real,
            });
        }

        Ok(())
    }
}

/// Recursively create directory with mode 0o755.
///
/// # Errors
///
/// - Return [`io::Error`] if any directory cannot be created.
pub fn create_dir_all(path: impl AsRef<Path>) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(path.as_ref())
}

/// Lexically clean path by dropping `.` components and redundant separators.
pub fn clean(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref()
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

fn reserved_root(path: &Path) -> Option<PathBuf> {
    if path.parent().is_none() {
        return Some(path.to_path_buf());
    }

    RESERVED_ROOTS
        .iter()
        .map(Path::new)
        .find(|root| path.starts_with(root))
        .map(Path::to_path_buf)
}

fn probe_writable(dir: &Path) -> Result<()> {
    let sentinel = dir.join(SENTINEL_FILE);
    let outcome = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&sentinel)
        .and_then(|mut file| file.write_all(b"rulem"));
    let cleanup = fs::remove_file(&sentinel);

    outcome
        .and(cleanup)
        .map_err(|err| PathError::NotWritable {
            path: dir.to_path_buf(),
            source: err,
        })
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Path security violations and file system failures.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path {path:?} contains a null byte")]
    NullByte { path: PathBuf },

    #[error("path {path:?} contains '..' traversal")]
    Traversal { path: PathBuf },

    #[error("path {path:?} is not absolute")]
    NotAbsolute { path: PathBuf },

    #[error("path {path:?} lies inside reserved system directory {root:?}")]
    Reserved { path: PathBuf, root: PathBuf },

    #[error("path {path:?} is outside of home directory {home:?}")]
    OutsideHome { path: PathBuf, home: PathBuf },

    #[error("path {path:?} escapes home directory through symlink to {target:?}")]
    SymlinkEscape { path: PathBuf, target: PathBuf },

    #[error("path {path:?} is not writable: {source}")]
    NotWritable { path: PathBuf, source: io::Error },

    #[error("file system operation on {path:?} failed: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

/// Friendly result alias :3
type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn guard() -> PathGuard {
        PathGuard::with_home("/home/blah")
    }

    #[test_case("~", "/home/blah"; "bare tilde")]
    #[test_case("~/rules", "/home/blah/rules"; "tilde prefix")]
    #[test_case("/srv/rules", "/srv/rules"; "absolute untouched")]
    #[test_case("~other/rules", "~other/rules"; "other user untouched")]
    #[test_case("/srv/~/rules", "/srv/~/rules"; "inner tilde untouched")]
    #[test]
    fn expand_home_prefix(input: &str, expect: &str) {
        assert_eq!(guard().expand(input), PathBuf::from(expect));
    }

    #[test_case("/srv//rules/./team", "/srv/rules/team"; "redundant parts")]
    #[test_case("~/./rules/", "/home/blah/rules"; "expanded then cleaned")]
    #[test]
    fn resolve_cleans_path(input: &str, expect: &str) {
        assert_eq!(guard().resolve(input).unwrap(), PathBuf::from(expect));
    }

    #[test]
    fn resolve_rejects_bad_paths() {
        let guard = guard();
        assert!(matches!(guard.resolve(""), Err(PathError::Empty)));
        assert!(matches!(
            guard.resolve("/srv/ru\0les"),
            Err(PathError::NullByte { .. })
        ));
        assert!(matches!(
            guard.resolve("/srv/../etc/passwd"),
            Err(PathError::Traversal { .. })
        ));
        assert!(matches!(
            guard.resolve("~/../../etc"),
            Err(PathError::Traversal { .. })
        ));
        assert!(matches!(
            guard.resolve("rules/team"),
            Err(PathError::NotAbsolute { .. })
        ));
    }

    #[cfg(unix)]
    #[test_case("/"; "file system root")]
    #[test_case("/etc/rulem"; "etc")]
    #[test_case("/usr/local/share/rules"; "usr")]
    #[test_case("/proc/self"; "proc")]
    #[test]
    fn resolve_rejects_reserved_roots(input: &str) {
        assert!(matches!(
            guard().resolve(input),
            Err(PathError::Reserved { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_keeps_lookalike_of_reserved_root() -> anyhow::Result<()> {
        assert_eq!(guard().resolve("/etcetera")?, PathBuf::from("/etcetera"));
        Ok(())
    }

    #[test]
    fn resolve_in_home_requires_containment() -> anyhow::Result<()> {
        let guard = guard();
        assert_eq!(
            guard.resolve_in_home("~/rules")?,
            PathBuf::from("/home/blah/rules")
        );
        assert!(matches!(
            guard.resolve_in_home("/home/blahblah/rules"),
            Err(PathError::OutsideHome { .. })
        ));
        Ok(())
    }

    #[test]
    fn ensure_writable_dir_creates_missing_directories() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let guard = PathGuard::with_home(home.path());

        let created = guard.ensure_writable_dir("~/config/rulem")?;
        assert_eq!(created, home.path().join("config").join("rulem"));
        assert!(created.is_dir());
        assert!(!created.join(SENTINEL_FILE).exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&created)?.permissions().mode() & 0o777;
            // Umask may only remove bits.
            assert_eq!(mode & !0o755, 0);
        }

        Ok(())
    }

    #[test]
    fn ensure_writable_dir_rejects_outside_home() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let elsewhere = tempfile::tempdir()?;
        let guard = PathGuard::with_home(home.path());

        let result = guard.ensure_writable_dir(elsewhere.path().join("rules"));
        assert!(matches!(result, Err(PathError::OutsideHome { .. })));
        assert!(!elsewhere.path().join("rules").exists());

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn ensure_writable_dir_rejects_symlink_escape() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let elsewhere = tempfile::tempdir()?;
        std::os::unix::fs::symlink(elsewhere.path(), home.path().join("link"))?;
        let guard = PathGuard::with_home(home.path());

        let result = guard.ensure_writable_dir("~/link/rules");
        assert!(matches!(result, Err(PathError::SymlinkEscape { .. })));
        assert!(!elsewhere.path().join("rules").exists());

        Ok(())
    }
}
