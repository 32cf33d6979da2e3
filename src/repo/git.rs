// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git-backed repository source.
//!
//! Remote central repositories are kept as shallow clones underneath the
//! storage root. Preparing one either clones it into an empty destination, or
//! refreshes the clone that already lives there.
//!
//! # Authentication
//!
//! Every network operation is attempted anonymously first, so public
//! repositories work without any stored credentials. Only when the remote
//! answers with an authentication failure does rulem look up the stored
//! personal access token and retry with HTTP basic auth, using "token" as the
//! user name. SSH URLs are rewritten to their HTTPS form up front so that this
//! single scheme covers every remote.
//!
//! # Local Changes
//!
//! Rulem never throws away work. A clone with uncommitted changes or
//! untracked files is left completely alone: no fetch, no checkout, no reset.

use crate::{
    credential::{CredentialError, CredentialStore, KeyringBackend, SecretBackend, Token},
    path::{create_dir_all, PathError, PathGuard},
    repo::classify::{classify, DirectoryClassification},
    url::{GitUrl, UrlError},
};

use auth_git2::GitAuthenticator;
use git2::{
    build::{CheckoutBuilder, RepoBuilder},
    BranchType, Config, Direction, ErrorClass, ErrorCode, FetchOptions, ObjectType, Remote,
    RemoteCallbacks, Repository, ResetType, StatusOptions,
};
use regex::Regex;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
    time::Duration,
};
use tracing::{debug, info, instrument, warn};

/// Refspec used for every fetch. Forced so upstream force-pushes apply.
pub const FETCH_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";

/// User name sent alongside a personal access token.
const TOKEN_USER: &str = "token";

/// History depth of fresh clones.
pub const SHALLOW_DEPTH: u32 = 1;

static HTTP_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(401|403|404)\b").expect("valid http status pattern"));

/// Source for remote Git repositories.
#[derive(Debug)]
pub struct GitSource<'src, B = KeyringBackend>
where
    B: SecretBackend,
{
    paths: &'src PathGuard,
    credentials: &'src CredentialStore<B>,
    depth: Option<u32>,
}

impl<'src, B> GitSource<'src, B>
where
    B: SecretBackend,
{
    /// Construct new Git source that makes shallow clones.
    pub fn new(paths: &'src PathGuard, credentials: &'src CredentialStore<B>) -> Self {
        Self {
            paths,
            credentials,
            depth: Some(SHALLOW_DEPTH),
        }
    }

    /// Set history depth of fresh clones, `None` for full history.
    ///
    /// Local file system remotes cannot serve shallow clones.
    pub fn with_depth(mut self, depth: Option<u32>) -> Self {
        self.depth = depth;
        self
    }

    /// Make remote repository available at local path.
    ///
    /// Clones into an empty destination, or updates an existing clone of the
    /// same remote. Anything else occupying the destination is a conflict, and
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// - Return [`GitError::EmptyUrl`] or [`GitError::EmptyPath`] if either
    ///   argument is blank.
    /// - Return [`GitError::Url`] if remote URL cannot be parsed.
    /// - Return [`GitError::Path`] if local path fails security checks.
    /// - Return [`GitError::DirectoryConflict`] if destination holds foreign
    ///   content.
    /// - Return [`GitError::Inspect`] if destination cannot be inspected.
    /// - Return any error of [`GitSource::clone_into`] or
    ///   [`GitSource::update`].
    #[instrument(skip(self, url, branch, path), level = "debug")]
    pub fn prepare(
        &self,
        url: &str,
        branch: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<GitPrepared> {
        let url = url.trim();
        if url.is_empty() {
            return Err(GitError::EmptyUrl);
        }

        let raw_path = path.as_ref().to_string_lossy();
        if raw_path.trim().is_empty() {
            return Err(GitError::EmptyPath);
        }

        let url = url.parse::<GitUrl>()?.https_url();
        let path = self.paths.resolve(raw_path.trim())?;

        self.prepare_resolved(&url, branch, &path)
    }

    /// Make remote repository available at an already resolved local path.
    ///
    /// Takes the remote URL as is, so it must already be in the form that
    /// should end up as the clone's origin.
    ///
    /// # Errors
    ///
    /// - Return [`GitError::DirectoryConflict`] if destination holds foreign
    ///   content.
    /// - Return [`GitError::Inspect`] if destination cannot be inspected.
    /// - Return any error of [`GitSource::clone_into`] or
    ///   [`GitSource::update`].
    pub fn prepare_resolved(
        &self,
        url: &str,
        branch: Option<&str>,
        path: &Path,
    ) -> Result<GitPrepared> {
        match classify(path, url) {
            DirectoryClassification::Empty => {
                let branch_warning = self.clone_into(url, branch, path)?;
                Ok(GitPrepared {
                    path: path.into(),
                    action: GitAction::Cloned,
                    branch_warning,
                })
            }
            DirectoryClassification::SameRepo => self.update(path, url, branch),
            DirectoryClassification::Error(reason) => Err(GitError::Inspect {
                path: path.into(),
                reason,
            }),
            classification => Err(GitError::DirectoryConflict {
                path: path.into(),
                classification,
            }),
        }
    }

    /// Clone remote repository into an empty destination.
    ///
    /// Clones are shallow unless [`GitSource::with_depth`] says otherwise.
    /// Returns a branch warning if the configured branch could not be checked
    /// out. In that case the default branch of the remote stays checked out.
    ///
    /// # Errors
    ///
    /// - Return [`GitError::Path`] if parent directory fails security checks.
    /// - Return [`GitError::Io`] if parent directory cannot be created.
    /// - Return [`GitError`] if clone fails, translated by category.
    #[instrument(skip(self, url, branch, path), level = "debug")]
    pub fn clone_into(
        &self,
        url: &str,
        branch: Option<&str>,
        path: &Path,
    ) -> Result<Option<GitError>> {
        if let Some(parent) = path.parent() {
            let parent = self.paths.resolve(parent)?;
            create_dir_all(&parent).map_err(|err| GitError::Io {
                path: parent.clone(),
                source: err,
            })?;
        }

        let existed = path.exists();
        info!("clone {url} into {:?}", path.display());
        let result = self.with_auth_retry(url, Operation::Clone, |token| {
            clone_repo(url, branch, path, self.depth, token)
        });

        let repo = match (result, branch) {
            (Ok(repo), _) => return Ok(verify_checkout(&repo, branch)),
            (Err(GitError::BranchNotOnRemote { .. }), Some(branch)) => {
                warn!("branch {branch:?} missing on {url}, clone default branch instead");
                discard_partial_clone(path, existed)?;
                self.with_auth_retry(url, Operation::Clone, |token| {
                    clone_repo(url, None, path, self.depth, token)
                })?
            }
            (Err(err), _) => return Err(err),
        };

        Ok(verify_checkout(&repo, branch))
    }

    /// Update existing clone at local path.
    ///
    /// Dirty clones are left alone. Clean clones are fetched, switched to the
    /// configured branch when possible, and moved to their upstream commit.
    ///
    /// # Errors
    ///
    /// - Return [`GitError::Operation`] if clone cannot be opened or its
    ///   status cannot be read.
    /// - Return [`GitError`] if fetch or reset fails, translated by category.
    #[instrument(skip(self, path, url, branch), level = "debug")]
    pub fn update(&self, path: &Path, url: &str, branch: Option<&str>) -> Result<GitPrepared> {
        let repo =
            Repository::open(path).map_err(|err| translate(Operation::Open, url, err))?;

        if !is_clean(&repo).map_err(|err| translate(Operation::Status, url, err))? {
            info!("{:?} has local changes, leave it as is", path.display());
            return Ok(GitPrepared {
                path: path.into(),
                action: GitAction::LeftDirty,
                branch_warning: None,
            });
        }

        canonicalize_origin(&repo, url)?;
        self.fetch(&repo)?;
        let branch_warning = verify_checkout(&repo, branch);
        reset_to_upstream(&repo).map_err(|err| translate(Operation::Reset, url, err))?;

        Ok(GitPrepared {
            path: path.into(),
            action: GitAction::Updated,
            branch_warning,
        })
    }

    /// Fetch origin, and move current branch to its upstream commit.
    ///
    /// Used by synchronization on clones already known to be clean.
    ///
    /// # Errors
    ///
    /// - Return [`GitError`] if fetch or reset fails, translated by category.
    pub fn refresh(&self, repo: &Repository) -> Result<()> {
        self.fetch(repo)?;
        let url = origin_url(repo);
        if reset_to_upstream(repo).map_err(|err| translate(Operation::Reset, &url, err))? {
            debug!("moved {url} to upstream commit");
        }

        Ok(())
    }

    /// Fetch every branch of origin with forced updates.
    ///
    /// # Errors
    ///
    /// - Return [`GitError::AuthenticationRequired`] if remote demands
    ///   credentials that are not stored.
    /// - Return [`GitError`] if fetch fails, translated by category.
    #[instrument(skip(self, repo), level = "debug")]
    pub fn fetch(&self, repo: &Repository) -> Result<()> {
        let url = origin_url(repo);
        let mut remote = repo
            .find_remote("origin")
            .map_err(|err| translate(Operation::Fetch, &url, err))?;

        debug!("fetch {url}");
        self.with_auth_retry(&url, Operation::Fetch, |token| {
            let auth = TokenAuth::new(token)?;
            let mut fo = FetchOptions::new();
            fo.remote_callbacks(remote_callbacks(auth.as_ref()));
            remote.fetch(&[FETCH_REFSPEC], Some(&mut fo), None)
        })
    }

    /// Run Git operation anonymously, then once more with the stored token if
    /// the remote asked for authentication.
    ///
    /// Secret store failures only matter when a token is actually needed.
    fn with_auth_retry<T>(
        &self,
        url: &str,
        operation: Operation,
        mut attempt: impl FnMut(Option<&Token>) -> std::result::Result<T, git2::Error>,
    ) -> Result<T> {
        let err = match attempt(None) {
            Ok(value) => return Ok(value),
            Err(err) if is_auth_error(&err) => err,
            Err(err) => return Err(translate(operation, url, err)),
        };

        debug!("anonymous {operation} of {url} rejected: {}", err.message());
        let token = match self.credentials.get() {
            Ok(token) => token,
            Err(CredentialError::NoToken | CredentialError::EmptyToken) => {
                return Err(GitError::AuthenticationRequired { url: url.into() })
            }
            Err(err) => return Err(GitError::Credential(err)),
        };

        info!("retry {operation} of {url} with stored token");
        attempt(Some(&token)).map_err(|err| translate(operation, url, err))
    }
}

/// Outcome of preparing a remote repository.
#[derive(Debug)]
pub struct GitPrepared {
    /// Absolute path to the clone.
    pub path: PathBuf,

    /// What had to be done to the clone.
    pub action: GitAction,

    /// Non-fatal branch checkout failure.
    pub branch_warning: Option<GitError>,
}

/// Work performed while preparing a remote repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitAction {
    /// Fresh shallow clone.
    Cloned,

    /// Existing clone fetched from origin.
    Updated,

    /// Existing clone has local changes, so nothing was touched.
    LeftDirty,
}

/// Git operation being performed, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Clone,
    Fetch,
    Open,
    Status,
    Reset,
    Verify,
}

impl Display for Operation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Clone => fmt.write_str("clone"),
            Self::Fetch => fmt.write_str("fetch"),
            Self::Open => fmt.write_str("open"),
            Self::Status => fmt.write_str("status"),
            Self::Reset => fmt.write_str("reset"),
            Self::Verify => fmt.write_str("verify"),
        }
    }
}

/// Check if working tree has no changes, untracked files included.
///
/// # Errors
///
/// - Return [`git2::Error`] if status cannot be computed.
pub fn is_clean(repo: &Repository) -> std::result::Result<bool, git2::Error> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    Ok(repo.statuses(Some(&mut opts))?.is_empty())
}

/// Check out local branch, creating it from origin when needed.
///
/// Checkout is never forced, so local changes are never overwritten.
///
/// # Errors
///
/// - Return [`GitError::BranchNotOnRemote`] if origin has no such branch.
/// - Return [`GitError::Checkout`] if checkout fails.
#[instrument(skip(repo), level = "debug")]
pub fn checkout_branch(repo: &Repository, branch: &str) -> Result<()> {
    if let Ok(head) = repo.head() {
        if head.is_branch() && head.shorthand() == Some(branch) {
            debug!("already on branch {branch:?}");
            return Ok(());
        }
    }

    let checkout_err = |source| GitError::Checkout {
        branch: branch.into(),
        source,
    };

    let upstream = match repo.find_reference(&format!("refs/remotes/origin/{branch}")) {
        Ok(reference) => reference,
        Err(err) if err.code() == ErrorCode::NotFound => {
            return Err(GitError::BranchNotOnRemote {
                branch: branch.into(),
            })
        }
        Err(err) => return Err(checkout_err(err)),
    };
    let commit = upstream.peel_to_commit().map_err(checkout_err)?;

    let local = match repo.find_branch(branch, BranchType::Local) {
        Ok(local) => local,
        Err(err) if err.code() == ErrorCode::NotFound => {
            info!("create local branch {branch:?} tracking origin/{branch}");
            let mut local = repo.branch(branch, &commit, false).map_err(checkout_err)?;
            local
                .set_upstream(Some(&format!("origin/{branch}")))
                .map_err(checkout_err)?;
            local
        }
        Err(err) => return Err(checkout_err(err)),
    };

    let target = local.get().peel(ObjectType::Commit).map_err(checkout_err)?;
    repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
        .map_err(checkout_err)?;
    repo.set_head(&format!("refs/heads/{branch}"))
        .map_err(checkout_err)?;
    info!("checked out branch {branch:?}");

    Ok(())
}

/// Hard reset current branch to `refs/remotes/origin/<branch>`.
///
/// Returns `false` without touching anything if HEAD is detached, has no
/// remote-tracking counterpart, or already sits on the upstream commit.
///
/// # Errors
///
/// - Return [`git2::Error`] if reset fails.
pub fn reset_to_upstream(repo: &Repository) -> std::result::Result<bool, git2::Error> {
    let head = repo.head()?;
    let Some(branch) = head.shorthand().filter(|_| head.is_branch()) else {
        return Ok(false);
    };

    let upstream = match repo.find_reference(&format!("refs/remotes/origin/{branch}")) {
        Ok(reference) => reference,
        Err(err) if err.code() == ErrorCode::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    let target = upstream.peel(ObjectType::Commit)?;
    if head.target() == Some(target.id()) {
        return Ok(false);
    }

    debug!("reset {branch:?} to {}", target.id());
    repo.reset(&target, ResetType::Hard, None)?;

    Ok(true)
}

/// Check if Git error means the remote wants (different) credentials.
pub fn is_auth_error(err: &git2::Error) -> bool {
    if err.code() == ErrorCode::Auth {
        return true;
    }

    let message = err.message().to_lowercase();
    let status = HTTP_STATUS
        .captures(&message)
        .is_some_and(|captures| matches!(&captures[1], "401" | "403"));

    status
        || message.contains("authentication required")
        || message.contains("unauthorized")
        || message.contains("forbidden")
}

/// Translate raw Git error into a user facing category.
pub fn translate(operation: Operation, url: &str, err: git2::Error) -> GitError {
    if err.class() == ErrorClass::Reference && err.code() == ErrorCode::NotFound {
        if let Some(branch) = missing_remote_branch(err.message()) {
            return GitError::BranchNotOnRemote { branch };
        }
    }

    let message = err.message().to_lowercase();
    let status = HTTP_STATUS
        .captures(&message)
        .map(|captures| captures[1].to_string());
    let url = url.to_string();

    if err.code() == ErrorCode::Auth
        || status.as_deref() == Some("401")
        || message.contains("unauthorized")
        || message.contains("authentication required")
    {
        return GitError::Unauthorized { url };
    }

    if status.as_deref() == Some("403") || message.contains("forbidden") {
        return GitError::Forbidden { url };
    }

    if status.as_deref() == Some("404")
        || message.contains("not found")
        || message.contains("does not appear to be a git repository")
    {
        return GitError::NotFound { url };
    }

    // INVARIANT: Transport limitations are not network failures, even when
    // reported under a network error class.
    let unsupported = message.contains("not supported") || message.contains("unsupported");
    let network = !unsupported
        && (matches!(
            err.class(),
            ErrorClass::Net | ErrorClass::Ssl | ErrorClass::Http
        ) || ["network", "connection", "connect", "timed out", "timeout", "resolve"]
            .iter()
            .any(|needle| message.contains(needle)));

    match (network, operation) {
        (true, Operation::Fetch) => GitError::FetchNetwork {
            url,
            message: err.message().into(),
        },
        (true, Operation::Clone) => GitError::CloneNetwork {
            url,
            message: err.message().into(),
        },
        _ => GitError::Operation {
            operation,
            url,
            source: err,
        },
    }
}

/// Check personal access token against a remote repository.
///
/// Opens an authenticated fetch connection and lists remote references. The
/// blocking network round trip runs off the async runtime, and is abandoned
/// once the deadline passes.
///
/// # Errors
///
/// - Return [`GitError::Url`] if remote URL cannot be parsed.
/// - Return [`GitError::Cancelled`] if deadline passes first.
/// - Return [`GitError`] if remote rejects the token, translated by category.
#[instrument(skip(url, token, deadline), level = "debug")]
pub async fn verify_token(url: &str, token: Token, deadline: Duration) -> Result<()> {
    let url = url.parse::<GitUrl>()?.https_url();
    let task_url = url.clone();
    let task = tokio::task::spawn_blocking(move || list_remote_refs(&task_url, &token));

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => Err(GitError::Internal(err.to_string())),
        Err(_) => Err(GitError::Cancelled { url }),
    }
}

fn list_remote_refs(url: &str, token: &Token) -> Result<()> {
    let translate_verify = |err: git2::Error| translate(Operation::Verify, url, err);
    let auth = TokenAuth::new(Some(token)).map_err(translate_verify)?;

    let mut remote = Remote::create_detached(url).map_err(translate_verify)?;
    let connection = remote
        .connect_auth(Direction::Fetch, Some(remote_callbacks(auth.as_ref())), None)
        .map_err(translate_verify)?;
    let heads = connection.list().map_err(translate_verify)?;
    debug!("token accepted by {url}, {} references visible", heads.len());

    Ok(())
}

fn clone_repo(
    url: &str,
    branch: Option<&str>,
    path: &Path,
    depth: Option<u32>,
    token: Option<&Token>,
) -> std::result::Result<Repository, git2::Error> {
    let auth = TokenAuth::new(token)?;
    let mut fo = FetchOptions::new();
    if let Some(depth) = depth {
        fo.depth(i32::try_from(depth).unwrap_or(i32::MAX));
    }
    fo.remote_callbacks(remote_callbacks(auth.as_ref()));

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fo);
    if let Some(branch) = branch {
        builder.branch(branch);
    }

    builder.clone(url, path)
}

fn verify_checkout(repo: &Repository, branch: Option<&str>) -> Option<GitError> {
    let branch = branch?;
    match checkout_branch(repo, branch) {
        Ok(()) => None,
        Err(err) => {
            warn!("cannot check out {branch:?}: {err}");
            Some(err)
        }
    }
}

/// Remove whatever a failed clone left behind.
///
/// A destination that existed beforehand was empty, so only its contents go
/// and the directory itself stays.
fn discard_partial_clone(path: &Path, existed: bool) -> Result<()> {
    let io_err = |err| GitError::Io {
        path: path.into(),
        source: err,
    };

    if !path.exists() {
        return Ok(());
    }

    if !existed {
        return fs::remove_dir_all(path).map_err(io_err);
    }

    for entry in fs::read_dir(path).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let leftover = entry.path();
        if entry.file_type().map_err(io_err)?.is_dir() {
            fs::remove_dir_all(&leftover).map_err(io_err)?;
        } else {
            fs::remove_file(&leftover).map_err(io_err)?;
        }
    }

    Ok(())
}

/// Rewrite origin to canonical HTTPS form so token authentication applies.
fn canonicalize_origin(repo: &Repository, expected: &str) -> Result<()> {
    let current = origin_url(repo);
    let Ok(parsed) = current.parse::<GitUrl>() else {
        return Ok(());
    };

    let https = parsed.https_url();
    if current != https && parsed.normalized() == crate::url::comparison_key(expected) {
        info!("rewrite origin {current} to {https}");
        repo.remote_set_url("origin", &https)
            .map_err(|err| translate(Operation::Open, expected, err))?;
    }

    Ok(())
}

fn origin_url(repo: &Repository) -> String {
    repo.find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(String::from))
        .unwrap_or_else(|| "origin".into())
}

fn missing_remote_branch(message: &str) -> Option<String> {
    let start = message.find("refs/remotes/origin/")? + "refs/remotes/origin/".len();
    let rest = &message[start..];
    let end = rest.find('\'').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

struct TokenAuth {
    authenticator: GitAuthenticator,
    config: Config,
}

impl TokenAuth {
    fn new(token: Option<&Token>) -> std::result::Result<Option<Self>, git2::Error> {
        let Some(token) = token else {
            return Ok(None);
        };

        Ok(Some(Self {
            authenticator: GitAuthenticator::new_empty().add_plaintext_credentials(
                "*",
                TOKEN_USER,
                token.expose(),
            ),
            config: Config::open_default()?,
        }))
    }
}

fn remote_callbacks(auth: Option<&TokenAuth>) -> RemoteCallbacks<'_> {
    let mut rc = RemoteCallbacks::new();
    if let Some(auth) = auth {
        rc.credentials(auth.authenticator.credentials(&auth.config));
    }

    rc
}

/// Git source errors.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("remote URL is empty")]
    EmptyUrl,

    #[error("clone path is empty")]
    EmptyPath,

    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("directory conflict at {path:?}: found {classification}; move it away or choose another path")]
    DirectoryConflict {
        path: PathBuf,
        classification: DirectoryClassification,
    },

    #[error("cannot inspect {path:?}: {reason}")]
    Inspect { path: PathBuf, reason: String },

    #[error("authentication required for {url}; configure a token with `rulem auth set`")]
    AuthenticationRequired { url: String },

    #[error("token invalid or missing; configure authentication with `rulem auth set` ({url})")]
    Unauthorized { url: String },

    #[error("token lacks required scope ({url})")]
    Forbidden { url: String },

    #[error("repository not found; check URL or access ({url})")]
    NotFound { url: String },

    #[error("network error; cached copy still usable ({url}: {message})")]
    FetchNetwork { url: String, message: String },

    #[error("clone failed: network error ({url}: {message})")]
    CloneNetwork { url: String, message: String },

    #[error("branch {branch:?} does not exist on remote")]
    BranchNotOnRemote { branch: String },

    #[error("cannot check out branch {branch:?}: {source}")]
    Checkout { branch: String, source: git2::Error },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("{operation} of {url} failed: {source}")]
    Operation {
        operation: Operation,
        url: String,
        source: git2::Error,
    },

    #[error("file system operation on {path:?} failed: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("token verification against {url} cancelled: deadline exceeded")]
    Cancelled { url: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Friendly result alias :3
type Result<T, E = GitError> = std::result::Result<T, E>;
