// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Personal access token storage.
//!
//! Private remote repositories are accessed over HTTPS with a personal access
//! token. Rulem keeps exactly one token in the operating system's secret
//! store under the service name [`SERVICE`] and key [`TOKEN_KEY`]. The token
//! is never enumerated, and never logged.
//!
//! The secret store itself is reached through a [`SecretBackend`]. The
//! default backend binds to the platform keychain through the `keyring`
//! crate. A missing or broken secret store is not fatal: public repositories
//! never need a token, so failures only surface once a private repository
//! actually asks for credentials.

use keyring::Entry;
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Mutex,
};
use tracing::{debug, instrument};

/// Service name that the token is stored under.
pub const SERVICE: &str = "rulem";

/// Key name that the token is stored under.
pub const TOKEN_KEY: &str = "github_pat";

/// Minimum length of a personal access token after trimming.
pub const MIN_TOKEN_LEN: usize = 20;

/// Accepted personal access token prefixes.
pub const TOKEN_PREFIXES: &[&str] = &["ghp_", "github_pat_", "gho_", "ghu_", "ghs_"];

const PROBE_KEY: &str = "rulem_probe";
const PROBE_VALUE: &str = "rulem-probe-value";

/// Personal access token.
///
/// Debug formatting is redacted so that a token cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Expose raw token contents.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Token {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str("Token(<redacted>)")
    }
}

/// Validate personal access token syntax.
///
/// Purely syntactic. Only catches common paste errors; the remote still
/// decides whether the token is any good.
///
/// # Errors
///
/// - Return [`CredentialError::TooShort`] if trimmed token is too short.
/// - Return [`CredentialError::BadPrefix`] if token prefix is unknown.
pub fn validate_token(raw: &str) -> Result<Token> {
    let token = raw.trim();
    if token.chars().count() < MIN_TOKEN_LEN {
        return Err(CredentialError::TooShort);
    }

    if !TOKEN_PREFIXES.iter().any(|prefix| token.starts_with(prefix)) {
        return Err(CredentialError::BadPrefix);
    }

    Ok(Token(token.into()))
}

/// Layer of indirection for secret store access.
pub trait SecretBackend {
    /// Write secret under key, replacing any existing value.
    fn set_secret(&self, key: &str, secret: &str) -> Result<()>;

    /// Read secret under key, or [`None`] if nothing is stored.
    fn get_secret(&self, key: &str) -> Result<Option<String>>;

    /// Delete secret under key. Deleting a missing secret is not an error.
    fn delete_secret(&self, key: &str) -> Result<()>;
}

/// Secret store access through the platform keychain.
///
/// On Linux the kernel keyring caches secrets that persist in the Secret
/// Service, so a stored token survives logout and reboot.
#[derive(Clone, Debug)]
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    /// Construct new keychain backend for rulem's service name.
    pub fn new() -> Self {
        Self {
            service: SERVICE.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(CredentialError::from)
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretBackend for KeyringBackend {
    fn set_secret(&self, key: &str, secret: &str) -> Result<()> {
        Ok(self.entry(key)?.set_password(secret)?)
    }

    fn get_secret(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local secret store.
///
/// Nothing is persisted. Useful for tests, and for sessions where the token
/// should not outlive the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Construct new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.secrets
            .lock()
            .map_err(|_| CredentialError::Unavailable("in-memory secret store poisoned".into()))
    }
}

impl SecretBackend for MemoryBackend {
    fn set_secret(&self, key: &str, secret: &str) -> Result<()> {
        self.lock()?.insert(key.into(), secret.into());
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Degraded secret store that is never available.
#[derive(Clone, Debug, Default)]
pub struct UnavailableBackend;

impl SecretBackend for UnavailableBackend {
    fn set_secret(&self, _key: &str, _secret: &str) -> Result<()> {
        Err(CredentialError::Unavailable("no secret store on this system".into()))
    }

    fn get_secret(&self, _key: &str) -> Result<Option<String>> {
        Err(CredentialError::Unavailable("no secret store on this system".into()))
    }

    fn delete_secret(&self, _key: &str) -> Result<()> {
        Err(CredentialError::Unavailable("no secret store on this system".into()))
    }
}

/// Result of probing the secret store.
#[derive(Debug)]
pub struct ProbeReport {
    /// Secret store completed a full write, read, and delete cycle.
    pub available: bool,

    /// Reason the secret store is unavailable.
    pub error: Option<CredentialError>,
}

/// Personal access token store.
#[derive(Debug, Default)]
pub struct CredentialStore<B = KeyringBackend>
where
    B: SecretBackend,
{
    backend: B,
}

impl<B> CredentialStore<B>
where
    B: SecretBackend,
{
    /// Construct new credential store on top of a secret backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Validate token syntax.
    ///
    /// # Errors
    ///
    /// - Return [`CredentialError`] if token is malformed.
    pub fn validate(&self, raw: &str) -> Result<Token> {
        validate_token(raw)
    }

    /// Store token, replacing any existing one.
    ///
    /// # Errors
    ///
    /// - Return [`CredentialError::EmptyToken`] if token is blank.
    /// - Return [`CredentialError`] if secret store rejects the write.
    #[instrument(skip(self, token), level = "debug")]
    pub fn store(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialError::EmptyToken);
        }

        self.backend.set_secret(TOKEN_KEY, token)?;
        debug!("personal access token stored");

        Ok(())
    }

    /// Retrieve stored token.
    ///
    /// # Errors
    ///
    /// - Return [`CredentialError::NoToken`] if nothing is stored.
    /// - Return [`CredentialError::EmptyToken`] if stored token is blank.
    /// - Return [`CredentialError`] if secret store cannot be read.
    pub fn get(&self) -> Result<Token> {
        match self.backend.get_secret(TOKEN_KEY)? {
            None => Err(CredentialError::NoToken),
            Some(token) if token.trim().is_empty() => Err(CredentialError::EmptyToken),
            Some(token) => Ok(Token(token.trim().into())),
        }
    }

    /// Check if a usable token is stored.
    ///
    /// Unavailable secret stores count as having no token.
    pub fn has(&self) -> bool {
        self.get().is_ok()
    }

    /// Delete stored token. Deleting twice is fine.
    ///
    /// # Errors
    ///
    /// - Return [`CredentialError`] if secret store rejects the delete.
    #[instrument(skip(self), level = "debug")]
    pub fn delete(&self) -> Result<()> {
        self.backend.delete_secret(TOKEN_KEY)?;
        debug!("personal access token deleted");
        Ok(())
    }

    /// Validate new token, and replace stored token with it.
    ///
    /// # Errors
    ///
    /// - Return [`CredentialError`] if token is malformed or cannot be stored.
    pub fn update(&self, raw: &str) -> Result<Token> {
        let token = validate_token(raw)?;
        self.store(token.expose())?;
        Ok(token)
    }

    /// Check if secret store works through a throwaway write, read, and delete.
    pub fn probe(&self) -> ProbeReport {
        let outcome = self
            .backend
            .set_secret(PROBE_KEY, PROBE_VALUE)
            .and_then(|_| self.backend.get_secret(PROBE_KEY))
            .and_then(|value| match value.as_deref() {
                Some(PROBE_VALUE) => Ok(()),
                Some(_) => Err(CredentialError::Corrupted("probe value mismatch".into())),
                None => Err(CredentialError::Corrupted("probe value vanished".into())),
            });
        let cleanup = self.backend.delete_secret(PROBE_KEY);

        match outcome.and(cleanup) {
            Ok(()) => ProbeReport {
                available: true,
                error: None,
            },
            Err(err) => {
                debug!("secret store probe failed: {err}");
                ProbeReport {
                    available: false,
                    error: Some(err),
                }
            }
        }
    }
}

/// Credential store errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("token must be at least {} characters long", MIN_TOKEN_LEN)]
    TooShort,

    #[error("token must start with one of {:?}", TOKEN_PREFIXES)]
    BadPrefix,

    #[error("no personal access token stored; configure one with `rulem auth set`")]
    NoToken,

    #[error("stored personal access token is empty; configure one with `rulem auth set`")]
    EmptyToken,

    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    #[error("secret store holds corrupted data: {0}")]
    Corrupted(String),
}

impl From<keyring::Error> for CredentialError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::BadEncoding(_) => Self::Corrupted(err.to_string()),
            err => Self::Unavailable(err.to_string()),
        }
    }
}

/// Friendly result alias :3
type Result<T, E = CredentialError> = std::result::Result<T, E>;
