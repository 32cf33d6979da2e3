// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository entry validation.
//!
//! Every listing of repository entries is validated before rulem touches the
//! file system or the network. Validation happens in two stages:
//!
//! 1. Batch sweeps looking for duplicate ids, names, and paths. Names are
//!    compared after trimming and case-folding. Ids are compared exactly,
//!    their format only admits lowercase anyway.
//! 2. Per-entry structural checks. Each entry reports the first field that
//!    fails.
//!
//! Duplicates are reported on their own before any per-entry issue, so that
//! the first thing the user sees about two conflicting entries is the
//! conflict itself.

use crate::{
    config::{RepositoryEntry, RepositoryKind},
    path::clean,
    url::GitUrl,
};

use regex::Regex;
use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    sync::LazyLock,
};

/// Maximum length of a display name in characters.
pub const MAX_NAME_LEN: usize = 100;

static ENTRY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+-([0-9]+)$").expect("valid entry id pattern"));

/// Validate a single repository entry.
///
/// # Errors
///
/// - Return [`EntryIssue`] naming the first field that fails.
pub fn validate_entry(entry: &RepositoryEntry) -> Result<(), EntryIssue> {
    validate_id(&entry.id).map_err(|reason| EntryIssue::new("id", reason))?;
    validate_name(&entry.name).map_err(|reason| EntryIssue::new("name", reason))?;

    if entry.created_at <= 0 {
        return Err(EntryIssue::new(
            "created_at",
            "must be a positive unix timestamp",
        ));
    }

    let path = entry.path.trim();
    if path.is_empty() {
        return Err(EntryIssue::new("path", "must not be empty"));
    }

    if !(Path::new(path).is_absolute() || path == "~" || path.starts_with("~/")) {
        return Err(EntryIssue::new("path", "must be absolute or start with '~/'"));
    }

    match entry.kind {
        RepositoryKind::Local => validate_local_fields(entry),
        RepositoryKind::RemoteGit => validate_remote_fields(entry),
    }
}

/// Validate a listing of repository entries.
///
/// # Errors
///
/// - Return [`ValidationError`] with duplicate issues if any ids, names, or
///   paths collide.
/// - Return [`ValidationError`] with every per-entry issue otherwise.
pub fn validate_batch(entries: &[RepositoryEntry]) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    issues.extend(find_duplicates(entries, DuplicateField::Id, |entry| {
        entry.id.clone()
    }));
    issues.extend(find_duplicates(entries, DuplicateField::Name, |entry| {
        entry.name.trim().to_lowercase()
    }));
    issues.extend(find_duplicates(entries, DuplicateField::Path, |entry| {
        clean(entry.path.trim()).to_string_lossy().into_owned()
    }));

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    for (index, entry) in entries.iter().enumerate() {
        if let Err(issue) = validate_entry(entry) {
            issues.push(Issue::Invalid {
                index,
                name: entry.name.clone(),
                issue,
            });
        }
    }

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    Ok(())
}

fn validate_id(id: &str) -> Result<(), &'static str> {
    let captures = ENTRY_ID
        .captures(id)
        .ok_or("must look like '<slug>-<timestamp>' using only [a-z0-9-]")?;

    // INVARIANT: Suffix is all digits, so only all-zero suffixes are not positive.
    if captures[1].bytes().all(|digit| digit == b'0') {
        return Err("timestamp suffix must be a positive number");
    }

    Ok(())
}

fn validate_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("must not be empty");
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err("must be at most 100 characters");
    }

    if name.chars().any(char::is_control) {
        return Err("must not contain control characters");
    }

    Ok(())
}

fn validate_local_fields(entry: &RepositoryEntry) -> Result<(), EntryIssue> {
    if entry.remote_url.is_some() {
        return Err(EntryIssue::new("remote_url", "not allowed for local repositories"));
    }

    if entry.branch.is_some() {
        return Err(EntryIssue::new("branch", "not allowed for local repositories"));
    }

    if entry.last_sync_time.is_some() {
        return Err(EntryIssue::new(
            "last_sync_time",
            "not allowed for local repositories",
        ));
    }

    Ok(())
}

fn validate_remote_fields(entry: &RepositoryEntry) -> Result<(), EntryIssue> {
    let url = match entry.remote_url.as_deref().map(str::trim) {
        None => return Err(EntryIssue::new("remote_url", "required for remote repositories")),
        Some("") => return Err(EntryIssue::new("remote_url", "must not be blank")),
        Some(url) => url,
    };

    if url.parse::<GitUrl>().is_err() {
        return Err(EntryIssue::new(
            "remote_url",
            "must be git@<host>:<owner>/<repo> or https://<host>/<owner>/<repo>",
        ));
    }

    if let Some(branch) = &entry.branch {
        if branch.trim().is_empty() {
            return Err(EntryIssue::new("branch", "must be omitted instead of blank"));
        }

        if !git2::Reference::is_valid_name(&format!("refs/heads/{branch}")) {
            return Err(EntryIssue::new("branch", "is not a valid branch name"));
        }
    }

    if let Some(time) = entry.last_sync_time {
        if time <= 0 {
            return Err(EntryIssue::new(
                "last_sync_time",
                "must be a positive unix timestamp",
            ));
        }
    }

    Ok(())
}

fn find_duplicates(
    entries: &[RepositoryEntry],
    field: DuplicateField,
    key: impl Fn(&RepositoryEntry) -> String,
) -> Vec<Issue> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut issues = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let value = key(entry);
        match seen.get(&value) {
            Some(&first) => issues.push(Issue::Duplicate {
                field,
                value,
                first,
                second: index,
            }),
            None => {
                seen.insert(value, index);
            }
        }
    }

    issues
}

/// Field that failed validation, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryIssue {
    /// Name of the offending field.
    pub field: &'static str,

    /// Human readable reason.
    pub reason: String,
}

impl EntryIssue {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for EntryIssue {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "field {:?} {}", self.field, self.reason)
    }
}

impl std::error::Error for EntryIssue {}

/// Field that must be unique across a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateField {
    Id,
    Name,
    Path,
}

impl Display for DuplicateField {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Id => fmt.write_str("id"),
            Self::Name => fmt.write_str("name"),
            Self::Path => fmt.write_str("path"),
        }
    }
}

/// Single validation problem in a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Issue {
    /// Two entries share a value that must be unique.
    Duplicate {
        field: DuplicateField,
        value: String,
        first: usize,
        second: usize,
    },

    /// Entry is structurally invalid.
    Invalid {
        index: usize,
        name: String,
        issue: EntryIssue,
    },
}

impl Display for Issue {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Duplicate {
                field,
                value,
                first,
                second,
            } => write!(
                fmt,
                "duplicate repository {field} {value:?} at entries {first} and {second}"
            ),
            Self::Invalid { index, name, issue } => {
                write!(fmt, "entry {index} ({name:?}): {issue}")
            }
        }
    }
}

/// Aggregated validation failure for a listing of entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// Every problem that was found.
    pub issues: Vec<Issue>,
}

impl Display for ValidationError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "invalid repository configuration:")?;
        for issue in &self.issues {
            write!(fmt, "\n  - {issue}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}
