// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule file catalog.
//!
//! List the rule files a prepared repository offers. Rule files are Markdown
//! documents, either plain `.md` files or Cursor style `.mdc` files. The walk
//! honors `.gitignore` files inside the repository, includes hidden
//! directories like `.cursor/`, and never descends into `.git`.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// File extensions that count as rule files.
pub const RULE_EXTENSIONS: &[&str] = &["md", "mdc"];

/// List rule files underneath a repository root.
///
/// Returns paths relative to `root`, sorted.
///
/// # Errors
///
/// - Return [`CatalogError::NotADirectory`] if root is not a directory.
/// - Return [`CatalogError::Walk`] if directory tree cannot be read.
#[instrument(skip(root), level = "debug")]
pub fn list_rule_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(CatalogError::NotADirectory { path: root.into() });
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|kind| kind.is_file()) {
            continue;
        }

        let path = entry.path();
        let is_rule = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| RULE_EXTENSIONS.contains(&ext));
        if !is_rule {
            continue;
        }

        // INVARIANT: Walker only yields paths underneath root.
        if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    debug!("found {} rule files in {:?}", files.len(), root.display());

    Ok(files)
}

/// Catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("rule repository {path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error(transparent)]
    Walk(#[from] ignore::Error),
}

/// Friendly result alias :3
type Result<T, E = CatalogError> = std::result::Result<T, E>;
