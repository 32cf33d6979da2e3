// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{manager, remote_entry};

use anyhow::Result;
use git2::Repository;
use pretty_assertions::assert_eq;
use rulem::{
    catalog::list_rule_files,
    config::RepositoryEntry,
    repo::{git::GitError, sync::SkipReason, SourceError},
};
use std::{fs, path::PathBuf};

#[test]
fn pure_local_batch_is_prepared_in_order() -> Result<()> {
    let home = tempfile::tempdir()?;
    let personal = home.path().join("personal");
    let team = home.path().join("team");
    fs::create_dir_all(personal.join("python"))?;
    fs::create_dir_all(&team)?;
    fs::write(personal.join("python/style.md"), "# Style")?;

    let entries = vec![
        RepositoryEntry::local("Team", &team, 1700000001),
        RepositoryEntry::local("Personal", &personal, 1700000000),
    ];
    let report = manager(home.path()).prepare_all(&entries)?;

    assert!(report.error.is_none());
    let names = report
        .repositories
        .iter()
        .map(|repo| repo.entry.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Team", "Personal"]);
    assert_eq!(report.repositories[1].local_path, personal);
    for repo in &report.repositories {
        assert_eq!(repo.sync.skip_reason(), Some(SkipReason::NotARemote));
        assert!(repo.branch_warning.is_none());
    }

    assert_eq!(
        list_rule_files(&report.repositories[1].local_path)?,
        vec![PathBuf::from("python/style.md")]
    );
    Ok(())
}

#[test]
fn duplicate_name_aborts_before_any_io() -> Result<()> {
    let home = tempfile::tempdir()?;
    let clone = home.path().join("clone");
    let entries = vec![
        RepositoryEntry::local("Rules", home.path(), 1700000000),
        remote_entry("rules", "git@github.com:acme/rules.git", &clone, 1700000001),
    ];

    let err = manager(home.path()).prepare_all(&entries).unwrap_err();
    assert!(err.to_string().contains("duplicate repository name"));
    assert!(!clone.exists());
    Ok(())
}

#[test]
fn directory_conflict_only_fails_its_entry() -> Result<()> {
    let home = tempfile::tempdir()?;
    let first = home.path().join("first");
    let second = home.path().join("second");
    let occupied = home.path().join("occupied");
    for dir in [&first, &second, &occupied] {
        fs::create_dir_all(dir)?;
    }
    fs::write(occupied.join("notes.md"), "# Mine")?;

    let entries = vec![
        RepositoryEntry::local("First", &first, 1700000000),
        remote_entry("Remote", "https://github.com/acme/rules", &occupied, 1700000001),
        RepositoryEntry::local("Second", &second, 1700000002),
    ];
    let report = manager(home.path()).prepare_all(&entries)?;

    let names = report
        .repositories
        .iter()
        .map(|repo| repo.entry.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["First", "Second"]);
    for repo in &report.repositories {
        assert_eq!(repo.sync.skip_reason(), Some(SkipReason::NotYetSynced));
    }

    let error = report.error.expect("conflicting entry should fail");
    assert_eq!(error.failures.len(), 1);
    assert_eq!(error.failures[0].name, "Remote");
    assert!(matches!(
        error.failures[0].source,
        SourceError::Git(GitError::DirectoryConflict { .. })
    ));
    assert!(error.to_string().contains("directory conflict"));
    assert_eq!(fs::read_to_string(occupied.join("notes.md"))?, "# Mine");
    Ok(())
}

#[test]
fn different_clone_in_the_way_is_a_conflict() -> Result<()> {
    let home = tempfile::tempdir()?;
    let path = home.path().join("rules");
    let repo = Repository::init(&path)?;
    repo.remote("origin", "https://github.com/other/rules.git")?;

    let entries = vec![remote_entry(
        "Rules",
        "git@github.com:acme/rules.git",
        &path,
        1700000000,
    )];
    let report = manager(home.path()).prepare_all(&entries)?;

    assert!(report.repositories.is_empty());
    let error = report.error.expect("different clone should conflict");
    assert!(error.to_string().contains("clone of a different repository"));
    Ok(())
}

#[test]
fn dirty_remote_is_kept_and_skipped() -> Result<()> {
    let home = tempfile::tempdir()?;
    let path = home.path().join("rules");
    let repo = Repository::init(&path)?;
    repo.remote("origin", "https://github.com/acme/rules.git")?;
    fs::write(path.join("draft.md"), "# Work in progress")?;

    // SSH form of the same remote still counts as the same repository.
    let entries = vec![remote_entry(
        "Rules",
        "git@github.com:acme/rules.git",
        &path,
        1700000000,
    )];
    let report = manager(home.path()).prepare_all(&entries)?;

    assert!(report.error.is_none());
    assert_eq!(report.repositories.len(), 1);
    assert_eq!(report.repositories[0].local_path, path);
    assert_eq!(
        report.repositories[0].sync.skip_reason(),
        Some(SkipReason::UncommittedChanges)
    );
    assert_eq!(fs::read_to_string(path.join("draft.md"))?, "# Work in progress");
    Ok(())
}
