// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{manager, remote_entry, RepoFixture};

use anyhow::Result;
use git2::Repository;
use pretty_assertions::assert_eq;
use rulem::{
    credential::{CredentialStore, MemoryBackend},
    path::PathGuard,
    repo::{
        git::{is_clean, GitAction, GitError, GitSource, Operation},
        sync::SyncOutcome,
    },
};
use std::fs;

struct Workspace {
    root: tempfile::TempDir,
    upstream: RepoFixture,
    paths: PathGuard,
    credentials: CredentialStore<MemoryBackend>,
}

impl Workspace {
    fn new() -> Result<Self> {
        let root = tempfile::tempdir()?;
        let upstream = RepoFixture::new(root.path().join("upstream"))?;
        upstream.stage_and_commit("general.md", "# General")?;

        Ok(Self {
            paths: PathGuard::with_home(root.path()),
            credentials: CredentialStore::new(MemoryBackend::new()),
            root,
            upstream,
        })
    }

    fn source(&self) -> GitSource<'_, MemoryBackend> {
        GitSource::new(&self.paths, &self.credentials)
    }

    /// Local upstreams cannot serve shallow clones.
    fn full_source(&self) -> GitSource<'_, MemoryBackend> {
        self.source().with_depth(None)
    }

    fn clone_path(&self) -> std::path::PathBuf {
        self.root.path().join("clone")
    }
}

#[test]
fn update_follows_new_upstream_commits() -> Result<()> {
    let ws = Workspace::new()?;
    ws.upstream.clone_to(ws.clone_path())?;
    ws.upstream.stage_and_commit("python/style.md", "# Style")?;

    let prepared = ws.source().update(&ws.clone_path(), &ws.upstream.url(), None)?;

    assert_eq!(prepared.action, GitAction::Updated);
    assert!(prepared.branch_warning.is_none());
    assert_eq!(
        fs::read_to_string(ws.clone_path().join("python/style.md"))?,
        "# Style"
    );
    Ok(())
}

#[test]
fn update_checks_out_configured_branch() -> Result<()> {
    let ws = Workspace::new()?;
    ws.upstream.create_branch("team")?;
    ws.upstream.stage_and_commit_on("team", "team.md", "# Team")?;
    let clone = ws.upstream.clone_to(ws.clone_path())?;
    assert!(!ws.clone_path().join("team.md").exists());

    let prepared = ws
        .source()
        .update(&ws.clone_path(), &ws.upstream.url(), Some("team"))?;

    assert!(prepared.branch_warning.is_none());
    assert_eq!(clone.head()?.shorthand(), Some("team"));
    assert_eq!(fs::read_to_string(ws.clone_path().join("team.md"))?, "# Team");

    let local = clone.find_branch("team", git2::BranchType::Local)?;
    assert_eq!(local.upstream()?.name()?, Some("origin/team"));
    Ok(())
}

#[test]
fn update_warns_about_missing_branch() -> Result<()> {
    let ws = Workspace::new()?;
    let clone = ws.upstream.clone_to(ws.clone_path())?;

    let prepared = ws
        .source()
        .update(&ws.clone_path(), &ws.upstream.url(), Some("nope"))?;

    assert_eq!(prepared.action, GitAction::Updated);
    assert!(matches!(
        prepared.branch_warning,
        Some(GitError::BranchNotOnRemote { ref branch }) if branch == "nope"
    ));
    assert_eq!(clone.head()?.shorthand(), Some("main"));
    assert!(ws.clone_path().join("general.md").exists());
    Ok(())
}

#[test]
fn update_leaves_dirty_clone_alone() -> Result<()> {
    let ws = Workspace::new()?;
    let clone = ws.upstream.clone_to(ws.clone_path())?;
    fs::write(ws.clone_path().join("general.md"), "# Edited locally")?;
    ws.upstream.stage_and_commit("python/style.md", "# Style")?;

    let prepared = ws.source().update(&ws.clone_path(), &ws.upstream.url(), None)?;

    assert_eq!(prepared.action, GitAction::LeftDirty);
    assert!(!is_clean(&clone)?);
    assert!(!ws.clone_path().join("python/style.md").exists());
    assert!(clone.find_reference("refs/remotes/origin/main")?.target()
        == clone.head()?.target());
    assert_eq!(
        fs::read_to_string(ws.clone_path().join("general.md"))?,
        "# Edited locally"
    );
    Ok(())
}

#[test]
fn untracked_files_count_as_dirty() -> Result<()> {
    let ws = Workspace::new()?;
    let clone = ws.upstream.clone_to(ws.clone_path())?;
    assert!(is_clean(&clone)?);

    fs::write(ws.clone_path().join("scratch.md"), "# Scratch")?;
    assert!(!is_clean(&clone)?);
    Ok(())
}

#[test]
fn clone_into_missing_destination() -> Result<()> {
    let ws = Workspace::new()?;

    let prepared = ws
        .full_source()
        .prepare_resolved(&ws.upstream.url(), None, &ws.clone_path())?;

    assert_eq!(prepared.action, GitAction::Cloned);
    assert_eq!(prepared.path, ws.clone_path());
    assert!(prepared.branch_warning.is_none());
    assert_eq!(
        fs::read_to_string(ws.clone_path().join("general.md"))?,
        "# General"
    );
    assert!(is_clean(&Repository::open(ws.clone_path())?)?);
    Ok(())
}

#[test]
fn clone_checks_out_configured_branch() -> Result<()> {
    let ws = Workspace::new()?;
    ws.upstream.create_branch("team")?;
    ws.upstream.stage_and_commit_on("team", "team.md", "# Team")?;

    let prepared =
        ws.full_source()
            .prepare_resolved(&ws.upstream.url(), Some("team"), &ws.clone_path())?;

    assert_eq!(prepared.action, GitAction::Cloned);
    assert!(prepared.branch_warning.is_none());
    let clone = Repository::open(ws.clone_path())?;
    assert_eq!(clone.head()?.shorthand(), Some("team"));
    assert_eq!(fs::read_to_string(ws.clone_path().join("team.md"))?, "# Team");
    Ok(())
}

#[test]
fn clone_falls_back_to_default_branch() -> Result<()> {
    let ws = Workspace::new()?;
    fs::create_dir(ws.clone_path())?;

    let prepared =
        ws.full_source()
            .prepare_resolved(&ws.upstream.url(), Some("nope"), &ws.clone_path())?;

    assert_eq!(prepared.action, GitAction::Cloned);
    assert!(matches!(
        prepared.branch_warning,
        Some(GitError::BranchNotOnRemote { ref branch }) if branch == "nope"
    ));
    let clone = Repository::open(ws.clone_path())?;
    assert_eq!(clone.head()?.shorthand(), Some("main"));
    assert!(ws.clone_path().join("general.md").exists());
    Ok(())
}

#[test]
fn shallow_clone_from_local_transport_is_not_a_network_error() -> Result<()> {
    let ws = Workspace::new()?;

    let err = ws
        .source()
        .prepare_resolved(&ws.upstream.url(), None, &ws.clone_path())
        .unwrap_err();

    assert!(matches!(
        err,
        GitError::Operation {
            operation: Operation::Clone,
            ..
        }
    ));
    assert!(!err.to_string().contains("network error"));
    Ok(())
}

#[test]
fn preparation_converges_on_rerun() -> Result<()> {
    let ws = Workspace::new()?;
    let url = ws.upstream.url();

    let first = ws.full_source().prepare_resolved(&url, None, &ws.clone_path())?;
    assert_eq!(first.action, GitAction::Cloned);

    let second = ws.full_source().prepare_resolved(&url, None, &ws.clone_path())?;
    assert_eq!(second.action, GitAction::Updated);
    assert!(second.branch_warning.is_none());

    ws.upstream.stage_and_commit("rust/errors.md", "# Errors")?;
    let entry = remote_entry("Rules", &url, ws.clone_path(), 1700000000);
    let outcome = manager(ws.root.path()).sync_one(&entry);
    assert!(matches!(outcome, SyncOutcome::Success { .. }), "{outcome}");
    assert_eq!(
        fs::read_to_string(ws.clone_path().join("rust/errors.md"))?,
        "# Errors"
    );

    let third = ws.full_source().prepare_resolved(&url, None, &ws.clone_path())?;
    assert_eq!(third.action, GitAction::Updated);
    assert!(is_clean(&Repository::open(ws.clone_path())?)?);
    Ok(())
}

#[test]
fn dirty_clone_keeps_its_origin() -> Result<()> {
    let ws = Workspace::new()?;
    let repo = Repository::init(ws.clone_path())?;
    repo.remote("origin", "git@github.com:acme/rules.git")?;
    fs::write(ws.clone_path().join("draft.md"), "# Draft")?;

    let prepared = ws.source().update(
        &ws.clone_path(),
        "https://github.com/acme/rules.git",
        None,
    )?;

    assert_eq!(prepared.action, GitAction::LeftDirty);
    let reopened = Repository::open(ws.clone_path())?;
    let origin = reopened.find_remote("origin")?;
    assert_eq!(origin.url(), Some("git@github.com:acme/rules.git"));
    Ok(())
}
