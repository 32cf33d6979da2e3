// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{manager, remote_entry, RepoFixture};

use anyhow::Result;
use pretty_assertions::assert_eq;
use rulem::{
    config::RepositoryEntry,
    repo::sync::{SkipReason, SyncOutcome},
};
use std::fs;

#[test]
fn clean_clone_syncs_to_upstream() -> Result<()> {
    let root = tempfile::tempdir()?;
    let upstream = RepoFixture::new(root.path().join("upstream"))?;
    upstream.stage_and_commit("general.md", "# General")?;
    let clone = root.path().join("clone");
    upstream.clone_to(&clone)?;
    upstream.stage_and_commit("rust/errors.md", "# Errors")?;

    let entry = remote_entry("Rules", &upstream.url(), &clone, 1700000000);
    let outcome = manager(root.path()).sync_one(&entry);

    assert!(matches!(outcome, SyncOutcome::Success { .. }), "{outcome}");
    assert_eq!(fs::read_to_string(clone.join("rust/errors.md"))?, "# Errors");
    Ok(())
}

#[test]
fn mixed_batch_keeps_order_and_independence() -> Result<()> {
    let root = tempfile::tempdir()?;
    let upstream = RepoFixture::new(root.path().join("upstream"))?;
    upstream.stage_and_commit("general.md", "# General")?;

    let clean = root.path().join("clean");
    let dirty = root.path().join("dirty");
    upstream.clone_to(&clean)?;
    upstream.clone_to(&dirty)?;
    fs::write(dirty.join("draft.md"), "# Draft")?;

    let entries = vec![
        remote_entry("Dirty", &upstream.url(), &dirty, 1700000000),
        RepositoryEntry::local("Local", root.path(), 1700000001),
        remote_entry("Missing", &upstream.url(), root.path().join("gone"), 1700000002),
        remote_entry("Clean", &upstream.url(), &clean, 1700000003),
    ];
    let outcomes = manager(root.path()).sync_all(&entries);

    assert_eq!(outcomes.len(), 4);
    assert_eq!(
        outcomes[0].skip_reason(),
        Some(SkipReason::UncommittedChanges)
    );
    assert_eq!(outcomes[1].skip_reason(), Some(SkipReason::NotARemote));
    assert!(outcomes[2].is_failed());
    assert!(matches!(outcomes[3], SyncOutcome::Success { .. }));
    assert!(dirty.join("draft.md").exists());
    Ok(())
}
