// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

mod integration;

use anyhow::Result;
use git2::{IndexEntry, IndexTime, Repository, RepositoryInitOptions};
use rulem::{
    config::{RepositoryEntry, RepositoryKind},
    credential::{CredentialStore, MemoryBackend},
    path::PathGuard,
    repo::RepositoryManager,
};
use std::path::{Path, PathBuf};

/// Upstream repository that test clones are made from.
pub(crate) struct RepoFixture {
    repo: Repository,
}

impl RepoFixture {
    pub(crate) fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(path.as_ref(), &opts)?;

        // INVARIANT: Always provide valid name and email.
        //   - Git will complain if this is not set in CI/CD environments.
        let mut config = repo.config()?;
        config.set_str("user.name", "John Doe")?;
        config.set_str("user.email", "john@doe.com")?;

        Ok(Self { repo })
    }

    /// Location to clone from.
    pub(crate) fn url(&self) -> String {
        self.repo
            .workdir()
            .unwrap_or_else(|| self.repo.path())
            .to_string_lossy()
            .into_owned()
    }

    /// Commit file on top of whatever HEAD points to.
    pub(crate) fn stage_and_commit(
        &self,
        filename: impl AsRef<Path>,
        contents: impl AsRef<str>,
    ) -> Result<()> {
        self.stage_and_commit_to("HEAD", filename, contents)
    }

    /// Commit file on top of a local branch.
    pub(crate) fn stage_and_commit_on(
        &self,
        branch: &str,
        filename: impl AsRef<Path>,
        contents: impl AsRef<str>,
    ) -> Result<()> {
        self.stage_and_commit_to(&format!("refs/heads/{branch}"), filename, contents)
    }

    pub(crate) fn create_branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &head, false)?;
        Ok(())
    }

    /// Make plain clone of upstream at target path.
    pub(crate) fn clone_to(&self, path: impl AsRef<Path>) -> Result<Repository> {
        Ok(Repository::clone(&self.url(), path.as_ref())?)
    }

    fn stage_and_commit_to(
        &self,
        refname: &str,
        filename: impl AsRef<Path>,
        contents: impl AsRef<str>,
    ) -> Result<()> {
        // INVARIANT: Always determine latest parent commit of target reference.
        let parent = match self.repo.refname_to_id(refname) {
            Ok(oid) => Some(self.repo.find_commit(oid)?),
            Err(_) => None,
        };

        // INVARIANT: Index must start from parent's tree, so branches never
        // pick up each other's files.
        let mut index = self.repo.index()?;
        match &parent {
            Some(parent) => index.read_tree(&parent.tree()?)?,
            None => index.clear()?,
        }

        let entry = IndexEntry {
            ctime: IndexTime::new(0, 0),
            mtime: IndexTime::new(0, 0),
            dev: 0,
            ino: 0,
            mode: 0o100644,
            uid: 0,
            gid: 0,
            file_size: contents.as_ref().len() as u32,
            id: self.repo.blob(contents.as_ref().as_bytes())?,
            flags: 0,
            flags_extended: 0,
            path: filename
                .as_ref()
                .to_string_lossy()
                .into_owned()
                .into_bytes(),
        };
        index.add_frombuffer(&entry, contents.as_ref().as_bytes())?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        let signature = self.repo.signature()?;
        let parents = parent.iter().collect::<Vec<_>>();
        self.repo.commit(
            Some(refname),
            &signature,
            &signature,
            format!("chore: add {:?}", filename.as_ref()).as_ref(),
            &tree,
            &parents,
        )?;

        Ok(())
    }
}

/// Repository manager confined to a scratch home directory.
pub(crate) fn manager(home: impl Into<PathBuf>) -> RepositoryManager<MemoryBackend> {
    RepositoryManager::new(
        PathGuard::with_home(home),
        CredentialStore::new(MemoryBackend::new()),
    )
}

/// Remote entry pointing at an existing clone.
pub(crate) fn remote_entry(
    name: &str,
    url: &str,
    path: impl AsRef<Path>,
    created_at: i64,
) -> RepositoryEntry {
    RepositoryEntry {
        id: rulem::config::generate_id(name, created_at),
        name: name.into(),
        kind: RepositoryKind::RemoteGit,
        created_at,
        path: path.as_ref().to_string_lossy().into_owned(),
        remote_url: Some(url.into()),
        ..Default::default()
    }
}
