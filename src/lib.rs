// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Manage AI assistant rule files kept in central repositories.
//!
//! Users keep their rule files in one or more __central repositories__, each
//! either a local directory or a remote Git repository. Rulem resolves those
//! into local directories that are safe to read from, keeping shallow clones of
//! remote repositories up to date along the way.
//!
//! # See Also
//!
//! 1. [`repo::RepositoryManager`]
//! 2. [`config::Config`]

pub mod catalog;
pub mod config;
pub mod credential;
pub mod path;
pub mod repo;
pub mod url;
pub mod validate;
