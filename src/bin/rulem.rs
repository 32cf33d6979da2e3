// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use rulem::{
    catalog::list_rule_files,
    config::{unix_now, Config, RepositoryEntry},
    credential::{CredentialStore, KeyringBackend},
    path::{default_config_file, default_storage_dir, PathGuard},
    repo::{
        git::verify_token,
        sync::SyncOutcome,
        BatchReport, RepositoryManager,
    },
    validate::{validate_batch, ValidationError},
};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Password;
use std::{path::PathBuf, process::exit, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Deadline for checking a token against a remote.
const VERIFY_DEADLINE: Duration = Duration::from_secs(10);

/// Exit code for per-entry preparation or synchronization failures.
const EXIT_FAILURE: i32 = 1;

/// Exit code for invalid configuration, reported before any I/O.
const EXIT_INVALID: i32 = 2;

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "rulem [options] <rulem-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<i32> {
        let config_path = match self.config {
            Some(path) => path,
            None => default_config_file()?,
        };

        match self.command {
            Command::Prepare => run_prepare(config_path).await,
            Command::Sync => run_sync(config_path).await,
            Command::Add(opts) => run_add(config_path, opts),
            Command::Remove(opts) => run_remove(config_path, opts),
            Command::List(opts) => run_list(config_path, opts),
            Command::Auth(opts) => run_auth(opts.command).await,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Prepare every central repository, cloning or updating remote ones.
    #[command(override_usage = "rulem prepare [options]")]
    Prepare,

    /// Fetch every clean remote repository.
    #[command(override_usage = "rulem sync [options]")]
    Sync,

    /// Register new central repository.
    #[command(override_usage = "rulem add [options] <name> (--path <path> | --url <url>)")]
    Add(AddOptions),

    /// Forget central repository. Files on disk are left alone.
    #[command(override_usage = "rulem remove [options] <id_or_name>")]
    Remove(RemoveOptions),

    /// List registered central repositories.
    #[command(override_usage = "rulem list [options]")]
    List(ListOptions),

    /// Manage personal access token for private remotes.
    #[command(override_usage = "rulem auth <auth-command>")]
    Auth(AuthOptions),
}

#[derive(Args, Clone, Debug)]
struct AddOptions {
    /// Display name of central repository.
    #[arg(required = true, value_name = "name")]
    pub name: String,

    /// Local directory, or clone destination when used with --url.
    #[arg(short, long, value_name = "path", required_unless_present = "url")]
    pub path: Option<PathBuf>,

    /// URL of remote Git repository.
    #[arg(short, long, value_name = "url")]
    pub url: Option<String>,

    /// Branch to check out instead of the default branch.
    #[arg(short, long, value_name = "branch", requires = "url")]
    pub branch: Option<String>,
}

#[derive(Args, Clone, Debug)]
struct RemoveOptions {
    /// Id or name of central repository to forget.
    #[arg(required = true, value_name = "id_or_name")]
    pub key: String,
}

#[derive(Args, Clone, Debug)]
struct ListOptions {
    /// Also list rule files of each central repository.
    #[arg(short, long)]
    pub files: bool,
}

#[derive(Args, Clone, Debug)]
struct AuthOptions {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Clone, Subcommand)]
enum AuthCommand {
    /// Store personal access token, prompting for it when not given.
    Set {
        /// Token to store. Prefer the prompt to keep it out of shell history.
        #[arg(long, value_name = "token")]
        token: Option<String>,
    },

    /// Delete stored personal access token.
    Remove,

    /// Show whether a token is stored, and whether the secret store works.
    Status,

    /// Check stored token against a remote repository.
    Verify {
        /// URL of remote repository to check against.
        #[arg(required = true, value_name = "url")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match Cli::parse().run().await {
        Ok(code) => exit(code),
        Err(err) if err.downcast_ref::<ValidationError>().is_some() => {
            error!("{err}");
            exit(EXIT_INVALID);
        }
        Err(err) => {
            error!("{err:?}");
            exit(EXIT_FAILURE);
        }
    }
}

async fn run_prepare(config_path: PathBuf) -> Result<i32> {
    let config = Config::load(&config_path)?;
    let manager = RepositoryManager::for_current_user()?;

    let spinner = spinner("preparing central repositories")?;
    let entries = config.repositories;
    let report = tokio::task::spawn_blocking(move || manager.prepare_all(&entries)).await??;
    spinner.finish_and_clear();

    print_report(&report);
    if let Some(error) = &report.error {
        error!("{error}");
    }

    Ok(if report.has_failures() { EXIT_FAILURE } else { 0 })
}

async fn run_sync(config_path: PathBuf) -> Result<i32> {
    let config = Config::load(&config_path)?;
    validate_batch(&config.repositories)?;
    let manager = RepositoryManager::for_current_user()?;

    let spinner = spinner("synchronizing central repositories")?;
    let entries = config.repositories;
    let (entries, outcomes) = tokio::task::spawn_blocking(move || {
        let outcomes = manager.sync_all(&entries);
        (entries, outcomes)
    })
    .await?;
    spinner.finish_and_clear();

    for (entry, outcome) in entries.iter().zip(&outcomes) {
        println!("{:<24} {outcome}", entry.name);
    }

    let failed = outcomes.iter().any(SyncOutcome::is_failed);
    Ok(if failed { EXIT_FAILURE } else { 0 })
}

fn run_add(config_path: PathBuf, opts: AddOptions) -> Result<i32> {
    let guard = PathGuard::new()?;
    let mut config = Config::load(&config_path)?;
    let now = unix_now();

    let entry = match opts.url {
        Some(url) => RepositoryEntry::remote(
            opts.name,
            url,
            opts.branch,
            opts.path.map(|path| guard.expand(path)),
            default_storage_dir()?,
            now,
        )?,
        None => {
            let path = opts
                .path
                .ok_or_else(|| anyhow!("either --path or --url is required"))?;
            RepositoryEntry::local(opts.name, guard.expand(path), now)
        }
    };

    info!("register {:?} as {}", entry.name, entry.id);
    config.add_repository(entry)?;
    config.save(&guard, &config_path)?;

    Ok(0)
}

fn run_remove(config_path: PathBuf, opts: RemoveOptions) -> Result<i32> {
    let guard = PathGuard::new()?;
    let mut config = Config::load(&config_path)?;
    let removed = config
        .remove_repository(&opts.key)
        .ok_or_else(|| anyhow!("no central repository named {:?}", opts.key))?;

    config.save(&guard, &config_path)?;
    info!("forgot {:?}, files at {:?} were left alone", removed.name, removed.path);

    Ok(0)
}

fn run_list(config_path: PathBuf, opts: ListOptions) -> Result<i32> {
    let config = Config::load(&config_path)?;
    let guard = PathGuard::new()?;

    for entry in &config.repositories {
        let source = entry.remote_url.as_deref().unwrap_or("-");
        println!("{:<24} {:<11} {:<40} {source}", entry.name, entry.kind, entry.path);

        if opts.files {
            let files = guard
                .resolve(&entry.path)
                .map_err(anyhow::Error::from)
                .and_then(|root| Ok(list_rule_files(root)?));
            match files {
                Ok(files) => files
                    .iter()
                    .for_each(|file| println!("    {}", file.display())),
                Err(err) => warn!("cannot list rule files of {:?}: {err}", entry.name),
            }
        }
    }

    Ok(0)
}

async fn run_auth(command: AuthCommand) -> Result<i32> {
    let store = CredentialStore::new(KeyringBackend::new());

    match command {
        AuthCommand::Set { token } => {
            let raw = match token {
                Some(token) => token,
                None => Password::new("personal access token")
                    .without_confirmation()
                    .prompt()?,
            };
            store.update(&raw)?;
            info!("personal access token stored");
        }
        AuthCommand::Remove => {
            store.delete()?;
            info!("personal access token removed");
        }
        AuthCommand::Status => {
            let probe = store.probe();
            match probe.error {
                None => println!("secret store: available"),
                Some(err) => println!("secret store: unavailable ({err})"),
            }
            println!(
                "token: {}",
                if store.has() { "configured" } else { "not configured" }
            );
        }
        AuthCommand::Verify { url } => {
            let token = store.get()?;
            let spinner = spinner(&format!("verifying token against {url}"))?;
            let result = verify_token(&url, token, VERIFY_DEADLINE).await;
            spinner.finish_and_clear();
            result?;
            info!("token accepted by {url}");
        }
    }

    Ok(0)
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {elapsed:.yellow} {msg}")?);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));

    Ok(bar)
}

fn print_report(report: &BatchReport) {
    for prepared in &report.repositories {
        println!(
            "{:<24} {:<40} {}",
            prepared.entry.name,
            prepared.local_path.display(),
            prepared.sync
        );

        if let Some(warning) = &prepared.branch_warning {
            warn!("{}: {warning}", prepared.entry.name);
        }
    }
}
