// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! hostvault - encrypted connection profiles behind one master password.
//!
//! This is the binary entry point.

mod profiles;

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hostvault_config::HostvaultConfig;
use hostvault_core::{HostvaultError, ProfileFields, SortKey};
use hostvault_vault::{AuthOutcome, CredentialVault, prompt};

use crate::profiles::{ProfileArgs, Session, render_details, render_list};

/// Exit code for a rejected master password.
const EXIT_DENIED: i32 = 2;

/// hostvault - encrypted connection profiles behind one master password.
#[derive(Parser, Debug)]
#[command(name = "hostvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the master password for a new vault.
    Init,
    /// List saved connections.
    List {
        /// Column to sort by: name, host, port, auth, user.
        #[arg(long, default_value = "name")]
        sort: SortKey,
        #[arg(long)]
        reverse: bool,
    },
    /// Add a connection.
    Add {
        #[command(flatten)]
        fields: ProfileArgs,
        /// Read the connection's login password from stdin.
        #[arg(long)]
        password_stdin: bool,
    },
    /// Change fields of a connection.
    Edit {
        /// Profile id, unique id prefix, or name.
        profile: String,
        #[command(flatten)]
        fields: ProfileArgs,
        /// Read a new login password from stdin.
        #[arg(long)]
        password_stdin: bool,
    },
    /// Copy a connection under a new id.
    Duplicate { profile: String },
    /// Delete a connection.
    Remove { profile: String },
    /// Change the master password and re-encrypt the vault.
    Passwd,
    /// Show one connection.
    Show {
        profile: String,
        /// Print the stored login password.
        #[arg(long)]
        reveal: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => hostvault_config::load_and_validate_path(path),
        None => hostvault_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            hostvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);

    match run(cli.command, &config) {
        Ok(()) => {}
        Err(Failure::Denied) => {
            eprintln!("hostvault: wrong master password");
            std::process::exit(EXIT_DENIED);
        }
        Err(Failure::Error(e)) => {
            eprintln!("hostvault: {e}");
            std::process::exit(1);
        }
    }
}

enum Failure {
    Denied,
    Error(HostvaultError),
}

impl From<HostvaultError> for Failure {
    fn from(e: HostvaultError) -> Self {
        Failure::Error(e)
    }
}

impl From<io::Error> for Failure {
    fn from(e: io::Error) -> Self {
        Failure::Error(e.into())
    }
}

fn run(command: Commands, config: &HostvaultConfig) -> Result<(), Failure> {
    let vault = CredentialVault::open(&config.vault);

    match command {
        Commands::Init => {
            let password = prompt::get_initial_password()?;
            vault.initialize(&password)?;
            println!("Vault initialized in {}", config.vault.data_dir);
        }
        Commands::Passwd => {
            let old = prompt::get_master_password()?;
            let new = prompt::get_new_password()?;
            match vault.change_password(&old, &new)? {
                AuthOutcome::Granted(_) => println!("Master password changed."),
                AuthOutcome::Denied => return Err(Failure::Denied),
            }
        }
        Commands::List { sort, reverse } => {
            let session = open_session(vault, Access::ReadOnly)?;
            render_list(&mut io::stdout().lock(), session.profiles(), sort, reverse)?;
        }
        Commands::Add {
            fields,
            password_stdin,
        } => {
            let mut session = open_session(vault, Access::Update)?;
            let mut profile = ProfileFields::default();
            fields.apply(&mut profile);
            if password_stdin {
                profile.password = read_stdin_password()?;
            }
            let id = session.add(profile)?;
            println!("{id}");
        }
        Commands::Edit {
            profile,
            fields,
            password_stdin,
        } => {
            let mut session = open_session(vault, Access::Update)?;
            let password = if password_stdin {
                Some(read_stdin_password()?)
            } else {
                None
            };
            let id = session.edit(&profile, &fields, password)?;
            println!("{id}");
        }
        Commands::Duplicate { profile } => {
            let mut session = open_session(vault, Access::Update)?;
            let id = session.duplicate(&profile)?;
            println!("{id}");
        }
        Commands::Remove { profile } => {
            let mut session = open_session(vault, Access::Update)?;
            let removed = session.remove(&profile)?;
            println!("Removed {} ({})", removed.fields().name, removed.id());
        }
        Commands::Show { profile, reveal } => {
            let session = open_session(vault, Access::ReadOnly)?;
            let index = session.find(&profile)?;
            render_details(&mut io::stdout().lock(), &session.profiles()[index], reveal)?;
        }
    }
    Ok(())
}

/// Whether a command only views profiles or also changes them.
#[derive(Clone, Copy)]
enum Access {
    ReadOnly,
    Update,
}

fn open_session(vault: CredentialVault, access: Access) -> Result<Session, Failure> {
    if !vault.is_initialized()? {
        return Err(HostvaultError::Vault(
            "vault is not initialized; run `hostvault init` first".to_string(),
        )
        .into());
    }
    let password = prompt::get_master_password()?;
    match vault.unlock(&password)? {
        AuthOutcome::Granted(key) => Ok(match access {
            Access::ReadOnly => Session::read_only(vault, key)?,
            Access::Update => Session::for_update(vault, key)?,
        }),
        AuthOutcome::Denied => Err(Failure::Denied),
    }
}

/// One line from stdin, or a hidden prompt on a TTY.
fn read_stdin_password() -> Result<String, Failure> {
    if io::stdin().is_terminal() {
        return rpassword::prompt_password("Connection password: ")
            .map_err(|e| HostvaultError::Internal(format!("failed to read password: {e}")).into());
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    line.truncate(line.trim_end_matches(['\r', '\n']).len());
    Ok(line)
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // Matches every hostvault_* crate by target prefix.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hostvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}
