//! Command-line front end for the Roster registry.
//!
//! # Responsibility
//! - Open and initialize the registry, run one operation, print the view.
//! - Own confirmation of destructive commands (`--yes`); the core never asks.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use roster_core::{
    core_version, init_logging, CoreConfig, SeedOutcome, SeedReport, SeedSet, UserId, UserRecord,
    UserRegistry,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "roster",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local-first user registry seeded from a bundled snapshot"
)]
struct Cli {
    /// Data directory (defaults to ROSTER_DATA_DIR or the platform data dir).
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log level: trace|debug|info|warn|error.
    #[clap(long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every user, newest first
    List,
    /// Case-insensitive search over name and email
    Search { term: String },
    /// Add a user
    Add { name: String, email: String },
    /// Replace a user's name and email
    Update {
        id: UserId,
        name: String,
        email: String,
    },
    /// Delete one user
    Delete {
        id: UserId,
        #[clap(long)]
        yes: bool,
    },
    /// Delete every user without reseeding
    Clear {
        #[clap(long)]
        yes: bool,
    },
    /// Discard all users and restore the bundled seed data
    Reset {
        #[clap(long)]
        yes: bool,
    },
    /// Write a JSON snapshot to the export directory
    Export,
    /// Replace all users with the contents of a seed or export file
    Import {
        file: PathBuf,
        #[clap(long)]
        yes: bool,
    },
    /// Print the core version
    Version,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Search { .. } => "search",
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Clear { .. } => "clear",
            Self::Reset { .. } => "reset",
            Self::Export => "export",
            Self::Import { .. } => "import",
            Self::Version => "version",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Command::Version => {
            println!("roster_core version={}", core_version());
            return Ok(());
        }
        command => command,
    };

    let mut config = match cli.data_dir {
        Some(dir) => CoreConfig::with_data_dir(dir),
        None => CoreConfig::from_env()?,
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.ensure_dirs()?;
    init_logging(&config.log_level, config.log_dir()).context("failed to start logging")?;

    let mut registry = UserRegistry::open(&config)?;
    let outcome = registry.initialize()?;
    if let Some(report) = &outcome.seed_report {
        print_seed_report("first run seeded", report);
    }
    info!("event=cli_command module=cli status=start command={}", command.name());

    match command {
        Command::List => print_users(registry.users()),
        Command::Search { term } => print_users(&registry.search(&term)?),
        Command::Add { name, email } => {
            let user = registry.add(&name, &email)?;
            println!("added #{}", user.id);
            print_users(registry.users());
        }
        Command::Update { id, name, email } => {
            registry.update(id, &name, &email)?;
            println!("updated #{id}");
            print_users(registry.users());
        }
        Command::Delete { id, yes } => {
            confirm(yes, "delete")?;
            if registry.delete(id)? {
                println!("deleted #{id}");
            } else {
                println!("no user #{id}; nothing deleted");
            }
            print_users(registry.users());
        }
        Command::Clear { yes } => {
            confirm(yes, "clear")?;
            let removed = registry.clear_all()?;
            println!("removed {removed} users");
        }
        Command::Reset { yes } => {
            confirm(yes, "reset")?;
            let report = registry.reset()?;
            print_seed_report("reset", &report);
            print_users(registry.users());
        }
        Command::Export => {
            let path = registry.export()?;
            println!(
                "exported {} users to {}",
                registry.users().len(),
                path.display()
            );
        }
        Command::Import { file, yes } => {
            confirm(yes, "import")?;
            let seed = SeedSet::from_path(&file)?;
            let report = registry.import(&seed)?;
            print_seed_report("imported", &report);
            print_users(registry.users());
        }
        // Answered before the registry is opened.
        Command::Version => {}
    }

    Ok(())
}

fn confirm(yes: bool, action: &str) -> Result<()> {
    if !yes {
        bail!("`{action}` is destructive; re-run with --yes to confirm");
    }
    Ok(())
}

fn print_users(users: &[UserRecord]) {
    if users.is_empty() {
        println!("(no users)");
        return;
    }
    for user in users {
        println!(
            "{:>5}  {:<24}  {:<32}  {}",
            user.id,
            user.name,
            user.email,
            user.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn print_seed_report(label: &str, report: &SeedReport) {
    println!(
        "{label}: {} inserted, {} skipped",
        report.inserted_count(),
        report.skipped_count()
    );
    for outcome in report.skipped() {
        if let SeedOutcome::Skipped {
            index,
            email,
            reason,
        } = outcome
        {
            println!("  skipped entry {index} ({email}): {reason}");
        }
    }
}
