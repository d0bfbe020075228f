//! `notekeeper` executable.
//!
//! # Responsibility
//! - Resolve runtime configuration from an optional TOML file plus flags.
//! - Own process-level setup: logging, database bootstrap, tokio runtime.
//!
//! # Invariants
//! - Configuration is built once here and passed down explicitly.
//! - The logger handle lives until `main` returns so buffered file output
//!   is flushed.

use clap::{Parser, Subcommand};
use log::{error, info};
use notekeeper_api::{router, serve, AppState};
use notekeeper_core::db::{open_db, open_db_in_memory};
use notekeeper_core::{init_logging, Config, DatabaseConfig, NoteService, SqliteNoteStore};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "notekeeper", version, about = "Notes REST service")]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override `database.path`. Use `:memory:` for a throwaway database.
    #[arg(long, value_name = "PATH", global = true)]
    database: Option<PathBuf>,

    /// Override `logging.level`.
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Override `logging.log_dir`.
    #[arg(long, value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Override `server.bind`.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Skip seeding sample notes into an empty database.
        #[arg(long)]
        no_seed: bool,
    },
    /// Create or migrate the database schema.
    InitDb {
        /// Delete every note after migrating.
        #[arg(long)]
        reset: bool,
    },
    /// Insert the built-in sample notes.
    Seed,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("notekeeper: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = resolve_config(&cli)?;
    let _logger = init_logging(&config.logging)?;
    info!(
        "event=cli_start module=cli status=ok version={} database={}",
        notekeeper_core::core_version(),
        config.database.path.display()
    );

    match cli.command {
        Command::Serve { no_seed, .. } => run_serve(config, no_seed),
        Command::InitDb { reset } => {
            let service = open_service(&config.database)?;
            if reset {
                let removed = service.clear()?;
                println!("database reset, removed {removed} notes");
            } else {
                println!("database ready at {}", config.database.path.display());
            }
            Ok(())
        }
        Command::Seed => {
            let service = open_service(&config.database)?;
            let seeded = service.seed_samples()?;
            println!("inserted {} sample notes", seeded.len());
            Ok(())
        }
    }
}

/// Applies flag overrides on top of the file (or default) config and
/// re-validates the result.
fn resolve_config(cli: &Cli) -> CliResult<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(path) = &cli.database {
        config.database.path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.log_dir = Some(dir.clone());
    }
    if let Command::Serve { bind: Some(bind), .. } = &cli.command {
        config.server.bind = bind.clone();
    }

    config.normalize();
    config.validate()?;
    Ok(config)
}

fn open_service(config: &DatabaseConfig) -> CliResult<NoteService<SqliteNoteStore>> {
    let conn = if config.is_in_memory() {
        open_db_in_memory()?
    } else {
        open_db(&config.path)?
    };
    Ok(NoteService::new(SqliteNoteStore::try_new(conn)?))
}

fn run_serve(config: Config, no_seed: bool) -> CliResult<()> {
    let service = open_service(&config.database)?;
    if config.database.auto_seed && !no_seed {
        service.seed_if_empty()?;
    }

    let app = router(AppState::new(service), &config.server);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(app, &config.server))?;
    Ok(())
}
