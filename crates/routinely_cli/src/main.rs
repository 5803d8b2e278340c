//! `routinely` command-line entry point.
//!
//! # Responsibility
//! - Parse flags, load configuration and wire core collaborators together.
//! - Save each shown routine so practice log sessions refer to it.
//! - Keep all scheduling semantics inside `routinely_core`.

mod identity;

use chrono::{DateTime, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use identity::PromptIdentity;
use log::info;
use routinely_core::db::{open_db, open_db_in_memory};
use routinely_core::{
    format_markdown, init_logging, AppConfig, AppContext, AuthState, EngineGenerator,
    IdentityProvider, NestedList, PlanService, PracticeLogService, Routine, RoutineEngine,
    SqlitePlanStore, SqlitePracticeLogRepository, SqliteRecordStore, TaskOutcome, UserId,
};
use rusqlite::Connection;
use std::num::NonZeroU32;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "routinely",
    version,
    about = "Build dated practice routines and keep a practice log"
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// SQLite store; overrides `db_path` from the config file.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, make sure the user record exists and print the routine.
    Show(RunArgs),
    /// Print the raw generator payload for a plan size.
    Generate {
        /// Number of days to include in the practice plan.
        #[arg(short = 'n', long = "number")]
        number: Option<NonZeroU32>,
    },
    /// Run the pipeline and write a printable Markdown practice sheet.
    Export {
        #[arg(long, value_name = "PATH")]
        markdown: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Add, list or delete notes against sessions of the last shown routine.
    Log {
        #[arg(long)]
        user: Option<String>,
        #[command(subcommand)]
        action: LogCommands,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Number of days to plan; overrides `plan_size`.
    #[arg(short = 'n', long = "days")]
    days: Option<NonZeroU32>,

    /// Signed-in user id; prompts on stdin when omitted.
    #[arg(long)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum LogCommands {
    Add {
        /// 1-based session (day) number from the plan.
        #[arg(long)]
        session: u32,
        #[arg(long)]
        notes: String,
    },
    List {
        /// Optional 1-based session number to filter by.
        #[arg(long)]
        session: Option<u32>,
    },
    Delete {
        #[arg(long)]
        entry_id: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Show(args) => run_show(&config, args),
        Commands::Generate { number } => run_generate(&config, number),
        Commands::Export { markdown, run } => run_export(&config, run, markdown),
        Commands::Log { user, action } => run_log(&config, user, action),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, String> {
    let file_config = match &cli.config {
        Some(path) => AppConfig::load(path).map_err(|err| err.to_string())?,
        None => AppConfig::default(),
    };
    let config = apply_overrides(file_config, cli);

    if let Some(dir) = &config.logging.dir {
        init_logging(&config.logging.level, dir)?;
    }
    Ok(config)
}

/// Command-line flags win over values from the config file.
fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.dir = Some(dir.clone());
    }
    config
}

fn open_store(config: &AppConfig) -> Result<Connection, String> {
    match &config.db_path {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| format!("failed to open store: {err}"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_user(user: Option<String>) -> Result<Option<UserId>, String> {
    user.map(UserId::parse)
        .transpose()
        .map_err(|err| err.to_string())
}

/// Uses the current identity, prompting for sign-in when signed out.
fn resolve_user(identity: &impl IdentityProvider) -> Result<UserId, String> {
    match identity.current() {
        AuthState::SignedIn(signed_in) => Ok(signed_in.user_id),
        AuthState::SignedOut => identity
            .sign_in()
            .map(|signed_in| signed_in.user_id)
            .map_err(|err| err.to_string()),
    }
}

/// Runs one pipeline task and saves the rendered routine as the user's plan.
fn run_pipeline(
    config: &AppConfig,
    args: RunArgs,
    today: NaiveDate,
    target: &mut NestedList,
) -> Result<Option<Routine>, String> {
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    let engine = config.engine(&catalog).map_err(|err| err.to_string())?;
    let fingerprint = config.plan_fingerprint(&catalog);
    let plan_size = args.days.unwrap_or(config.plan_size);
    let identity = PromptIdentity::stdin(parse_user(args.user)?);
    let conn = open_store(config)?;

    let context = AppContext::new(
        SqliteRecordStore::new(&conn),
        EngineGenerator::new(engine),
        identity,
        catalog,
        plan_size,
    );

    match context.run(today, target).map_err(|err| err.to_string())? {
        TaskOutcome::Rendered {
            user_id, routine, ..
        } => {
            PlanService::new(SqlitePlanStore::new(&conn), fingerprint)
                .save_shown(&user_id, &routine)
                .map_err(|err| err.to_string())?;
            Ok(Some(routine))
        }
        TaskOutcome::Stale { .. } => Ok(None),
    }
}

fn run_show(config: &AppConfig, args: RunArgs) -> Result<(), String> {
    let mut target = NestedList::new();
    run_pipeline(config, args, today(), &mut target)?;
    print!("{target}");
    Ok(())
}

fn run_generate(config: &AppConfig, number: Option<NonZeroU32>) -> Result<(), String> {
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    let engine = config.engine(&catalog).map_err(|err| err.to_string())?;
    let payload = engine
        .build(number.unwrap_or(config.plan_size))
        .map_err(|err| err.to_string())?;
    println!("{payload}");
    Ok(())
}

fn run_export(config: &AppConfig, args: RunArgs, markdown: PathBuf) -> Result<(), String> {
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    let today = today();
    let mut target = NestedList::new();
    let Some(routine) = run_pipeline(config, args, today, &mut target)? else {
        return Err("routine was superseded before it could be exported".to_string());
    };

    let generated_on = today.format("%B %d %Y").to_string();
    std::fs::write(&markdown, format_markdown(&routine, &catalog, &generated_on)).map_err(
        |err| {
            format!(
                "failed to write Markdown output `{}`: {err}",
                markdown.display()
            )
        },
    )?;
    info!(
        "event=markdown_export module=cli status=ok days={}",
        routine.len()
    );
    println!("Wrote Markdown to {}", markdown.display());
    Ok(())
}

fn run_log(config: &AppConfig, user: Option<String>, action: LogCommands) -> Result<(), String> {
    let user_id = resolve_user(&PromptIdentity::stdin(parse_user(user)?))?;
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    let conn = open_store(config)?;
    let service = PracticeLogService::new(
        SqlitePracticeLogRepository::new(&conn),
        PlanService::new(SqlitePlanStore::new(&conn), config.plan_fingerprint(&catalog)),
    );

    match action {
        LogCommands::Add { session, notes } => {
            let entry = service
                .add_entry(&user_id, to_session_index(session)?, &notes)
                .map_err(|err| err.to_string())?;
            println!(
                "Added entry {} to session {} at {}",
                entry.entry_id,
                entry.session_index + 1,
                format_logged_at(entry.logged_at)
            );
        }
        LogCommands::List { session } => {
            let session_index = session.map(to_session_index).transpose()?;
            let entries = service
                .list_entries(&user_id, session_index)
                .map_err(|err| err.to_string())?;
            if entries.is_empty() {
                match session {
                    Some(session) => println!("No log entries for session {session}."),
                    None => println!("No log entries found."),
                }
            }
            for entry in entries {
                println!(
                    "[{}] Session {} {}: {}",
                    entry.entry_id,
                    entry.session_index + 1,
                    format_logged_at(entry.logged_at),
                    entry.notes
                );
            }
        }
        LogCommands::Delete { entry_id } => {
            let removed = service
                .delete_entry(&user_id, entry_id)
                .map_err(|err| err.to_string())?;
            println!(
                "Removed entry {} from session {}",
                removed.entry_id,
                removed.session_index + 1
            );
        }
    }
    Ok(())
}

/// Converts a 1-based session number from the command line to a plan index.
fn to_session_index(session: u32) -> Result<u32, String> {
    session
        .checked_sub(1)
        .ok_or_else(|| "session numbers start at 1".to_string())
}

fn format_logged_at(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|at| {
            at.with_timezone(&Local)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}
