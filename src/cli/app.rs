//! Main CLI application structure

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::query;
use super::user;
use crate::domain::{Category, TaskStatus, UnitStatus};
use crate::storage::{Config, LogLevel, UnitSearch, Workspace};

/// Environment variable holding a tracing filter, e.g. `shotline=debug`
pub const LOG_ENV: &str = "SHOTLINE_LOG";

/// Environment variable read by `add-user` when `--password` is absent
pub const PASSWORD_ENV: &str = "SHOTLINE_PASSWORD";

#[derive(Parser)]
#[command(name = "shotline")]
#[command(author, version, about = "Production tracking data for VFX shows, shots and assets")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace with a database and a site row
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Show row counts per table
    Status,

    /// List shows
    Shows,

    /// Search units of a show
    Search(SearchArgs),

    /// Add a user with a bcrypt-hashed password
    AddUser {
        /// User id
        id: String,

        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: String,
    },
}

#[derive(Args)]
pub struct SearchArgs {
    /// Show to search
    pub show: String,

    /// shot or asset
    #[arg(long, short)]
    pub category: Option<Category>,

    /// Group name (repeatable, any may match)
    #[arg(long = "group", short)]
    pub groups: Vec<String>,

    /// Unit name fragment, `*` as wildcard (repeatable, any may match)
    #[arg(long = "unit", short)]
    pub units: Vec<String>,

    #[arg(long, short)]
    pub tag: Option<String>,

    /// Unit status
    #[arg(long, short)]
    pub status: Option<UnitStatus>,

    /// Units listing this task
    #[arg(long)]
    pub task: Option<String>,

    /// Units with a task assigned to this user
    #[arg(long)]
    pub assignee: Option<String>,

    /// Units with a task in this status
    #[arg(long)]
    pub task_status: Option<TaskStatus>,

    /// Units with a task due on this day (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

impl SearchArgs {
    fn to_search(&self) -> UnitSearch {
        UnitSearch {
            show: self.show.clone(),
            category: self.category,
            groups: self.groups.clone(),
            units: self.units.clone(),
            tag: self.tag.clone().unwrap_or_default(),
            status: self.status,
            task: self.task.clone().unwrap_or_default(),
            assignee: self.assignee.clone().unwrap_or_default(),
            task_status: self.task_status,
            due: self
                .due
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| Utc.from_utc_datetime(&d)),
        }
    }
}

/// Installs the stderr subscriber: `SHOTLINE_LOG`, then `--verbose`, then the config level
fn init_tracing(verbose: bool, level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { level.as_str() })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let global = Config::load_global()?;
    let format = cli.format.unwrap_or_else(|| global.default_format.into());
    let output = Output::new(format, cli.verbose);
    init_tracing(cli.verbose, global.log.level);

    output.verbose("shotline starting");

    if let Err(e) = dispatch(cli.command, &output) {
        output.error(&format!("{:#}", e));
        return Err(e);
    }

    output.verbose("Command completed successfully");
    Ok(())
}

fn dispatch(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
            let workspace = Workspace::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Database at: {}", workspace.database_path()?.display()),
            );
            output.success(&format!(
                "Initialized shotline workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::Status => {
            output.verbose("Gathering workspace status");
            query::status(output)?
        }

        Commands::Shows => query::shows(output)?,

        Commands::Search(args) => {
            let search = args.to_search();
            output.verbose_ctx("search", &format!("Filters: {:?}", search));
            query::search(output, &search)?
        }

        Commands::AddUser { id, password } => user::add(output, &id, &password)?,
    }
    Ok(())
}
