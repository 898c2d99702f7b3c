//! Database connectivity checker and one-off SQL runner.
//!
//! Reads the JDBC settings of a portal installation, either from a
//! `portal-ext.properties`-style file or from a Tomcat `context.xml`, and
//! checks the connection or runs a single statement with them.
//!
//! # Exit Codes
//! - `0`: success
//! - `1`: database unreachable, or a command failed
//! - `2`: invalid command line

use clap::{Args, CommandFactory, Parser, Subcommand, error::ErrorKind};
use dbchecko_core::{DbChecko, DriverKind, DriverRegistry, Result, logging::init_logging};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "dbchecko")]
#[command(about = "Checks database connectivity and runs one-off SQL statements")]
#[command(version)]
#[command(long_about = "
dbchecko - database connectivity checker

Resolves the connection from one of two sources:
- a properties file with jdbc.default.url, jdbc.default.username,
  jdbc.default.password and jdbc.default.driverClassName
- a context file with a <Resource name=\"jdbc/LiferayPool\" .../> element

If both are given, the properties file is used.

SECURITY FEATURES:
- Passwords are never logged
- Connection URLs are redacted in all messages

EXAMPLES:
  dbchecko check -p portal-ext.properties
  dbchecko select -c tomcat/conf/context.xml \"SELECT userId, screenName FROM User_\"
  dbchecko update -p portal-ext.properties \"UPDATE User_ SET status = 0 WHERE userId = 20156\"
")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the database is reachable
    Check(SourceArgs),
    /// Run a SELECT and print the result as a table
    Select(QueryArgs),
    /// Run an INSERT, UPDATE, DELETE or DDL statement
    Update(QueryArgs),
    /// List supported driver identifiers
    Drivers,
}

#[derive(Args)]
struct SourceArgs {
    /// Properties file
    #[arg(
        short = 'p',
        long = "properties",
        env = "DBCHECKO_PROPERTIES",
        value_name = "FILE",
        help = "Path to properties file"
    )]
    properties: Option<PathBuf>,

    /// Context file
    #[arg(
        short = 'c',
        long = "context",
        env = "DBCHECKO_CONTEXT",
        value_name = "FILE",
        help = "Path to context file"
    )]
    context: Option<PathBuf>,
}

impl SourceArgs {
    /// Fails the same way a missing required argument does.
    fn require_source(&self) -> std::result::Result<(), clap::Error> {
        if self.properties.is_none() && self.context.is_none() {
            return Err(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "Missing properties file or context file",
            ));
        }
        Ok(())
    }

    fn checko(&self) -> Result<DbChecko> {
        DbChecko::from_sources(self.properties.as_deref(), self.context.as_deref())
    }
}

#[derive(Args)]
struct QueryArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// SQL statement, passed to the database verbatim
    #[arg(value_name = "QUERY")]
    query: String,
}

#[derive(Args)]
struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all log output except errors")]
    quiet: bool,
}

impl Command {
    fn source(&self) -> Option<&SourceArgs> {
        match self {
            Self::Check(source) => Some(source),
            Self::Select(args) | Self::Update(args) => Some(&args.source),
            Self::Drivers => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        eprint!("{}", Cli::command().render_help());
        return;
    };

    if let Some(source) = command.source()
        && let Err(e) = source.require_source()
    {
        e.exit();
    }

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run(&command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            if let Some(source) = std::error::Error::source(&e) {
                error!("Caused by: {}", source);
            }
            std::process::exit(1);
        }
    }
}

/// Runs one command; `Ok(false)` means the database was not reachable.
async fn run(command: &Command) -> Result<bool> {
    match command {
        Command::Check(source) => {
            let checko = source.checko()?;
            let reachable = checko.check().await;
            if reachable {
                info!("Connection to {} successful", checko.config());
            } else {
                error!("Connection to {} failed", checko.config());
            }
            Ok(reachable)
        }
        Command::Select(args) => {
            let checko = args.source.checko()?;
            let mut stdout = std::io::stdout().lock();
            checko.execute_select(&args.query, &mut stdout).await?;
            Ok(true)
        }
        Command::Update(args) => {
            let checko = args.source.checko()?;
            let mut stdout = std::io::stdout().lock();
            checko.execute_update_to(&args.query, &mut stdout).await?;
            Ok(true)
        }
        Command::Drivers => {
            list_drivers(DriverRegistry::global());
            Ok(true)
        }
    }
}

/// Lists registered driver identifiers grouped by engine.
fn list_drivers(registry: &DriverRegistry) {
    println!("Supported drivers:");
    for kind in DriverKind::ALL {
        if !kind.is_available() {
            println!("  {kind}: not compiled in (enable feature '{}')", kind.feature());
            continue;
        }
        let identifiers: Vec<&str> = registry
            .identifiers()
            .filter(|(_, registered)| *registered == kind)
            .map(|(identifier, _)| identifier)
            .collect();
        println!("  {kind}: {}", identifiers.join(", "));
    }
}
