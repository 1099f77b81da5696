//! fieldscope CLI - Command-line interface
//!
//! Lists data views, loads index patterns through the cache loader and runs
//! field existence syncs against a configured server.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::ServerArgs;
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "fieldscope", version, about = "Index pattern loading and field existence")]
struct Cli {
    #[command(flatten)]
    server: ServerArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List data views sorted by title
    Refs {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Load index patterns, falling back to other patterns if none load
    Load {
        /// Index pattern ids to load
        #[arg(required = true)]
        ids: Vec<String>,

        /// Fallback ids, tried in order when none of the ids load
        #[arg(long = "fallback")]
        fallback: Vec<String>,

        /// Print the loaded patterns as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report which fields of an index pattern have data
    Existence {
        /// Id of the current index pattern
        id: String,

        /// Other index pattern ids to include in the sync
        #[arg(long = "with")]
        with: Vec<String>,

        /// Start of the date range (overrides existence.from_date)
        #[arg(long)]
        from: Option<String>,

        /// End of the date range (overrides existence.to_date)
        #[arg(long)]
        to: Option<String>,

        /// Filter as a JSON query DSL object
        #[arg(long)]
        query: Option<String>,

        /// Print the existence state as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Refs { json } => commands::patterns::run_refs(&cli.server, json),
        Commands::Load {
            ids,
            fallback,
            json,
        } => commands::patterns::run_load(&cli.server, ids, fallback, json),
        Commands::Existence {
            id,
            with,
            from,
            to,
            query,
            json,
        } => commands::existence::run(
            &cli.server,
            commands::existence::ExistenceArgs {
                id,
                with,
                from,
                to,
                query,
                json,
            },
        ),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
