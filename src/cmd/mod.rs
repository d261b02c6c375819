mod deps;
mod generate;
mod schema;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eadv-synth")]
#[command(version)]
#[command(
    about = "Generate synthetic EADV fixtures for compiled clinical rule blocks",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a fixture for a rule-block file
    Generate {
        /// Compiled rule blocks (.yaml, .yml or .json)
        rules: PathBuf,

        /// YAML generation config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json or sql
        #[arg(short, long, default_value = "json")]
        format: String,

        /// SQL dialect: oracle, mssql or postgres
        #[arg(short, long)]
        dialect: Option<String>,

        /// Source table name for SQL output
        #[arg(long)]
        source_table: Option<String>,

        /// Rows per INSERT statement for SQL output
        #[arg(long)]
        batch_size: Option<usize>,

        /// PRNG seed (default: current time in milliseconds)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of entities
        #[arg(short = 'n', long)]
        entities: Option<usize>,

        /// First entity id
        #[arg(long)]
        start_id: Option<i64>,

        /// Observations per entity per attribute
        #[arg(long)]
        observations: Option<usize>,

        /// Interval start (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Interval end (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Date format: iso, oracle or mssql
        #[arg(long)]
        date_format: Option<String>,

        /// Date distribution: uniform, recent_weighted or clustered
        #[arg(long)]
        distribution: Option<String>,

        /// Skip rout_* binding tables
        #[arg(long)]
        no_bindings: bool,

        /// Show progress while generating
        #[arg(short, long)]
        progress: bool,

        /// Report counts without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the attributes and derived tables rule blocks depend on
    Deps {
        /// Compiled rule blocks (.yaml, .yml or .json)
        rules: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print JSON Schemas for command output
    Schema {
        /// Schema to print (default: all)
        name: Option<String>,

        /// List available schema names
        #[arg(long)]
        list: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            rules,
            config,
            output,
            format,
            dialect,
            source_table,
            batch_size,
            seed,
            entities,
            start_id,
            observations,
            start,
            end,
            date_format,
            distribution,
            no_bindings,
            progress,
            dry_run,
        } => generate::run(generate::GenerateArgs {
            rules,
            config,
            output,
            format,
            dialect,
            source_table,
            batch_size,
            seed,
            entities,
            start_id,
            observations,
            start,
            end,
            date_format,
            distribution,
            no_bindings,
            progress,
            dry_run,
        }),
        Commands::Deps { rules, json } => deps::run(rules, json),
        Commands::Schema { name, list } => schema::run(name, list),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "eadv-synth", &mut io::stdout());
            Ok(())
        }
    }
}
