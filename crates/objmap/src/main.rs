//! objmap - validate and map documents with declarative mapping schemas

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::apply::{ApplyArgs, handle_apply};
use commands::generate::{GenerateArgs, GenerateTarget, handle_generate};
use commands::validate::{ValidateArgs, handle_validate};
use output::OutputFormat;

/// CLI arguments for objmap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate documents against a type from a mapping schema
    Validate {
        /// Mapping schema file (YAML or JSON)
        #[arg(long)]
        schema: PathBuf,

        /// Type to validate against
        #[arg(long = "type")]
        type_name: String,

        /// Input document (object or array of objects), or - for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// Build instances from documents and print their projection
    Apply {
        /// Mapping schema file (YAML or JSON)
        #[arg(long)]
        schema: PathBuf,

        /// Type to construct
        #[arg(long = "type")]
        type_name: String,

        /// Input document (object or array of objects), or - for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Projection keys (comma separated); defaults to the type's projection keys
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Print the encoded state (internal keys) instead of the projection
        #[arg(long, default_value_t = false)]
        state: bool,

        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a mapping schema or Rust scaffolding from a sample JSON document
    Generate {
        /// Sample JSON document, or - for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Name of the root type
        #[arg(long, default_value = "root")]
        root_name: String,

        /// Prefix for every generated type name
        #[arg(long, default_value = "")]
        prefix: String,

        /// Keep date-like strings as plain strings
        #[arg(long, default_value_t = false)]
        no_dates: bool,

        /// Output format: yaml, json or rust
        #[arg(long, default_value = "yaml")]
        format: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Validate {
            schema,
            type_name,
            input,
        } => handle_validate(&ValidateArgs {
            schema,
            type_name,
            input,
        })?,
        Command::Apply {
            schema,
            type_name,
            input,
            keys,
            state,
            format,
            output,
        } => handle_apply(&ApplyArgs {
            schema,
            type_name,
            input,
            keys,
            state,
            format: format.parse::<OutputFormat>()?,
            output,
        })?,
        Command::Generate {
            input,
            root_name,
            prefix,
            no_dates,
            format,
            output,
        } => handle_generate(&GenerateArgs {
            input,
            root_name,
            prefix,
            detect_dates: !no_dates,
            target: format.parse::<GenerateTarget>()?,
            output,
        })?,
    }

    Ok(())
}
