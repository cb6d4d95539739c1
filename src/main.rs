use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_exstruct::config::DEFAULT_MAX_IDENTIFIER_LEN;
use rust_exstruct::{generate_schema, GenerateOptions, GeneratorConfig};

#[derive(Parser)]
#[command(name = "rust-exstruct")]
#[command(author, version, about = "Relational schema compiler for extracted document entity types")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate tables, association tables and triggers from a schema model
    Generate {
        /// Path to the schema model (or collected-info mapping) JSON file
        #[arg(short, long)]
        model: PathBuf,

        /// Target schema name
        #[arg(short, long)]
        schema: String,

        /// Input file shape (model, mapping)
        #[arg(long, default_value = "model")]
        input_format: String,

        /// Output format (sql, json)
        #[arg(short, long, default_value = "sql")]
        format: String,

        /// Output path (defaults to <model dir>/<schema>_schema.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum identifier length in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_IDENTIFIER_LEN)]
        max_identifier_len: usize,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            model,
            schema,
            input_format,
            format,
            output,
            max_identifier_len,
            verbose,
        } => {
            init_tracing(verbose);

            let config = GeneratorConfig {
                max_identifier_len,
                ..GeneratorConfig::new(schema)
            };
            let options = GenerateOptions {
                model_path: model,
                input_format: input_format.parse().map_err(|e: String| anyhow!(e))?,
                output_path: output,
                output_format: format.parse().map_err(|e: String| anyhow!(e))?,
                config,
            };

            let output_path = generate_schema(options)?;
            println!("{}", output_path.display());
        }
    }

    Ok(())
}
