use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(version, about = "Draft leather pattern pieces and their seam allowances", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a pattern block or DSL file into a geometry document
    Draft {
        /// Body measurements (JSON with `body` and `fit` maps)
        #[arg(short, long, value_name = "FILE")]
        measurements: Option<PathBuf>,

        /// Recipe whose `defaults` become drafting options
        #[arg(short, long, value_name = "FILE")]
        recipe: Option<PathBuf>,

        /// Parametric pattern block (JSON or YAML)
        #[arg(short, long, value_name = "FILE", conflicts_with = "dsl")]
        block: Option<PathBuf>,

        /// Pattern DSL source
        #[arg(short, long, value_name = "FILE")]
        dsl: Option<PathBuf>,

        /// Geometry document to write
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Attach seam-allowance outlines to every piece of a geometry document
    Construct {
        /// Geometry document produced by `draft`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// YAML options carrying `seam_allowance` in millimetres
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Check that every outline and seam-allowance outline is a simple polygon
    Validate {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Draft {
            measurements,
            recipe,
            block,
            dsl,
            out,
        } => {
            let source = match (block, dsl) {
                (Some(path), _) => commands::Source::Block(path),
                (None, Some(path)) => commands::Source::Dsl(path),
                (None, None) => commands::Source::Demo,
            };
            commands::draft(measurements.as_deref(), recipe.as_deref(), &source, &out)?;
            Ok(true)
        }
        Command::Construct {
            input,
            options,
            out,
        } => {
            commands::construct(&input, options.as_deref(), &out)?;
            Ok(true)
        }
        Command::Validate { input } => commands::validate(&input),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
