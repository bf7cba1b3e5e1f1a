//! `ultpit` - ultimate pit limits from a block value file.

mod error;
mod io;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use ultpit::console::{self, LogTarget};
use ultpit::{ConfigFormat, UltpitConfig};

use crate::error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "ultpit")]
#[command(about = "Ultimate open-pit limit optimization")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize the pit for every realization in the input file
    Run {
        /// Block value file (plain or GEOEAS, optionally .gz)
        #[arg(short, long)]
        input: PathBuf,

        /// Selection output file; stdout when omitted, gzip when ending in .gz
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log to this file instead of the console
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Parameter file (.json, .toml, .yaml)
        params: PathBuf,
    },

    /// Print the default parameters
    Params {
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Toml,
    Yaml,
}

impl From<FormatArg> for ConfigFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => ConfigFormat::Json,
            FormatArg::Toml => ConfigFormat::Toml,
            FormatArg::Yaml => ConfigFormat::Yaml,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            log,
            params,
        } => run(&input, output.as_deref(), log, &params),
        Commands::Params { format } => print_params(format.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(event = "run_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, output: Option<&Path>, log: Option<PathBuf>, params: &Path) -> CliResult<()> {
    match log {
        Some(path) => console::init(LogTarget::File(path.clone()))
            .map_err(|source| CliError::Log { path, source })?,
        None => console::init(LogTarget::Console).map_err(|source| CliError::Log {
            path: PathBuf::from("<stderr>"),
            source,
        })?,
    }

    info!(event = "params_read", path = %params.display());
    let config = UltpitConfig::load(params)?;
    config.validate()?;

    let values = io::read_values(input, &config.input, config.grid.block_count())?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let pit = ultpit::optimize_named(&config, &values, name)?;
    io::write_selections(output, &pit)
}

fn print_params(format: ConfigFormat) -> CliResult<()> {
    println!("{}", UltpitConfig::default().to_string_as(format)?);
    Ok(())
}
