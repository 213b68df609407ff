// lrecon - PLX vs Crescent labor-hour reconciliation (CLI mode, headless)

mod exit_codes;
mod recon;
mod records;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use laborrecon_recon::{DayFilter, ReconError};
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_SUCCESS};
use records::{ParseArgs, SourceArg};

#[derive(Parser)]
#[command(name = "lrecon")]
#[command(about = "Reconcile PLX labor hours against Crescent timekeeping")]
#[command(version)]
struct Cli {
    /// Log engine decisions (dropped rows, name conflicts) to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the two exports named in a session file
    #[command(after_help = "\
Examples:
  lrecon run week41.session.toml
  lrecon run week41.session.toml --summary-only > email.txt
  lrecon run week41.session.toml --json
  lrecon run week41.session.toml --output week41.json")]
    Run {
        /// Path to the .session.toml file
        session: PathBuf,

        /// Output the full result as JSON to stdout instead of the email summary
        #[arg(long)]
        json: bool,

        /// Write the full JSON result to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print only the email summary; no report on stderr
        #[arg(long, conflicts_with = "json")]
        summary_only: bool,
    },

    /// Validate a session file without reading the exports
    #[command(after_help = "\
Examples:
  lrecon validate week41.session.toml")]
    Validate {
        /// Path to the .session.toml file
        session: PathBuf,
    },

    /// Parse one export and print its normalized per-employee records
    #[command(after_help = "\
Examples:
  lrecon parse plx-week41.xlsx --source plx
  lrecon parse plx-week41.xlsx --source plx --day wednesday
  lrecon parse crescent-week41.csv --source crescent --json")]
    Parse {
        /// Export file (xlsx, xls, ods, csv or tsv)
        file: PathBuf,

        /// Which vendor produced the file
        #[arg(long, value_enum)]
        source: SourceArg,

        /// Output records as JSON
        #[arg(long)]
        json: bool,

        /// 1-based header row (PLX only)
        #[arg(long)]
        header_row: Option<usize>,

        /// Only sum this weekday's hour columns (PLX only)
        #[arg(long)]
        day: Option<DayFilter>,

        /// Literal badge prefix before the EID digits (Crescent only)
        #[arg(long)]
        badge_prefix: Option<String>,

        /// Treat 00457123 and 457123 as the same EID
        #[arg(long)]
        strip_leading_zeros: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            session,
            json,
            output,
            summary_only,
        } => recon::cmd_run(session, json, output, summary_only),
        Commands::Validate { session } => recon::cmd_validate(session),
        Commands::Parse {
            file,
            source,
            json,
            header_row,
            day,
            badge_prefix,
            strip_leading_zeros,
        } => records::cmd_parse(
            file,
            source,
            ParseArgs {
                header_row,
                day,
                badge_prefix,
                strip_leading_zeros,
            },
            json,
        ),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the registry exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::MissingColumn { .. } => {
                Some("check header_row and the column names in the session file".to_string())
            }
            ReconError::DuplicateIdentifier { .. } => {
                Some("records must be aggregated by EID before reconciling".to_string())
            }
            ReconError::Io(laborrecon_io::IoError::Read { .. }) => {
                Some("export paths are resolved relative to the session file".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
