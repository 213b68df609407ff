//! `lrecon run` / `lrecon validate`: session-file driven reconciliation.

use std::path::{Path, PathBuf};

use laborrecon_recon::{ReviewSession, SessionConfig, SessionOutput};
use serde::Serialize;

use crate::exit_codes::{EXIT_DISCREPANCIES, EXIT_IO};
use crate::CliError;

/// Full JSON document for `run --json` / `--output`.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    meta: RunMeta<'a>,
    totals_message: String,
    #[serde(flatten)]
    output: &'a SessionOutput,
}

#[derive(Debug, Serialize)]
struct RunMeta<'a> {
    session: &'a str,
    engine_version: &'static str,
    run_at: String,
    tolerance: f64,
}

fn read_config(path: &Path) -> Result<SessionConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_IO, format!("cannot read session file {}: {e}", path.display()))
            .with_hint("pass the path to a .session.toml file")
    })?;
    SessionConfig::from_toml(&text).map_err(CliError::recon)
}

/// Source paths in the session file are relative to the file itself.
fn base_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

pub fn cmd_run(
    session_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    summary_only: bool,
) -> Result<(), CliError> {
    let config = read_config(&session_path)?;
    let session = ReviewSession::from_config(&config, base_dir(&session_path))
        .map_err(CliError::recon)?;
    let output = session.recalculate().map_err(CliError::recon)?;

    tracing::debug!(rows = output.rows.len(), "recalculated session");

    if json_output || output_file.is_some() {
        let report = RunReport {
            meta: RunMeta {
                session: &config.name,
                engine_version: env!("CARGO_PKG_VERSION"),
                run_at: chrono::Utc::now().to_rfc3339(),
                tolerance: session.tolerance(),
            },
            totals_message: output.totals.message(),
            output: &output,
        };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_IO, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str).map_err(|e| {
                CliError::new(EXIT_IO, format!("cannot write {}: {e}", path.display()))
            })?;
            eprintln!("wrote {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    if !json_output && !output.summary.is_empty() {
        println!("{}", output.summary);
    }

    if !summary_only {
        print_report(&config, &output);
    }

    match output.counts.open {
        0 => Ok(()),
        n => Err(CliError::new(
            EXIT_DISCREPANCIES,
            format!("{n} unresolved discrepancies"),
        )),
    }
}

/// Human summary to stderr.
fn print_report(config: &SessionConfig, output: &SessionOutput) {
    let c = &output.counts;
    let label = if config.name.is_empty() { "session" } else { config.name.as_str() };
    eprintln!(
        "{label}: {} employees: {} mismatched, {} no EID on Crescent, {} Crescent-only, {} invalid, {} matched",
        c.total, c.mismatched_hours, c.missing_from_crescent, c.crescent_only, c.invalid_data, c.matched,
    );
    eprintln!(
        "totals: PLX {}h, Crescent {}h: {}",
        output.totals.plx_total.to_fixed(),
        output.totals.crescent_total.to_fixed(),
        output.totals.message(),
    );
    if !output.rejected.is_empty() {
        eprintln!("{} Crescent row(s) skipped:", output.rejected.len());
        for msg in &output.rejected {
            eprintln!("  {msg}");
        }
    }
}

pub fn cmd_validate(session_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&session_path)?;
    let base = base_dir(&session_path);

    for path in [config.plx_path(base), config.crescent_path(base)] {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "source file not found");
        }
    }

    eprintln!(
        "valid: session '{}' with {} merge(s), {} edit(s), {} review note(s)",
        config.name,
        config.merges.len(),
        config.edits.len(),
        config.review.len(),
    );
    Ok(())
}
