//! `lrecon parse`: print one export's normalized records.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::ValueEnum;
use laborrecon_recon::source::crescent::parse_crescent_report;
use laborrecon_recon::source::plx::parse_plx_source;
use laborrecon_recon::{
    CrescentOptions, DayFilter, EmployeeRecord, Hours, IdentifierPolicy, PlxOptions,
};

use crate::exit_codes::{EXIT_IO, EXIT_USAGE};
use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Plx,
    Crescent,
}

/// Parser knobs exposed on the command line. Unset values keep the defaults.
#[derive(Debug, Clone, Default)]
pub struct ParseArgs {
    pub header_row: Option<usize>,
    pub day: Option<DayFilter>,
    pub badge_prefix: Option<String>,
    pub strip_leading_zeros: bool,
}

pub fn cmd_parse(file: PathBuf, source: SourceArg, args: ParseArgs, json: bool) -> Result<(), CliError> {
    if args.header_row == Some(0) {
        return Err(CliError::new(EXIT_USAGE, "--header-row is 1-based, got 0")
            .with_hint("the PLX header is usually on row 5"));
    }
    let bytes = laborrecon_io::read_bytes(&file).map_err(|e| CliError::recon(e.into()))?;
    let identifiers = IdentifierPolicy {
        strip_leading_zeros: args.strip_leading_zeros,
    };

    let records = match source {
        SourceArg::Plx => {
            let mut options = PlxOptions {
                identifiers,
                ..PlxOptions::default()
            };
            if let Some(row) = args.header_row {
                options.header_row = row;
            }
            if let Some(day) = args.day {
                options.day = day;
            }
            parse_plx_source(&bytes, &options).map_err(CliError::recon)?
        }
        SourceArg::Crescent => {
            let mut options = CrescentOptions {
                identifiers,
                ..CrescentOptions::default()
            };
            if let Some(prefix) = args.badge_prefix {
                options.badge_prefix = prefix;
            }
            let report = parse_crescent_report(&bytes, &options).map_err(CliError::recon)?;
            for rejected in &report.rejected {
                eprintln!("skipped: {rejected}");
            }
            report.records
        }
    };

    if json {
        let json_str = serde_json::to_string_pretty(&records)
            .map_err(|e| CliError::new(EXIT_IO, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        write_table(&records).map_err(|e| CliError::new(EXIT_IO, e.to_string()))?;
    }

    let total: Hours = records.iter().map(|r| r.total_hours).sum();
    eprintln!("{} employee(s), {} hours", records.len(), total.to_fixed());
    Ok(())
}

fn write_table(records: &[EmployeeRecord]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "eid\tname\thours\tlines\tbadges")?;
    for r in records {
        writeln!(
            out,
            "{}\t{}\t{}{}\t{}\t{}",
            r.eid,
            r.name,
            r.total_hours,
            if r.invalid_hours { "*" } else { "" },
            r.lines_display().unwrap_or_default(),
            r.badges_display().unwrap_or_default(),
        )?;
    }
    Ok(())
}
