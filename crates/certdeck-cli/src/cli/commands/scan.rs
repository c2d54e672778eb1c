//! `certdeck scan` - Import a directory of certificates and report on expiry.

use anyhow::Result;
use certdeck_core::CertificateRecord;
use certdeck_parse::{import_path, ExpirySummary};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use super::Context;
use crate::cli::args::ScanArgs;
use crate::output::{certificate_table, write_certificate_csv, OutputFormat};

#[derive(Serialize)]
struct ScanFailure {
    path: String,
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanReport<'a> {
    summary: &'a ExpirySummary,
    certificates: &'a [CertificateRecord],
    failures: Vec<ScanFailure>,
    duplicates: usize,
}

pub async fn execute(ctx: Context, args: ScanArgs) -> Result<()> {
    let parser = ctx.parser(args.window);
    let window = parser.config().soon_window_days;
    let now = Utc::now();

    let report = import_path(&parser, &args.path, now).await?;
    let summary = ExpirySummary::from_records(&report.records, now, window);

    let mut records = report.records;
    records.sort_by_key(|r| r.valid_to);
    if args.expiring_only {
        records.retain(|r| r.status.needs_attention());
    }

    let failures: Vec<ScanFailure> = report
        .failures
        .iter()
        .map(|f| ScanFailure {
            path: f.path.display().to_string(),
            error: f.error.to_string(),
        })
        .collect();

    match ctx.output_format {
        OutputFormat::Json => {
            let out = ScanReport {
                summary: &summary,
                certificates: &records,
                failures,
                duplicates: report.duplicates,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Yaml => {
            let out = ScanReport {
                summary: &summary,
                certificates: &records,
                failures,
                duplicates: report.duplicates,
            };
            print!("{}", serde_yaml::to_string(&out)?);
        }
        OutputFormat::Csv => {
            write_certificate_csv(std::io::stdout().lock(), &records, now)?;
            for failure in &failures {
                eprintln!("{} {}: {}", "Error:".red().bold(), failure.path, failure.error);
            }
        }
        OutputFormat::Pretty => {
            print_scan_pretty(
                &summary,
                &records,
                &failures,
                report.duplicates,
                &args,
                window,
                now,
            );
        }
    }

    Ok(())
}

fn print_scan_pretty(
    summary: &ExpirySummary,
    records: &[CertificateRecord],
    failures: &[ScanFailure],
    duplicates: usize,
    args: &ScanArgs,
    window: u32,
    now: DateTime<Utc>,
) {
    // Header
    println!("{} {}", "Scanned:".bold(), args.path.display().to_string().cyan());
    println!(
        "  {} {}   {} {}   {} {}   {} {}",
        "Total:".bold(),
        summary.total,
        "Valid:".bold(),
        summary.valid.to_string().green(),
        format!("Expiring ({window}d):").bold(),
        summary.expiring_soon.to_string().yellow(),
        "Expired:".bold(),
        summary.expired.to_string().red()
    );
    if let Some(next) = &summary.next_expiry {
        println!(
            "  {} {} on {} ({} days)",
            "Next expiry:".bold(),
            next.common_name.cyan(),
            next.valid_to.format("%Y-%m-%d"),
            next.days_remaining
        );
    }
    println!();

    if records.is_empty() {
        let msg = if args.expiring_only {
            "Nothing is expiring. All certificates are valid."
        } else {
            "No certificates found."
        };
        println!("{}", msg.dimmed());
    } else {
        println!("{}", certificate_table(records, now));
    }

    if !failures.is_empty() {
        println!();
        println!("{}", "Skipped files:".bold().underline());
        for failure in failures {
            println!("  {} {}", failure.path.yellow(), failure.error.dimmed());
        }
    }

    if duplicates > 0 {
        println!();
        println!(
            "{}",
            format!("{duplicates} duplicate certificates ignored").dimmed()
        );
    }
}
