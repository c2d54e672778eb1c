//! `certdeck inspect` - Parse certificate files and print their fields.

use anyhow::Result;
use certdeck_core::CertificateRecord;
use certdeck_parse::{hash::colon_hex, CertificateParser};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use super::Context;
use crate::cli::args::InspectArgs;
use crate::output::{status_label, write_certificate_csv, OutputFormat};

pub async fn execute(ctx: Context, args: InspectArgs) -> Result<()> {
    let parser = ctx.parser(args.window);
    let now = Utc::now();

    let mut records = Vec::new();
    let mut failures: Vec<(PathBuf, String)> = Vec::new();

    for path in &args.files {
        let hint = path.file_name().and_then(|n| n.to_str());
        let parsed = match tokio::fs::read(path).await {
            Ok(bytes) => parser
                .parse_bundle_at(&bytes, hint, now)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match parsed {
            Ok(found) => {
                debug!(path = %path.display(), certificates = found.len(), "parsed file");
                records.extend(found);
            }
            Err(reason) => failures.push((path.clone(), reason)),
        }
    }

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&records)?);
        }
        OutputFormat::Csv => {
            write_certificate_csv(std::io::stdout().lock(), &records, now)?;
        }
        OutputFormat::Pretty => {
            for (i, record) in records.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_record_pretty(record, now, &ctx);
            }
        }
    }

    for (path, reason) in &failures {
        eprintln!("{} {}: {}", "Error:".red().bold(), path.display(), reason);
    }

    if !failures.is_empty() {
        anyhow::bail!(
            "{} of {} files could not be parsed",
            failures.len(),
            args.files.len()
        );
    }

    Ok(())
}

fn print_record_pretty(record: &CertificateRecord, now: DateTime<Utc>, ctx: &Context) {
    // Header
    println!(
        "{} {}",
        "Certificate:".bold(),
        record.common_name.cyan().bold()
    );
    if let Some(source) = &record.source {
        println!("  {} {}", "File:".bold(), source.dimmed());
    }
    println!();

    println!("  {} {}", "Subject:".bold(), record.subject);
    println!("  {} {}", "Issuer:".bold(), record.issuer);
    println!("  {} {}", "Serial:".bold(), record.serial_number);
    println!("  {} {}", "Algorithm:".bold(), record.algorithm);
    println!(
        "  {} {}",
        "Valid From:".bold(),
        record.valid_from.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  {} {}",
        "Valid To:".bold(),
        record.valid_to.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let days = record.days_remaining(now);
    let remaining = if days < 0 {
        format!("expired {} days ago", -days)
    } else {
        format!("{days} days remaining")
    };
    println!(
        "  {} {} ({})",
        "Status:".bold(),
        status_label(record.status),
        remaining
    );

    if !record.subject_alt_names.is_empty() {
        println!(
            "  {} {}",
            "DNS Names:".bold(),
            record.subject_alt_names.join(", ")
        );
    }
    if record.is_ca {
        println!("  {} {}", "CA:".bold(), "yes".yellow());
    }
    println!(
        "  {} {}",
        "SHA-256:".bold(),
        colon_hex(&record.fingerprint).dimmed()
    );

    if ctx.verbose {
        println!();
        print!("{}", record.pem);
    }
}
