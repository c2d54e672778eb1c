//! Output formatting for different formats.

use anyhow::Result;
use certdeck_core::{CertificateRecord, CertificateStatus};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed tables with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// YAML output
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "table" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Unknown output format: {s}\n\
                 Valid formats: pretty, json, csv, yaml"
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Status word colored by urgency.
pub fn status_label(status: CertificateStatus) -> ColoredString {
    match status {
        CertificateStatus::Valid => status.as_str().green(),
        CertificateStatus::ExpiringSoon => status.as_str().yellow().bold(),
        CertificateStatus::Expired => status.as_str().red().bold(),
    }
}

/// One line per certificate in tables and CSV.
#[derive(Tabled, Serialize)]
pub struct CertificateRow {
    #[tabled(rename = "Common Name")]
    pub common_name: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Expires")]
    pub valid_to: String,
    #[tabled(rename = "Days")]
    pub days_remaining: i64,
    #[tabled(rename = "Issuer")]
    pub issuer: String,
    #[tabled(rename = "Serial")]
    pub serial_number: String,
    #[tabled(skip)]
    pub fingerprint: String,
    #[tabled(skip)]
    pub source: String,
}

impl CertificateRow {
    /// `colored` controls whether the status cell carries ANSI styling.
    pub fn new(record: &CertificateRecord, now: DateTime<Utc>, colored: bool) -> Self {
        Self {
            common_name: truncate(&record.common_name, 40),
            status: if colored {
                status_label(record.status).to_string()
            } else {
                record.status.to_string()
            },
            valid_to: record.valid_to.format("%Y-%m-%d %H:%M").to_string(),
            days_remaining: record.days_remaining(now),
            issuer: truncate(&issuer_name(&record.issuer), 30),
            serial_number: truncate(&record.serial_number, 23),
            fingerprint: record.fingerprint.clone(),
            source: record.source.clone().unwrap_or_default(),
        }
    }
}

/// The issuer's CN, or the whole DN when it has none.
fn issuer_name(issuer: &str) -> String {
    issuer
        .split(", ")
        .find_map(|part| part.strip_prefix("CN="))
        .unwrap_or(issuer)
        .to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Rounded table of certificates.
pub fn certificate_table(records: &[CertificateRecord], now: DateTime<Utc>) -> String {
    let rows: Vec<CertificateRow> = records
        .iter()
        .map(|r| CertificateRow::new(r, now, true))
        .collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

/// CSV with a header row. Fields are quoted as needed.
pub fn write_certificate_csv<W: Write>(
    out: W,
    records: &[CertificateRecord],
    now: DateTime<Utc>,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(CertificateRow::new(record, now, false))?;
    }
    writer.flush()?;
    Ok(())
}
