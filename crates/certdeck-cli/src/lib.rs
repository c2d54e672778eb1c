//! # certdeck-cli
//!
//! Command-line front end for the certdeck certificate inventory.
//!
//! ## Commands
//!
//! - **inspect**: parse PEM/DER files (bundles included) and print every field
//! - **scan**: import a directory tree, deduplicate by fingerprint and report
//!   on expiry, soonest first
//! - **config**: show or change the persisted defaults
//!
//! Every command speaks pretty tables, JSON, CSV and YAML.

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
