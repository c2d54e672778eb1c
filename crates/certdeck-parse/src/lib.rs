//! # certdeck-parse
//!
//! Turns uploaded certificate bytes into [`CertificateRecord`]s.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ─► size cap ─► detect (PEM / DER / rejection) ─► x509-parser
//!       ─► DN rendering, CN fallback, serial, algorithm, SANs
//!       ─► fingerprint (SHA-256 of DER) ─► classify(valid_to, now)
//! ```
//!
//! Parsing is pure: the same bytes and the same `now` always produce the
//! same fields. Only `id` and `created_at` differ between calls.
//!
//! ## Rejections
//!
//! Private keys, certificate signing requests and `openssl x509 -text`
//! dumps are each reported with their own error so the uploader can be
//! told what they sent instead.
//!
//! ```no_run
//! let bytes = std::fs::read("site.pem").unwrap();
//! let record = certdeck_parse::parse(&bytes, Some("site.pem")).unwrap();
//! println!("{} expires {}", record.common_name, record.valid_to);
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod hash;
pub mod import;
pub mod summary;
pub mod x509;

pub use certdeck_core::{classify, CertificateRecord, CertificateStatus};
pub use config::ParserConfig;
pub use error::{ParseError, Result};
pub use import::{import_path, ImportFailure, ImportReport};
pub use summary::{ExpirySummary, NextExpiry};
pub use x509::{CertificateParser, X509Parser};

/// Parse the first certificate in `buffer` with default settings.
///
/// # Errors
///
/// See [`ParseError`] for the rejection kinds.
pub fn parse(buffer: &[u8], hint: Option<&str>) -> Result<CertificateRecord> {
    X509Parser::default().parse(buffer, hint)
}

/// Parse every certificate in a PEM bundle (or the single DER certificate)
/// with default settings.
///
/// # Errors
///
/// Fails as a whole if any block is rejected.
pub fn parse_bundle(buffer: &[u8], hint: Option<&str>) -> Result<Vec<CertificateRecord>> {
    X509Parser::default().parse_bundle_at(buffer, hint, chrono::Utc::now())
}
