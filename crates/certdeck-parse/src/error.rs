//! Error types for certificate parsing.

use thiserror::Error;

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while turning an upload into a certificate record.
///
/// All of these are local to one buffer: the caller decides how to surface
/// them, and retrying the same bytes can never succeed.
#[derive(Error, Debug)]
pub enum ParseError {
    /// No certificate markers or ASN.1 certificate structure found.
    #[error("not a certificate: {0}")]
    NotACertificate(String),

    /// Certificate markers present but the payload cannot be decoded.
    #[error("unsupported encoding: {reason}")]
    UnsupportedEncoding { reason: String },

    /// Validity window missing or outside a sane range.
    #[error("invalid certificate dates: {reason}")]
    InvalidDates { reason: String },

    /// The DER structure declares more bytes than were supplied.
    #[error("truncated input: certificate declares {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    /// Upload contains a private key.
    #[error("private key detected; upload the certificate only")]
    PrivateKey,

    /// Upload is a certificate signing request, not a certificate.
    #[error("certificate signing request detected; upload the issued certificate")]
    CertificateRequest,

    /// Upload is a human-readable dump of certificate fields.
    #[error("textual certificate dump detected; upload the PEM or DER encoding")]
    TextualDump,

    /// Upload exceeds the configured size cap.
    #[error("input too large: {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },

    /// Reading an import source failed.
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl ParseError {
    /// Shorthand for an IO failure on `path`.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status an upload handler should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::TooLarge { .. } => 413,
            Self::Io { .. } | Self::Config(_) => 500,
            _ => 400,
        }
    }

    /// Returns true if the upload was the wrong kind of file rather than a
    /// damaged certificate.
    #[must_use]
    pub const fn is_rejected_content(&self) -> bool {
        matches!(
            self,
            Self::PrivateKey | Self::CertificateRequest | Self::TextualDump
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ParseError::PrivateKey.status_code(), 400);
        assert_eq!(
            ParseError::TooLarge {
                size: 10,
                limit: 5
            }
            .status_code(),
            413
        );
        assert_eq!(ParseError::Config("bad".into()).status_code(), 500);
    }

    #[test]
    fn rejected_content_is_distinguished() {
        assert!(ParseError::PrivateKey.is_rejected_content());
        assert!(ParseError::TextualDump.is_rejected_content());
        assert!(!ParseError::NotACertificate("empty input".into()).is_rejected_content());
        assert!(!ParseError::InvalidDates {
            reason: "x".into()
        }
        .is_rejected_content());
    }
}
