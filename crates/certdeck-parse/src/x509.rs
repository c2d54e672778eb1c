//! X.509 field extraction backed by `x509-parser`.

use certdeck_core::{classify, CertificateRecord, UNKNOWN_COMMON_NAME};
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};
use uuid::Uuid;
use x509_parser::certificate::X509Certificate;
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::extensions::GeneralName;
use x509_parser::nom;
use x509_parser::oid_registry::Oid;
use x509_parser::time::ASN1Time;
use x509_parser::x509::{AttributeTypeAndValue, X509Name};

use crate::config::ParserConfig;
use crate::detect;
use crate::error::{ParseError, Result};
use crate::hash::sha256_bytes;

/// Parses uploaded buffers into certificate records.
///
/// Implementations must be pure: no I/O, no retries, no side effects.
/// "Now" is an explicit input so results are reproducible.
pub trait CertificateParser: Send + Sync {
    /// Parse the first certificate in `buffer`, classifying it against `now`.
    fn parse_at(
        &self,
        buffer: &[u8],
        hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CertificateRecord>;

    /// Parse every certificate in `buffer`.
    fn parse_bundle_at(
        &self,
        buffer: &[u8],
        hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<CertificateRecord>>;

    /// Parse against the current wall clock.
    fn parse(&self, buffer: &[u8], hint: Option<&str>) -> Result<CertificateRecord> {
        self.parse_at(buffer, hint, Utc::now())
    }
}

/// Reference [`CertificateParser`] using a full ASN.1/X.509 decoder.
#[derive(Debug, Clone, Default)]
pub struct X509Parser {
    config: ParserConfig,
}

impl X509Parser {
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn check_size(&self, buffer: &[u8]) -> Result<()> {
        if buffer.len() > self.config.max_input_bytes {
            return Err(ParseError::TooLarge {
                size: buffer.len(),
                limit: self.config.max_input_bytes,
            });
        }
        Ok(())
    }

    /// Decode one DER certificate into a record.
    pub fn record_from_der(
        &self,
        der: &[u8],
        hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CertificateRecord> {
        let (_, cert) = x509_parser::parse_x509_certificate(der).map_err(|e| match e {
            nom::Err::Incomplete(needed) => ParseError::TruncatedInput {
                expected: match needed {
                    nom::Needed::Size(n) => der.len() + n.get(),
                    nom::Needed::Unknown => der.len() + 1,
                },
                actual: der.len(),
            },
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                ParseError::NotACertificate(format!("X.509 decode failed: {e}"))
            }
        })?;

        let valid_from = asn1_to_utc(cert.validity().not_before, "notBefore")?;
        let valid_to = asn1_to_utc(cert.validity().not_after, "notAfter")?;
        if valid_from > valid_to {
            return Err(ParseError::InvalidDates {
                reason: format!("notBefore {valid_from} is after notAfter {valid_to}"),
            });
        }

        let subject = render_name(cert.subject());
        let issuer = render_name(cert.issuer());
        let subject_alt_names = dns_alt_names(&cert);
        let common_name = resolve_common_name(&cert, &subject_alt_names);

        let record = CertificateRecord {
            id: Uuid::new_v4(),
            common_name,
            subject,
            issuer,
            valid_from,
            valid_to,
            algorithm: algorithm_name(&cert.signature_algorithm.algorithm),
            serial_number: format_serial(cert.raw_serial()),
            status: classify(valid_to, now, self.config.soon_window_days),
            folder_id: None,
            fingerprint: sha256_bytes(der),
            subject_alt_names,
            is_ca: cert
                .basic_constraints()
                .ok()
                .flatten()
                .is_some_and(|bc| bc.value.ca),
            pem: pem::encode_config(
                &pem::Pem::new("CERTIFICATE", der.to_vec()),
                pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
            ),
            source: hint.map(ToString::to_string),
            created_at: now,
        };

        debug!(
            source = hint.unwrap_or("-"),
            common_name = %record.common_name,
            serial = %record.serial_number,
            status = %record.status,
            "parsed certificate"
        );

        Ok(record)
    }
}

impl CertificateParser for X509Parser {
    fn parse_at(
        &self,
        buffer: &[u8],
        hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CertificateRecord> {
        self.check_size(buffer)?;
        let ders = detect::certificate_ders(buffer).map_err(|e| {
            debug!(source = hint.unwrap_or("-"), error = %e, "rejected upload");
            e
        })?;
        if ders.len() > 1 {
            debug!(
                source = hint.unwrap_or("-"),
                count = ders.len(),
                "bundle uploaded, using first certificate"
            );
        }
        let first = ders.first().ok_or_else(|| {
            ParseError::NotACertificate("no certificate found in input".into())
        })?;
        self.record_from_der(first, hint, now)
    }

    fn parse_bundle_at(
        &self,
        buffer: &[u8],
        hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<CertificateRecord>> {
        self.check_size(buffer)?;
        detect::certificate_ders(buffer)?
            .iter()
            .map(|der| self.record_from_der(der, hint, now))
            .collect()
    }
}

/// Convert an ASN.1 `UTCTime` / `GeneralizedTime` to `DateTime<Utc>`.
///
/// Anything before the Unix epoch is treated as a corrupt parse.
fn asn1_to_utc(t: ASN1Time, field: &str) -> Result<DateTime<Utc>> {
    let epoch = t.timestamp();
    if epoch < 0 {
        return Err(ParseError::InvalidDates {
            reason: format!("{field} {t} is before 1970"),
        });
    }
    Utc.timestamp_opt(epoch, 0)
        .single()
        .ok_or_else(|| ParseError::InvalidDates {
            reason: format!("{field} {t} is out of range"),
        })
}

/// Short code for the DN attributes we render; everything else is skipped.
fn short_code(oid: &Oid<'_>) -> Option<&'static str> {
    match oid.to_id_string().as_str() {
        "2.5.4.6" => Some("C"),
        "2.5.4.10" => Some("O"),
        "2.5.4.11" => Some("OU"),
        "2.5.4.3" => Some("CN"),
        "2.5.4.7" => Some("L"),
        "2.5.4.8" => Some("ST"),
        _ => None,
    }
}

/// Decode a DN attribute value. BMPString is UTF-16BE and UniversalString
/// is UTF-32BE; both must be decoded before they can be rendered.
fn attr_text(attr: &AttributeTypeAndValue<'_>) -> Option<String> {
    let value = attr.attr_value();
    match value.tag() {
        Tag::BmpString => decode_utf16_be(value.data),
        Tag::UniversalString => decode_utf32_be(value.data),
        _ => attr
            .as_str()
            .ok()
            .or_else(|| std::str::from_utf8(value.data).ok())
            .map(ToString::to_string),
    }
}

fn decode_utf16_be(data: &[u8]) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }
    let units = data.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .ok()
}

fn decode_utf32_be(data: &[u8]) -> Option<String> {
    if data.len() % 4 != 0 {
        return None;
    }
    data.chunks_exact(4)
        .map(|c| char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
        .collect()
}

/// Render a DN as `ATTR=value` pairs joined by `", "`, in encoded order.
fn render_name(name: &X509Name<'_>) -> String {
    let mut parts = Vec::new();
    for rdn in name.iter() {
        for attr in rdn.iter() {
            let Some(code) = short_code(attr.attr_type()) else {
                continue;
            };
            match attr_text(attr) {
                Some(value) => parts.push(format!("{code}={value}")),
                None => debug!(attr = code, "skipping undecodable DN attribute"),
            }
        }
    }
    parts.join(", ")
}

fn dns_alt_names(cert: &X509Certificate<'_>) -> Vec<String> {
    match cert.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some((*dns).to_string()),
                _ => None,
            })
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "malformed subjectAltName extension ignored");
            Vec::new()
        }
    }
}

/// CN attribute, then a `CN=` scan of the decoder's own subject rendering,
/// then the first DNS SAN, then `"Unknown"`.
fn resolve_common_name(cert: &X509Certificate<'_>, dns_names: &[String]) -> String {
    cert.subject()
        .iter_common_name()
        .find_map(|cn| {
            attr_text(cn)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .or_else(|| scan_common_name(&cert.subject().to_string()))
        .or_else(|| dns_names.first().cloned())
        .unwrap_or_else(|| UNKNOWN_COMMON_NAME.to_string())
}

fn scan_common_name(rendered: &str) -> Option<String> {
    rendered
        .split([',', '+'])
        .map(str::trim)
        .find_map(|part| part.strip_prefix("CN="))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Uppercase hex, colon-separated per byte, leading zero bytes kept.
fn format_serial(raw: &[u8]) -> String {
    raw.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn algorithm_name(oid: &Oid<'_>) -> String {
    let id = oid.to_id_string();
    let name = match id.as_str() {
        "1.2.840.113549.1.1.4" => "md5WithRSAEncryption",
        "1.2.840.113549.1.1.5" => "sha1WithRSAEncryption",
        "1.2.840.113549.1.1.10" => "rsassaPss",
        "1.2.840.113549.1.1.11" => "sha256WithRSAEncryption",
        "1.2.840.113549.1.1.12" => "sha384WithRSAEncryption",
        "1.2.840.113549.1.1.13" => "sha512WithRSAEncryption",
        "1.2.840.10040.4.3" => "dsa-with-SHA1",
        "2.16.840.1.101.3.4.3.2" => "dsa-with-SHA256",
        "1.2.840.10045.4.1" => "ecdsa-with-SHA1",
        "1.2.840.10045.4.3.2" => "ecdsa-with-SHA256",
        "1.2.840.10045.4.3.3" => "ecdsa-with-SHA384",
        "1.2.840.10045.4.3.4" => "ecdsa-with-SHA512",
        "1.3.101.112" => "Ed25519",
        "1.3.101.113" => "Ed448",
        _ => return id,
    };
    name.to_string()
}
