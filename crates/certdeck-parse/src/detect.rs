//! Input sniffing: PEM vs DER, and rejection of uploads that are not
//! certificates (keys, CSRs, text dumps).

use tracing::debug;

use crate::error::{ParseError, Result};

const CERTIFICATE_MARKER: &str = "-----BEGIN CERTIFICATE-----";
const PEM_BEGIN: &str = "-----BEGIN ";
const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// ASN.1 SEQUENCE tag, the first byte of every DER certificate.
const DER_SEQUENCE: u8 = 0x30;

/// Extract the DER encodings of every certificate in `buffer`.
///
/// PEM input may carry several certificates; DER input yields exactly one.
/// Never returns an empty list.
pub fn certificate_ders(buffer: &[u8]) -> Result<Vec<Vec<u8>>> {
    if buffer.is_empty() {
        return Err(ParseError::NotACertificate("empty input".into()));
    }

    if looks_like_der(buffer) {
        check_der_envelope(buffer)?;
        return Ok(vec![buffer.to_vec()]);
    }

    let text = String::from_utf8_lossy(buffer);
    let labels = pem_labels(&text);

    if labels.iter().any(|l| l.ends_with("PRIVATE KEY")) {
        return Err(ParseError::PrivateKey);
    }

    if text.contains(CERTIFICATE_MARKER) {
        return decode_pem(buffer);
    }

    if labels.iter().any(|l| l.ends_with("CERTIFICATE REQUEST")) {
        return Err(ParseError::CertificateRequest);
    }

    if let Some(label) = labels.first() {
        return Err(ParseError::UnsupportedEncoding {
            reason: format!("unsupported PEM block `{label}`"),
        });
    }

    if looks_like_text_dump(&text) {
        return Err(ParseError::TextualDump);
    }

    Err(ParseError::NotACertificate(
        "no certificate markers or DER structure found".into(),
    ))
}

/// A certificate is always longer than 127 bytes, so real DER starts with
/// a SEQUENCE tag followed by a long-form length octet. Text that happens
/// to start with `0` stays on the text path.
fn looks_like_der(buffer: &[u8]) -> bool {
    buffer[0] == DER_SEQUENCE
        && (buffer.len() < 2 || buffer[1] & 0x80 != 0 || std::str::from_utf8(buffer).is_err())
}

/// Labels of every `-----BEGIN <label>-----` line, in order.
fn pem_labels(text: &str) -> Vec<&str> {
    text.lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix(PEM_BEGIN)
                .and_then(|rest| rest.strip_suffix("-----"))
        })
        .collect()
}

fn decode_pem(buffer: &[u8]) -> Result<Vec<Vec<u8>>> {
    let blocks = pem::parse_many(buffer).map_err(|e| ParseError::UnsupportedEncoding {
        reason: e.to_string(),
    })?;

    let mut ders = Vec::new();
    for block in blocks {
        if block.tag() != CERTIFICATE_TAG {
            debug!(tag = block.tag(), "skipping non-certificate PEM block");
            continue;
        }
        check_der_envelope(block.contents())?;
        ders.push(block.contents().to_vec());
    }

    if ders.is_empty() {
        return Err(ParseError::UnsupportedEncoding {
            reason: "certificate markers present but no decodable certificate block".into(),
        });
    }

    Ok(ders)
}

/// Check the outer SEQUENCE header against the available bytes.
///
/// Catches truncated uploads before the ASN.1 decoder sees them.
pub fn check_der_envelope(der: &[u8]) -> Result<()> {
    if der.len() < 2 {
        return Err(ParseError::TruncatedInput {
            expected: 2,
            actual: der.len(),
        });
    }
    if der[0] != DER_SEQUENCE {
        return Err(ParseError::NotACertificate(format!(
            "expected ASN.1 SEQUENCE, found tag 0x{:02x}",
            der[0]
        )));
    }

    let (header_len, content_len) = match der[1] {
        short if short < 0x80 => (2, usize::from(short)),
        0x80 => {
            return Err(ParseError::UnsupportedEncoding {
                reason: "indefinite-length BER is not DER".into(),
            })
        }
        long => {
            let octets = usize::from(long & 0x7f);
            if octets > 4 {
                return Err(ParseError::NotACertificate(format!(
                    "implausible length field of {octets} octets"
                )));
            }
            if der.len() < 2 + octets {
                return Err(ParseError::TruncatedInput {
                    expected: 2 + octets,
                    actual: der.len(),
                });
            }
            let len = der[2..2 + octets]
                .iter()
                .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
            (2 + octets, len)
        }
    };

    let expected = header_len + content_len;
    if der.len() < expected {
        return Err(ParseError::TruncatedInput {
            expected,
            actual: der.len(),
        });
    }

    Ok(())
}

/// `openssl x509 -text` style output.
fn looks_like_text_dump(text: &str) -> bool {
    const FIELD_MARKERS: &[&str] = &[
        "Serial Number:",
        "Signature Algorithm:",
        "Validity",
        "Not After",
        "Subject:",
        "Issuer:",
    ];
    let hits = FIELD_MARKERS.iter().filter(|m| text.contains(*m)).count();
    hits >= 2 || (text.contains("Certificate:") && hits >= 1)
}
