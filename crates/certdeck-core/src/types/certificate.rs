//! Parsed certificate records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{classify, CertificateStatus};

/// Common name used when neither the subject nor the SAN carries one.
pub const UNKNOWN_COMMON_NAME: &str = "Unknown";

/// Structured metadata extracted from an uploaded X.509 certificate.
///
/// Immutable once created except for folder reassignment and renewal.
/// `status` is a snapshot taken at parse time; call [`Self::status_at`]
/// or [`Self::refresh_status`] on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Inventory identifier
    pub id: Uuid,
    /// Subject CN, first DNS SAN, or `"Unknown"`
    pub common_name: String,
    /// Subject DN (`C=US, O=Example, CN=host`)
    pub subject: String,
    /// Issuer DN, same rendering as `subject`
    pub issuer: String,
    /// Not valid before
    pub valid_from: DateTime<Utc>,
    /// Not valid after
    pub valid_to: DateTime<Utc>,
    /// Signature algorithm (friendly name or dotted OID)
    pub algorithm: String,
    /// Uppercase colon-separated hex (`0A:1B:2C`)
    pub serial_number: String,
    /// Status at the time the record was last classified
    pub status: CertificateStatus,
    /// Folder this certificate is filed under, if any
    pub folder_id: Option<Uuid>,
    /// SHA-256 of the DER encoding (lowercase hex)
    pub fingerprint: String,
    /// DNS entries from the Subject Alternative Name extension
    #[serde(default)]
    pub subject_alt_names: Vec<String>,
    /// Basic constraints CA flag
    #[serde(default)]
    pub is_ca: bool,
    /// Normalized PEM encoding
    pub pem: String,
    /// Upload filename, diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl CertificateRecord {
    /// Status of this certificate at `now`.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>, soon_window_days: u32) -> CertificateStatus {
        classify(self.valid_to, now, soon_window_days)
    }

    /// Recompute the stored status snapshot.
    pub fn refresh_status(&mut self, now: DateTime<Utc>, soon_window_days: u32) {
        self.status = self.status_at(now, soon_window_days);
    }

    /// Whole days until expiry; negative once expired.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.valid_to - now).num_days()
    }

    /// Returns true if the common name fell back to the sentinel.
    #[must_use]
    pub fn has_unknown_common_name(&self) -> bool {
        self.common_name == UNKNOWN_COMMON_NAME
    }

    /// Apply a renewal: take the validity window, serial and encoding of a
    /// freshly parsed certificate, keeping identity and folder placement.
    pub fn apply_renewal(&mut self, renewed: &Self) {
        self.valid_from = renewed.valid_from;
        self.valid_to = renewed.valid_to;
        self.serial_number.clone_from(&renewed.serial_number);
        self.pem.clone_from(&renewed.pem);
        self.fingerprint.clone_from(&renewed.fingerprint);
        self.status = renewed.status;
    }

    /// Compare everything extracted from the certificate bytes, ignoring
    /// per-upload fields (`id`, `created_at`, `status`, `source`, `folder_id`).
    #[must_use]
    pub fn same_certificate(&self, other: &Self) -> bool {
        self.common_name == other.common_name
            && self.subject == other.subject
            && self.issuer == other.issuer
            && self.valid_from == other.valid_from
            && self.valid_to == other.valid_to
            && self.algorithm == other.algorithm
            && self.serial_number == other.serial_number
            && self.fingerprint == other.fingerprint
            && self.subject_alt_names == other.subject_alt_names
            && self.is_ca == other.is_ca
            && self.pem == other.pem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(valid_to: DateTime<Utc>) -> CertificateRecord {
        let created = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        CertificateRecord {
            id: Uuid::new_v4(),
            common_name: "api.example.com".into(),
            subject: "C=US, O=Example Corp, CN=api.example.com".into(),
            issuer: "C=US, O=Example Corp, CN=Example Root CA".into(),
            valid_from: created,
            valid_to,
            algorithm: "sha256WithRSAEncryption".into(),
            serial_number: "00:80:A1:B2".into(),
            status: CertificateStatus::Valid,
            folder_id: None,
            fingerprint: "aabbccdd".into(),
            subject_alt_names: vec!["api.example.com".into()],
            is_ca: false,
            pem: "-----BEGIN CERTIFICATE-----".into(),
            source: None,
            created_at: created,
        }
    }

    #[test]
    fn status_is_recomputed_against_now() {
        let expiry = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut rec = record(expiry);

        rec.refresh_status(expiry - Duration::days(90), 30);
        assert_eq!(rec.status, CertificateStatus::Valid);

        rec.refresh_status(expiry - Duration::days(10), 30);
        assert_eq!(rec.status, CertificateStatus::ExpiringSoon);

        rec.refresh_status(expiry, 30);
        assert_eq!(rec.status, CertificateStatus::Expired);
    }

    #[test]
    fn renewal_keeps_identity_and_folder() {
        let old_expiry = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut rec = record(old_expiry);
        let folder = Uuid::new_v4();
        rec.folder_id = Some(folder);
        let id = rec.id;

        let mut fresh = record(old_expiry + Duration::days(365));
        fresh.pem = "renewed".into();
        fresh.fingerprint = "eeff".into();
        fresh.serial_number = "02".into();
        fresh.common_name = "other.example.com".into();

        rec.apply_renewal(&fresh);
        assert_eq!(rec.id, id);
        assert_eq!(rec.folder_id, Some(folder));
        assert_eq!(rec.valid_to, fresh.valid_to);
        assert_eq!(rec.pem, "renewed");
        assert_eq!(rec.serial_number, "02");
        assert_eq!(rec.common_name, "api.example.com");
    }

    #[test]
    fn same_certificate_ignores_upload_fields() {
        let expiry = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let a = record(expiry);
        let mut b = a.clone();
        b.id = Uuid::new_v4();
        b.source = Some("upload.der".into());
        b.status = CertificateStatus::Expired;
        assert!(a.same_certificate(&b));

        b.serial_number = "01".into();
        assert!(!a.same_certificate(&b));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let expiry = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(record(expiry)).unwrap();
        assert_eq!(json["commonName"], "api.example.com");
        assert_eq!(json["serialNumber"], "00:80:A1:B2");
        assert_eq!(json["status"], "VALID");
        assert!(json["folderId"].is_null());
    }
}
