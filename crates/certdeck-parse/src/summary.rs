//! Expiry roll-up over a set of records.

use certdeck_core::{CertificateRecord, CertificateStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The certificate that expires first among the non-expired ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextExpiry {
    pub id: Uuid,
    pub common_name: String,
    pub valid_to: DateTime<Utc>,
    pub days_remaining: i64,
}

/// Counts per status, computed against a fixed "now".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirySummary {
    pub total: usize,
    pub valid: usize,
    pub expiring_soon: usize,
    pub expired: usize,
    pub next_expiry: Option<NextExpiry>,
}

impl ExpirySummary {
    /// Classify every record at `now` and tally the results.
    ///
    /// Stored status snapshots are ignored.
    #[must_use]
    pub fn from_records<'a, I>(records: I, now: DateTime<Utc>, soon_window_days: u32) -> Self
    where
        I: IntoIterator<Item = &'a CertificateRecord>,
    {
        let mut summary = Self::default();
        let mut next: Option<&CertificateRecord> = None;

        for record in records {
            summary.total += 1;
            match record.status_at(now, soon_window_days) {
                CertificateStatus::Valid => summary.valid += 1,
                CertificateStatus::ExpiringSoon => summary.expiring_soon += 1,
                CertificateStatus::Expired => {
                    summary.expired += 1;
                    continue;
                }
            }
            if next.map_or(true, |n| record.valid_to < n.valid_to) {
                next = Some(record);
            }
        }

        summary.next_expiry = next.map(|r| NextExpiry {
            id: r.id,
            common_name: r.common_name.clone(),
            valid_to: r.valid_to,
            days_remaining: r.days_remaining(now),
        });
        summary
    }

    /// Certificates that are expiring soon or already expired.
    #[must_use]
    pub const fn needing_attention(&self) -> usize {
        self.expiring_soon + self.expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(name: &str, valid_to: DateTime<Utc>) -> CertificateRecord {
        let epoch = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        CertificateRecord {
            id: Uuid::new_v4(),
            common_name: name.into(),
            subject: format!("CN={name}"),
            issuer: "CN=Test CA".into(),
            valid_from: epoch,
            valid_to,
            algorithm: "Ed25519".into(),
            serial_number: "01".into(),
            status: CertificateStatus::Valid,
            folder_id: None,
            fingerprint: String::new(),
            subject_alt_names: Vec::new(),
            is_ca: false,
            pem: String::new(),
            source: None,
            created_at: epoch,
        }
    }

    #[test]
    fn test_counts_and_next_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let records = vec![
            record("gone.example.com", now - Duration::days(3)),
            record("soon.example.com", now + Duration::days(10)),
            record("later.example.com", now + Duration::days(200)),
            record("edge.example.com", now),
        ];

        let summary = ExpirySummary::from_records(&records, now, 30);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.expiring_soon, 1);
        assert_eq!(summary.expired, 2);
        assert_eq!(summary.needing_attention(), 3);

        let next = summary.next_expiry.unwrap();
        assert_eq!(next.common_name, "soon.example.com");
        assert_eq!(next.days_remaining, 10);
    }

    #[test]
    fn test_empty_inventory() {
        let now = Utc::now();
        let summary = ExpirySummary::from_records(std::iter::empty::<&CertificateRecord>(), now, 30);
        assert_eq!(summary, ExpirySummary::default());
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut stale = record("stale.example.com", now - Duration::days(1));
        stale.status = CertificateStatus::Valid;
        let summary = ExpirySummary::from_records([&stale], now, 30);
        assert_eq!(summary.expired, 1);
        assert!(summary.next_expiry.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let records = [record("soon.example.com", now + Duration::days(5))];
        let json = serde_json::to_value(ExpirySummary::from_records(&records, now, 30)).unwrap();
        assert_eq!(json["expiringSoon"], 1);
        assert_eq!(json["nextExpiry"]["commonName"], "soon.example.com");
        assert_eq!(json["nextExpiry"]["daysRemaining"], 5);
    }
}
