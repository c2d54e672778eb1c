//! Certificate lifecycle status and the pure classifier that derives it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Default "expiring soon" window in days.
pub const DEFAULT_SOON_WINDOW_DAYS: u32 = 30;

/// Lifecycle status of a certificate relative to a point in time.
///
/// Derived from `valid_to` and "now"; never authoritative on its own since
/// it drifts with the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    /// Not expiring within the window
    Valid,
    /// Expires within the window
    ExpiringSoon,
    /// Already expired (or expiring exactly now)
    Expired,
}

impl CertificateStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::ExpiringSoon => "EXPIRING_SOON",
            Self::Expired => "EXPIRED",
        }
    }

    /// Returns true if the certificate needs attention.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        matches!(self, Self::ExpiringSoon | Self::Expired)
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "VALID" => Ok(Self::Valid),
            "EXPIRING_SOON" => Ok(Self::ExpiringSoon),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(CoreError::UnknownStatus(s.to_string())),
        }
    }
}

/// Classify a certificate's status from its expiry instant.
///
/// - `valid_to <= now` is `Expired` (the boundary instant counts as expired)
/// - `valid_to` within `soon_window_days` of `now` (edge inclusive) is `ExpiringSoon`
/// - otherwise `Valid`
#[must_use]
pub fn classify(
    valid_to: DateTime<Utc>,
    now: DateTime<Utc>,
    soon_window_days: u32,
) -> CertificateStatus {
    if valid_to <= now {
        return CertificateStatus::Expired;
    }

    match now.checked_add_signed(Duration::days(i64::from(soon_window_days))) {
        Some(soon) if valid_to > soon => CertificateStatus::Valid,
        _ => CertificateStatus::ExpiringSoon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn boundary_instant_is_expired() {
        let t = at(2024, 1, 1);
        assert_eq!(classify(t, t, 30), CertificateStatus::Expired);
    }

    #[test]
    fn past_expiry_is_expired() {
        let now = at(2024, 1, 1);
        let valid_to = now - Duration::seconds(1);
        assert_eq!(classify(valid_to, now, 30), CertificateStatus::Expired);
    }

    #[test]
    fn inside_window_is_expiring_soon() {
        let now = at(2024, 1, 1);
        assert_eq!(
            classify(now + Duration::days(1), now, 1),
            CertificateStatus::ExpiringSoon
        );
        assert_eq!(
            classify(now + Duration::days(1), now, 30),
            CertificateStatus::ExpiringSoon
        );
        assert_eq!(
            classify(now + Duration::days(29), now, 30),
            CertificateStatus::ExpiringSoon
        );
    }

    #[test]
    fn past_window_is_valid() {
        let now = at(2024, 1, 1);
        assert_eq!(
            classify(now + Duration::days(30), now, 30),
            CertificateStatus::ExpiringSoon
        );
        assert_eq!(
            classify(now + Duration::days(30) + Duration::seconds(1), now, 30),
            CertificateStatus::Valid
        );
        assert_eq!(
            classify(now + Duration::days(31), now, 30),
            CertificateStatus::Valid
        );
    }

    #[test]
    fn zero_window_only_distinguishes_expired() {
        let now = at(2024, 1, 1);
        assert_eq!(
            classify(now + Duration::seconds(1), now, 0),
            CertificateStatus::Valid
        );
        assert_eq!(classify(now, now, 0), CertificateStatus::Expired);
    }

    #[test]
    fn classify_is_deterministic() {
        let now = at(2025, 6, 15);
        let valid_to = at(2025, 7, 1);
        let first = classify(valid_to, now, 30);
        assert_eq!(first, classify(valid_to, now, 30));
    }

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&CertificateStatus::ExpiringSoon).unwrap();
        assert_eq!(json, "\"EXPIRING_SOON\"");
        assert_eq!(
            "expiring-soon".parse::<CertificateStatus>().unwrap(),
            CertificateStatus::ExpiringSoon
        );
        assert!("stale".parse::<CertificateStatus>().is_err());
    }
}
