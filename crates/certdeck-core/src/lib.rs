//! Core domain types for the certdeck certificate inventory.
//!
//! This crate holds the records shared by the parser and the access-control
//! model:
//!
//! - **Certificates**: [`CertificateRecord`] and its derived [`CertificateStatus`]
//! - **Folders**: [`Folder`] with optional per-folder [`AccessControl`]
//! - **Identity**: [`Role`], [`User`] and the flat permission strings in [`permissions`]
//! - **Status classification**: [`classify`], a pure function of `valid_to` and "now"
//!
//! Nothing here performs I/O.
//!
//! # Example
//!
//! ```rust
//! use certdeck_core::{classify, CertificateStatus};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! assert_eq!(classify(now, now, 30), CertificateStatus::Expired);
//! assert_eq!(classify(now + Duration::days(5), now, 30), CertificateStatus::ExpiringSoon);
//! ```

mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::*;
