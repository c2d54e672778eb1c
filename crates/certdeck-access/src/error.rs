//! Error types for folder and access-control operations.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for access operations.
pub type Result<T> = std::result::Result<T, AccessError>;

/// Errors raised by structural folder changes and guarded inventory
/// operations.
///
/// Permission checks themselves return `bool`; only the guarded operations
/// turn a negative answer into [`AccessError::Denied`].
#[derive(Error, Debug)]
pub enum AccessError {
    /// Moving `folder` under `parent` would make the tree cyclic.
    #[error("moving folder {folder} under {parent} would create a cycle")]
    Cycle { folder: Uuid, parent: Uuid },

    /// System folders can never be deleted.
    #[error("folder {0} is a system folder and cannot be deleted")]
    SystemFolderProtected(Uuid),

    #[error("folder not found: {0}")]
    FolderNotFound(Uuid),

    #[error("certificate not found: {0}")]
    CertificateNotFound(Uuid),

    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// A folder with this id already exists.
    #[error("folder already exists: {0}")]
    DuplicateFolder(Uuid),

    /// A certificate with this id is already on file.
    #[error("certificate already exists: {0}")]
    DuplicateCertificate(Uuid),

    /// The actor lacks a permission or folder grant.
    #[error("permission denied: {permission}")]
    Denied { permission: String },

    /// Token unknown, revoked, or past its expiry.
    #[error("session expired or unknown")]
    SessionExpired,

    /// The account behind a login or session is deactivated.
    #[error("user {0} is inactive")]
    InactiveUser(Uuid),

    /// The system random source failed.
    #[error("failed to generate session token")]
    TokenGeneration,

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Policy file is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl AccessError {
    pub(crate) fn denied(permission: impl Into<String>) -> Self {
        Self::Denied {
            permission: permission.into(),
        }
    }

    /// Returns true if the request was well-formed but not allowed.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(
            self,
            Self::Denied { .. } | Self::SessionExpired | Self::InactiveUser(_)
        )
    }

    /// HTTP status a request handler should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::SessionExpired | Self::InactiveUser(_) => 401,
            Self::Denied { .. } => 403,
            Self::FolderNotFound(_) | Self::CertificateNotFound(_) | Self::UserNotFound(_) => 404,
            Self::Cycle { .. }
            | Self::DuplicateFolder(_)
            | Self::DuplicateCertificate(_)
            | Self::SystemFolderProtected(_) => 409,
            Self::TokenGeneration | Self::Io { .. } | Self::Config(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(AccessError::denied("folders:write").status_code(), 403);
        assert_eq!(AccessError::SystemFolderProtected(id).status_code(), 409);
        assert_eq!(
            AccessError::Cycle {
                folder: id,
                parent: id
            }
            .status_code(),
            409
        );
        assert_eq!(AccessError::DuplicateCertificate(id).status_code(), 409);
        assert_eq!(AccessError::FolderNotFound(id).status_code(), 404);
        assert_eq!(AccessError::SessionExpired.status_code(), 401);
    }

    #[test]
    fn test_denied_message_names_permission() {
        let err = AccessError::denied("certificates:write");
        assert!(err.is_denied());
        assert_eq!(err.to_string(), "permission denied: certificates:write");
    }
}
