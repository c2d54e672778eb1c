//! Domain types for certificates, folders, roles and users.

pub mod certificate;
pub mod folder;
pub mod identity;
pub mod status;

pub use certificate::{CertificateRecord, UNKNOWN_COMMON_NAME};
pub use folder::{AccessControl, Folder, FolderType};
pub use identity::{permissions, FolderAction, Role, RoleId, User};
pub use status::{classify, CertificateStatus, DEFAULT_SOON_WINDOW_DAYS};
