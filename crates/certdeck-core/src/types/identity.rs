//! Roles, users, and the flat permission strings they carry.
//!
//! Roles are flat permission sets with no inheritance between them. A
//! user's effective capability is their role's set, narrowed further by
//! per-folder access control lists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

/// Permission strings understood by the inventory.
pub mod permissions {
    pub const CERTIFICATES_READ: &str = "certificates:read";
    pub const CERTIFICATES_WRITE: &str = "certificates:write";
    pub const CERTIFICATES_DELETE: &str = "certificates:delete";
    pub const FOLDERS_READ: &str = "folders:read";
    pub const FOLDERS_WRITE: &str = "folders:write";
    pub const FOLDERS_DELETE: &str = "folders:delete";
    pub const USERS_READ: &str = "users:read";
    pub const USERS_WRITE: &str = "users:write";
    pub const INSIGHTS_READ: &str = "insights:read";

    /// Every permission string, in display order.
    pub const ALL: &[&str] = &[
        CERTIFICATES_READ,
        CERTIFICATES_WRITE,
        CERTIFICATES_DELETE,
        FOLDERS_READ,
        FOLDERS_WRITE,
        FOLDERS_DELETE,
        USERS_READ,
        USERS_WRITE,
        INSIGHTS_READ,
    ];
}

/// Role identifier (`admin`, `viewer`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named set of permission strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Role {
    /// Create a role from permission strings.
    pub fn new<I, S>(id: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: RoleId::new(id),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if this role carries `permission`.
    #[must_use]
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Every permission.
    #[must_use]
    pub fn admin() -> Self {
        Self::new("admin", permissions::ALL.iter().copied())
    }

    /// Day-to-day certificate management without user administration.
    #[must_use]
    pub fn manager() -> Self {
        Self::new(
            "manager",
            [
                permissions::CERTIFICATES_READ,
                permissions::CERTIFICATES_WRITE,
                permissions::CERTIFICATES_DELETE,
                permissions::FOLDERS_READ,
                permissions::FOLDERS_WRITE,
                permissions::INSIGHTS_READ,
            ],
        )
    }

    /// Read-only access.
    #[must_use]
    pub fn viewer() -> Self {
        Self::new(
            "viewer",
            [permissions::CERTIFICATES_READ, permissions::FOLDERS_READ],
        )
    }

    /// The built-in role presets.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self::admin(), Self::manager(), Self::viewer()]
    }
}

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: RoleId,
    /// Inactive users hold no permissions.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl User {
    /// Create an active user with a fresh id.
    pub fn new(name: impl Into<String>, role: impl Into<RoleId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role: role.into(),
            active: true,
        }
    }

    /// Builder-style deactivation.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Action requested against a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderAction {
    Read,
    Write,
    Delete,
}

impl FolderAction {
    /// The role-level permission gating this action.
    #[must_use]
    pub const fn permission(self) -> &'static str {
        match self {
            Self::Read => permissions::FOLDERS_READ,
            Self::Write => permissions::FOLDERS_WRITE,
            Self::Delete => permissions::FOLDERS_DELETE,
        }
    }
}

impl fmt::Display for FolderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for FolderAction {
    type Err = CoreError;

    /// Accepts both the bare action (`write`) and the full permission
    /// string (`folders:write`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.strip_prefix("folders:").unwrap_or(&lower) {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            _ => Err(CoreError::UnknownAction(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_nested() {
        let admin = Role::admin();
        let manager = Role::manager();
        let viewer = Role::viewer();

        assert!(viewer.permissions.is_subset(&manager.permissions));
        assert!(manager.permissions.is_subset(&admin.permissions));
        assert!(!viewer.grants(permissions::FOLDERS_WRITE));
        assert!(admin.grants(permissions::FOLDERS_DELETE));
    }

    #[test]
    fn folder_action_parses_both_forms() {
        assert_eq!("write".parse::<FolderAction>().unwrap(), FolderAction::Write);
        assert_eq!("WRITE".parse::<FolderAction>().unwrap(), FolderAction::Write);
        assert_eq!(
            "FOLDERS:Read".parse::<FolderAction>().unwrap(),
            FolderAction::Read
        );
        assert_eq!(
            "folders:delete".parse::<FolderAction>().unwrap(),
            FolderAction::Delete
        );
        assert_eq!(
            "certificates:read".parse::<FolderAction>(),
            Err(CoreError::UnknownAction("certificates:read".into()))
        );
        assert_eq!(FolderAction::Read.permission(), "folders:read");
    }

    #[test]
    fn user_defaults_to_active() {
        let json = r#"{"id":"6f9619ff-8b86-d011-b42d-00c04fc964ff","name":"ana","role":"viewer"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.active);
        assert_eq!(user.role, RoleId::from("viewer"));
        assert!(!User::new("bo", "viewer").deactivated().active);
    }
}
