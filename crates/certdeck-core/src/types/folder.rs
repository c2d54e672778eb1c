//! Folder records and per-folder access control lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::identity::{RoleId, User};
use crate::error::CoreError;

/// Whether a folder was seeded by the system or created by a user.
///
/// Fixed at creation; system folders can never be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderType {
    System,
    Custom,
}

impl fmt::Display for FolderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for FolderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "custom" => Ok(Self::Custom),
            _ => Err(CoreError::UnknownFolderType(s.to_string())),
        }
    }
}

/// Roles and users admitted to a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,
    #[serde(default)]
    pub users: BTreeSet<Uuid>,
}

impl AccessControl {
    /// Admit a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Admit a single user.
    #[must_use]
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.users.insert(user_id);
        self
    }

    /// Role in the list, or user in the list.
    #[must_use]
    pub fn admits(&self, user: &User) -> bool {
        self.roles.contains(&user.role) || self.users.contains(&user.id)
    }
}

/// A node in the folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub folder_type: FolderType,
    /// `None` for root folders
    pub parent_id: Option<Uuid>,
    /// `None` means only the role-level permission applies
    #[serde(default)]
    pub access_control: Option<AccessControl>,
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// A user-created root folder.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, FolderType::Custom)
    }

    /// A protected, system-seeded root folder.
    pub fn system(name: impl Into<String>) -> Self {
        Self::new(name, FolderType::System)
    }

    fn new(name: impl Into<String>, folder_type: FolderType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            folder_type,
            parent_id: None,
            access_control: None,
            created_at: Utc::now(),
        }
    }

    /// Place under `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: Uuid) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Restrict to an access control list.
    #[must_use]
    pub fn with_access_control(mut self, acl: AccessControl) -> Self {
        self.access_control = Some(acl);
        self
    }

    /// System folders cannot be deleted.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.folder_type == FolderType::System
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
