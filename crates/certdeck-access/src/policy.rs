//! Role-level permissions and per-folder access decisions.
//!
//! Decisions are plain booleans. A folder without an access control list
//! only needs the role-level permission; a folder with one additionally
//! needs the user's role or id to be on it.

use certdeck_core::{Folder, FolderAction, Role, RoleId, User};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use crate::error::{AccessError, Result};
use crate::tree::FolderTree;

/// Roles loaded from a policy file.
///
/// ```toml
/// [[roles]]
/// id = "auditor"
/// permissions = ["certificates:read", "folders:read", "insights:read"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "Role::builtin")]
    pub roles: Vec<Role>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            roles: Role::builtin(),
        }
    }
}

impl PolicyConfig {
    /// Load from a TOML file, falling back to the built-in roles.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| AccessError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AccessError::Config(e.to_string()))
    }
}

/// Answers permission questions for users against a fixed role table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    roles: HashMap<RoleId, Role>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(Role::builtin())
    }
}

impl AccessPolicy {
    /// Later roles with the same id replace earlier ones.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.roles.iter().cloned())
    }

    #[must_use]
    pub fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    /// True iff the user is active and their role grants `permission`.
    ///
    /// Unknown roles grant nothing.
    #[must_use]
    pub fn has_permission(&self, user: &User, permission: &str) -> bool {
        user.active
            && self
                .roles
                .get(&user.role)
                .is_some_and(|role| role.grants(permission))
    }

    /// Decide `action` on an already-loaded folder.
    #[must_use]
    pub fn can_access_folder(&self, user: &User, folder: &Folder, action: FolderAction) -> bool {
        if !self.has_permission(user, action.permission()) {
            return false;
        }
        folder
            .access_control
            .as_ref()
            .map_or(true, |acl| acl.admits(user))
    }

    /// Decide `action` on the folder `folder_id` in `tree`.
    ///
    /// A folder that does not exist is never accessible.
    #[must_use]
    pub fn has_folder_access(
        &self,
        user: &User,
        tree: &FolderTree,
        folder_id: Uuid,
        action: FolderAction,
    ) -> bool {
        tree.get(folder_id)
            .is_some_and(|folder| self.can_access_folder(user, folder, action))
    }

    /// Folders the user may read.
    pub fn accessible_folders<'a>(
        &'a self,
        user: &'a User,
        tree: &'a FolderTree,
    ) -> impl Iterator<Item = &'a Folder> + 'a {
        tree.iter()
            .filter(move |folder| self.can_access_folder(user, folder, FolderAction::Read))
    }
}
