//! In-memory certificate inventory guarded by the access policy.
//!
//! Certificates and the folder tree sit behind one `RwLock`, so a folder
//! move validates its ancestor walk and writes the new parent without any
//! other structural change slipping in between. Every guarded operation
//! checks the actor before touching state.

use certdeck_core::{permissions, CertificateRecord, Folder, FolderAction, User};
use chrono::{DateTime, Utc};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AccessError, Result};
use crate::policy::AccessPolicy;
use crate::tree::FolderTree;

#[derive(Debug, Default)]
struct InventoryState {
    certificates: BTreeMap<Uuid, CertificateRecord>,
    folders: FolderTree,
}

/// Certificates, folders and the policy that gates them.
#[derive(Debug)]
pub struct Inventory {
    policy: AccessPolicy,
    soon_window_days: u32,
    state: RwLock<InventoryState>,
}

impl Inventory {
    #[must_use]
    pub fn new(policy: AccessPolicy, soon_window_days: u32) -> Self {
        Self::with_folders(policy, FolderTree::new(), soon_window_days)
    }

    /// Start from an existing folder tree (system folders, restored state).
    #[must_use]
    pub fn with_folders(policy: AccessPolicy, folders: FolderTree, soon_window_days: u32) -> Self {
        Self {
            policy,
            soon_window_days,
            state: RwLock::new(InventoryState {
                certificates: BTreeMap::new(),
                folders,
            }),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    fn require_permission(&self, actor: &User, permission: &str) -> Result<()> {
        if self.policy.has_permission(actor, permission) {
            Ok(())
        } else {
            debug!(user = %actor.id, permission, "permission denied");
            Err(AccessError::denied(permission))
        }
    }

    fn require_folder(
        &self,
        actor: &User,
        folders: &FolderTree,
        folder_id: Uuid,
        action: FolderAction,
    ) -> Result<()> {
        let folder = folders
            .get(folder_id)
            .ok_or(AccessError::FolderNotFound(folder_id))?;
        if self.policy.can_access_folder(actor, folder, action) {
            Ok(())
        } else {
            debug!(user = %actor.id, folder = %folder_id, %action, "folder access denied");
            Err(AccessError::denied(format!("{}@{folder_id}", action.permission())))
        }
    }

    fn readable(&self, actor: &User, folders: &FolderTree, record: &CertificateRecord) -> bool {
        record.folder_id.map_or(true, |id| {
            self.policy
                .has_folder_access(actor, folders, id, FolderAction::Read)
        })
    }

    /// File a freshly parsed certificate. Returns its id.
    ///
    /// Ids are never reused: an existing record is only changed through the
    /// guarded update operations.
    pub async fn add_certificate(&self, actor: &User, record: CertificateRecord) -> Result<Uuid> {
        self.require_permission(actor, permissions::CERTIFICATES_WRITE)?;
        let mut state = self.state.write().await;
        if let Some(folder_id) = record.folder_id {
            self.require_folder(actor, &state.folders, folder_id, FolderAction::Write)?;
        }

        let id = record.id;
        let Entry::Vacant(slot) = state.certificates.entry(id) else {
            debug!(user = %actor.id, certificate = %id, "certificate id already on file");
            return Err(AccessError::DuplicateCertificate(id));
        };
        info!(
            user = %actor.id,
            certificate = %id,
            common_name = %record.common_name,
            folder = ?record.folder_id,
            "certificate added"
        );
        slot.insert(record);
        Ok(id)
    }

    /// One certificate with its status recomputed at `now`.
    pub async fn certificate(
        &self,
        actor: &User,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CertificateRecord> {
        self.require_permission(actor, permissions::CERTIFICATES_READ)?;
        let state = self.state.read().await;
        let record = state
            .certificates
            .get(&id)
            .ok_or(AccessError::CertificateNotFound(id))?;
        if let Some(folder_id) = record.folder_id {
            self.require_folder(actor, &state.folders, folder_id, FolderAction::Read)?;
        }

        let mut record = record.clone();
        record.refresh_status(now, self.soon_window_days);
        Ok(record)
    }

    /// Every certificate the actor can see, soonest expiry first.
    ///
    /// Unfiled certificates are visible to anyone holding
    /// `certificates:read`.
    pub async fn visible_certificates(&self, actor: &User, now: DateTime<Utc>) -> Vec<CertificateRecord> {
        if !self
            .policy
            .has_permission(actor, permissions::CERTIFICATES_READ)
        {
            return Vec::new();
        }
        let state = self.state.read().await;
        let mut visible: Vec<CertificateRecord> = state
            .certificates
            .values()
            .filter(|record| self.readable(actor, &state.folders, record))
            .cloned()
            .map(|mut record| {
                record.refresh_status(now, self.soon_window_days);
                record
            })
            .collect();
        visible.sort_by_key(|r| r.valid_to);
        visible
    }

    /// Move a certificate into `folder_id`, or out of any folder.
    pub async fn assign_folder(
        &self,
        actor: &User,
        certificate_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<()> {
        self.require_permission(actor, permissions::CERTIFICATES_WRITE)?;
        let mut state = self.state.write().await;
        let current = state
            .certificates
            .get(&certificate_id)
            .ok_or(AccessError::CertificateNotFound(certificate_id))?
            .folder_id;
        for folder in [current, folder_id].into_iter().flatten() {
            self.require_folder(actor, &state.folders, folder, FolderAction::Write)?;
        }

        if let Some(record) = state.certificates.get_mut(&certificate_id) {
            record.folder_id = folder_id;
        }
        info!(
            user = %actor.id,
            certificate = %certificate_id,
            from = ?current,
            to = ?folder_id,
            "certificate reassigned"
        );
        Ok(())
    }

    /// Replace a certificate's validity window and encoding with those of
    /// `renewed`, keeping its id and folder.
    pub async fn renew(
        &self,
        actor: &User,
        certificate_id: Uuid,
        renewed: &CertificateRecord,
        now: DateTime<Utc>,
    ) -> Result<CertificateRecord> {
        self.require_permission(actor, permissions::CERTIFICATES_WRITE)?;
        let mut state = self.state.write().await;
        let folder_id = state
            .certificates
            .get(&certificate_id)
            .ok_or(AccessError::CertificateNotFound(certificate_id))?
            .folder_id;
        if let Some(folder_id) = folder_id {
            self.require_folder(actor, &state.folders, folder_id, FolderAction::Write)?;
        }

        let record = state
            .certificates
            .get_mut(&certificate_id)
            .ok_or(AccessError::CertificateNotFound(certificate_id))?;
        record.apply_renewal(renewed);
        record.refresh_status(now, self.soon_window_days);
        info!(
            user = %actor.id,
            certificate = %certificate_id,
            valid_to = %record.valid_to,
            "certificate renewed"
        );
        Ok(record.clone())
    }

    /// Folders the actor may read.
    pub async fn folders(&self, actor: &User) -> Vec<Folder> {
        let state = self.state.read().await;
        self.policy
            .accessible_folders(actor, &state.folders)
            .cloned()
            .collect()
    }

    /// Create a folder. Nesting under a parent needs write access to it.
    pub async fn create_folder(&self, actor: &User, folder: Folder) -> Result<Uuid> {
        self.require_permission(actor, permissions::FOLDERS_WRITE)?;
        let mut state = self.state.write().await;
        if let Some(parent) = folder.parent_id {
            self.require_folder(actor, &state.folders, parent, FolderAction::Write)?;
        }

        let id = folder.id;
        let name = folder.name.clone();
        state.folders.insert(folder)?;
        info!(user = %actor.id, folder = %id, name = %name, "folder created");
        Ok(id)
    }

    /// Re-parent a folder, rejecting moves that would create a cycle.
    pub async fn move_folder(
        &self,
        actor: &User,
        folder_id: Uuid,
        new_parent: Option<Uuid>,
    ) -> Result<()> {
        self.require_permission(actor, permissions::FOLDERS_WRITE)?;
        let mut state = self.state.write().await;
        self.require_folder(actor, &state.folders, folder_id, FolderAction::Write)?;
        if let Some(parent) = new_parent {
            self.require_folder(actor, &state.folders, parent, FolderAction::Write)?;
        }

        state.folders.move_folder(folder_id, new_parent)?;
        info!(user = %actor.id, folder = %folder_id, parent = ?new_parent, "folder moved");
        Ok(())
    }

    /// Delete a custom folder and unassign its certificates in the same
    /// critical section. Returns the unassigned certificate ids.
    pub async fn delete_folder(&self, actor: &User, folder_id: Uuid) -> Result<BTreeSet<Uuid>> {
        self.require_permission(actor, permissions::FOLDERS_DELETE)?;
        let mut state = self.state.write().await;
        self.require_folder(actor, &state.folders, folder_id, FolderAction::Delete)?;

        let InventoryState {
            certificates,
            folders,
        } = &mut *state;
        let deletion = folders.delete_folder(folder_id, certificates.values())?;
        for id in &deletion.affected_certificates {
            if let Some(record) = certificates.get_mut(id) {
                record.folder_id = None;
            }
        }

        info!(
            user = %actor.id,
            folder = %folder_id,
            name = %deletion.folder.name,
            unassigned = deletion.affected_certificates.len(),
            reparented = deletion.reparented.len(),
            "folder deleted"
        );
        Ok(deletion.affected_certificates)
    }

    pub async fn certificate_count(&self) -> usize {
        self.state.read().await.certificates.len()
    }
}
