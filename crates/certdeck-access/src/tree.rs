//! The folder tree and its structural invariants.
//!
//! Every mutation validates before it writes, so a rejected call leaves the
//! tree untouched. The tree is always acyclic and every `parent_id` points
//! at a folder that exists.

use certdeck_core::{AccessControl, CertificateRecord, Folder};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AccessError, Result};

/// Outcome of [`FolderTree::delete_folder`].
#[derive(Debug, Clone)]
pub struct FolderDeletion {
    /// The removed folder
    pub folder: Folder,
    /// Certificates that referenced the folder and must be unassigned
    pub affected_certificates: BTreeSet<Uuid>,
    /// Child folders moved up to the removed folder's parent
    pub reparented: Vec<Uuid>,
}

/// Folders keyed by id.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    folders: BTreeMap<Uuid, Folder>,
}

impl FolderTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from folders in any order.
    ///
    /// # Errors
    ///
    /// Rejects duplicate ids, dangling parents, and cycles.
    pub fn from_folders(folders: impl IntoIterator<Item = Folder>) -> Result<Self> {
        let mut tree = Self::new();
        for folder in folders {
            if tree.folders.contains_key(&folder.id) {
                return Err(AccessError::DuplicateFolder(folder.id));
            }
            tree.folders.insert(folder.id, folder);
        }

        for folder in tree.folders.values() {
            if let Some(parent) = folder.parent_id {
                if !tree.folders.contains_key(&parent) {
                    return Err(AccessError::FolderNotFound(parent));
                }
                if tree.ancestor_chain(parent).contains(&folder.id) {
                    return Err(AccessError::Cycle {
                        folder: folder.id,
                        parent,
                    });
                }
            }
        }

        Ok(tree)
    }

    /// Add a folder. Its parent, if any, must already be present.
    pub fn insert(&mut self, folder: Folder) -> Result<()> {
        if self.folders.contains_key(&folder.id) {
            return Err(AccessError::DuplicateFolder(folder.id));
        }
        if let Some(parent) = folder.parent_id {
            self.require(parent)?;
        }
        debug!(folder = %folder.id, name = %folder.name, "folder inserted");
        self.folders.insert(folder.id, folder);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Folder> {
        self.folders.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.folders.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// All folders, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    /// Direct children of `id`.
    pub fn children(&self, id: Uuid) -> impl Iterator<Item = &Folder> {
        self.folders
            .values()
            .filter(move |f| f.parent_id == Some(id))
    }

    /// Root folders.
    pub fn roots(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values().filter(|f| f.is_root())
    }

    /// Parent chain of `id`, nearest first, not including `id` itself.
    #[must_use]
    pub fn ancestors(&self, id: Uuid) -> Vec<Uuid> {
        self.folders
            .get(&id)
            .and_then(|f| f.parent_id)
            .map(|parent| self.ancestor_chain(parent))
            .unwrap_or_default()
    }

    /// Every folder below `id`, depth first.
    #[must_use]
    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        let mut found = Vec::new();
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in self.children(current) {
                found.push(child.id);
                frontier.push(child.id);
            }
        }
        found
    }

    /// Returns true if `candidate` sits somewhere below `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, candidate: Uuid, ancestor: Uuid) -> bool {
        self.ancestors(candidate).contains(&ancestor)
    }

    /// Re-parent `folder_id` under `new_parent` (or make it a root).
    ///
    /// Walks the parent chain upward from `new_parent`; meeting `folder_id`
    /// on the way means the move would close a loop.
    pub fn move_folder(&mut self, folder_id: Uuid, new_parent: Option<Uuid>) -> Result<()> {
        self.require(folder_id)?;

        if let Some(parent) = new_parent {
            self.require(parent)?;
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == folder_id {
                    return Err(AccessError::Cycle {
                        folder: folder_id,
                        parent,
                    });
                }
                cursor = self.folders.get(&current).and_then(|f| f.parent_id);
            }
        }

        if let Some(folder) = self.folders.get_mut(&folder_id) {
            folder.parent_id = new_parent;
        }
        Ok(())
    }

    pub fn rename(&mut self, folder_id: Uuid, name: impl Into<String>) -> Result<()> {
        self.require_mut(folder_id)?.name = name.into();
        Ok(())
    }

    /// Replace (or clear) a folder's access control list.
    pub fn set_access_control(
        &mut self,
        folder_id: Uuid,
        access_control: Option<AccessControl>,
    ) -> Result<()> {
        self.require_mut(folder_id)?.access_control = access_control;
        Ok(())
    }

    /// Remove a custom folder.
    ///
    /// Returns the certificates (from `certificates`) filed directly under
    /// it; the caller unassigns them together with this removal. Children
    /// move up to the removed folder's parent.
    pub fn delete_folder<'a>(
        &mut self,
        folder_id: Uuid,
        certificates: impl IntoIterator<Item = &'a CertificateRecord>,
    ) -> Result<FolderDeletion> {
        let folder = self.require(folder_id)?;
        if folder.is_protected() {
            return Err(AccessError::SystemFolderProtected(folder_id));
        }
        let new_parent = folder.parent_id;

        let affected_certificates = certificates
            .into_iter()
            .filter(|c| c.folder_id == Some(folder_id))
            .map(|c| c.id)
            .collect();

        let reparented: Vec<Uuid> = self.children(folder_id).map(|f| f.id).collect();
        for child in &reparented {
            if let Some(f) = self.folders.get_mut(child) {
                f.parent_id = new_parent;
            }
        }

        let folder = self
            .folders
            .remove(&folder_id)
            .ok_or(AccessError::FolderNotFound(folder_id))?;

        Ok(FolderDeletion {
            folder,
            affected_certificates,
            reparented,
        })
    }

    fn require(&self, id: Uuid) -> Result<&Folder> {
        self.folders.get(&id).ok_or(AccessError::FolderNotFound(id))
    }

    fn require_mut(&mut self, id: Uuid) -> Result<&mut Folder> {
        self.folders
            .get_mut(&id)
            .ok_or(AccessError::FolderNotFound(id))
    }

    /// `start` and every ancestor above it. Bounded by the folder count so a
    /// corrupt parent loop cannot spin forever.
    fn ancestor_chain(&self, start: Uuid) -> Vec<Uuid> {
        let mut chain = Vec::new();
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if chain.len() > self.folders.len() {
                break;
            }
            chain.push(current);
            cursor = self.folders.get(&current).and_then(|f| f.parent_id);
        }
        chain
    }
}
