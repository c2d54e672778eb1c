//! # certdeck-access
//!
//! Hierarchical folders with role-based access control.
//!
//! - [`AccessPolicy`] answers `has_permission`, `has_folder_access` and
//!   `accessible_folders` with plain booleans and filtered sets.
//! - [`FolderTree`] owns the folder graph and keeps it acyclic; moves are
//!   checked with an explicit ancestor walk and system folders refuse
//!   deletion.
//! - [`Inventory`] applies guarded mutations to certificates and folders
//!   under a single lock.
//! - [`SessionRepository`] resolves request tokens to the current state of
//!   their user, read from a [`UserDirectory`].
//!
//! ```
//! use certdeck_access::{AccessPolicy, FolderTree};
//! use certdeck_core::{Folder, FolderAction, User};
//!
//! let folder = Folder::custom("web");
//! let id = folder.id;
//! let tree = FolderTree::from_folders([folder]).unwrap();
//! let policy = AccessPolicy::default();
//! let viewer = User::new("vera", "viewer");
//!
//! assert!(policy.has_folder_access(&viewer, &tree, id, FolderAction::Read));
//! assert!(!policy.has_folder_access(&viewer, &tree, id, FolderAction::Write));
//! ```

pub mod error;
pub mod inventory;
pub mod policy;
pub mod session;
pub mod tree;
pub mod users;

pub use error::{AccessError, Result};
pub use inventory::Inventory;
pub use policy::{AccessPolicy, PolicyConfig};
pub use session::{InMemorySessionRepository, IssuedSession, Session, SessionRepository};
pub use tree::{FolderDeletion, FolderTree};
pub use users::{InMemoryUserDirectory, UserDirectory};
