use std::ffi::OsString;
use std::fs;
use std::os::unix::ffi::OsStringExt;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;

use crate::fs::object::read_object;
use crate::hashing::Hash;
use crate::object::tree::{self, TreeEntry, MODE_GITLINK, MODE_SYMLINK, MODE_TREE};
use crate::object::{commit, ObjectKind};
use crate::{Error, Result};

/// Materializes the tree of `commit_hash` into `root`, the repository's
/// working directory.
///
/// # Errors
///
/// This function will fail if an object is missing or of the wrong kind, a
/// tree entry carries an unknown mode, or a file operation fails.
pub fn restore_commit(root: &Path, commit_hash: &Hash) -> Result<()> {
    let commit_object = read_object(root, commit_hash)?;
    if commit_object.kind != ObjectKind::Commit {
        return Err(Error::corrupted(format!(
            "{} is a {}, expected a commit",
            commit_hash, commit_object.kind
        )));
    }

    let tree_hash = commit::tree_hash(&commit_object.data)?;
    restore_tree(root, root, &tree_hash)
}

fn restore_tree(root: &Path, dir: &Path, tree_hash: &Hash) -> Result<()> {
    let tree_object = read_object(root, tree_hash)?;
    if tree_object.kind != ObjectKind::Tree {
        return Err(Error::corrupted(format!(
            "{} is a {}, expected a tree",
            tree_hash, tree_object.kind
        )));
    }

    for entry in tree::parse(&tree_object.data)? {
        let target = dir.join(&entry.name);
        match entry.mode {
            MODE_TREE => {
                fs::create_dir_all(&target)?;
                restore_tree(root, &target, &entry.hash)?;
            }
            MODE_SYMLINK => {
                let blob = read_blob(root, &entry)?;
                symlink(OsString::from_vec(blob), &target)?;
            }
            MODE_GITLINK => {
                // submodules are not fetched, leave the path absent
                log::debug!("skipping gitlink entry {:?}", entry.name);
            }
            _ if entry.is_file() => {
                let blob = read_blob(root, &entry)?;
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, blob)?;
                fs::set_permissions(&target, fs::Permissions::from_mode(entry.permissions()))?;
            }
            mode => return Err(Error::InvalidMode(mode)),
        }
    }

    Ok(())
}

fn read_blob(root: &Path, entry: &TreeEntry) -> Result<Vec<u8>> {
    let object = read_object(root, &entry.hash)?;
    if object.kind != ObjectKind::Blob {
        return Err(Error::corrupted(format!(
            "tree entry {:?} points at a {}, expected a blob",
            entry.name, object.kind
        )));
    }
    Ok(object.data)
}

// Tests
