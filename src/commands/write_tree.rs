use std::fs;
use std::os::unix::ffi::OsStringExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context, Result};

use crate::fs::object::write_object;
use crate::hashing::Hash;
use crate::object::tree::{self, TreeEntry, MODE_EXECUTABLE, MODE_FILE, MODE_SYMLINK, MODE_TREE};
use crate::object::{Object, ObjectKind};
use crate::Constants;

/// Stores the whole working tree as blob and tree objects, printing the
/// hash of the root tree.
///
/// This walker works straight off the filesystem, there is no index
/// involved: every file becomes a blob and every directory a tree, bottom
/// up, with entries sorted by name as git stores them.
pub fn write_tree(root: &Path) -> Result<String> {
    let hash = write_tree_dir(root, root)?;
    Ok(hash.to_string())
}

fn write_tree_dir(root: &Path, dir: &Path) -> Result<Hash> {
    let mut entries: Vec<TreeEntry> = Vec::new();

    for dir_entry in fs::read_dir(dir).context(format!("could not read directory {:?}", dir))? {
        let dir_entry = dir_entry.context("could not get dir entry")?;
        let name = dir_entry.file_name();
        if name == Constants::REPOSITORY_FOLDER_NAME {
            continue;
        }

        let path = dir_entry.path();
        let file_type = dir_entry
            .file_type()
            .context(format!("could not get the file type of {:?}", path))?;

        let (mode, hash) = if file_type.is_dir() {
            (MODE_TREE, write_tree_dir(root, &path)?)
        } else if file_type.is_symlink() {
            let target = fs::read_link(&path)
                .context(format!("could not read symlink {:?}", path))?;
            let blob = Object::new(ObjectKind::Blob, target.into_os_string().into_vec());
            (MODE_SYMLINK, write_object(root, &blob)?)
        } else {
            let data = fs::read(&path).context(format!("could not read file {:?}", path))?;
            let executable = dir_entry
                .metadata()
                .context(format!("could not get metadata of {:?}", path))?
                .permissions()
                .mode()
                & 0o111
                != 0;
            let mode = if executable { MODE_EXECUTABLE } else { MODE_FILE };
            (mode, write_object(root, &Object::new(ObjectKind::Blob, data))?)
        };

        entries.push(TreeEntry { mode, name, hash });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let tree = Object::new(ObjectKind::Tree, tree::encode(&entries));
    Ok(write_object(root, &tree)?)
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::object::read_object;
    use crate::fs::repo::init_repository;
    use std::str::FromStr;
    use tempfile::tempdir;

    const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    #[test]
    fn test_empty_directory_is_the_empty_tree() {
        let dir = tempdir().unwrap();
        init_repository(dir.path()).unwrap();

        let output = write_tree(dir.path()).unwrap();
        assert_eq!(EMPTY_TREE_SHA, output);
    }

    #[test]
    fn test_tree_contains_sorted_entries() {
        let dir = tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        fs::write(dir.path().join("zebra.txt"), b"z").unwrap();
        fs::write(dir.path().join("apple.txt"), b"a").unwrap();

        let output = write_tree(dir.path()).unwrap();
        let root_tree = read_object(dir.path(), &Hash::from_str(&output).unwrap()).unwrap();
        let entries = tree::parse(&root_tree.data).unwrap();

        assert_eq!(2, entries.len());
        assert_eq!("apple.txt", entries[0].name.to_string_lossy());
        assert_eq!("zebra.txt", entries[1].name.to_string_lossy());
    }

    #[test]
    fn test_subdirectories_become_subtrees() {
        let dir = tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.txt"), b"inner").unwrap();

        let output = write_tree(dir.path()).unwrap();
        let root_tree = read_object(dir.path(), &Hash::from_str(&output).unwrap()).unwrap();
        let entries = tree::parse(&root_tree.data).unwrap();

        assert_eq!(1, entries.len());
        assert_eq!(MODE_TREE, entries[0].mode);

        let subtree = read_object(dir.path(), &entries[0].hash).unwrap();
        let sub_entries = tree::parse(&subtree.data).unwrap();
        assert_eq!("inner.txt", sub_entries[0].name.to_string_lossy());
        assert_eq!(MODE_FILE, sub_entries[0].mode);
    }
}
