use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::fs::object::{read_object, write_object};
use crate::hashing::Hash;
use crate::object::commit::{self, Signature};
use crate::object::{Object, ObjectKind};
use crate::Constants;

/// Creates a commit object pointing at `tree`, printing its hash.
///
/// # Errors
///
/// This function will fail if the tree is missing or not a tree, or the
/// commit could not be encoded or stored.
pub fn commit_tree(
    root: &Path,
    tree: &str,
    parent: Option<&str>,
    message: &str,
) -> Result<String> {
    let tree_hash = Hash::from_str(tree).context("the given tree hash is not valid")?;
    let tree_object = read_object(root, &tree_hash)
        .context(format!("could not read object {}", tree_hash))?;
    if tree_object.kind != ObjectKind::Tree {
        bail!("object {} is a {}, not a tree", tree_hash, tree_object.kind);
    }

    let parents = match parent {
        Some(p) => vec![Hash::from_str(p).context("the given parent hash is not valid")?],
        None => Vec::new(),
    };

    let signature = Signature::now(Constants::DEFAULT_IDENTIFIER);
    let data = commit::encode(&tree_hash, &parents, &signature, &signature, message)
        .context("could not encode the commit")?;

    let hash = write_object(root, &Object::new(ObjectKind::Commit, data))
        .context("could not write the commit to the object dir")?;

    Ok(hash.to_string())
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::write_tree::write_tree;
    use crate::fs::repo::init_repository;
    use tempfile::tempdir;

    #[test]
    fn test_commit_tree_round_trip() {
        let dir = tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        std::fs::write(dir.path().join("file.txt"), b"content").unwrap();
        let tree = write_tree(dir.path()).unwrap();

        let output = commit_tree(dir.path(), &tree, None, "first commit").unwrap();

        let hash = Hash::from_str(&output).unwrap();
        let stored = read_object(dir.path(), &hash).unwrap();
        assert_eq!(ObjectKind::Commit, stored.kind);
        let text = String::from_utf8(stored.data).unwrap();
        assert!(text.starts_with(&format!("tree {}\n", tree)));
        assert!(text.ends_with("first commit\n"));
        assert!(!text.contains("parent"));
    }

    #[test]
    fn test_commit_tree_with_parent() {
        let dir = tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        let tree = write_tree(dir.path()).unwrap();
        let first = commit_tree(dir.path(), &tree, None, "first").unwrap();
        let second = commit_tree(dir.path(), &tree, Some(&first), "second").unwrap();

        let stored = read_object(dir.path(), &Hash::from_str(&second).unwrap()).unwrap();
        let text = String::from_utf8(stored.data).unwrap();
        assert!(text.contains(&format!("parent {}\n", first)));
    }

    #[test]
    fn test_commit_tree_rejects_non_tree() {
        let dir = tempdir().unwrap();
        init_repository(dir.path()).unwrap();
        let blob = write_object(
            dir.path(),
            &Object::new(ObjectKind::Blob, b"not a tree".to_vec()),
        )
        .unwrap();

        assert!(commit_tree(dir.path(), &blob.to_string(), None, "nope").is_err());
    }
}
