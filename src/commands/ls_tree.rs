use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::fs::object::read_object;
use crate::hashing::Hash;
use crate::object::{tree, ObjectKind};

/// Lists the entries of the tree stored under `hash`.
pub fn ls_tree(root: &Path, name_only: bool, hash: &str) -> Result<String> {
    let hash = Hash::from_str(hash).context("the given hash is not valid")?;
    let object = read_object(root, &hash)
        .context(format!("could not read object {}", hash))?;

    if object.kind != ObjectKind::Tree {
        bail!("object {} is a {}, not a tree", hash, object.kind);
    }

    let entries = tree::parse(&object.data).context("could not parse tree entries")?;
    if name_only {
        Ok(entries
            .iter()
            .map(|e| e.name.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("\n"))
    } else {
        Ok(tree::display(&entries))
    }
}
