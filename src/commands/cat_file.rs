use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::fs::object::read_object;
use crate::hashing::Hash;
use crate::object::{tree, ObjectKind};

/// Shows the content of the object stored under `hash`.
///
/// Blobs, commits and tags print their payload as-is; trees get one line
/// per entry since their payload is binary.
pub fn cat_file(root: &Path, _pretty: bool, hash: &str) -> Result<String> {
    let hash = Hash::from_str(hash).context("the given hash is not valid")?;
    let object = read_object(root, &hash)
        .context(format!("could not read object {}", hash))?;

    match object.kind {
        ObjectKind::Tree => {
            let entries = tree::parse(&object.data).context("could not parse tree entries")?;
            Ok(tree::display(&entries))
        }
        _ => Ok(String::from_utf8_lossy(&object.data).into_owned()),
    }
}
