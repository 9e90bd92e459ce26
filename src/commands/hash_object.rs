use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::fs::object::write_object;
use crate::object::{Object, ObjectKind};

/// Prints the blob hash of `file`, storing the blob when `write` is set.
///
/// # Errors
///
/// This function will fail if the file could not be read or the object
/// could not be stored.
pub fn hash_object(root: &Path, write: bool, file: &OsStr) -> Result<String> {
    let data = fs::read(file).context(format!("could not read file {:?}", file))?;
    let blob = Object::new(ObjectKind::Blob, data);

    let hash = if write {
        write_object(root, &blob).context("could not write the blob to the object dir")?
    } else {
        blob.hash()
    };

    Ok(hash.to_string())
}
