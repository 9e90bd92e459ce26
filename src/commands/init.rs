use std::path::Path;

use anyhow::{Context, Result};

use crate::fs::repo;

/// Creates a new git repository in `root`.
///
/// # Errors
///
/// This function will fail if any of the operations related with the
/// creation of directories and files fail.
pub fn init(root: &Path) -> Result<String> {
    if repo::init_repository(root).context("could not create the repository layout")? {
        Ok("Created new git repository".into())
    } else {
        Ok("The directory is already a git repository".into())
    }
}
