use std::fs;
use std::path::Path;

use crate::hashing::Hash;
use crate::{Constants, Result};

/// Creates the `.git` skeleton inside `root`: the objects and refs folders
/// and a HEAD pointing at the default branch.
///
/// Initializing an existing repository is a no-op.
///
/// # Errors
///
/// This function will fail if any of the operations related with the
/// creation of directories and files fail.
pub fn init_repository(root: &Path) -> Result<bool> {
    if Constants::repository_path(root).exists() {
        return Ok(false);
    }

    for p in [
        Constants::objects_path(root),
        Constants::refs_path(root),
        Constants::heads_path(root),
    ] {
        fs::create_dir_all(&p)?;
    }

    fs::write(
        Constants::head_path(root),
        format!(
            "{}refs/{}/{}\n",
            Constants::HEAD_CONTENT_HEADER,
            Constants::HEADS_FOLDER_NAME,
            Constants::DEFAULT_BRANCH
        ),
    )?;

    Ok(true)
}

/// Points `refs/heads/<branch>` at `commit`, and HEAD at that branch if no
/// HEAD exists yet.
///
/// # Errors
///
/// This function will fail if the ref file or its parents can not be
/// written.
pub fn write_branch_ref(root: &Path, branch: &str, commit: &Hash) -> Result<()> {
    let ref_path = Constants::heads_path(root).join(branch);
    if let Some(parent) = ref_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&ref_path, format!("{}\n", commit))?;

    let head_path = Constants::head_path(root);
    if !head_path.exists() {
        fs::write(
            &head_path,
            format!(
                "{}refs/{}/{}\n",
                Constants::HEAD_CONTENT_HEADER,
                Constants::HEADS_FOLDER_NAME,
                branch
            ),
        )?;
    }

    Ok(())
}

// Tests
