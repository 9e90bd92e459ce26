use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::fs::object::write_object;
use crate::fs::{repo, restore};
use crate::hashing::Hash;
use crate::http::RemoteRepository;
use crate::pack::Ingester;
use crate::Constants;

/// Clones the repository at `url` into `directory`: discovers the remote
/// head, fetches and ingests a packfile, flushes every object to the loose
/// store, writes the branch ref and restores the working tree.
///
/// A clone is all or nothing; when any stage fails the half-written
/// destination directory is removed again.
///
/// # Errors
///
/// This function will fail if the destination is unusable or any stage of
/// the fetch, ingest or restore fails.
pub fn clone(url: &str, directory: &OsStr) -> Result<String> {
    let root = Path::new(directory);
    if root.exists() && root.read_dir()?.next().is_some() {
        bail!("destination {:?} already exists and is not empty", root);
    }

    fs::create_dir_all(root)
        .context(format!("could not create the destination {:?}", root))?;

    match clone_into(url, root) {
        Ok(message) => Ok(message),
        Err(error) => {
            if let Err(cleanup) = fs::remove_dir_all(root) {
                log::warn!("could not clean up {:?}: {}", root, cleanup);
            }
            Err(error)
        }
    }
}

fn clone_into(url: &str, root: &Path) -> Result<String> {
    let remote = RemoteRepository::new(url)?;
    let head = remote
        .discover_head()
        .context("reference discovery failed")?;
    log::debug!("remote head is at {}", head);

    let pack = remote
        .fetch_pack(&head)
        .context("pack negotiation failed")?;

    let count = ingest_pack(root, &head, &pack)?;

    Ok(format!("Cloned {} objects into {:?}", count, root))
}

/// The local half of a clone: initializes the repository layout, ingests
/// the fetched pack, flushes all objects, writes the branch ref and
/// restores the working tree at `head`. Returns the number of objects.
fn ingest_pack(root: &Path, head: &Hash, pack: &[u8]) -> Result<usize> {
    repo::init_repository(root).context("could not create the repository layout")?;

    let mut ingester = Ingester::new();
    ingester
        .ingest(pack)
        .context("packfile ingestion failed")?;

    for object in ingester.objects() {
        write_object(root, object).context("could not flush an object to disk")?;
    }

    repo::write_branch_ref(root, Constants::DEFAULT_BRANCH, head)
        .context("could not write the branch ref")?;

    restore::restore_commit(root, head).context("could not restore the working tree")?;

    Ok(ingester.len())
}

// Tests
