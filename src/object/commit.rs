use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::UtcOffset;

use crate::hashing::{Hash, HASH_HEX_LEN};
use crate::{Error, Result};

pub const TREE_STR: &str = "tree";
pub const PARENT_STR: &str = "parent";
pub const AUTHOR_STR: &str = "author";
pub const COMMITTER_STR: &str = "committer";

const TIMEZONE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[offset_hour sign:mandatory][offset_minute]");

/// The person recorded on an author or committer line.
#[derive(Debug)]
pub struct Signature {
    /// Generally name and email, `Jane Doe <jane@example.com>`
    pub identifier: String,
    pub timestamp: SystemTime,
    pub timezone: UtcOffset,
}

impl Signature {
    pub fn now(identifier: impl Into<String>) -> Self {
        Signature {
            identifier: identifier.into(),
            timestamp: SystemTime::now(),
            timezone: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    fn format(&self, role: &str) -> Result<String> {
        let seconds = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map_err(|_| Error::corrupted("commit timestamp predates the unix epoch".to_owned()))?
            .as_secs();
        let offset = self
            .timezone
            .format(TIMEZONE_FORMAT)
            .map_err(|e| Error::corrupted(format!("could not format timezone offset: {}", e)))?;
        Ok(format!("{} {} {} {}\n", role, self.identifier, seconds, offset))
    }
}

/// Returns a commit payload with the following format:
///
/// tree {`tree_hash`}
/// parent {`parent_hash`} (zero or more)
/// author {`identifier`} {`timestamp`} {`timezone`}
/// committer {`identifier`} {`timestamp`} {`timezone`}
///
/// {`message`}
pub fn encode(
    tree_hash: &Hash,
    parents: &[Hash],
    author: &Signature,
    committer: &Signature,
    message: &str,
) -> Result<Vec<u8>> {
    let mut file = format!("{} {}\n", TREE_STR, tree_hash);
    for hash in parents {
        file.push_str(&format!("{} {}\n", PARENT_STR, hash));
    }
    file.push_str(&author.format(AUTHOR_STR)?);
    file.push_str(&committer.format(COMMITTER_STR)?);
    file.push_str(&format!("\n{}\n", message));
    Ok(file.into_bytes())
}

/// Extracts the tree hash from a commit payload.
///
/// The first line of every commit is `tree ` followed by 40 hex characters;
/// that is all the restore path needs from a commit.
///
/// # Errors
///
/// This function will fail if the payload does not start with a well formed
/// tree line.
pub fn tree_hash(data: &[u8]) -> Result<Hash> {
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::corrupted("commit object is not valid utf-8".to_owned()))?;
    let first_line = text
        .lines()
        .next()
        .ok_or_else(|| Error::corrupted("commit object was empty".to_owned()))?;
    let hash_str = first_line
        .strip_prefix(&format!("{} ", TREE_STR))
        .ok_or_else(|| {
            Error::corrupted(format!("expected commit to start with {:?}", TREE_STR))
        })?;
    if hash_str.len() != HASH_HEX_LEN {
        return Err(Error::corrupted(format!(
            "tree line carries a malformed hash: {:?}",
            hash_str
        )));
    }
    Hash::from_str(hash_str)
}

// Tests
