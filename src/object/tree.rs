use std::ffi::OsString;
use std::fmt::Display;
use std::io::{Cursor, Read};
use std::os::unix::ffi::{OsStrExt, OsStringExt};

use crate::hashing::{Hash, HASH_BYTE_LEN};
use crate::object::{ObjectKind, NULL_BYTE, SPACE_BYTE};
use crate::utils::cursor::EasyRead;
use crate::{Error, Result};

/// Regular file.
pub const MODE_FILE: u32 = 0o100644;
/// File with the executable bit set.
pub const MODE_EXECUTABLE: u32 = 0o100755;
/// Symbolic link; the blob payload is the link target.
pub const MODE_SYMLINK: u32 = 0o120000;
/// Subtree.
pub const MODE_TREE: u32 = 0o40000;
/// Submodule commit reference.
pub const MODE_GITLINK: u32 = 0o160000;

/// Struct that represents a single tree entry in a tree object.
#[derive(Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// Stored in the object as octal text without a leading zero, kept here
    /// as the numeric value (`0o100644`, `0o40000`, ...).
    pub mode: u32,
    pub name: OsString,
    pub hash: Hash,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.mode >> 9 == MODE_FILE >> 9
    }

    /// The permission bits a restored file gets, `0o644` or `0o755`.
    pub fn permissions(&self) -> u32 {
        self.mode & 0o777
    }

    pub fn kind(&self) -> ObjectKind {
        match self.mode {
            MODE_TREE => ObjectKind::Tree,
            MODE_GITLINK => ObjectKind::Commit,
            _ => ObjectKind::Blob,
        }
    }
}

impl Display for TreeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{:06o} {} {}\t{}",
            self.mode,
            self.kind(),
            self.hash,
            self.name.to_string_lossy(),
        ))
    }
}

/// Encodes tree entries as a tree object payload:
///
/// `{mode} {name}\0{20 byte hash}` per entry, in the order given.
pub fn encode(entries: &[TreeEntry]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for e in entries {
        bytes.extend(format!("{:o} ", e.mode).into_bytes());
        bytes.extend(e.name.as_bytes());
        bytes.push(NULL_BYTE);
        bytes.extend(e.hash.as_ref());
    }
    bytes
}

/// Parses a tree object payload into its entries.
///
/// Entries are returned in the order they are stored; no resorting happens
/// on read.
///
/// # Errors
///
/// This function will fail if an entry is truncated or its mode is not
/// octal text.
pub fn parse(data: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut cursor = Cursor::new(data);
    let mut entries = Vec::new();
    let mut hash_buf = [0u8; HASH_BYTE_LEN];

    while (cursor.position() as usize) < data.len() {
        // reading mode
        let mode_buf = cursor.read_until_checked(SPACE_BYTE)?;
        let mode = u32::from_str_radix(&String::from_utf8_lossy(&mode_buf), 8)
            .map_err(|e| Error::corrupted(format!("could not read tree entry mode: {}", e)))?;

        // reading name
        let name_buf = cursor.read_until_checked(NULL_BYTE)?;
        if name_buf.is_empty() {
            return Err(Error::corrupted("tree entry had an empty name".to_owned()));
        }

        // reading hash
        cursor
            .read_exact(&mut hash_buf)
            .map_err(|_| Error::corrupted("could not read tree entry hash".to_owned()))?;

        entries.push(TreeEntry {
            mode,
            name: OsString::from_vec(name_buf),
            hash: Hash::from(hash_buf),
        });
    }

    Ok(entries)
}

pub fn display(entries: &[TreeEntry]) -> String {
    let mut s = String::new();
    for e in entries {
        s.push_str(&e.to_string());
        s.push('\n');
    }
    s.pop(); // removing trailing newline
    s
}

// Tests
