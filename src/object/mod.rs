pub mod commit;
pub mod tree;

use std::io::{Cursor, Read};
use std::str::FromStr;

use crate::hashing::Hash;
use crate::utils::cursor::EasyRead;
use crate::{Error, Result};

pub const SPACE_BYTE: u8 = b' ';
pub const NULL_BYTE: u8 = b'\0';

/// Represents the different type of objects there can be: Blobs, Trees,
/// Commits and Tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    pub const COMMIT_STRING: &'static str = "commit";
    pub const TREE_STRING: &'static str = "tree";
    pub const BLOB_STRING: &'static str = "blob";
    pub const TAG_STRING: &'static str = "tag";

    /// Maps a packfile object type code (the three bits of the record
    /// header) to a kind. Codes 6 and 7 are delta representations and have
    /// no kind of their own; 0 and 5 are invalid.
    pub fn from_pack_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(ObjectKind::Commit),
            2 => Ok(ObjectKind::Tree),
            3 => Ok(ObjectKind::Blob),
            4 => Ok(ObjectKind::Tag),
            _ => Err(Error::pack(format!("invalid object type code: {}", code))),
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Commit => Self::COMMIT_STRING,
            Self::Tree => Self::TREE_STRING,
            Self::Blob => Self::BLOB_STRING,
            Self::Tag => Self::TAG_STRING,
        })
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            Self::COMMIT_STRING => Ok(ObjectKind::Commit),
            Self::TREE_STRING => Ok(ObjectKind::Tree),
            Self::BLOB_STRING => Ok(ObjectKind::Blob),
            Self::TAG_STRING => Ok(ObjectKind::Tag),
            _ => Err(Error::corrupted(format!("unknown object type {:?}", s))),
        }
    }
}

/// An object as it exists in memory: a kind and the raw payload bytes.
///
/// The identity of an object is the SHA1 of its wrapped form,
/// `{type} {data_length}\0{data}`, which is also the byte layout stored
/// on disk (compressed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

impl Object {
    pub fn new<T: Into<Vec<u8>>>(kind: ObjectKind, data: T) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Returns the encoded data for this object, with the following format:
    ///
    /// `{type} {data_length}\0{data}`
    pub fn wrapped(&self) -> Vec<u8> {
        let mut bytes = format!("{} {}\0", self.kind, self.data.len()).into_bytes();
        bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Returns the SHA1 hash of the wrapped form of this object.
    pub fn hash(&self) -> Hash {
        Hash::new(&self.wrapped())
    }

    /// Reads a byte slice, expecting the wrapped (uncompressed) form of an
    /// object file.
    ///
    /// # Errors
    ///
    /// This function will fail if:
    /// - The header does not follow the `{type} {data_length}\0` format.
    /// - The payload length does not match the declared length.
    pub fn from_wrapped(bytes: &[u8]) -> Result<Object> {
        let mut cursor = Cursor::new(bytes);

        // reading kind
        let kind_buf = cursor.read_until_checked(SPACE_BYTE)?;
        let kind = ObjectKind::from_str(&String::from_utf8_lossy(&kind_buf))?;

        // reading data length
        let len_buf = cursor.read_until_checked(NULL_BYTE)?;
        let data_len: usize = String::from_utf8_lossy(&len_buf)
            .parse()
            .map_err(|e| Error::corrupted(format!("could not read object length as a number: {}", e)))?;

        // reading actual data
        let mut data = Vec::with_capacity(data_len);
        cursor.read_to_end(&mut data)?;

        if data_len != data.len() {
            return Err(Error::corrupted(format!(
                "length read {} did not match actual data length {}",
                data_len,
                data.len()
            )));
        }

        Ok(Object::new(kind, data))
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_BLOB_SHA: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
    const HI_BLOB_SHA: &str = "45b983be36b73c0788dc9cbcb76cbb80fc7bb057";

    #[test]
    fn test_wrapped_layout() {
        let blob = Object::new(ObjectKind::Blob, b"hi\n".to_vec());
        assert_eq!(b"blob 3\0hi\n".to_vec(), blob.wrapped());
    }

    #[test]
    fn test_empty_blob_identity() {
        let blob = Object::new(ObjectKind::Blob, Vec::new());
        assert_eq!(b"blob 0\0".to_vec(), blob.wrapped());
        assert_eq!(EMPTY_BLOB_SHA, blob.hash().to_string());
    }

    #[test]
    fn test_known_blob_identity() {
        let blob = Object::new(ObjectKind::Blob, b"hi\n".to_vec());
        assert_eq!(HI_BLOB_SHA, blob.hash().to_string());
    }

    #[test]
    fn test_wrapped_round_trip() {
        for kind in [
            ObjectKind::Commit,
            ObjectKind::Tree,
            ObjectKind::Blob,
            ObjectKind::Tag,
        ] {
            let object = Object::new(kind, b"payload".to_vec());
            let parsed = Object::from_wrapped(&object.wrapped()).unwrap();
            assert_eq!(object, parsed);
        }
    }

    #[test]
    fn test_from_wrapped_rejects_unknown_type() {
        assert!(Object::from_wrapped(b"glob 2\0hi").is_err());
    }

    #[test]
    fn test_from_wrapped_rejects_length_mismatch() {
        assert!(Object::from_wrapped(b"blob 5\0hi").is_err());
    }

    #[test]
    fn test_from_wrapped_rejects_missing_header() {
        assert!(Object::from_wrapped(b"blob3hi").is_err());
    }

    #[test]
    fn test_pack_code_mapping() {
        assert_eq!(ObjectKind::Commit, ObjectKind::from_pack_code(1).unwrap());
        assert_eq!(ObjectKind::Tree, ObjectKind::from_pack_code(2).unwrap());
        assert_eq!(ObjectKind::Blob, ObjectKind::from_pack_code(3).unwrap());
        assert_eq!(ObjectKind::Tag, ObjectKind::from_pack_code(4).unwrap());
        assert!(ObjectKind::from_pack_code(0).is_err());
        assert!(ObjectKind::from_pack_code(5).is_err());
    }
}
