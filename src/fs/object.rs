use std::fs;
use std::path::{Path, PathBuf};

use crate::hashing::Hash;
use crate::object::Object;
use crate::utils::zlib;
use crate::{Constants, Error, Result};

/// Returns the loose object path for `hash`: the first two hex characters
/// name the fan-out directory, the remaining 38 the file.
fn object_path(root: &Path, hash: &Hash) -> PathBuf {
    let hash_str = hash.to_string();
    Constants::objects_path(root)
        .join(&hash_str[..2])
        .join(&hash_str[2..])
}

/// Writes a compressed version of the object to the objects folder of the
/// repository in `root`, returning the hash used to find said object.
///
/// Writing goes through a temporary file in the same directory followed by
/// a rename, so a crash can not leave a half-written object behind. An
/// object that is already stored is left alone; an existing file whose
/// content differs from what would be written means the store is corrupt.
///
/// # Errors
///
/// This function will fail if a directory or file operation fails, or with
/// `CorruptedStore` on a content mismatch.
pub fn write_object(root: &Path, object: &Object) -> Result<Hash> {
    let wrapped = object.wrapped();
    let hash = Hash::new(&wrapped);
    let file_path = object_path(root, &hash);

    if file_path.exists() {
        let existing = zlib::decompress(&fs::read(&file_path)?)?;
        if existing == wrapped {
            return Ok(hash);
        }
        return Err(Error::CorruptedStore(hash));
    }

    let folder_path = file_path.parent().unwrap_or(&file_path);
    fs::create_dir_all(folder_path)?;

    let tmp_path = folder_path.join(format!(".tmp-{}", hash));
    fs::write(&tmp_path, zlib::compress(&wrapped)?)?;
    fs::rename(&tmp_path, &file_path)?;

    Ok(hash)
}

/// Reads the loose object stored under `hash`, validating its header.
///
/// # Errors
///
/// This function will fail if the file is missing or unreadable, or with
/// `CorruptedObject` if the decompressed content does not carry a valid
/// wrapped form.
pub fn read_object(root: &Path, hash: &Hash) -> Result<Object> {
    let file_path = object_path(root, hash);
    let compressed = fs::read(&file_path)?;
    let wrapped = zlib::decompress(&compressed)
        .map_err(|_| Error::corrupted(format!("object file for {} is not valid zlib", hash)))?;
    Object::from_wrapped(&wrapped)
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use tempfile::tempdir;

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempdir().unwrap();
        for kind in [
            ObjectKind::Commit,
            ObjectKind::Tree,
            ObjectKind::Blob,
            ObjectKind::Tag,
        ] {
            let object = Object::new(kind, b"round trip payload".to_vec());
            let hash = write_object(dir.path(), &object).unwrap();
            assert_eq!(object.hash(), hash);
            assert_eq!(object, read_object(dir.path(), &hash).unwrap());
        }
    }

    #[test]
    fn test_write_uses_fanout_layout() {
        let dir = tempdir().unwrap();
        let object = Object::new(ObjectKind::Blob, b"hi\n".to_vec());
        let hash = write_object(dir.path(), &object).unwrap();

        let hash_str = hash.to_string();
        let expected = dir
            .path()
            .join(".git/objects")
            .join(&hash_str[..2])
            .join(&hash_str[2..]);
        assert!(expected.is_file());
    }

    #[test]
    fn test_rewrite_is_a_noop() {
        let dir = tempdir().unwrap();
        let object = Object::new(ObjectKind::Blob, b"same twice".to_vec());
        let first = write_object(dir.path(), &object).unwrap();
        let second = write_object(dir.path(), &object).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_file_with_other_content_is_corrupt() {
        let dir = tempdir().unwrap();
        let object = Object::new(ObjectKind::Blob, b"original".to_vec());
        let path = object_path(dir.path(), &object.hash());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, zlib::compress(b"blob 5\0other").unwrap()).unwrap();

        let err = write_object(dir.path(), &object).unwrap_err();
        assert!(matches!(err, Error::CorruptedStore(_)));
    }

    #[test]
    fn test_read_missing_object() {
        let dir = tempdir().unwrap();
        let hash = Hash::new(b"nothing stored here");
        assert!(read_object(dir.path(), &hash).is_err());
    }

    #[test]
    fn test_read_rejects_garbage_file() {
        let dir = tempdir().unwrap();
        let hash = Hash::new(b"garbage");
        let path = object_path(dir.path(), &hash);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not zlib at all").unwrap();

        assert!(read_object(dir.path(), &hash).is_err());
    }

    #[test]
    fn test_read_rejects_header_length_mismatch() {
        let dir = tempdir().unwrap();
        let hash = Hash::new(b"short");
        let path = object_path(dir.path(), &hash);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, zlib::compress(b"blob 99\0hi").unwrap()).unwrap();

        let err = read_object(dir.path(), &hash).unwrap_err();
        assert!(matches!(err, Error::CorruptedObject(_)));
    }
}
