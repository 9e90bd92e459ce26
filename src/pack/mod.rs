pub mod delta;

use std::collections::HashMap;
use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::hashing::{Hash, HASH_BYTE_LEN};
use crate::object::{Object, ObjectKind};
use crate::utils::zlib;
use crate::{Error, Result};

const PACK_MAGIC: &[u8; 4] = b"PACK";
/// Pack versions this parser accepts.
const SUPPORTED_VERSIONS: [u32; 2] = [2, 3];
const TRAILER_LEN: usize = HASH_BYTE_LEN;
const HEADER_LEN: usize = 12;

const MSB_MASK: u8 = 0b1000_0000;
const REM_MASK: u8 = 0b0111_1111;
const TYPE_MASK: u8 = 0b0111_0000;
/// The first header byte only contributes its low four bits to the length.
const FIRST_REM_MASK: u8 = 0b0000_1111;

const OFS_DELTA_CODE: u8 = 6;
const REF_DELTA_CODE: u8 = 7;

/// Owns one pack ingest session: the objects reconstructed so far and the
/// ref-deltas still waiting for their base.
///
/// Deltas are not required to appear after their base in the pack, so a
/// delta whose base is unknown is parked under the base hash and replayed
/// the moment that base (or an object deltified into it) is inserted.
#[derive(Default)]
pub struct Ingester {
    objects: HashMap<Hash, Object>,
    pending: HashMap<Hash, Vec<Vec<u8>>>,
}

impl Ingester {
    pub fn new() -> Self {
        Ingester::default()
    }

    /// Parses a whole packfile, reconstructing every object in it.
    ///
    /// # Errors
    ///
    /// This function will fail if the envelope is malformed, the trailer
    /// checksum does not match, any object record is invalid, an ofs-delta
    /// is encountered or a ref-delta base never shows up.
    pub fn ingest(&mut self, pack: &[u8]) -> Result<()> {
        let body_len = verify_envelope(pack)?;
        let mut cursor = Cursor::new(&pack[..body_len]);
        cursor.set_position(HEADER_LEN as u64);
        let count = {
            let mut header = Cursor::new(&pack[4..HEADER_LEN]);
            let version = header.read_u32::<BigEndian>()?;
            let count = header.read_u32::<BigEndian>()?;
            log::debug!("pack version {} with {} objects", version, count);
            count
        };

        for n in 0..count {
            self.read_record(&mut cursor)
                .map_err(|e| match e {
                    // carry which record broke the parse
                    Error::Pack(msg) => Error::pack(format!("object {} of {}: {}", n + 1, count, msg)),
                    other => other,
                })?;
        }

        if (cursor.position() as usize) < body_len {
            return Err(Error::pack(format!(
                "{} bytes of unread data between the last object and the trailer",
                body_len - cursor.position() as usize
            )));
        }

        if let Some(base) = self.pending.keys().next() {
            return Err(Error::UnresolvedDelta(*base));
        }

        Ok(())
    }

    pub fn get(&self, hash: &Hash) -> Option<&Object> {
        self.objects.get(hash)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Reads one object record starting at the cursor position.
    fn read_record(&mut self, cursor: &mut Cursor<&[u8]>) -> Result<()> {
        let (type_code, declared_len) = read_object_header(cursor)?;

        match type_code {
            OFS_DELTA_CODE => Err(Error::UnsupportedDelta),
            REF_DELTA_CODE => {
                let mut raw = [0u8; HASH_BYTE_LEN];
                cursor
                    .read_exact(&mut raw)
                    .map_err(|_| Error::pack("ref-delta record is missing its base hash"))?;
                let base = Hash::from(raw);

                let instructions = read_compressed_payload(cursor, declared_len)?;
                match self.objects.get(&base) {
                    Some(base_object) => {
                        let object = Object::new(
                            base_object.kind,
                            delta::apply(&base_object.data, &instructions)?,
                        );
                        self.insert(object)
                    }
                    // base not seen yet, park the delta until it arrives
                    None => {
                        self.pending.entry(base).or_default().push(instructions);
                        Ok(())
                    }
                }
            }
            code => {
                let kind = ObjectKind::from_pack_code(code)?;
                let data = read_compressed_payload(cursor, declared_len)?;
                self.insert(Object::new(kind, data))
            }
        }
    }

    /// Adds a reconstructed object and replays any deltas that were waiting
    /// for it. A resolved delta is itself an insertion, so resolution keeps
    /// going until no newly inserted object unblocks anything.
    fn insert(&mut self, object: Object) -> Result<()> {
        let mut queue = vec![object];
        while let Some(object) = queue.pop() {
            let hash = object.hash();
            for instructions in self.pending.remove(&hash).unwrap_or_default() {
                let data = delta::apply(&object.data, &instructions)?;
                queue.push(Object::new(object.kind, data));
            }
            self.objects.insert(hash, object);
        }
        Ok(())
    }
}

/// Checks the magic, the version and the trailer checksum, returning the
/// length of the pack without its trailer.
fn verify_envelope(pack: &[u8]) -> Result<usize> {
    if pack.len() < HEADER_LEN + TRAILER_LEN {
        return Err(Error::pack(format!(
            "{} bytes is too short to be a packfile",
            pack.len()
        )));
    }
    if &pack[..4] != PACK_MAGIC {
        return Err(Error::pack(format!(
            "bad magic: {:?}",
            String::from_utf8_lossy(&pack[..4])
        )));
    }
    let version = u32::from_be_bytes([pack[4], pack[5], pack[6], pack[7]]);
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(Error::pack(format!("unsupported pack version {}", version)));
    }

    let body_len = pack.len() - TRAILER_LEN;
    let computed = Hash::new(&pack[..body_len]);
    let mut stored_raw = [0u8; HASH_BYTE_LEN];
    stored_raw.copy_from_slice(&pack[body_len..]);
    let stored = Hash::from(stored_raw);
    if computed != stored {
        return Err(Error::Checksum { computed, stored });
    }

    Ok(body_len)
}

/// Decodes an object record header: type in bits 6-4 of the first byte, the
/// low four bits starting the length, then seven more length bits per
/// continuation byte, shifted by `4 + 7*i`.
fn read_object_header(cursor: &mut Cursor<&[u8]>) -> Result<(u8, u64)> {
    let mut buf = [0u8; 1];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| Error::pack("stream ended at an object record header"))?;

    let type_code = (buf[0] & TYPE_MASK) >> 4;
    let mut length = (buf[0] & FIRST_REM_MASK) as u64;
    let mut continued = buf[0] & MSB_MASK != 0;

    let mut shift = 4u32;
    while continued {
        if shift >= u64::BITS {
            return Err(Error::pack("object length does not fit in 64 bits"));
        }
        cursor
            .read_exact(&mut buf)
            .map_err(|_| Error::pack("stream ended inside an object length"))?;
        length |= ((buf[0] & REM_MASK) as u64) << shift;
        continued = buf[0] & MSB_MASK != 0;
        shift += 7;
    }

    Ok((type_code, length))
}

/// Inflates the zlib stream at the cursor position and advances the cursor
/// to the byte right after the stream's end marker.
fn read_compressed_payload(cursor: &mut Cursor<&[u8]>, declared_len: u64) -> Result<Vec<u8>> {
    let position = cursor.position() as usize;
    let (data, consumed) = zlib::decompress_prefix(&cursor.get_ref()[position..])?;
    cursor.set_position((position + consumed) as u64);

    if data.len() as u64 != declared_len {
        return Err(Error::pack(format!(
            "record declared {} bytes but inflated to {}",
            declared_len,
            data.len()
        )));
    }
    Ok(data)
}

// Tests
