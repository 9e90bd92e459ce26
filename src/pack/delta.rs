use std::io::{Cursor, Read};

use crate::{Error, Result};

const MSB_MASK: u8 = 0b1000_0000;
const REM_MASK: u8 = 0b0111_1111;

/// Number of bits of a copy opcode that select offset bytes.
const COPY_OFFSET_BYTES: u8 = 4;
/// Number of bits that select size bytes.
const COPY_SIZE_BYTES: u8 = 3;

/// A copy opcode with no size bytes means this many bytes.
const COPY_SIZE_DEFAULT: usize = 0x10000;

/// Applies a delta instruction stream against `base`, producing the
/// deltified object's bytes.
///
/// The stream starts with two varints, the expected base length and the
/// result length, followed by insert opcodes (literal runs taken from the
/// delta itself) and copy opcodes (ranges taken from the base).
///
/// # Errors
///
/// This function will fail if an opcode copies outside the base, the stream
/// ends mid-instruction or the reconstructed length does not match the
/// declared one.
pub fn apply(base: &[u8], delta: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(delta);

    let src_len = read_varint(&mut cursor)?;
    if src_len != base.len() as u64 {
        // Observed in the wild with odd servers; the copy bounds checks
        // below still protect the reconstruction.
        log::warn!(
            "delta declares a base of {} bytes but the base has {}",
            src_len,
            base.len()
        );
    }
    let dst_len = read_varint(&mut cursor)?;

    let mut result = Vec::with_capacity(dst_len as usize);
    let mut opcode = [0u8; 1];
    while (cursor.position() as usize) < delta.len() {
        cursor.read_exact(&mut opcode)?;
        let opcode = opcode[0];

        if opcode & MSB_MASK == 0 {
            // insert: the low seven bits count literal bytes that follow
            if opcode == 0 {
                return Err(Error::delta("insert opcode with length 0 is reserved"));
            }
            let mut literal = vec![0u8; (opcode & REM_MASK) as usize];
            cursor.read_exact(&mut literal).map_err(|_| {
                Error::delta("delta ended in the middle of an insert instruction")
            })?;
            result.extend(literal);
        } else {
            // copy: the opcode selects which offset and size bytes follow
            let offset = read_copy_field(&mut cursor, opcode, 0, COPY_OFFSET_BYTES)?;
            let mut size =
                read_copy_field(&mut cursor, opcode, COPY_OFFSET_BYTES, COPY_SIZE_BYTES)?;
            if size == 0 {
                size = COPY_SIZE_DEFAULT;
            }

            let end = offset
                .checked_add(size)
                .filter(|end| *end <= base.len())
                .ok_or_else(|| {
                    Error::delta(format!(
                        "copy of {} bytes at offset {} is outside the {} byte base",
                        size,
                        offset,
                        base.len()
                    ))
                })?;
            result.extend_from_slice(&base[offset..end]);
        }
    }

    if result.len() as u64 != dst_len {
        return Err(Error::delta(format!(
            "reconstructed {} bytes but the delta declared {}",
            result.len(),
            dst_len
        )));
    }

    Ok(result)
}

/// Reads one little-endian field of a copy instruction. Bit `shift + i` of
/// the opcode says whether byte `i` of the field is present; missing bytes
/// are zero.
fn read_copy_field(
    cursor: &mut Cursor<&[u8]>,
    opcode: u8,
    shift: u8,
    byte_count: u8,
) -> Result<usize> {
    let mut value = 0usize;
    let mut buf = [0u8; 1];
    for i in 0..byte_count {
        if opcode >> (shift + i) & 1 == 1 {
            cursor.read_exact(&mut buf).map_err(|_| {
                Error::delta("delta ended in the middle of a copy instruction")
            })?;
            value |= (buf[0] as usize) << (8 * i);
        }
    }
    Ok(value)
}

/// Reads the size varints at the head of a delta: seven value bits per
/// byte, least significant group first, high bit set while more follow.
pub fn read_varint(cursor: &mut Cursor<&[u8]>) -> Result<u64> {
    let mut value = 0u64;
    let mut buf = [0u8; 1];
    for shift in (0..u64::BITS).step_by(7) {
        cursor
            .read_exact(&mut buf)
            .map_err(|_| Error::delta("delta ended in the middle of a varint"))?;
        value |= ((buf[0] & REM_MASK) as u64) << shift;
        if buf[0] & MSB_MASK == 0 {
            return Ok(value);
        }
    }
    Err(Error::delta("varint does not fit in 64 bits"))
}

// Tests
