use std::io::Read;

use crate::{Error, Result};

/// Length of the hexadecimal size prefix on every packet line.
const PREFIX_LEN: usize = 4;

/// A single frame of git's pkt-line transport.
#[derive(Debug, PartialEq, Eq)]
pub enum PktLine {
    /// The `0000` marker, carrying no payload.
    Flush,
    Data(Vec<u8>),
}

impl PktLine {
    /// Returns the payload of a data line, or an error for a flush marker.
    pub fn data(self) -> Result<Vec<u8>> {
        match self {
            PktLine::Data(data) => Ok(data),
            PktLine::Flush => Err(Error::protocol("expected a data packet line, got a flush")),
        }
    }
}

/// Frames `payload` as a packet line: a four character lowercase hex length
/// (including the prefix itself) followed by the payload.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut line = format!("{:04x}", payload.len() + PREFIX_LEN).into_bytes();
    line.extend_from_slice(payload);
    line
}

/// The `0000` flush marker.
pub fn flush() -> Vec<u8> {
    b"0000".to_vec()
}

/// Reads one packet line from `reader`.
///
/// # Errors
///
/// A short read of the prefix, a prefix that is not hexadecimal and a short
/// read of the declared payload are all fatal protocol errors.
pub fn read<R: Read>(reader: &mut R) -> Result<PktLine> {
    let mut prefix = [0u8; PREFIX_LEN];
    reader
        .read_exact(&mut prefix)
        .map_err(|_| Error::protocol("stream ended while reading a packet line length"))?;

    let prefix_str = std::str::from_utf8(&prefix)
        .map_err(|_| Error::protocol("packet line length was not valid text"))?;
    let length = usize::from_str_radix(prefix_str, 16)
        .map_err(|_| Error::protocol(format!("packet line length {:?} is not hex", prefix_str)))?;

    if length == 0 {
        return Ok(PktLine::Flush);
    }
    if length < PREFIX_LEN {
        return Err(Error::protocol(format!(
            "packet line declared an impossible length {}",
            length
        )));
    }

    let mut payload = vec![0u8; length - PREFIX_LEN];
    reader.read_exact(&mut payload).map_err(|_| {
        Error::protocol(format!(
            "stream ended before the {} declared payload bytes",
            length - PREFIX_LEN
        ))
    })?;

    Ok(PktLine::Data(payload))
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode() {
        assert_eq!(b"0008done".to_vec(), encode(b"done"));
        assert_eq!(b"0004".to_vec(), encode(b""));
    }

    #[test]
    fn test_encode_read_round_trip() {
        let payload = b"want 0000000000000000000000000000000000000000 no-progress\n";
        let mut cursor = Cursor::new(encode(payload));
        assert_eq!(
            PktLine::Data(payload.to_vec()),
            read(&mut cursor).unwrap()
        );
    }

    #[test]
    fn test_read_flush() {
        let mut cursor = Cursor::new(b"0000".to_vec());
        assert_eq!(PktLine::Flush, read(&mut cursor).unwrap());
    }

    #[test]
    fn test_read_sequence() {
        let mut stream = encode(b"# service=git-upload-pack\n");
        stream.extend(flush());
        stream.extend(encode(b"hello"));
        let mut cursor = Cursor::new(stream);

        assert_eq!(
            PktLine::Data(b"# service=git-upload-pack\n".to_vec()),
            read(&mut cursor).unwrap()
        );
        assert_eq!(PktLine::Flush, read(&mut cursor).unwrap());
        assert_eq!(PktLine::Data(b"hello".to_vec()), read(&mut cursor).unwrap());
    }

    #[test]
    fn test_read_short_prefix() {
        let mut cursor = Cursor::new(b"00".to_vec());
        assert!(read(&mut cursor).is_err());
    }

    #[test]
    fn test_read_non_hex_prefix() {
        let mut cursor = Cursor::new(b"zzzzpayload".to_vec());
        assert!(read(&mut cursor).is_err());
    }

    #[test]
    fn test_read_short_payload() {
        // declares 8 bytes of payload but carries 3
        let mut cursor = Cursor::new(b"000cabc".to_vec());
        assert!(read(&mut cursor).is_err());
    }

    #[test]
    fn test_read_length_below_prefix() {
        let mut cursor = Cursor::new(b"0002xx".to_vec());
        assert!(read(&mut cursor).is_err());
    }
}
