use std::io::{Read, Write};

use flate2::bufread::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::{Error, Result};

/// Compresses `bytes` using a zlib encoder.
///
/// # Errors
///
/// This function will fail if the `ZlibEncoder` fails.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Returns `bytes` decompressed, using a zlib decoder.
///
/// # Errors
///
/// This function will fail if reading from the bytes was not possible.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut decoder = ZlibDecoder::new(bytes);
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Decompresses exactly one zlib stream from the start of `bytes`, returning
/// the inflated data together with the number of compressed bytes consumed.
///
/// A deflate stream carries its own end marker, so the decoder stops there
/// and `total_in` tells where the next record starts. The caller resumes
/// reading at that position.
///
/// # Errors
///
/// This function will fail if the stream is truncated or not valid zlib data.
pub fn decompress_prefix(bytes: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut decoder = ZlibDecoder::new(bytes);
    decoder
        .read_to_end(&mut buf)
        .map_err(|e| Error::pack(format!("could not inflate object data: {}", e)))?;
    let consumed = decoder.total_in() as usize;
    Ok((buf, consumed))
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_round_trip() {
        let data = b"some data to compress, long enough to actually deflate";
        let compressed = compress(data).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(data.as_ref(), decompressed.as_slice());
    }

    #[test]
    fn test_decompress_prefix_reports_consumed_bytes() {
        let mut stream = compress(b"first").unwrap();
        let first_len = stream.len();
        stream.extend(compress(b"second").unwrap());

        let (data, consumed) = decompress_prefix(&stream).unwrap();
        assert_eq!(b"first".as_ref(), data.as_slice());
        assert_eq!(first_len, consumed);

        let (data, consumed) = decompress_prefix(&stream[first_len..]).unwrap();
        assert_eq!(b"second".as_ref(), data.as_slice());
        assert_eq!(stream.len() - first_len, consumed);
    }

    #[test]
    fn test_decompress_prefix_rejects_garbage() {
        assert!(decompress_prefix(b"definitely not zlib").is_err());
    }
}
