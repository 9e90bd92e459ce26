use std::io::BufRead;
use std::io::Cursor;

use crate::{Error, Result};

pub trait EasyRead {
    fn read_until_checked(&mut self, byte: u8) -> Result<Vec<u8>>;
}

impl<T: AsRef<[u8]>> EasyRead for Cursor<T> {
    /// Reads up to and including `byte`, returning the bytes before it.
    ///
    /// Object payloads use single-byte terminators everywhere (the space
    /// after a type name, the null after a length or a tree entry name), so
    /// this is the one parsing primitive the decoders share. Not finding the
    /// terminator means the object is truncated.
    fn read_until_checked(&mut self, byte: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        BufRead::read_until(self, byte, &mut buf)?;
        if buf.pop() != Some(byte) {
            return Err(Error::corrupted(format!(
                "expected byte {:#04x} before the data ended",
                byte
            )));
        }
        Ok(buf)
    }
}

// Tests
