//! Utilities for decoding values from received radio frames.
//!
//! Control-plane frames are small and fixed-size, so the only machinery needed here is
//! [`ByteReader`], which wraps a `&[u8]` and hands out little-endian scalars until the buffer is
//! exhausted. Outgoing frames have fully static layouts and are assembled in place by
//! [`link::wire`].
//!
//! [`ByteReader`]: struct.ByteReader.html
//! [`link::wire`]: ../link/wire/index.html

use byteorder::{ByteOrder, LittleEndian};

use crate::Error;

/// Allows reading values from a borrowed byte slice.
pub struct ByteReader<'a>(&'a [u8]);

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` that will read from the given byte slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteReader(bytes)
    }

    /// Returns the number of bytes that have not yet been read.
    pub fn bytes_left(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the entire input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Skips the given number of bytes in the input data without inspecting them.
    pub fn skip(&mut self, bytes: usize) -> Result<(), Error> {
        if self.bytes_left() < bytes {
            Err(Error::Eof)
        } else {
            self.0 = &self.0[bytes..];
            Ok(())
        }
    }

    /// Reads the next `len` bytes and advances past them.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.bytes_left() < len {
            Err(Error::Eof)
        } else {
            let (head, tail) = self.0.split_at(len);
            self.0 = tail;
            Ok(head)
        }
    }

    /// Reads a single byte.
    ///
    /// Returns `Error::Eof` when no byte is left in the input.
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let slice = self.read_slice(1)?;
        Ok(slice[0])
    }

    /// Reads a `u16` stored in Little Endian byte order.
    pub fn read_u16_le(&mut self) -> Result<u16, Error> {
        let slice = self.read_slice(2)?;
        Ok(LittleEndian::read_u16(slice))
    }

    /// Reads a 24-bit value stored in Little Endian byte order, widening it to a `u32`.
    pub fn read_u24_le(&mut self) -> Result<u32, Error> {
        let slice = self.read_slice(3)?;
        Ok(LittleEndian::read_u24(slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_scalars_in_order() {
        let mut r = ByteReader::new(&[0x01, 0x34, 0x12, 0x42, 0xDE, 0xC0, 0xFF]);
        assert_eq!(r.read_u8(), Ok(0x01));
        assert_eq!(r.read_u16_le(), Ok(0x1234));
        assert_eq!(r.read_u24_le(), Ok(0x00C0_DE42));
        assert_eq!(r.bytes_left(), 1);
        assert_eq!(r.skip(1), Ok(()));
        assert!(r.is_empty());
    }

    #[test]
    fn eof_leaves_input_untouched() {
        let mut r = ByteReader::new(&[0xAA]);
        assert_eq!(r.read_u16_le(), Err(Error::Eof));
        assert_eq!(r.read_u8(), Ok(0xAA));
        assert_eq!(r.read_u8(), Err(Error::Eof));
    }
}
