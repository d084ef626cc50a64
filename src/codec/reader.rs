// ABOUTME: Bounds-checked cursor over a PDU buffer built on bytes::Buf
// ABOUTME: Running out of data is reported as a structural PDU error naming the field being read

use super::{CodecError, PduInvalidityReason};
use bytes::Buf;
use std::io::Cursor;

pub struct PduReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> PduReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.cursor.chunk().first().copied()
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        self.ensure(1, field)?;
        Ok(self.cursor.get_u8())
    }

    /// Borrow the next `count` octets
    pub fn read_bytes(&mut self, count: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        self.ensure(count, field)?;
        let start = self.cursor.position() as usize;
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.advance(count);
        Ok(&data[start..start + count])
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        self.ensure(N, field)?;
        let mut array = [0u8; N];
        self.cursor.copy_to_slice(&mut array);
        Ok(array)
    }

    fn ensure(&self, count: usize, field: &'static str) -> Result<(), CodecError> {
        let remaining = self.remaining();
        if remaining < count {
            return Err(CodecError::invalid(
                PduInvalidityReason::ShorterThanExpected,
                format!("{field} needs {count} octets, {remaining} remaining"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_order() {
        let data = [0x07, 0x91, 0x58, 0x92, 0x00];
        let mut reader = PduReader::new(&data);
        assert_eq!(reader.read_u8("length").unwrap(), 0x07);
        assert_eq!(reader.read_bytes(2, "digits").unwrap(), &[0x91, 0x58]);
        assert_eq!(reader.peek_u8(), Some(0x92));
        assert_eq!(reader.read_array::<2>("rest").unwrap(), [0x92, 0x00]);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.peek_u8(), None);
    }

    #[test]
    fn test_end_of_buffer() {
        let data = [0x01, 0x02];
        let mut reader = PduReader::new(&data);
        let err = reader.read_bytes(3, "user data").unwrap_err();
        assert!(err.is_invalid(PduInvalidityReason::ShorterThanExpected));
        assert!(err.to_string().contains("user data needs 3 octets, 2 remaining"));

        // A failed read consumes nothing
        assert_eq!(reader.remaining(), 2);
    }
}
