// Compressed-stream cursor.
//
// An immutable byte slice plus a read position that only moves forward.
// Every read is bounds-checked; running off the end is reported as
// `DecodeError::StreamExhausted` with the position of the failed read.

use super::DecodeError;

/// Forward-only reader over a compressed payload.
#[derive(Debug, Clone)]
pub struct CompressedStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CompressedStream<'a> {
    /// Start reading `data` at `start`. A start past the end is allowed;
    /// the first read will fail.
    pub fn new(data: &'a [u8], start: usize) -> Self {
        Self { data, pos: start }
    }

    /// Absolute read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the input.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Read one byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        match self.data.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(self.exhausted(1)),
        }
    }

    /// Borrow the next `len` bytes and advance past them.
    ///
    /// Either all `len` bytes are returned or none are consumed.
    #[inline]
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(self.exhausted(len));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn exhausted(&self, needed: usize) -> DecodeError {
        DecodeError::StreamExhausted {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
