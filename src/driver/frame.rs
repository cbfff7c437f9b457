//! Response frame capture and fixed-offset decoding

use crate::hardware::{ByteChannel, CommError, CommResult};

/// Little-endian `i32` at `offset`. Panics if `buf` is shorter than `offset + 4`.
pub(crate) fn read_i32_le(buf: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

/// Byte at `offset`. Panics if out of range.
pub(crate) fn read_u8(buf: &[u8], offset: usize) -> u8 {
    buf[offset]
}

/// Fixed-capacity response buffer
///
/// Starts zero-filled. [`fill_from`](Self::fill_from) drains at most `N`
/// bytes; slots that nothing arrived for keep their zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame<const N: usize> {
    bytes: [u8; N],
    received: usize,
}

impl<const N: usize> Default for ResponseFrame<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ResponseFrame<N> {
    pub fn new() -> Self {
        Self {
            bytes: [0u8; N],
            received: 0,
        }
    }

    /// Read bytes while the channel has some and the buffer is not full.
    ///
    /// Surplus bytes stay on the channel. A read error stops the drain; bytes
    /// captured before it are kept.
    pub fn fill_from<C: ByteChannel + ?Sized>(&mut self, channel: &mut C) -> CommResult<()> {
        while self.received < N && channel.bytes_available() > 0 {
            self.bytes[self.received] = channel.read_byte()?;
            self.received += 1;
        }
        Ok(())
    }

    /// Whole buffer, including untouched zero slots
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Only the bytes that actually arrived
    pub fn captured(&self) -> &[u8] {
        &self.bytes[..self.received]
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn is_complete(&self) -> bool {
        self.received == N
    }

    /// Fail unless at least `len` bytes were captured
    pub fn require(&self, len: usize) -> CommResult<()> {
        if self.received < len {
            return Err(CommError::ShortResponse {
                expected: len,
                received: self.received,
            });
        }
        Ok(())
    }
}
