//! Adapter from a `std::io` stream to a [`ByteChannel`]
//!
//! Works with any already-opened serial device (a tty file, a serial port
//! handle, a TCP bridge to a UART) as long as reads do not block forever:
//! open it non-blocking or give it a short read timeout.

use crate::hardware::{ByteChannel, CommError, CommResult};
use log::{trace, warn};
use std::collections::VecDeque;
use std::io::{self, Read, Write};

const READ_CHUNK: usize = 64;

/// Byte channel over a caller-owned `Read + Write` stream
pub struct StreamChannel<S> {
    stream: S,
    read_buffer: VecDeque<u8>,
    // Poll failure waiting to be handed to the next `read_byte`
    pending_error: Option<io::Error>,
}

impl<S: Read + Write> StreamChannel<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            read_buffer: VecDeque::with_capacity(READ_CHUNK),
            pending_error: None,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Pull whatever the stream has ready into the local buffer
    fn poll_stream(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(n) => {
                    self.read_buffer.extend(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<S: Read + Write> ByteChannel for StreamChannel<S> {
    fn write_byte(&mut self, byte: u8) -> CommResult<()> {
        self.stream.write_all(&[byte])?;
        self.stream.flush()?;
        Ok(())
    }

    /// A hard read failure counts as one available "byte" so the caller's
    /// next `read_byte` picks up the error.
    fn bytes_available(&mut self) -> usize {
        if self.read_buffer.is_empty() && self.pending_error.is_none() {
            match self.poll_stream() {
                Ok(n) => trace!("pulled {} bytes from stream", n),
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
                Err(e) => {
                    warn!("stream read failed: {}", e);
                    self.pending_error = Some(e);
                }
            }
        }

        if self.pending_error.is_some() {
            self.read_buffer.len().max(1)
        } else {
            self.read_buffer.len()
        }
    }

    fn read_byte(&mut self) -> CommResult<u8> {
        if let Some(e) = self.pending_error.take() {
            return Err(e.into());
        }
        if self.read_buffer.is_empty() {
            self.poll_stream()?;
        }

        self.read_buffer.pop_front().ok_or_else(|| CommError::Io {
            kind: io::ErrorKind::UnexpectedEof,
            message: "stream has no data".to_string(),
        })
    }
}
