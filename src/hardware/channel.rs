//! Byte channel capability the driver is handed

use crate::hardware::CommResult;

/// Duplex byte stream to the module.
///
/// The caller opens the link and sets the line rate (115200 8N1 for the
/// DWM1001 UART API) before handing it to a driver. The driver only writes
/// bytes and drains what is available; it never configures or closes it.
pub trait ByteChannel {
    /// Write one byte
    fn write_byte(&mut self, byte: u8) -> CommResult<()>;

    /// Number of bytes that can be read right now without blocking
    fn bytes_available(&mut self) -> usize;

    /// Read one byte. Only called after `bytes_available` reported data.
    fn read_byte(&mut self) -> CommResult<u8>;

    /// Write a whole frame, byte by byte
    fn write_all(&mut self, bytes: &[u8]) -> CommResult<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn write_byte(&mut self, byte: u8) -> CommResult<()> {
        (**self).write_byte(byte)
    }

    fn bytes_available(&mut self) -> usize {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> CommResult<u8> {
        (**self).read_byte()
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for Box<C> {
    fn write_byte(&mut self, byte: u8) -> CommResult<()> {
        (**self).write_byte(byte)
    }

    fn bytes_available(&mut self) -> usize {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> CommResult<u8> {
        (**self).read_byte()
    }
}
