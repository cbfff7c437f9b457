//! Scripted in-memory channel for testing and development

use crate::hardware::{ByteChannel, CommError, CommResult};
use std::collections::{HashMap, VecDeque};
use std::io;

/// Mock module link
///
/// Responses are scripted per opcode: once a complete two byte command frame
/// has been written, the scripted reply for its opcode is queued for reading.
/// Everything written is recorded for later inspection.
#[derive(Debug, Default)]
pub struct MockChannel {
    tx_buffer: Vec<u8>,
    rx_buffer: VecDeque<u8>,
    responses: HashMap<u8, Vec<u8>>,
    pending_opcode: Option<u8>,
    fail_writes: bool,
    fail_reads: bool,
    disconnected: bool,
}

impl MockChannel {
    /// Create a new mock channel with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply sent after every frame carrying `opcode`
    pub fn set_response(&mut self, opcode: u8, response: &[u8]) {
        self.responses.insert(opcode, response.to_vec());
    }

    /// Builder form of [`set_response`](Self::set_response)
    pub fn with_response(mut self, opcode: u8, response: &[u8]) -> Self {
        self.set_response(opcode, response);
        self
    }

    /// Queue bytes as if they were already sitting in the receive buffer
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.extend(data.iter().copied());
    }

    /// Bytes still waiting to be read
    pub fn pending_rx(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Everything written so far
    pub fn tx_buffer(&self) -> &[u8] {
        &self.tx_buffer
    }

    /// Written bytes grouped into two byte command frames
    pub fn sent_frames(&self) -> Vec<[u8; 2]> {
        self.tx_buffer
            .chunks_exact(2)
            .map(|frame| [frame[0], frame[1]])
            .collect()
    }

    /// Make every write fail with a broken pipe
    pub fn fail_writes(&mut self, enable: bool) {
        self.fail_writes = enable;
    }

    /// Make every read fail, even while data is reported available
    pub fn fail_reads(&mut self, enable: bool) {
        self.fail_reads = enable;
    }

    /// Simulate a pulled cable: writes fail and nothing is ever available
    pub fn disconnect(&mut self) {
        self.disconnected = true;
        self.rx_buffer.clear();
    }

    /// Restore the link
    pub fn reconnect(&mut self) {
        self.disconnected = false;
    }

    fn broken_pipe(message: &str) -> CommError {
        CommError::Io {
            kind: io::ErrorKind::BrokenPipe,
            message: message.to_string(),
        }
    }
}

impl ByteChannel for MockChannel {
    fn write_byte(&mut self, byte: u8) -> CommResult<()> {
        if self.disconnected || self.fail_writes {
            return Err(Self::broken_pipe("simulated write failure"));
        }

        self.tx_buffer.push(byte);

        match self.pending_opcode.take() {
            Some(opcode) => {
                if let Some(response) = self.responses.get(&opcode) {
                    self.rx_buffer.extend(response.iter().copied());
                }
            }
            None => self.pending_opcode = Some(byte),
        }

        Ok(())
    }

    fn bytes_available(&mut self) -> usize {
        if self.disconnected {
            0
        } else {
            self.rx_buffer.len()
        }
    }

    fn read_byte(&mut self) -> CommResult<u8> {
        if self.disconnected || self.fail_reads {
            return Err(Self::broken_pipe("simulated read failure"));
        }

        self.rx_buffer.pop_front().ok_or_else(|| CommError::Io {
            kind: io::ErrorKind::UnexpectedEof,
            message: "receive buffer empty".to_string(),
        })
    }
}
