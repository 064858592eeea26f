//! We use this mocking module in unit tests to emulate the PSU's USB interface.

use crate::frame::{FRAME_LEN, Frame};
use std::sync::mpsc;

/// Build a response report echoing `opcode`, with `payload` from offset 2.
pub fn reply(opcode: u8, payload: &[u8]) -> [u8; FRAME_LEN] {
    let mut raw = [0u8; FRAME_LEN];
    raw[0] = 0x03;
    raw[1] = opcode;
    raw[2..2 + payload.len()].copy_from_slice(payload);
    raw
}

/// Our mock type used to emulate the PSU.
///
/// Requests are recorded frame by frame and replies are served in the order they
/// were pushed, one per request.
pub struct MockTransport {
    /// Frames written so far
    requests: heapless::Vec<Frame, 32>,
    /// Bytes of a request not yet completed
    pending: heapless::Vec<u8, FRAME_LEN>,
    /// Pre-configured replies
    replies: heapless::Deque<[u8; FRAME_LEN], 32>,
    /// Reply currently being read and the position within it
    current: Option<([u8; FRAME_LEN], usize)>,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
    /// Parks the first read until released
    gate: Option<GateInner>,
}

#[derive(Debug)]
pub enum MockError {
    /// Generic simulated error for testing
    SimulatedError,
    /// More requests than the mock can record
    BufferOverflow,
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockError::SimulatedError => write!(f, "simulated error"),
            MockError::BufferOverflow => write!(f, "mock buffer overflow"),
        }
    }
}

impl core::error::Error for MockError {}

impl embedded_io::Error for MockError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockError::SimulatedError => embedded_io::ErrorKind::Other,
            MockError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
        }
    }
}

struct GateInner {
    entered: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

/// Test side of a gated mock.
pub struct Gate {
    entered: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl Gate {
    /// Block until an exchange is parked inside the mock.
    pub fn wait_entered(&self) {
        self.entered.recv().unwrap();
    }

    /// Let the parked exchange complete.
    pub fn release(&self) {
        self.release.send(()).unwrap();
    }
}

impl embedded_io::ErrorType for MockTransport {
    type Error = MockError;
}

impl embedded_io::Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockError::SimulatedError);
        }

        for &byte in buf {
            self.pending
                .push(byte)
                .map_err(|_| MockError::BufferOverflow)?;
            if self.pending.len() == FRAME_LEN {
                let mut raw = [0u8; FRAME_LEN];
                raw.copy_from_slice(&self.pending);
                self.pending.clear();
                self.requests
                    .push(Frame::from(raw))
                    .map_err(|_| MockError::BufferOverflow)?;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if let Some(gate) = self.gate.take() {
            gate.entered.send(()).unwrap();
            gate.release.recv().unwrap();
        }

        if self.should_error_on_read {
            return Err(MockError::SimulatedError);
        }

        if self.current.is_none() {
            match self.replies.pop_front() {
                Some(next) => self.current = Some((next, 0)),
                // Nothing queued reads as end of stream, like a transfer that timed out.
                None => return Ok(0),
            }
        }

        let Some((report, position)) = self.current.as_mut() else {
            return Ok(0);
        };
        let count = buf.len().min(FRAME_LEN - *position);
        buf[..count].copy_from_slice(&report[*position..*position + count]);
        *position += count;
        if *position == FRAME_LEN {
            self.current = None;
        }
        Ok(count)
    }
}

impl MockTransport {
    /// Create a new MockTransport with no replies queued
    pub fn new() -> Self {
        Self {
            requests: heapless::Vec::new(),
            pending: heapless::Vec::new(),
            replies: heapless::Deque::new(),
            current: None,
            should_error_on_write: false,
            should_error_on_read: false,
            gate: None,
        }
    }

    /// Create a mock whose first read parks until the returned [`Gate`] releases it.
    pub fn gated() -> (Self, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let mut mock = Self::new();
        mock.gate = Some(GateInner {
            entered: entered_tx,
            release: release_rx,
        });
        (
            mock,
            Gate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    /// Queue a reply for the next request
    pub fn push_reply(&mut self, reply: [u8; FRAME_LEN]) {
        self.replies
            .push_back(reply)
            .expect("too many replies queued");
    }

    /// Get the frames written to this mock so far
    pub fn requests(&self) -> &[Frame] {
        &self.requests
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn test_records_whole_frames() {
        let mut mock = MockTransport::new();
        let frame = Frame::command(0x03, 0x90, 0x00);
        mock.write(&frame.as_bytes()[..10]).unwrap();
        assert!(mock.requests().is_empty());
        mock.write(&frame.as_bytes()[10..]).unwrap();
        assert_eq!(mock.requests(), &[frame]);
    }

    #[test]
    fn test_replies_served_in_order() {
        let mut mock = MockTransport::new();
        mock.push_reply(reply(0x8D, &[1]));
        mock.push_reply(reply(0x8E, &[2]));

        let mut buffer = [0u8; FRAME_LEN];
        mock.read_exact(&mut buffer).unwrap();
        assert_eq!(buffer[1], 0x8D);
        mock.read_exact(&mut buffer).unwrap();
        assert_eq!(buffer[1], 0x8E);
        assert_eq!(mock.read(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_partial_reads() {
        let mut mock = MockTransport::new();
        mock.push_reply(reply(0x99, b"CORSAIR"));

        let mut head = [0u8; 5];
        assert_eq!(mock.read(&mut head).unwrap(), 5);
        assert_eq!(&head, &[0x03, 0x99, b'C', b'O', b'R']);
        let mut rest = [0u8; FRAME_LEN];
        assert_eq!(mock.read(&mut rest).unwrap(), FRAME_LEN - 5);
    }

    #[test]
    fn test_error_flags_toggle() {
        let mut mock = MockTransport::new();
        mock.set_write_error(true);
        assert!(mock.write(b"test").is_err());
        assert!(mock.flush().is_err());
        mock.set_write_error(false);
        assert!(mock.write(b"test").is_ok());

        mock.push_reply(reply(0x8D, &[]));
        let mut buffer = [0u8; FRAME_LEN];
        mock.set_read_error(true);
        assert!(mock.read(&mut buffer).is_err());
        mock.set_read_error(false);
        assert!(mock.read(&mut buffer).is_ok());
    }

    #[test]
    fn test_error_is_a_std_error() {
        fn as_std_error(e: &dyn std::error::Error) -> String {
            e.to_string()
        }
        assert_eq!(as_std_error(&MockError::SimulatedError), "simulated error");
        assert_eq!(
            embedded_io::Error::kind(&MockError::BufferOverflow),
            embedded_io::ErrorKind::OutOfMemory
        );
    }
}
