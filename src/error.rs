//! Our error types for the Corsair PSUs.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for Corsair PSU communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    /// Another exchange currently holds the device. Retry on the next poll.
    #[error("Device busy")]
    Busy,
    #[error("USB communication error")]
    Io(I),
    /// The inbound report was missing or shorter than a full frame.
    #[error("Communication timeout")]
    Timeout,
    /// The device echoed the wrong opcode, even after one resynchronisation.
    #[error("Protocol desync: expected opcode {expected:#04x}, received {received:#04x}")]
    ProtocolDesync { expected: u8, received: u8 },
    /// The requested sensor is not part of the descriptor table.
    #[error("Unsupported sensor")]
    Unsupported,
    #[error("Invalid response received")]
    InvalidResponse,
    #[error("Invalid value")]
    InvalidValue,
}

impl<I: embedded_io::Error> Error<I> {
    /// Whether a later attempt at the same read may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Busy | Error::Io(_) | Error::Timeout)
    }
}

impl<I: embedded_io::Error> From<embedded_io::ReadExactError<I>> for Error<I> {
    fn from(err: embedded_io::ReadExactError<I>) -> Self {
        match err {
            embedded_io::ReadExactError::UnexpectedEof => Error::Timeout,
            embedded_io::ReadExactError::Other(e) => Error::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_transport::MockError;

    #[test]
    fn transient_errors_are_worth_retrying() {
        let transient: [Error<MockError>; 3] = [
            Error::Busy,
            Error::Io(MockError::SimulatedError),
            Error::Timeout,
        ];
        for e in &transient {
            assert!(e.is_transient(), "{e:?}");
        }

        let terminal: [Error<MockError>; 4] = [
            Error::ProtocolDesync {
                expected: 0x8D,
                received: 0x8E,
            },
            Error::Unsupported,
            Error::InvalidResponse,
            Error::InvalidValue,
        ];
        for e in &terminal {
            assert!(!e.is_transient(), "{e:?}");
        }
    }

    #[test]
    fn short_read_is_timeout() {
        let e: Error<MockError> = embedded_io::ReadExactError::UnexpectedEof.into();
        assert!(matches!(e, Error::Timeout));
        let e: Error<MockError> =
            embedded_io::ReadExactError::Other(MockError::SimulatedError).into();
        assert!(matches!(e, Error::Io(MockError::SimulatedError)));
    }
}
