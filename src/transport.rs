//! Serialised request/response exchange with the PSU.
//!
//! The PSU answers one report at a time, so the interface sits behind a lock.
//! The lock is never waited on: a caller that finds it held gets
//! [`Error::Busy`] straight away and is expected to try again on its next poll.

use crate::{
    error::{Error, Result},
    frame::{FRAME_LEN, Frame},
};
use embedded_io::{Read, Write};
use log::trace;
use parking_lot::{Mutex, MutexGuard};

/// Owns the interface to one physical PSU.
///
/// The interface is expected to bound every transfer with its own timeout, in the
/// same way a serial port is opened with a read timeout.
pub struct TransportClient<S: Read + Write> {
    interface: Mutex<S>,
}

impl<S: Read + Write> TransportClient<S> {
    pub fn new(interface: S) -> Self {
        Self {
            interface: Mutex::new(interface),
        }
    }

    /// Exchange a single frame.
    ///
    /// The lock is released before returning, on success and on error alike.
    pub fn send_recv(&self, request: &Frame) -> Result<Frame, S::Error> {
        self.try_session()?.send_recv(request)
    }

    /// Take the lock for a run of exchanges that must not interleave with other
    /// callers, such as a rail selection followed by the rail reading.
    pub fn try_session(&self) -> Result<Session<'_, S>, S::Error> {
        let interface = self.interface.try_lock().ok_or(Error::Busy)?;
        Ok(Session { interface })
    }

    /// Give the interface back, e.g. on detach.
    pub fn into_inner(self) -> S {
        self.interface.into_inner()
    }

    #[cfg(test)]
    pub(crate) fn interface(&self) -> MutexGuard<'_, S> {
        self.interface.lock()
    }
}

/// Exclusive access to the interface. Dropping it releases the lock.
pub struct Session<'a, S: Read + Write> {
    interface: MutexGuard<'a, S>,
}

impl<S: Read + Write> Session<'_, S> {
    /// Send one frame and read back one response frame.
    pub fn send_recv(&mut self, request: &Frame) -> Result<Frame, S::Error> {
        trace!("tx {request:?}");
        self.interface
            .write_all(request.as_bytes())
            .map_err(Error::Io)?;
        self.interface.flush().map_err(Error::Io)?;

        // Fresh buffer per exchange.
        let mut response = [0u8; FRAME_LEN];
        self.interface.read_exact(&mut response)?;
        let response = Frame::from(response);
        trace!("rx {response:?}");
        Ok(response)
    }
}
