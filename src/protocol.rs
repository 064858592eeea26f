//! Command/response exchanges with opcode echo checking and desync recovery.
//!
//! Every valid response echoes the requested opcode at offset 1. When it does
//! not, the PSU has fallen out of step with us. It is brought back by one
//! handshake exchange, after which the original request is repeated exactly
//! once. A second mismatch is reported as [`Error::ProtocolDesync`].

use crate::{
    command::{Address, HANDSHAKE_OPCODE},
    error::{Error, Result},
    frame::{Frame, MAX_PAYLOAD},
    transport::Session,
};
use embedded_io::{Read, Write};
use log::{debug, warn};

/// Payload bytes returned from an exchange.
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD>;

impl<S: Read + Write> Session<'_, S> {
    /// Send `(address, opcode, opdata)` and return `width` payload bytes of the reply.
    ///
    /// Transport errors are returned as they are. Takes one round trip when the
    /// device is in step, three when it had to be resynchronised.
    pub fn exchange(
        &mut self,
        address: u8,
        opcode: u8,
        opdata: u8,
        width: usize,
    ) -> Result<Payload, S::Error> {
        let request = Frame::command(address, opcode, opdata);

        let response = self.send_recv(&request)?;
        if response.opcode() == opcode {
            return Ok(payload(&response, width));
        }

        warn!(
            "desync on opcode {opcode:#04x}: device echoed {:#04x}, resynchronising",
            response.opcode()
        );
        self.handshake()?;

        let response = self.send_recv(&request)?;
        if response.opcode() != opcode {
            return Err(Error::ProtocolDesync {
                expected: opcode,
                received: response.opcode(),
            });
        }
        debug!("opcode {opcode:#04x} back in step after handshake");
        Ok(payload(&response, width))
    }

    /// Greeting exchange. Sent once on attach and used to resynchronise.
    ///
    /// Its payload is discarded, but its echo must match.
    pub fn handshake(&mut self) -> Result<(), S::Error> {
        let request = Frame::command(Address::HANDSHAKE, HANDSHAKE_OPCODE, 0x00);
        let response = self.send_recv(&request)?;
        if response.opcode() != HANDSHAKE_OPCODE {
            return Err(Error::ProtocolDesync {
                expected: HANDSHAKE_OPCODE,
                received: response.opcode(),
            });
        }
        Ok(())
    }
}

fn payload(response: &Frame, width: usize) -> Payload {
    // Frame::payload never yields more than MAX_PAYLOAD bytes.
    Payload::from_slice(response.payload(width)).unwrap_or_default()
}
