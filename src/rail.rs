//! Output rail selection.
//!
//! Rail voltage, current and power share one opcode each. The PSU answers them
//! for whichever rail was selected last, so a selection has to go out right
//! before every rail scoped reading, inside the same session.

use crate::{
    command::{Address, Opcode},
    error::Result,
    transport::Session,
};
use core::sync::atomic::{AtomicU8, Ordering};
use embedded_io::{Read, Write};
use strum_macros::EnumIter;

/// The regulated output rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum Rail {
    Rail12V = 0,
    Rail5V = 1,
    Rail3V3 = 2,
}

impl From<Rail> for u8 {
    fn from(value: Rail) -> Self {
        value as u8
    }
}

/// The rail the PSU was last told to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RailState {
    /// Nothing selected since attach, or the last selection failed.
    #[default]
    None,
    Rail12V,
    Rail5V,
    Rail3V3,
}

impl From<Rail> for RailState {
    fn from(value: Rail) -> Self {
        match value {
            Rail::Rail12V => RailState::Rail12V,
            Rail::Rail5V => RailState::Rail5V,
            Rail::Rail3V3 => RailState::Rail3V3,
        }
    }
}

impl RailState {
    const fn to_bits(self) -> u8 {
        match self {
            RailState::None => 0,
            RailState::Rail12V => 1,
            RailState::Rail5V => 2,
            RailState::Rail3V3 => 3,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => RailState::Rail12V,
            2 => RailState::Rail5V,
            3 => RailState::Rail3V3,
            _ => RailState::None,
        }
    }
}

/// Issues rail selections and remembers the last one.
///
/// The remembered state is only informational. It is never used to skip a
/// selection, since another host process may have talked to the PSU since.
#[derive(Debug, Default)]
pub struct RailSelector {
    state: AtomicU8,
}

impl RailSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the PSU's rail scoped opcodes at `rail`.
    pub fn select<S: Read + Write>(
        &self,
        session: &mut Session<'_, S>,
        rail: Rail,
    ) -> Result<(), S::Error> {
        let result = session.exchange(
            Address::RAIL_SELECT,
            Opcode::RailSelect.into(),
            rail.into(),
            0,
        );
        let state = match result {
            Ok(_) => RailState::from(rail),
            // Whether the PSU switched is unknown.
            Err(_) => RailState::None,
        };
        self.state.store(state.to_bits(), Ordering::Release);
        result.map(|_| ())
    }

    pub fn state(&self) -> RailState {
        RailState::from_bits(self.state.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::mock_transport::{MockTransport, reply};
    use crate::transport::TransportClient;
    use strum::IntoEnumIterator;

    #[test]
    fn select_sends_rail_code() {
        let mut mock = MockTransport::new();
        for _ in Rail::iter() {
            mock.push_reply(reply(0x00, &[]));
        }
        let client = TransportClient::new(mock);
        let selector = RailSelector::new();
        assert_eq!(selector.state(), RailState::None);

        for rail in Rail::iter() {
            let mut session = client.try_session().unwrap();
            selector.select(&mut session, rail).unwrap();
            assert_eq!(selector.state(), RailState::from(rail));
        }

        let mock = client.into_inner();
        assert_eq!(
            mock.requests(),
            &[
                Frame::command(0x02, 0x00, 0x00),
                Frame::command(0x02, 0x00, 0x01),
                Frame::command(0x02, 0x00, 0x02),
            ]
        );
    }

    #[test]
    fn failed_select_forgets_state() {
        let mut mock = MockTransport::new();
        mock.push_reply(reply(0x00, &[]));
        let client = TransportClient::new(mock);
        let selector = RailSelector::new();

        let mut session = client.try_session().unwrap();
        selector.select(&mut session, Rail::Rail5V).unwrap();
        assert_eq!(selector.state(), RailState::Rail5V);

        // Nothing queued, the next selection times out.
        assert!(selector.select(&mut session, Rail::Rail3V3).is_err());
        assert_eq!(selector.state(), RailState::None);
    }

    #[test]
    fn state_bits_round_trip() {
        for state in [
            RailState::None,
            RailState::Rail12V,
            RailState::Rail5V,
            RailState::Rail3V3,
        ] {
            assert_eq!(RailState::from_bits(state.to_bits()), state);
        }
    }
}
