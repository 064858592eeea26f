//! This module is used to define the commands understood by the Corsair PSUs.
//!
//! Every command is a single opcode byte sent to one of a few addresses. Sensor
//! readings live at [`Address::SENSOR`], and rail scoped readings report on the
//! rail last chosen through [`Address::RAIL_SELECT`].

/// Address (class selector) byte placed at offset 0 of every frame.
pub struct Address;

impl Address {
    /// Used by the greeting and the desync recovery handshake.
    pub const HANDSHAKE: u8 = 0xFE;
    /// Selects which output rail the rail scoped opcodes report on.
    pub const RAIL_SELECT: u8 = 0x02;
    /// All telemetry and identification opcodes.
    pub const SENSOR: u8 = 0x03;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// __W__ - Select output rail.
    ///
    /// Sent to [`Address::RAIL_SELECT`] with opdata `0` (12V), `1` (5V) or `2` (3.3V).
    RailSelect = 0x00,
    /// __R__ - Supply (input) voltage. LINEAR11, volts.
    SupplyVoltage = 0x88,
    /// __R__ - Voltage of the selected rail. LINEAR11, volts.
    RailVoltage = 0x8B,
    /// __R__ - Current of the selected rail. LINEAR11, amperes.
    RailCurrent = 0x8C,
    /// __R__ - First temperature sensor. LINEAR11, degrees Celsius.
    Temperature1 = 0x8D,
    /// __R__ - Second temperature sensor. LINEAR11, degrees Celsius.
    Temperature2 = 0x8E,
    /// __R__ - Fan speed. LINEAR11, RPM.
    FanSpeed = 0x90,
    /// __R__ - Output power of the selected rail. LINEAR11, watts.
    RailPower = 0x96,
    /// __R__ - Vendor string. ASCII.
    Vendor = 0x99,
    /// __R__ - Product string. ASCII.
    Product = 0x9A,
    /// __R__ - Total uptime. u32, seconds.
    TotalUptime = 0xD1,
    /// __R__ - Uptime since power on. u32, seconds.
    CurrentUptime = 0xD2,
    /// __R__ - Over current protection mode.
    ///
    /// See [`OcpMode`](crate::types::OcpMode).
    OcpMode = 0xD8,
    /// __R__ - Total output power. LINEAR11, watts.
    TotalPower = 0xEE,
    /// __R__ - Fan control mode.
    ///
    /// See [`FanControlMode`](crate::types::FanControlMode).
    FanControlMode = 0xF0,
    /// __R__ - Device name. ASCII.
    Name = 0xFE,
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        value as u8
    }
}

/// Opcode of the greeting exchange at [`Address::HANDSHAKE`], also used to
/// resynchronise the device after a desync. Its opdata is always `0x00`.
pub const HANDSHAKE_OPCODE: u8 = 0x03;
