//! The sensors a PSU exposes, described as data.
//!
//! Each sensor is identified by a category and a channel index within that
//! category, the way hardware monitoring front ends number their channels.
//! Supporting another sensor means adding a row to [`SENSORS`].

use crate::{
    command::{Address, Opcode},
    frame::MAX_PAYLOAD,
    linear11,
    rail::Rail,
    types::{SensorText, SensorValue},
};
use strum_macros::{EnumCount, EnumIter};

/// Plain counts, e.g. RPM.
pub const SCALE_UNIT: i64 = 1;
/// Millidegrees Celsius, millivolts, milliamperes.
pub const SCALE_MILLI: i64 = 1_000;
/// Microwatts.
pub const SCALE_MICRO: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum SensorCategory {
    /// Millidegrees Celsius.
    Temperature,
    /// RPM.
    Fan,
    /// Millivolts.
    Voltage,
    /// Milliamperes.
    Current,
    /// Microwatts.
    Power,
    /// Seconds.
    Uptime,
    /// See [`OcpMode`](crate::types::OcpMode).
    OcpMode,
    /// See [`FanControlMode`](crate::types::FanControlMode).
    FanControlMode,
    /// Name, vendor and product strings.
    Identity,
}

/// How a response payload is turned into a [`SensorValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Linear11,
    RawU32,
    Ascii,
}

impl PayloadKind {
    /// Number of payload bytes to take from the response.
    pub const fn width(self) -> usize {
        match self {
            PayloadKind::Linear11 => 2,
            PayloadKind::RawU32 => 4,
            PayloadKind::Ascii => MAX_PAYLOAD,
        }
    }
}

/// Everything needed to read one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub category: SensorCategory,
    pub channel: u8,
    pub label: &'static str,
    pub address: u8,
    pub opcode: Opcode,
    /// Rail to select right before reading, for the shared rail opcodes.
    pub rail: Option<Rail>,
    /// Multiplier applied to LINEAR11 values. Ignored by other kinds.
    pub scale: i64,
    pub kind: PayloadKind,
}

impl SensorDescriptor {
    const fn new(
        category: SensorCategory,
        channel: u8,
        label: &'static str,
        opcode: Opcode,
        scale: i64,
        kind: PayloadKind,
    ) -> Self {
        Self {
            category,
            channel,
            label,
            address: Address::SENSOR,
            opcode,
            rail: None,
            scale,
            kind,
        }
    }

    const fn on_rail(mut self, rail: Rail) -> Self {
        self.rail = Some(rail);
        self
    }

    /// Decode `payload` according to this sensor's kind.
    ///
    /// Returns `None` when the payload is too short, when a scaled value overflows,
    /// or when an identification string holds something other than ASCII.
    pub fn decode(&self, payload: &[u8]) -> Option<SensorValue> {
        match self.kind {
            PayloadKind::Linear11 => {
                let raw = u16::from_le_bytes(payload.get(..2)?.try_into().ok()?);
                Some(SensorValue::Linear(linear11::decode(raw, self.scale)?))
            }
            PayloadKind::RawU32 => {
                let raw = u32::from_le_bytes(payload.get(..4)?.try_into().ok()?);
                Some(SensorValue::Raw(raw))
            }
            PayloadKind::Ascii => {
                // NUL padded.
                let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
                let bytes = &payload[..end];
                if !bytes.is_ascii() {
                    return None;
                }
                let text = core::str::from_utf8(bytes).ok()?;
                Some(SensorValue::Text(SensorText::try_from(text).ok()?))
            }
        }
    }
}

use PayloadKind::{Ascii, Linear11, RawU32};
use SensorCategory as SC;

/// Every sensor of the RMi/HXi PSUs.
#[rustfmt::skip]
pub static SENSORS: [SensorDescriptor; 21] = [
    SensorDescriptor::new(SC::Temperature, 0, "VRM temperature", Opcode::Temperature1, SCALE_MILLI, Linear11),
    SensorDescriptor::new(SC::Temperature, 1, "Case temperature", Opcode::Temperature2, SCALE_MILLI, Linear11),
    SensorDescriptor::new(SC::Fan, 0, "Fan speed", Opcode::FanSpeed, SCALE_UNIT, Linear11),
    SensorDescriptor::new(SC::Voltage, 0, "Supply voltage", Opcode::SupplyVoltage, SCALE_MILLI, Linear11),
    SensorDescriptor::new(SC::Voltage, 1, "12V rail voltage", Opcode::RailVoltage, SCALE_MILLI, Linear11)
        .on_rail(Rail::Rail12V),
    SensorDescriptor::new(SC::Voltage, 2, "5V rail voltage", Opcode::RailVoltage, SCALE_MILLI, Linear11)
        .on_rail(Rail::Rail5V),
    SensorDescriptor::new(SC::Voltage, 3, "3.3V rail voltage", Opcode::RailVoltage, SCALE_MILLI, Linear11)
        .on_rail(Rail::Rail3V3),
    SensorDescriptor::new(SC::Current, 0, "12V rail current", Opcode::RailCurrent, SCALE_MILLI, Linear11)
        .on_rail(Rail::Rail12V),
    SensorDescriptor::new(SC::Current, 1, "5V rail current", Opcode::RailCurrent, SCALE_MILLI, Linear11)
        .on_rail(Rail::Rail5V),
    SensorDescriptor::new(SC::Current, 2, "3.3V rail current", Opcode::RailCurrent, SCALE_MILLI, Linear11)
        .on_rail(Rail::Rail3V3),
    SensorDescriptor::new(SC::Power, 0, "Total power", Opcode::TotalPower, SCALE_MICRO, Linear11),
    SensorDescriptor::new(SC::Power, 1, "12V rail power", Opcode::RailPower, SCALE_MICRO, Linear11)
        .on_rail(Rail::Rail12V),
    SensorDescriptor::new(SC::Power, 2, "5V rail power", Opcode::RailPower, SCALE_MICRO, Linear11)
        .on_rail(Rail::Rail5V),
    SensorDescriptor::new(SC::Power, 3, "3.3V rail power", Opcode::RailPower, SCALE_MICRO, Linear11)
        .on_rail(Rail::Rail3V3),
    SensorDescriptor::new(SC::Uptime, 0, "Total uptime", Opcode::TotalUptime, SCALE_UNIT, RawU32),
    SensorDescriptor::new(SC::Uptime, 1, "Current uptime", Opcode::CurrentUptime, SCALE_UNIT, RawU32),
    SensorDescriptor::new(SC::OcpMode, 0, "OCP mode", Opcode::OcpMode, SCALE_UNIT, RawU32),
    SensorDescriptor::new(SC::FanControlMode, 0, "Fan control mode", Opcode::FanControlMode, SCALE_UNIT, RawU32),
    SensorDescriptor::new(SC::Identity, 0, "Name", Opcode::Name, SCALE_UNIT, Ascii),
    SensorDescriptor::new(SC::Identity, 1, "Vendor", Opcode::Vendor, SCALE_UNIT, Ascii),
    SensorDescriptor::new(SC::Identity, 2, "Product", Opcode::Product, SCALE_UNIT, Ascii),
];

/// Looks sensors up by `(category, channel)`. Never touches the device.
#[derive(Debug, Clone, Copy)]
pub struct SensorRegistry {
    table: &'static [SensorDescriptor],
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self { table: &SENSORS }
    }
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different descriptor table, e.g. for a model with fewer rails.
    pub fn with_table(table: &'static [SensorDescriptor]) -> Self {
        Self { table }
    }

    pub fn descriptor(
        &self,
        category: SensorCategory,
        channel: u8,
    ) -> Option<&'static SensorDescriptor> {
        self.table
            .iter()
            .find(|d| d.category == category && d.channel == channel)
    }

    pub fn label(&self, category: SensorCategory, channel: u8) -> Option<&'static str> {
        self.descriptor(category, channel).map(|d| d.label)
    }

    pub fn iter(&self) -> core::slice::Iter<'static, SensorDescriptor> {
        self.table.iter()
    }

    /// Number of channels of `category`.
    pub fn channels(&self, category: SensorCategory) -> usize {
        self.table.iter().filter(|d| d.category == category).count()
    }
}
