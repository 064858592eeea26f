//! This module contains the value types reported by the PSU.

use crate::frame::MAX_PAYLOAD;
use strum_macros::EnumIter;

/// Identification strings are at most one response payload long.
pub type SensorText = heapless::String<MAX_PAYLOAD>;

/// A decoded sensor reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorValue {
    /// LINEAR11 measurement already scaled to the sensor's unit.
    Linear(i64),
    /// Little endian counter or flag word, passed through.
    Raw(u32),
    /// Identification string.
    Text(SensorText),
}

impl SensorValue {
    pub fn as_linear(&self) -> Option<i64> {
        match self {
            SensorValue::Linear(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<u32> {
        match self {
            SensorValue::Raw(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SensorValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl core::fmt::Display for SensorValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorValue::Linear(value) => write!(f, "{value}"),
            SensorValue::Raw(value) => write!(f, "{value}"),
            SensorValue::Text(value) => write!(f, "{value}"),
        }
    }
}

/// Over current protection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u32)]
pub enum OcpMode {
    /// All 12V outputs share one current limit.
    SingleRail = 1,
    /// Each 12V output has its own current limit.
    MultiRail = 2,
}

impl TryFrom<u32> for OcpMode {
    type Error = ();
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            v if v == OcpMode::SingleRail as u32 => Ok(OcpMode::SingleRail),
            v if v == OcpMode::MultiRail as u32 => Ok(OcpMode::MultiRail),
            _ => Err(()),
        }
    }
}

/// Who drives the fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u32)]
pub enum FanControlMode {
    /// The PSU's own temperature curve.
    Hardware = 0,
    /// A fixed duty requested over USB.
    Software = 1,
}

impl TryFrom<u32> for FanControlMode {
    type Error = ();
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            v if v == FanControlMode::Hardware as u32 => Ok(FanControlMode::Hardware),
            v if v == FanControlMode::Software as u32 => Ok(FanControlMode::Software),
            _ => Err(()),
        }
    }
}
