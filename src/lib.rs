//! This crate reads telemetry from the Corsair RMi and HXi series of power supplies over their
//! USB HID interface.
//!
//! The PSUs speak a small command/response protocol in fixed 64 byte reports. Measurements come
//! back in the LINEAR11 format and are converted here to integer milli/micro units. Everything is
//! read only.
//!
//! Supported PSU models:
//! * RM650i, RM750i, RM850i, RM1000i
//! * HX650i, HX750i, HX850i, HX1000i, HX1200i
//!
//! The crate does not look for the device itself. Open its HID interface (e.g. a `/dev/hidraw`
//! node), wrap it in something implementing [`embedded_io::Read`] & [`embedded_io::Write`] with a
//! read timeout, and hand it to [`psu::CorsairPsu::attach`].
//!
//! Reported units:
//! * Temperature - millidegrees Celsius
//! * Fan - RPM
//! * Voltage - millivolts
//! * Current - milliamperes
//! * Power - microwatts
//! * Uptime - seconds

pub mod command;
pub mod error;
pub mod frame;
pub mod linear11;
pub mod model;
pub mod protocol;
pub mod psu;
pub mod rail;
pub mod sensor;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_transport;

pub use error::{Error, Result};
pub use psu::CorsairPsu;
pub use sensor::SensorCategory;
pub use types::SensorValue;
