use crate::{
    error::{Error, Result},
    rail::{RailSelector, RailState},
    sensor::{SensorCategory, SensorDescriptor, SensorRegistry},
    transport::TransportClient,
    types::{FanControlMode, OcpMode, SensorText, SensorValue},
};
use embedded_io::{Read, Write};
use fugit::Duration;
use log::{debug, warn};

/// You can create a CorsairPsu using any interface which implements [embedded_io::Read] &
/// [embedded_io::Write], where one 64 byte write is one outbound report and 64 bytes read back
/// are one inbound report.
///
/// All reads take `&self`, so a PSU can be shared between pollers behind an `Arc`. Only one
/// read talks to the device at a time. Others get [`Error::Busy`] and should try again on
/// their next poll.
pub struct CorsairPsu<S: Read + Write> {
    transport: TransportClient<S>,
    rails: RailSelector,
    registry: SensorRegistry,
}

impl<S: Read + Write> CorsairPsu<S> {
    /// Wrap the interface without talking to the device.
    pub fn new(interface: S) -> Self {
        Self::with_registry(interface, SensorRegistry::new())
    }

    /// Wrap the interface, using a custom sensor table.
    pub fn with_registry(interface: S, registry: SensorRegistry) -> Self {
        Self {
            transport: TransportClient::new(interface),
            rails: RailSelector::new(),
            registry,
        }
    }

    /// Wrap the interface and greet the device.
    ///
    /// The PSU expects a greeting once it is plugged in. A failed greeting is
    /// logged, the device usually still answers afterwards.
    pub fn attach(interface: S) -> Self {
        let psu = Self::new(interface);
        match psu.transport.try_session().and_then(|mut session| session.handshake()) {
            Ok(()) => debug!("PSU greeted"),
            Err(e) => warn!("PSU greeting failed: {e}"),
        }
        psu
    }

    /// Give back the interface.
    pub fn detach(self) -> S {
        self.transport.into_inner()
    }

    /// Every sensor this PSU can be asked for, with its label.
    pub fn sensors(&self) -> impl Iterator<Item = (SensorCategory, u8, &'static str)> + use<S> {
        self.registry.iter().map(|d| (d.category, d.channel, d.label))
    }

    pub fn label(&self, category: SensorCategory, channel: u8) -> Option<&'static str> {
        self.registry.label(category, channel)
    }

    /// The rail most recently selected. Informational only.
    pub fn rail_state(&self) -> RailState {
        self.rails.state()
    }

    /// Read one sensor.
    ///
    /// Unknown sensors fail with [`Error::Unsupported`] before any I/O. Rail scoped sensors
    /// select their rail first, in the same locked session as the reading itself.
    pub fn read(&self, category: SensorCategory, channel: u8) -> Result<SensorValue, S::Error> {
        let descriptor = self
            .registry
            .descriptor(category, channel)
            .ok_or(Error::Unsupported)?;
        self.read_descriptor(descriptor)
    }

    fn read_descriptor(&self, descriptor: &SensorDescriptor) -> Result<SensorValue, S::Error> {
        let payload = {
            let mut session = self.transport.try_session()?;
            if let Some(rail) = descriptor.rail {
                self.rails.select(&mut session, rail)?;
            }
            session.exchange(
                descriptor.address,
                descriptor.opcode.into(),
                0x00,
                descriptor.kind.width(),
            )?
        };

        let value = descriptor.decode(&payload).ok_or(Error::InvalidResponse)?;
        debug!("{}: {value}", descriptor.label);
        Ok(value)
    }

    fn read_linear(&self, category: SensorCategory, channel: u8) -> Result<i64, S::Error> {
        self.read(category, channel)?
            .as_linear()
            .ok_or(Error::InvalidResponse)
    }

    fn read_raw(&self, category: SensorCategory, channel: u8) -> Result<u32, S::Error> {
        self.read(category, channel)?
            .as_raw()
            .ok_or(Error::InvalidResponse)
    }

    fn read_text(&self, channel: u8) -> Result<SensorText, S::Error> {
        match self.read(SensorCategory::Identity, channel)? {
            SensorValue::Text(text) => Ok(text),
            _ => Err(Error::InvalidResponse),
        }
    }

    /// Return a temperature in millidegrees Celsius. Channel 0 is the VRM, 1 the case.
    pub fn read_temperature_mdegc(&self, channel: u8) -> Result<i64, S::Error> {
        self.read_linear(SensorCategory::Temperature, channel)
    }

    /// Return the fan speed in RPM.
    pub fn read_fan_rpm(&self) -> Result<i64, S::Error> {
        self.read_linear(SensorCategory::Fan, 0)
    }

    /// Return a voltage in millivolts.
    ///
    /// Channel 0 is the supply, 1 to 3 are the 12V, 5V and 3.3V rails.
    pub fn read_voltage_mv(&self, channel: u8) -> Result<i64, S::Error> {
        self.read_linear(SensorCategory::Voltage, channel)
    }

    /// Return a rail current in milliamperes. Channels 0 to 2 are the 12V, 5V and 3.3V rails.
    pub fn read_current_ma(&self, channel: u8) -> Result<i64, S::Error> {
        self.read_linear(SensorCategory::Current, channel)
    }

    /// Return a power in microwatts.
    ///
    /// Channel 0 is the total output, 1 to 3 are the 12V, 5V and 3.3V rails.
    pub fn read_power_uw(&self, channel: u8) -> Result<i64, S::Error> {
        self.read_linear(SensorCategory::Power, channel)
    }

    /// Return how long the PSU has been powered over its whole life.
    pub fn read_total_uptime(&self) -> Result<Duration<u32, 1, 1>, S::Error> {
        let secs = self.read_raw(SensorCategory::Uptime, 0)?;
        Ok(Duration::<u32, 1, 1>::secs(secs))
    }

    /// Return how long the PSU has been powered since it was last switched on.
    pub fn read_current_uptime(&self) -> Result<Duration<u32, 1, 1>, S::Error> {
        let secs = self.read_raw(SensorCategory::Uptime, 1)?;
        Ok(Duration::<u32, 1, 1>::secs(secs))
    }

    pub fn read_ocp_mode(&self) -> Result<OcpMode, S::Error> {
        let value = self.read_raw(SensorCategory::OcpMode, 0)?;
        OcpMode::try_from(value).map_err(|_| Error::InvalidValue)
    }

    pub fn read_fan_control_mode(&self) -> Result<FanControlMode, S::Error> {
        let value = self.read_raw(SensorCategory::FanControlMode, 0)?;
        FanControlMode::try_from(value).map_err(|_| Error::InvalidValue)
    }

    pub fn read_name(&self) -> Result<SensorText, S::Error> {
        self.read_text(0)
    }

    pub fn read_vendor(&self) -> Result<SensorText, S::Error> {
        self.read_text(1)
    }

    pub fn read_product(&self) -> Result<SensorText, S::Error> {
        self.read_text(2)
    }
}
