use std::env;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use corsair_psu::{
    model::{PsuModel, VENDOR_ID},
    psu::CorsairPsu,
};
use inquire::Select;

// The PSU answers within a few milliseconds, anything longer means the report was lost.
const REPORT_TIMEOUT_MS: u64 = 500;
const REPORT_LEN: usize = 64;

/// A hidraw node as an [embedded_io] interface.
///
/// Reports are read on a background thread so every read can be bounded by a timeout.
pub struct HidrawWrapper {
    file: File,
    reports: Receiver<std::io::Result<[u8; REPORT_LEN]>>,
    current: Option<([u8; REPORT_LEN], usize)>,
}

impl HidrawWrapper {
    fn open(path: &str) -> std::io::Result<Self> {
        let file = fs::OpenOptions::new().read(true).write(true).open(path)?;
        let mut reader = file.try_clone()?;
        let (tx, reports) = mpsc::channel();
        std::thread::spawn(move || {
            loop {
                let mut report = [0u8; REPORT_LEN];
                let result = reader.read(&mut report).map(|_| report);
                let failed = result.is_err();
                if tx.send(result).is_err() || failed {
                    break;
                }
            }
        });
        Ok(Self {
            file,
            reports,
            current: None,
        })
    }
}

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for HidrawWrapper {
    type Error = IoError;
}

impl embedded_io::Read for HidrawWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.current.is_none() {
            let report = match self
                .reports
                .recv_timeout(Duration::from_millis(REPORT_TIMEOUT_MS))
            {
                Ok(report) => report.map_err(IoError)?,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(IoError(std::io::ErrorKind::TimedOut.into()));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(IoError(std::io::ErrorKind::BrokenPipe.into()));
                }
            };
            self.current = Some((report, 0));
        }

        let Some((report, position)) = self.current.as_mut() else {
            return Ok(0);
        };
        let count = buf.len().min(REPORT_LEN - *position);
        buf[..count].copy_from_slice(&report[*position..*position + count]);
        *position += count;
        if *position == REPORT_LEN {
            self.current = None;
        }
        Ok(count)
    }
}

impl embedded_io::Write for HidrawWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        // A report that arrived after its read timed out answers an older request.
        self.current = None;
        while self.reports.try_recv().is_ok() {}

        // hidraw wants the report number first, 0 for devices without numbered reports.
        let mut report = [0u8; REPORT_LEN + 1];
        let count = buf.len().min(REPORT_LEN);
        report[1..=count].copy_from_slice(&buf[..count]);
        self.file.write_all(&report).map_err(IoError)?;
        Ok(count)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.file.flush().map_err(IoError)
    }
}

/// Vendor and product id of a hidraw node, from sysfs.
fn hid_ids(node: &str) -> Option<(u16, u16)> {
    let uevent = fs::read_to_string(format!("/sys/class/hidraw/{node}/device/uevent")).ok()?;
    parse_hid_id(&uevent)
}

fn parse_hid_id(uevent: &str) -> Option<(u16, u16)> {
    // HID_ID=0003:00001B1C:00001C0A
    let id = uevent.lines().find_map(|line| line.strip_prefix("HID_ID="))?;
    let mut parts = id.split(':').skip(1);
    let vendor = u16::from_str_radix(parts.next()?, 16).ok()?;
    let product = u16::from_str_radix(parts.next()?, 16).ok()?;
    Some((vendor, product))
}

fn main() {
    env_logger::init();

    // Get hidraw node from command line arg or interactive selection
    let path = env::args().nth(1).unwrap_or_else(|| {
        let mut nodes: Vec<String> = fs::read_dir("/sys/class/hidraw")
            .expect("Failed to list hidraw devices")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        nodes.sort();

        let choices: Vec<String> = nodes
            .iter()
            .map(|node| match hid_ids(node) {
                Some((VENDOR_ID, product)) => match PsuModel::from_product_id(product) {
                    Some(model) => format!("/dev/{node} ({})", model.name()),
                    None => format!("/dev/{node} (Corsair {product:04x})"),
                },
                Some((vendor, product)) => format!("/dev/{node} ({vendor:04x}:{product:04x})"),
                None => format!("/dev/{node}"),
            })
            .collect();

        if choices.is_empty() {
            eprintln!("No hidraw devices found!");
            std::process::exit(1);
        }

        let choice = Select::new("Select a PSU:", choices)
            .prompt()
            .expect("Failed to select device");
        choice
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    println!("Using device: {}", path);

    let interface = HidrawWrapper::open(&path).expect("Failed to open hidraw device");
    let psu = CorsairPsu::attach(interface);

    for (category, channel, label) in psu.sensors() {
        match psu.read(category, channel) {
            Ok(value) => println!("{label:>20}: {value}"),
            Err(e) => println!("{label:>20}: error: {e}"),
        }
    }

    if let Ok(uptime) = psu.read_total_uptime() {
        println!("Total uptime: {} h", uptime.to_hours());
    }
    if let Ok(mode) = psu.read_ocp_mode() {
        println!("OCP mode: {mode:?}");
    }
}
