//! Profiler over a JSON dump of raw descriptors, for `--from-json` and offline reports
//!
//! ```json
//! { "devices": [
//!   { "bus": 1, "port": 2,
//!     "descriptor": { "vendor_id": 1133, "product_id": 49948, "usb_version": 272, "num_configurations": 1,
//!                     "manufacturer_string_index": 1, "product_string_index": 2 },
//!     "strings": { "1": "Logitech", "2": "USB Keyboard" },
//!     "configurations": [ { "num_interfaces": 1, "configuration_value": 1, "max_power": 50 } ] }
//! ] }
//! ```
//!
//! A `null` descriptor or configuration reads as unavailable and `"can_open": false` fails the open.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

use super::{Profiler, UsbOperations};
use crate::error::{Error, ErrorKind, Result};
use crate::usb::{RawConfigDescriptor, RawDeviceDescriptor};

fn default_can_open() -> bool {
    true
}

/// One enumerated device of a dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpDevice {
    /// Bus number
    pub bus: u8,
    /// Port number
    #[serde(default)]
    pub port: u8,
    /// Device descriptor; `None` simulates an unreadable descriptor
    #[serde(default)]
    pub descriptor: Option<RawDeviceDescriptor>,
    /// Whether the device can be opened for string reads
    #[serde(default = "default_can_open")]
    pub can_open: bool,
    /// String descriptors by index
    #[serde(default)]
    pub strings: BTreeMap<u8, String>,
    /// Configuration descriptors by index; `None` simulates an unreadable configuration
    #[serde(default)]
    pub configurations: Vec<Option<RawConfigDescriptor>>,
}

/// Dump "opened" for string reads
#[derive(Debug)]
pub struct DumpHandle {
    strings: BTreeMap<u8, String>,
}

impl UsbOperations for DumpHandle {
    fn get_string_descriptor(&self, index: u8) -> Result<Vec<u8>> {
        self.strings
            .get(&index)
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::StringUnavailable,
                    &format!("String index {} not in dump", index),
                )
            })
    }
}

/// Profiler reading devices from a JSON dump
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpProfiler {
    /// Devices in enumeration order
    pub devices: Vec<DumpDevice>,
}

impl DumpProfiler {
    /// Read dump from `file_path`
    pub fn from_file(file_path: &str) -> Result<DumpProfiler> {
        let data = fs::read_to_string(file_path).map_err(|e| {
            Error::new(
                ErrorKind::Io,
                &format!("Failed to read dump '{}': {}", file_path, e),
            )
        })?;
        DumpProfiler::from_json(&data)
    }

    /// Parse dump from a JSON string
    pub fn from_json(data: &str) -> Result<DumpProfiler> {
        Ok(serde_json::from_str::<DumpProfiler>(data)?)
    }
}

impl Profiler for DumpProfiler {
    type Device = DumpDevice;
    type Handle = DumpHandle;

    fn devices(&self) -> Result<Vec<DumpDevice>> {
        Ok(self.devices.clone())
    }

    fn device_descriptor(&self, device: &DumpDevice) -> Result<RawDeviceDescriptor> {
        device.descriptor.clone().ok_or_else(|| {
            Error::new(
                ErrorKind::DescriptorUnavailable,
                "Device descriptor missing from dump",
            )
        })
    }

    fn config_descriptor(&self, device: &DumpDevice, index: u8) -> Result<RawConfigDescriptor> {
        device
            .configurations
            .get(index as usize)
            .cloned()
            .flatten()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ConfigUnavailable,
                    &format!("Configuration {} missing from dump", index),
                )
            })
    }

    fn bus_number(&self, device: &DumpDevice) -> u8 {
        device.bus
    }

    fn port_number(&self, device: &DumpDevice) -> u8 {
        device.port
    }

    fn open(&self, device: &DumpDevice) -> Result<DumpHandle> {
        if device.can_open {
            Ok(DumpHandle {
                strings: device.strings.clone(),
            })
        } else {
            Err(Error::new(ErrorKind::OpenDenied, "Access denied (insufficient permissions)"))
        }
    }
}
