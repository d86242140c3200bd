//! System USB profiler for getting attached devices as normalised [`DeviceRecord`]s
//!
//! Enumeration itself is done by a [`Profiler`] backend: [`libusb`] for live devices (feature `libusb`) or
//! [`dump`] for a JSON descriptor dump. The backend only hands over raw descriptors and string bytes, the
//! provided methods of [`Profiler`] turn them into records.
//!
//! ```no_run
//! use listusb::profiler::{self, Profiler};
//!
//! let records = profiler::libusb::LibUsbProfiler::new().unwrap().get_records().unwrap();
//! let tree = profiler::DeviceTree::aggregate(records);
//! for bus in tree.buses {
//!     println!("Bus {} : {} devices", bus.bus, bus.devices.len());
//! }
//! ```
use std::fmt::Debug;

use crate::error::{Error, ErrorKind, Result};
use crate::usb::{self, RawConfigDescriptor, RawDeviceDescriptor, UsbString};

// separate module but import all
pub mod types;
pub use types::*;

pub mod dump;
#[cfg(feature = "libusb")]
pub mod libusb;

/// Operations on an opened device required by the [`Profiler`]
pub trait UsbOperations {
    /// Read string descriptor `index` as raw bytes
    fn get_string_descriptor(&self, index: u8) -> Result<Vec<u8>>;
}

/// USB enumeration backend
///
/// An opened [`Profiler::Handle`] is released when dropped, so it only lives within [`Profiler::build_record`].
pub trait Profiler
where
    Self: Debug,
{
    /// Enumerated device reference
    type Device: Debug;
    /// Opened device
    type Handle: UsbOperations;

    /// Devices currently attached
    fn devices(&self) -> Result<Vec<Self::Device>>;

    /// Device descriptor of `device`
    fn device_descriptor(&self, device: &Self::Device) -> Result<RawDeviceDescriptor>;

    /// Configuration descriptor at `index` of `device`
    fn config_descriptor(&self, device: &Self::Device, index: u8) -> Result<RawConfigDescriptor>;

    /// Bus the device is attached to
    fn bus_number(&self, device: &Self::Device) -> u8;

    /// Port number of the device on its bus
    fn port_number(&self, device: &Self::Device) -> u8;

    /// Open the device for string descriptor reads
    fn open(&self, device: &Self::Device) -> Result<Self::Handle>;

    /// Read string descriptor `index` through `handle`; absent when unopened, index 0 or read fails
    fn get_string(&self, handle: Option<&Self::Handle>, index: u8) -> UsbString {
        // index 0 is reserved for the language table
        if index == 0 {
            return UsbString::absent();
        }

        match handle.map(|h| h.get_string_descriptor(index)) {
            Some(Ok(raw)) => UsbString::from_raw(&raw),
            Some(Err(e)) => {
                log::debug!("String descriptor {} unavailable: {}", index, e);
                UsbString::absent()
            }
            None => UsbString::absent(),
        }
    }

    /// Builds a [`DeviceRecord`] from `device`
    ///
    /// Only an unreadable device descriptor is an error ([`ErrorKind::DescriptorUnavailable`]). Failing to open
    /// the device leaves strings absent and an unreadable configuration leaves a placeholder at its index.
    fn build_record(&self, device: &Self::Device) -> Result<DeviceRecord> {
        let desc = self.device_descriptor(device).map_err(|e| {
            Error::new(
                ErrorKind::DescriptorUnavailable,
                &format!("Failed to read device descriptor of {:?}: {:#}", device, e),
            )
        })?;
        let bus = self.bus_number(device);
        let port = self.port_number(device);

        let handle = match self.open(device) {
            Ok(h) => Some(h),
            Err(e) => {
                log::warn!(
                    "Failed to open bus {} port {} [{:04X}:{:04X}], strings will be missing: {}",
                    bus,
                    port,
                    desc.vendor_id,
                    desc.product_id,
                    e
                );
                None
            }
        };

        let version = desc.usb_version;
        let configurations = (0..desc.num_configurations)
            .map(|n| match self.config_descriptor(device, n) {
                Ok(config) => {
                    let name = self.get_string(handle.as_ref(), config.string_index);
                    ConfigSummary::new(n, &config, version, name)
                }
                Err(e) => {
                    log::warn!(
                        "{}",
                        Error::new(
                            ErrorKind::ConfigUnavailable,
                            &format!("bus {} port {} config[{}]: {:#}", bus, port, n, e),
                        )
                    );
                    ConfigSummary::unreadable(n)
                }
            })
            .collect();

        let record = DeviceRecord {
            vendor_id: desc.vendor_id,
            product_id: desc.product_id,
            bus,
            port,
            manufacturer: self.get_string(handle.as_ref(), desc.manufacturer_string_index),
            product: self.get_string(handle.as_ref(), desc.product_string_index),
            serial: self.get_string(handle.as_ref(), desc.serial_number_string_index),
            class_code: desc.class_code,
            sub_class_code: desc.sub_class_code,
            class: usb::classify(desc.class_code, desc.sub_class_code),
            version,
            configurations,
        };
        // handle drops here, closing the device
        drop(handle);

        log::debug!(
            "Built record bus {} port {} [{}] {}",
            record.bus,
            record.port,
            record.vid_pid(),
            record.product
        );
        log::trace!("{:?}", record);
        Ok(record)
    }

    /// Build records for every attached device, in enumeration order
    ///
    /// Devices whose descriptor cannot be read are skipped; only failing to enumerate at all is an error.
    fn get_records(&self) -> Result<Vec<DeviceRecord>> {
        let devices = self.devices()?;
        log::info!("Profiling {} devices with {:?}", devices.len(), self);

        let mut records = Vec::with_capacity(devices.len());
        for device in devices.iter() {
            match self.build_record(device) {
                Ok(r) => records.push(r),
                Err(e) => log::warn!("Skipping device: {}", e),
            }
        }

        Ok(records)
    }
}
