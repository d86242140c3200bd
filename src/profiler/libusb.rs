//! Uses rusb (upto date libusb fork) to enumerate attached USB devices. Requires 'libusb' feature.
use super::{Profiler, UsbOperations};
use crate::error::{Error, ErrorKind, Result};
use crate::usb::{
    RawConfigDescriptor, RawDeviceDescriptor, RawEndpointDescriptor, RawInterfaceDescriptor,
    Version,
};
use rusb as libusb;
use rusb::UsbContext;
use std::fmt;
use std::mem::MaybeUninit;

/// Profiler over a libusb context; the context is released when this is dropped
pub struct LibUsbProfiler {
    context: libusb::Context,
}

impl fmt::Debug for LibUsbProfiler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LibUsbProfiler(libusb {})", libusb_version())
    }
}

/// Opened device, closed on drop
pub struct UsbDevice<T: libusb::UsbContext> {
    handle: libusb::DeviceHandle<T>,
}

/// Set log level for rusb
pub fn set_log_level(debug: u8) {
    let log_level = match debug {
        0 => rusb::LogLevel::None,
        1 => rusb::LogLevel::Warning,
        2 => rusb::LogLevel::Info,
        _ => rusb::LogLevel::Debug,
    };

    rusb::set_log_level(log_level);
}

/// libusb library version "major.minor.micro"
pub fn libusb_version() -> String {
    let v = libusb::version();
    format!("{}.{}.{}", v.major(), v.minor(), v.micro())
}

impl From<libusb::Error> for Error {
    fn from(error: libusb::Error) -> Self {
        Error {
            kind: ErrorKind::LibUSB,
            message: format!("libusb: Error({})", &error.to_string()),
        }
    }
}

/// bcdUSB exactly as the device reported it, `None` if libusb cannot return the descriptor
fn raw_bcd_usb<T: libusb::UsbContext>(device: &libusb::Device<T>) -> Option<u16> {
    let mut desc = MaybeUninit::<libusb::ffi::libusb_device_descriptor>::uninit();
    // device holds a reference on the libusb_device so the pointer is valid for the call
    let ret =
        unsafe { libusb::ffi::libusb_get_device_descriptor(device.as_raw(), desc.as_mut_ptr()) };

    if ret == libusb::ffi::constants::LIBUSB_SUCCESS {
        // initialised by libusb on success
        Some(unsafe { desc.assume_init() }.bcdUSB)
    } else {
        log::debug!("libusb_get_device_descriptor returned {}", ret);
        None
    }
}

/// Prefer the raw bcdUSB; rusb's [`libusb::Version`] reads the high byte as two decimal digits so cannot hold
/// a non-BCD major such as `0x0A`
fn usb_version(raw: Option<u16>, parsed: libusb::Version) -> Version {
    raw.map_or_else(|| version_to_bcd(parsed), Version)
}

/// rusb splits bcdUSB into decimal digits, put them back into BCD
fn version_to_bcd(v: libusb::Version) -> Version {
    let major = v.major() as u16;
    Version(
        ((major / 10) << 12)
            | ((major % 10) << 8)
            | ((v.minor() as u16 & 0x0f) << 4)
            | (v.sub_minor() as u16 & 0x0f),
    )
}

fn build_endpoints(interface_desc: &libusb::InterfaceDescriptor) -> Vec<RawEndpointDescriptor> {
    interface_desc
        .endpoint_descriptors()
        .map(|endpoint_desc| RawEndpointDescriptor {
            address: endpoint_desc.address(),
            attributes: u8::from(crate::usb::TransferType::from(endpoint_desc.transfer_type())),
            max_packet_size: endpoint_desc.max_packet_size(),
            interval: endpoint_desc.interval(),
        })
        .collect()
}

fn build_interfaces(config_desc: &libusb::ConfigDescriptor) -> Vec<RawInterfaceDescriptor> {
    let mut ret: Vec<RawInterfaceDescriptor> = Vec::new();

    for interface in config_desc.interfaces() {
        for interface_desc in interface.descriptors() {
            ret.push(RawInterfaceDescriptor {
                number: interface_desc.interface_number(),
                alt_setting: interface_desc.setting_number(),
                class_code: interface_desc.class_code(),
                sub_class_code: interface_desc.sub_class_code(),
                protocol_code: interface_desc.protocol_code(),
                endpoints: build_endpoints(&interface_desc),
                extra: interface_desc.extra().to_vec(),
            });
        }
    }

    ret
}

impl From<libusb::TransferType> for crate::usb::TransferType {
    fn from(libusb: libusb::TransferType) -> Self {
        match libusb {
            libusb::TransferType::Control => crate::usb::TransferType::Control,
            libusb::TransferType::Isochronous => crate::usb::TransferType::Isochronous,
            libusb::TransferType::Bulk => crate::usb::TransferType::Bulk,
            libusb::TransferType::Interrupt => crate::usb::TransferType::Interrupt,
        }
    }
}

impl<T: libusb::UsbContext> UsbOperations for UsbDevice<T> {
    fn get_string_descriptor(&self, index: u8) -> Result<Vec<u8>> {
        self.handle
            .read_string_descriptor_ascii(index)
            .map(String::into_bytes)
            .map_err(|e| {
                Error::new(
                    ErrorKind::StringUnavailable,
                    &format!("Failed to read string descriptor {}: {}", index, e),
                )
            })
    }
}

impl LibUsbProfiler {
    /// Create the libusb context used for the whole run
    pub fn new() -> Result<Self> {
        let context = libusb::Context::new().map_err(|e| {
            Error::new(
                ErrorKind::ContextInitFailed,
                &format!("libusb context could not be initialised: {}", e),
            )
        })?;
        log::info!("libusb context created, libusb {}", libusb_version());

        Ok(LibUsbProfiler { context })
    }
}

impl Profiler for LibUsbProfiler {
    type Device = libusb::Device<libusb::Context>;
    type Handle = UsbDevice<libusb::Context>;

    fn devices(&self) -> Result<Vec<Self::Device>> {
        Ok(self.context.devices()?.iter().collect())
    }

    fn device_descriptor(&self, device: &Self::Device) -> Result<RawDeviceDescriptor> {
        let desc = device.device_descriptor()?;

        Ok(RawDeviceDescriptor {
            vendor_id: desc.vendor_id(),
            product_id: desc.product_id(),
            class_code: desc.class_code(),
            sub_class_code: desc.sub_class_code(),
            usb_version: usb_version(raw_bcd_usb(device), desc.usb_version()),
            num_configurations: desc.num_configurations(),
            manufacturer_string_index: desc.manufacturer_string_index().unwrap_or(0),
            product_string_index: desc.product_string_index().unwrap_or(0),
            serial_number_string_index: desc.serial_number_string_index().unwrap_or(0),
        })
    }

    fn config_descriptor(&self, device: &Self::Device, index: u8) -> Result<RawConfigDescriptor> {
        let config_desc = device.config_descriptor(index)?;

        Ok(RawConfigDescriptor {
            num_interfaces: config_desc.num_interfaces(),
            configuration_value: config_desc.number(),
            // rusb has already doubled bMaxPower into mA, undo so scaling follows bcdUSB
            max_power: (config_desc.max_power() / 2) as u8,
            string_index: config_desc.description_string_index().unwrap_or(0),
            interfaces: build_interfaces(&config_desc),
        })
    }

    fn bus_number(&self, device: &Self::Device) -> u8 {
        device.bus_number()
    }

    fn port_number(&self, device: &Self::Device) -> u8 {
        device.port_number()
    }

    fn open(&self, device: &Self::Device) -> Result<Self::Handle> {
        device
            .open()
            .map(|handle| UsbDevice { handle })
            .map_err(|e| Error::new(ErrorKind::OpenDenied, &e.to_string()))
    }
}
