//! Raw descriptors as handed over by the USB enumeration backend
//!
//! These mirror the on-wire device, configuration, interface and endpoint descriptors closely enough for
//! [`crate::profiler`] to normalise them. They are also the format of `--from-json` dumps so field names are
//! kept stable.
use serde::{Deserialize, Serialize};

use super::{Direction, TransferType, Version};

/// Device descriptor fields used to build a [`crate::profiler::DeviceRecord`]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDeviceDescriptor {
    /// idVendor
    pub vendor_id: u16,
    /// idProduct
    pub product_id: u16,
    /// bDeviceClass
    pub class_code: u8,
    /// bDeviceSubClass
    pub sub_class_code: u8,
    /// bcdUSB
    pub usb_version: Version,
    /// bNumConfigurations
    pub num_configurations: u8,
    /// iManufacturer, 0 when none
    pub manufacturer_string_index: u8,
    /// iProduct, 0 when none
    pub product_string_index: u8,
    /// iSerialNumber, 0 when none
    pub serial_number_string_index: u8,
}

/// Configuration descriptor for one index of bNumConfigurations
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfigDescriptor {
    /// bNumInterfaces
    pub num_interfaces: u8,
    /// bConfigurationValue
    pub configuration_value: u8,
    /// bMaxPower in 2 mA or 8 mA units depending on bcdUSB
    pub max_power: u8,
    /// iConfiguration, 0 when none
    pub string_index: u8,
    /// Every alternate setting of every interface
    pub interfaces: Vec<RawInterfaceDescriptor>,
}

/// Interface descriptor of one alternate setting
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInterfaceDescriptor {
    /// bInterfaceNumber
    pub number: u8,
    /// bAlternateSetting
    pub alt_setting: u8,
    /// bInterfaceClass
    pub class_code: u8,
    /// bInterfaceSubClass
    pub sub_class_code: u8,
    /// bInterfaceProtocol
    pub protocol_code: u8,
    /// Endpoints of this setting
    pub endpoints: Vec<RawEndpointDescriptor>,
    /// Class specific descriptors following the interface descriptor
    pub extra: Vec<u8>,
}

impl RawInterfaceDescriptor {
    /// bDescriptorType of the first class specific descriptor in `extra`, 0x21 for HID for example
    pub fn extra_descriptor_type(&self) -> Option<u8> {
        self.extra.get(1).copied()
    }
}

/// Endpoint descriptor
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEndpointDescriptor {
    /// bEndpointAddress
    pub address: u8,
    /// bmAttributes
    pub attributes: u8,
    /// wMaxPacketSize
    pub max_packet_size: u16,
    /// bInterval
    pub interval: u8,
}

impl RawEndpointDescriptor {
    /// Direction from bit 7 of the address
    pub fn direction(&self) -> Direction {
        Direction::from(self.address)
    }

    /// Transfer type from bmAttributes
    pub fn transfer_type(&self) -> TransferType {
        TransferType::from(self.attributes)
    }
}
