//! Normalised device records and the bus grouped tree built from them
use serde::Serialize;
use std::collections::HashMap;

use crate::types::NumericalUnit;
use crate::usb::{
    self, Classification, RawConfigDescriptor, RawEndpointDescriptor, RawInterfaceDescriptor,
    UsbString, Version,
};

/// Endpoint synopsis line of an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSummary {
    /// bEndpointAddress
    pub address: u8,
    /// Direction from the address
    pub direction: usb::Direction,
    /// Transfer type from bmAttributes
    pub transfer_type: usb::TransferType,
    /// wMaxPacketSize
    pub max_packet_size: u16,
    /// bInterval
    pub interval: u8,
}

impl From<&RawEndpointDescriptor> for EndpointSummary {
    fn from(raw: &RawEndpointDescriptor) -> Self {
        EndpointSummary {
            address: raw.address,
            direction: raw.direction(),
            transfer_type: raw.transfer_type(),
            max_packet_size: raw.max_packet_size,
            interval: raw.interval,
        }
    }
}

/// Interface alternate setting synopsis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceSummary {
    /// bInterfaceNumber
    pub number: u8,
    /// bAlternateSetting
    pub alt_setting: u8,
    /// Interface class lookup
    pub class: Classification,
    /// bInterfaceProtocol
    pub protocol: u8,
    /// bDescriptorType of trailing class specific data, if any
    pub extra_type: Option<u8>,
    /// Endpoints
    pub endpoints: Vec<EndpointSummary>,
}

impl From<&RawInterfaceDescriptor> for InterfaceSummary {
    fn from(raw: &RawInterfaceDescriptor) -> Self {
        InterfaceSummary {
            number: raw.number,
            alt_setting: raw.alt_setting,
            class: usb::classify(raw.class_code, raw.sub_class_code),
            protocol: raw.protocol_code,
            extra_type: raw.extra_descriptor_type(),
            endpoints: raw.endpoints.iter().map(EndpointSummary::from).collect(),
        }
    }
}

/// One configuration of a device, or a placeholder at an index whose descriptor could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    /// Index within bNumConfigurations
    pub index: u8,
    /// false when the configuration descriptor was unreadable; other fields are then zeroed
    pub readable: bool,
    /// iConfiguration string
    pub name: UsbString,
    /// bNumInterfaces
    pub num_interfaces: u8,
    /// bConfigurationValue
    pub configuration_value: u8,
    /// bMaxPower scaled for the device release
    pub max_power: NumericalUnit<u32>,
    /// Interface and endpoint synopsis
    pub interfaces: Vec<InterfaceSummary>,
}

impl ConfigSummary {
    /// Build from the raw descriptor; `version` decides the bMaxPower units
    pub fn new(index: u8, raw: &RawConfigDescriptor, version: Version, name: UsbString) -> Self {
        ConfigSummary {
            index,
            readable: true,
            name,
            num_interfaces: raw.num_interfaces,
            configuration_value: raw.configuration_value,
            max_power: NumericalUnit::milliamps(usb::scale_max_power(raw.max_power, version)),
            interfaces: raw.interfaces.iter().map(InterfaceSummary::from).collect(),
        }
    }

    /// Placeholder keeping index alignment with bNumConfigurations
    pub fn unreadable(index: u8) -> Self {
        ConfigSummary {
            index,
            readable: false,
            name: UsbString::absent(),
            num_interfaces: 0,
            configuration_value: 0,
            max_power: NumericalUnit::milliamps(0),
            interfaces: Vec::new(),
        }
    }
}

/// Normalised device, built once by [`crate::profiler::Profiler::build_record`] and only read after
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// idVendor
    pub vendor_id: u16,
    /// idProduct
    pub product_id: u16,
    /// Bus the device is attached to
    pub bus: u8,
    /// Port number on the bus hierarchy, 0 for root hubs
    pub port: u8,
    /// iManufacturer string
    pub manufacturer: UsbString,
    /// iProduct string
    pub product: UsbString,
    /// iSerialNumber string
    pub serial: UsbString,
    /// bDeviceClass
    pub class_code: u8,
    /// bDeviceSubClass
    pub sub_class_code: u8,
    /// Catalog lookup of class and sub-class
    pub class: Classification,
    /// bcdUSB
    pub version: Version,
    /// Configurations in index order
    pub configurations: Vec<ConfigSummary>,
}

impl DeviceRecord {
    /// "VVVV:PPPP" upper-case hex
    pub fn vid_pid(&self) -> String {
        format!("{:04X}:{:04X}", self.vendor_id, self.product_id)
    }
}

/// Devices sharing a bus number, in encounter order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusGroup {
    /// Bus number
    pub bus: u8,
    /// Devices on the bus
    pub devices: Vec<DeviceRecord>,
}

/// Devices grouped under their buses; buses are in the order first seen
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceTree {
    /// Bus groups
    pub buses: Vec<BusGroup>,
}

impl DeviceTree {
    /// Fold `records` into bus groups, keeping first-seen order of buses and of devices within a bus
    pub fn aggregate<I>(records: I) -> DeviceTree
    where
        I: IntoIterator<Item = DeviceRecord>,
    {
        let mut buses: Vec<BusGroup> = Vec::new();
        // bus number -> position in buses
        let mut index: HashMap<u8, usize> = HashMap::new();

        for record in records {
            match index.get(&record.bus) {
                Some(&i) => buses[i].devices.push(record),
                None => {
                    log::trace!("New bus group {}", record.bus);
                    index.insert(record.bus, buses.len());
                    buses.push(BusGroup {
                        bus: record.bus,
                        devices: vec![record],
                    });
                }
            }
        }

        DeviceTree { buses }
    }

    /// Total devices across buses
    pub fn len(&self) -> usize {
        self.buses.iter().map(|b| b.devices.len()).sum()
    }

    /// No devices
    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
    }
}

impl From<Vec<DeviceRecord>> for DeviceTree {
    fn from(records: Vec<DeviceRecord>) -> Self {
        DeviceTree::aggregate(records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(bus: u8, port: u8) -> DeviceRecord {
        DeviceRecord {
            vendor_id: 0x1d6b,
            product_id: port as u16,
            bus,
            port,
            manufacturer: UsbString::absent(),
            product: UsbString::absent(),
            serial: UsbString::absent(),
            class_code: 0x09,
            sub_class_code: 0,
            class: usb::classify(0x09, 0),
            version: Version(0x0200),
            configurations: Vec::new(),
        }
    }

    #[test]
    fn test_aggregate_first_seen_order() {
        let records: Vec<DeviceRecord> = [1, 2, 1, 3, 2]
            .iter()
            .enumerate()
            .map(|(i, b)| record(*b, i as u8))
            .collect();
        let tree = DeviceTree::aggregate(records);

        let order: Vec<u8> = tree.buses.iter().map(|b| b.bus).collect();
        assert_eq!(order, vec![1, 2, 3]);
        let bus1: Vec<u8> = tree.buses[0].devices.iter().map(|d| d.port).collect();
        assert_eq!(bus1, vec![0, 2]);
        let bus2: Vec<u8> = tree.buses[1].devices.iter().map(|d| d.port).collect();
        assert_eq!(bus2, vec![1, 4]);
        assert_eq!(tree.buses[2].devices.len(), 1);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_aggregate_permutations_two_buses() {
        // every interleaving of three devices on bus 4 and two on bus 7
        for mask in 0u8..32 {
            if mask.count_ones() != 3 {
                continue;
            }
            let records: Vec<DeviceRecord> = (0..5)
                .map(|i| record(if mask & (1 << i) != 0 { 4 } else { 7 }, i))
                .collect();
            let first_bus = records[0].bus;
            let expect_4: Vec<u8> = records.iter().filter(|r| r.bus == 4).map(|r| r.port).collect();
            let expect_7: Vec<u8> = records.iter().filter(|r| r.bus == 7).map(|r| r.port).collect();

            let tree = DeviceTree::from(records);
            assert_eq!(tree.buses.len(), 2);
            assert_eq!(tree.buses[0].bus, first_bus);
            for group in tree.buses.iter() {
                let ports: Vec<u8> = group.devices.iter().map(|d| d.port).collect();
                if group.bus == 4 {
                    assert_eq!(ports, expect_4);
                } else {
                    assert_eq!(ports, expect_7);
                }
            }
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let tree = DeviceTree::aggregate(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn test_unreadable_config_placeholder() {
        let c = ConfigSummary::unreadable(3);
        assert_eq!(c.index, 3);
        assert!(!c.readable);
        assert!(c.interfaces.is_empty());
    }

    #[test]
    fn test_config_power_scaled() {
        let raw = RawConfigDescriptor {
            num_interfaces: 1,
            configuration_value: 1,
            max_power: 50,
            ..Default::default()
        };
        let usb3 = ConfigSummary::new(0, &raw, Version(0x0310), UsbString::absent());
        let usb2 = ConfigSummary::new(0, &raw, Version(0x0300), UsbString::absent());
        assert_eq!(usb3.max_power.value, 400);
        assert_eq!(usb2.max_power.value, 100);
    }
}
