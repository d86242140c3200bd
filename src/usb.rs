//! Defines for USB, mainly those covered at [usb.org](https://www.usb.org)
//!
//! Class code catalog, BCD version decoding and the protocol dependent power scaling rule
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

pub mod descriptors;
pub mod strings;

pub use descriptors::*;
pub use strings::{sanitize, UsbString};

/// Class code catalog entry; per-interface (0x00) and unknown codes are handled outside the table
struct ClassEntry {
    code: u8,
    mnemonic: &'static str,
    label: &'static str,
}

/// USB class code defines [ref](https://www.usb.org/defined-class-codes)
const CLASS_CATALOG: [ClassEntry; 18] = [
    ClassEntry { code: 0x01, mnemonic: "audio", label: "Audio device" },
    ClassEntry { code: 0x02, mnemonic: "communicating", label: "Communicating device" },
    ClassEntry { code: 0x03, mnemonic: "HID", label: "Human Interface Device" },
    ClassEntry { code: 0x05, mnemonic: "physical", label: "Physical device" },
    ClassEntry { code: 0x06, mnemonic: "image", label: "Imaging device" },
    ClassEntry { code: 0x07, mnemonic: "printer", label: "Printing device" },
    ClassEntry { code: 0x08, mnemonic: "mass_storage", label: "Mass storage device" },
    ClassEntry { code: 0x09, mnemonic: "HUB", label: "HUB device" },
    ClassEntry { code: 0x0a, mnemonic: "data", label: "Data device" },
    ClassEntry { code: 0x0b, mnemonic: "smart_card", label: "Smart Card device" },
    ClassEntry { code: 0x0d, mnemonic: "content_security", label: "Content Security device" },
    ClassEntry { code: 0x0e, mnemonic: "video", label: "Video device" },
    ClassEntry { code: 0x0f, mnemonic: "healthcare", label: "Personal Healthcare device" },
    ClassEntry { code: 0xdc, mnemonic: "diagnostic", label: "Diagnostic device" },
    ClassEntry { code: 0xe0, mnemonic: "wireless", label: "Wireless device" },
    ClassEntry { code: 0xef, mnemonic: "misc.", label: "Miscellaneous device" },
    ClassEntry { code: 0xfe, mnemonic: "application", label: "Application device" },
    ClassEntry { code: 0xff, mnemonic: "vendor", label: "Vendor-Specific device" },
];

/// Class code used when the class is defined by each interface
pub const CLASS_PER_INTERFACE: u8 = 0x00;

/// Result of a [`classify`] lookup: short mnemonic for compact/tree output and label for verbose
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Short mnemonic, "HUB", "mass_storage", "PER/02" or hex of the class for unknown
    pub mnemonic: Cow<'static, str>,
    /// Human label, "HUB device" etc.
    pub label: Cow<'static, str>,
}

/// Lookup `class` (with `sub_class` for the per-interface class) in the static class catalog
///
/// ```
/// use listusb::usb::classify;
///
/// assert_eq!(classify(0x09, 0).mnemonic, "HUB");
/// assert_eq!(classify(0x00, 0x02).mnemonic, "PER/02");
/// assert_eq!(classify(0xf0, 0).mnemonic, "F0");
/// ```
pub fn classify(class: u8, sub_class: u8) -> Classification {
    if class == CLASS_PER_INTERFACE {
        return if sub_class == 0 {
            Classification {
                mnemonic: Cow::Borrowed("none"),
                label: Cow::Borrowed("Defined at interface level"),
            }
        } else {
            Classification {
                mnemonic: Cow::Owned(format!("PER/{:02X}", sub_class)),
                label: Cow::Owned(format!("PER interface {:02X} device", sub_class)),
            }
        };
    }

    match CLASS_CATALOG.iter().find(|e| e.code == class) {
        Some(e) => Classification {
            mnemonic: Cow::Borrowed(e.mnemonic),
            label: Cow::Borrowed(e.label),
        },
        None => Classification {
            mnemonic: Cow::Owned(format!("{:02X}", class)),
            label: Cow::Owned(format!("Unknown {:02X} class type device", class)),
        },
    }
}

/// BCD encoded USB specification release, bcdUSB of the device descriptor
///
/// Major is the whole high byte and minor the upper nibble of the low byte; the low nibble is ignored
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u16);

/// Devices reporting above this release give bMaxPower in 8 mA units rather than 2 mA
pub const SUPERSPEED_POWER_BCD: u16 = 0x0300;

impl Version {
    /// Raw BCD value
    pub fn bcd(&self) -> u16 {
        self.0
    }

    /// Major release from the high byte
    pub fn major(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Minor release from bits 4..7
    pub fn minor(&self) -> u8 {
        ((self.0 & 0x00f0) >> 4) as u8
    }

    /// "M.m" form used in compact output
    pub fn short(&self) -> String {
        format!("{}.{}", self.major(), self.minor())
    }

    /// "USB M.m" form
    pub fn human(&self) -> String {
        format!("USB {}", self.short())
    }

    /// Multiplier applied to bMaxPower for this release
    pub fn power_unit_ma(&self) -> u32 {
        if self.0 > SUPERSPEED_POWER_BCD {
            8
        } else {
            2
        }
    }

    /// Decode into the display string and the numeric value used for power scaling
    pub fn decode(bcd: u16) -> (String, u16) {
        let v = Version(bcd);
        (v.human(), v.bcd())
    }
}

impl From<u16> for Version {
    fn from(bcd: u16) -> Self {
        Version(bcd)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.human())
        } else {
            write!(f, "{}", self.short())
        }
    }
}

/// Scale raw bMaxPower to milliamps according to the release the device reports
///
/// ```
/// use listusb::usb::{scale_max_power, Version};
///
/// assert_eq!(scale_max_power(50, Version(0x0300)), 100);
/// assert_eq!(scale_max_power(50, Version(0x0310)), 400);
/// ```
pub fn scale_max_power(raw: u8, version: Version) -> u32 {
    raw as u32 * version.power_unit_ma()
}

/// Transfer and endpoint directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Direction {
    /// Direction for write (host to device) transfers.
    #[strum(serialize = "OUT")]
    Out,
    /// Direction for read (device to host) transfers.
    #[strum(serialize = "IN")]
    In,
}

impl From<u8> for Direction {
    /// From bEndpointAddress
    fn from(address: u8) -> Self {
        if address & 0x80 != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

/// An endpoint's transfer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransferType {
    /// Control endpoint.
    Control,
    /// Isochronous endpoint.
    Isochronous,
    /// Bulk endpoint.
    Bulk,
    /// Interrupt endpoint.
    Interrupt,
}

impl From<u8> for TransferType {
    /// From bits 0..1 of bmAttributes
    fn from(attributes: u8) -> Self {
        match attributes & 0x03 {
            0 => TransferType::Control,
            1 => TransferType::Isochronous,
            2 => TransferType::Bulk,
            _ => TransferType::Interrupt,
        }
    }
}

impl From<TransferType> for u8 {
    fn from(tt: TransferType) -> u8 {
        match tt {
            TransferType::Control => 0,
            TransferType::Isochronous => 1,
            TransferType::Bulk => 2,
            TransferType::Interrupt => 3,
        }
    }
}
