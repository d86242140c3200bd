//! Colouring of listusb output
use colored::*;

use crate::display::Block;

/// Colours [`Block`] fields; only field values are styled, never separators or labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColourTheme {
    /// Colour to use for bus number
    pub bus: Option<Color>,
    /// Colour to use for port number
    pub port: Option<Color>,
    /// Colour to use for Vendor ID:Product ID
    pub vid_pid: Option<Color>,
    /// Colour to use for manufacturer from descriptor
    pub manufacturer: Option<Color>,
    /// Colour to use for product name from descriptor
    pub product: Option<Color>,
    /// Colour to use for serial from descriptor
    pub serial: Option<Color>,
    /// Colour to use for class mnemonic or label
    pub class_code: Option<Color>,
    /// Colour to use for bcdUSB
    pub version: Option<Color>,
    /// Colour to use for power information
    pub power: Option<Color>,
    /// Colour to use for configuration, interface and endpoint details
    pub detail: Option<Color>,
}

impl Default for ColourTheme {
    fn default() -> Self {
        ColourTheme::new()
    }
}

impl ColourTheme {
    /// New theme with defaults
    pub fn new() -> Self {
        ColourTheme {
            bus: Some(Color::Cyan),
            port: Some(Color::Magenta),
            vid_pid: Some(Color::Yellow),
            manufacturer: Some(Color::Blue),
            product: Some(Color::Blue),
            serial: Some(Color::Green),
            class_code: Some(Color::BrightYellow),
            version: Some(Color::Magenta),
            power: Some(Color::Red),
            detail: Some(Color::BrightBlack),
        }
    }

    /// Style `s` as a `block` value
    pub fn colour(&self, block: Block, s: &str) -> ColoredString {
        let (colour, bold) = match block {
            Block::BusNumber => (self.bus, false),
            Block::PortNumber => (self.port, false),
            Block::VidPid => (self.vid_pid, true),
            Block::Manufacturer => (self.manufacturer, false),
            Block::Product => (self.product, true),
            Block::Serial => (self.serial, false),
            Block::Class => (self.class_code, false),
            Block::Version => (self.version, false),
            Block::Power => (self.power, false),
            Block::Detail => (self.detail, false),
        };

        let cs = match colour {
            Some(c) => s.color(c),
            None => s.normal(),
        };

        if bold {
            cs.bold()
        } else {
            cs
        }
    }
}
