//! Rendering of [`DeviceRecord`]s: verbose, compact, reference table and bus tree
//!
//! Renderers only read records and write to the passed writer. Colour is a wrapping layer applied per
//! [`Block`] value so stripping the escapes gives the uncoloured output byte for byte.
use itertools::Itertools;
use std::io::{self, Write};

use crate::colour::ColourTheme;
use crate::profiler::{ConfigSummary, DeviceRecord, DeviceTree, InterfaceSummary};

/// Placeholder for absent values in compact, reference table and tree output
pub const PLACEHOLDER: &str = "-";
/// Verbose placeholder for an absent manufacturer
pub const NO_MANUFACTURER: &str = "(no manufacturer)";
/// Verbose placeholder for an absent product
pub const NO_PRODUCT: &str = "(no product name)";
/// Verbose placeholder for an absent serial number
pub const NO_SERIAL: &str = "(SN not found)";

/// Header of the reference table, same field order and delimiter as the compact rows
pub const REFERENCE_HEADER: &str =
    "bus;port;[vid:pid];manufacturer;product;serial;class;version;power;";

/// Semantic fields of a record that get styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Block {
    /// Bus number
    BusNumber,
    /// Port number
    PortNumber,
    /// VVVV:PPPP
    VidPid,
    /// Manufacturer string
    Manufacturer,
    /// Product string
    Product,
    /// Serial number string
    Serial,
    /// Class mnemonic or label
    Class,
    /// bcdUSB
    Version,
    /// Configuration power
    Power,
    /// Configuration, interface and endpoint details
    Detail,
}

/// Mode selected from the command line; [`RenderConfig::render_mode`] refines it into a [`RenderMode`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Labelled multi-line blocks
    #[default]
    Verbose,
    /// Delimited single line per device
    Compact,
    /// Devices grouped under buses
    Tree,
}

impl DisplayMode {
    /// Tree takes precedence over simple
    pub fn select(simple: bool, tree: bool) -> Self {
        if tree {
            DisplayMode::Tree
        } else if simple {
            DisplayMode::Compact
        } else {
            DisplayMode::Verbose
        }
    }
}

/// Concrete renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RenderMode {
    /// Labelled multi-line blocks
    Verbose,
    /// Delimited single line per device
    Compact,
    /// Compact with a header naming the fields
    ReferenceTable,
    /// Devices grouped under buses
    Tree,
}

/// Options for a render pass, built once from the command line
#[derive(Debug, Default, Clone)]
pub struct RenderConfig {
    /// Compact output requested
    pub simple: bool,
    /// Style output with ANSI colours
    pub colour: bool,
    /// Reference table header; only applies to compact
    pub reftable: bool,
    /// Hide interface and endpoint lines in verbose
    pub lessinfo: bool,
    /// Selected mode
    pub mode: DisplayMode,
    /// Palette used when `colour`
    pub theme: ColourTheme,
}

impl RenderConfig {
    /// Build from command line flags; `tree` overrides `simple`
    pub fn new(simple: bool, reftable: bool, colour: bool, lessinfo: bool, tree: bool) -> Self {
        RenderConfig {
            simple,
            colour,
            reftable,
            lessinfo,
            mode: DisplayMode::select(simple, tree),
            theme: ColourTheme::new(),
        }
    }

    /// Renderer for this config
    pub fn render_mode(&self) -> RenderMode {
        match self.mode {
            DisplayMode::Verbose => RenderMode::Verbose,
            DisplayMode::Compact if self.reftable => RenderMode::ReferenceTable,
            DisplayMode::Compact => RenderMode::Compact,
            DisplayMode::Tree => RenderMode::Tree,
        }
    }

    /// `s` styled as `block` when colour is enabled, otherwise unchanged
    pub fn paint(&self, block: Block, s: &str) -> String {
        if self.colour {
            self.theme.colour(block, s).to_string()
        } else {
            s.to_string()
        }
    }
}

impl RenderMode {
    /// Render `records` to `w`
    pub fn render<W: Write>(
        &self,
        records: &[DeviceRecord],
        settings: &RenderConfig,
        w: &mut W,
    ) -> io::Result<()> {
        log::debug!("Rendering {} records as {}", records.len(), self);
        match self {
            RenderMode::Verbose => print_verbose(records, settings, w),
            RenderMode::Compact => print_compact(records, settings, w),
            RenderMode::ReferenceTable => {
                writeln!(w, "{}", REFERENCE_HEADER)?;
                print_compact(records, settings, w)
            }
            RenderMode::Tree => print_tree(&DeviceTree::aggregate(records.to_vec()), settings, w),
        }
    }

    /// Render `records` into a String
    pub fn render_to_string(&self, records: &[DeviceRecord], settings: &RenderConfig) -> String {
        let mut buf: Vec<u8> = Vec::new();
        // writing to a Vec cannot fail
        let _ = self.render(records, settings, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn format_power(config: &ConfigSummary) -> String {
    if config.readable {
        format!("{:#}", config.max_power)
    } else {
        String::from("?")
    }
}

/// Compact fields of `d` in [`REFERENCE_HEADER`] order
pub fn compact_fields(d: &DeviceRecord, settings: &RenderConfig) -> Vec<String> {
    let power = if d.configurations.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        d.configurations.iter().map(format_power).join(",")
    };

    vec![
        settings.paint(Block::BusNumber, &d.bus.to_string()),
        settings.paint(Block::PortNumber, &d.port.to_string()),
        format!("[{}]", settings.paint(Block::VidPid, &d.vid_pid())),
        settings.paint(Block::Manufacturer, d.manufacturer.or(PLACEHOLDER)),
        settings.paint(Block::Product, d.product.or(PLACEHOLDER)),
        settings.paint(Block::Serial, d.serial.or(PLACEHOLDER)),
        settings.paint(Block::Class, &d.class.mnemonic),
        settings.paint(Block::Version, &d.version.short()),
        settings.paint(Block::Power, &power),
    ]
}

/// One `;` terminated line per device
pub fn print_compact<W: Write>(
    records: &[DeviceRecord],
    settings: &RenderConfig,
    w: &mut W,
) -> io::Result<()> {
    for d in records {
        let line: String = compact_fields(d, settings)
            .iter()
            .map(|f| format!("{};", f))
            .collect();
        writeln!(w, "{}", line)?;
    }

    Ok(())
}

fn print_interface<W: Write>(
    interface: &InterfaceSummary,
    settings: &RenderConfig,
    w: &mut W,
) -> io::Result<()> {
    let extra = interface
        .extra_type
        .map_or(String::new(), |t| format!(", extra = 0x{:02X}", t));
    writeln!(
        w,
        "        - interface[{:2}] alt {} : {}, endpoints = {}{}",
        interface.number,
        interface.alt_setting,
        settings.paint(Block::Class, &interface.class.mnemonic),
        interface.endpoints.len(),
        extra
    )?;

    for ep in interface.endpoints.iter() {
        writeln!(
            w,
            "            * endpoint {} {} {}, max packet = {}, interval = {}",
            settings.paint(Block::Detail, &format!("0x{:02X}", ep.address)),
            ep.direction,
            ep.transfer_type,
            ep.max_packet_size,
            ep.interval
        )?;
    }

    Ok(())
}

fn print_config<W: Write>(
    config: &ConfigSummary,
    settings: &RenderConfig,
    w: &mut W,
) -> io::Result<()> {
    if !config.readable {
        return writeln!(
            w,
            "    + config[{:2}] : (unreadable configuration descriptor)",
            config.index
        );
    }

    let name = config.name.value().map_or(String::new(), |n| {
        format!(" : {}", settings.paint(Block::Detail, n))
    });
    writeln!(
        w,
        "    + config[{:2}]{}, interfaces = {}, ID = 0x{:02X}, max required power = {}",
        config.index,
        name,
        config.num_interfaces,
        config.configuration_value,
        settings.paint(Block::Power, &config.max_power.to_string())
    )?;

    if !settings.lessinfo {
        for interface in config.interfaces.iter() {
            print_interface(interface, settings, w)?;
        }
    }

    Ok(())
}

/// Labelled block per device followed by the device count
///
/// The count is of `records` so devices skipped for an unreadable descriptor are not included.
pub fn print_verbose<W: Write>(
    records: &[DeviceRecord],
    settings: &RenderConfig,
    w: &mut W,
) -> io::Result<()> {
    for d in records {
        writeln!(
            w,
            "Device VID:PID [{}] {}, {}",
            settings.paint(Block::VidPid, &d.vid_pid()),
            settings.paint(Block::Manufacturer, d.manufacturer.or(NO_MANUFACTURER)),
            settings.paint(Block::Product, d.product.or(NO_PRODUCT)),
        )?;
        writeln!(
            w,
            "    + Location = bus {}, port {}",
            settings.paint(Block::BusNumber, &d.bus.to_string()),
            settings.paint(Block::PortNumber, &d.port.to_string()),
        )?;
        match d.serial.value() {
            Some(s) => writeln!(
                w,
                "    + Serial number = {}",
                settings.paint(Block::Serial, s)
            )?,
            None => writeln!(w, "    + {}", settings.paint(Block::Serial, NO_SERIAL))?,
        }
        writeln!(
            w,
            "    + Class = {}",
            settings.paint(Block::Class, &d.class.label)
        )?;
        writeln!(
            w,
            "    + bcdID = {:04X}, human readable = {}",
            d.version.bcd(),
            settings.paint(Block::Version, &d.version.human())
        )?;

        for config in d.configurations.iter() {
            print_config(config, settings, w)?;
        }
    }

    if !records.is_empty() {
        writeln!(w, "total {} devices found.", records.len())?;
    }

    Ok(())
}

/// Bus header then one indented line per device on that bus
pub fn print_tree<W: Write>(
    tree: &DeviceTree,
    settings: &RenderConfig,
    w: &mut W,
) -> io::Result<()> {
    for bus in tree.buses.iter() {
        writeln!(
            w,
            "Bus {} : {} devices",
            settings.paint(Block::BusNumber, &bus.bus.to_string()),
            bus.devices.len()
        )?;

        for d in bus.devices.iter() {
            writeln!(
                w,
                "    port {} : [{}] {}, {}, {}, {}, {}",
                settings.paint(Block::PortNumber, &d.port.to_string()),
                settings.paint(Block::VidPid, &d.vid_pid()),
                settings.paint(Block::Version, &d.version.human()),
                settings.paint(Block::Class, &d.class.mnemonic),
                settings.paint(Block::Serial, d.serial.or(PLACEHOLDER)),
                settings.paint(Block::Manufacturer, d.manufacturer.or(PLACEHOLDER)),
                settings.paint(Block::Product, d.product.or(PLACEHOLDER)),
            )?;
        }
    }

    Ok(())
}
