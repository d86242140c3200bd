//! Where the magic happens for `listusb` binary!
use clap::Parser;
use std::io::{self, Write};

use listusb::display::{RenderConfig, RenderMode};
use listusb::error::Result;
use listusb::profiler::{self, DeviceRecord, DeviceTree, Profiler};

/// List attached USB devices with their descriptors, classes, power budget and bus topology
#[derive(Parser, Debug)]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Args {
    /// Print name, version and libusb version then exit
    #[arg(short = 'v', long, default_value_t = false)]
    version: bool,

    /// Display one delimited line per device
    #[arg(short, long, default_value_t = false)]
    simple: bool,

    /// Print a header line naming the fields; only with --simple
    #[arg(short, long, default_value_t = false)]
    reftable: bool,

    /// Display with ANSI colour escape codes
    #[arg(short, long, default_value_t = false)]
    color: bool,

    /// Do not list interfaces and endpoints of each configuration
    #[arg(short = 'L', long, default_value_t = false)]
    lessinfo: bool,

    /// Group devices under their bus; overrides --simple
    #[arg(short, long, default_value_t = false)]
    tree: bool,

    /// Output normalised records (or the tree with --tree) as JSON
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// Read raw descriptors from a JSON dump rather than attached devices
    #[arg(long)]
    from_json: Option<String>,

    /// Turn debugging information on; repeat for more
    #[arg(short = 'z', long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn get_records(args: &Args) -> Result<Vec<DeviceRecord>> {
    match &args.from_json {
        Some(file_path) => profiler::dump::DumpProfiler::from_file(file_path)?.get_records(),
        None => get_system_records(),
    }
}

#[cfg(feature = "libusb")]
fn get_system_records() -> Result<Vec<DeviceRecord>> {
    profiler::libusb::LibUsbProfiler::new()?.get_records()
}

#[cfg(not(feature = "libusb"))]
fn get_system_records() -> Result<Vec<DeviceRecord>> {
    Err(listusb::error::Error::new(
        listusb::error::ErrorKind::ContextInitFailed,
        "listusb built without 'libusb' feature, only --from-json is available",
    ))
}

fn run(args: Args) -> Result<()> {
    listusb::set_log_level(args.debug)?;
    log::debug!("Args {:?}", args);

    if args.version {
        println!(
            "{} version {}, libusb version {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            listusb::libusb_version()
        );
        return Ok(());
    }

    let settings = RenderConfig::new(
        args.simple,
        args.reftable,
        args.color,
        args.lessinfo,
        args.tree,
    );
    // explicit request so colour even when not a tty
    if settings.colour {
        colored::control::set_override(true);
    }

    let records = get_records(&args)?;
    let mode = settings.render_mode();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        let json = if mode == RenderMode::Tree {
            serde_json::to_string_pretty(&DeviceTree::aggregate(records))?
        } else {
            serde_json::to_string_pretty(&records)?
        };
        writeln!(out, "{}", json)?;
    } else {
        if mode == RenderMode::Verbose {
            writeln!(
                out,
                "{}, version {}, w/ libusb {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                listusb::libusb_version()
            )?;
        }
        mode.render(&records, &settings, &mut out)?;
    }

    out.flush()?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
