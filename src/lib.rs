//! List attached USB devices; identity, class, USB release, power budget and bus topology of each.
//!
//! Raw descriptors come from a [`profiler::Profiler`] backend, are normalised into [`profiler::DeviceRecord`]s,
//! optionally grouped into a [`profiler::DeviceTree`] and rendered by [`display::RenderMode`].
#![warn(missing_docs)]
use simple_logger::SimpleLogger;

pub mod colour;
pub mod display;
pub mod error;
pub mod profiler;
pub mod types;
pub mod usb;

/// Set listusb module and binary log level
pub fn set_log_level(debug: u8) -> crate::error::Result<()> {
    match debug {
        // just use env if not passed
        0 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Error.to_level_filter())
            .env(),
        1 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Info.to_level_filter()),
        2 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Debug.to_level_filter()),
        _ => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Trace.to_level_filter()),
    }
    .init()
    .map_err(|e| {
        crate::error::Error::new(
            crate::error::ErrorKind::Other("simple_logger"),
            &format!("Failed to set log level: {}", e),
        )
    })?;

    #[cfg(feature = "libusb")]
    profiler::libusb::set_log_level(debug);

    Ok(())
}

/// Version of the libusb library in use
#[cfg(feature = "libusb")]
pub fn libusb_version() -> String {
    profiler::libusb::libusb_version()
}

/// Version of the libusb library in use, "n/a" when built without the `libusb` feature
#[cfg(not(feature = "libusb"))]
pub fn libusb_version() -> String {
    String::from("n/a")
}
