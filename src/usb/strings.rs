//! Normalisation of string descriptor data read from devices
use serde::{Deserialize, Serialize};
use std::fmt;

/// C `isspace`: includes vertical tab unlike [`u8::is_ascii_whitespace`]
fn is_space(b: &u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Truncate `raw` at the first NUL and trim surrounding whitespace
///
/// Other control bytes are passed through; invalid UTF-8 is replaced rather than rejected.
///
/// ```
/// use listusb::usb::sanitize;
///
/// assert_eq!(sanitize(b"  Linux Foundation \n"), "Linux Foundation");
/// assert_eq!(sanitize(b"abc\0garbage"), "abc");
/// ```
pub fn sanitize(raw: &[u8]) -> String {
    let raw = match raw.iter().position(|b| *b == 0) {
        Some(nul) => &raw[..nul],
        None => raw,
    };
    let start = raw.iter().position(|b| !is_space(b)).unwrap_or(raw.len());
    let end = raw
        .iter()
        .rposition(|b| !is_space(b))
        .map_or(start, |i| i + 1);

    String::from_utf8_lossy(&raw[start..end]).into_owned()
}

/// Sanitized descriptor string; `None` when the device reported nothing, or nothing but whitespace
///
/// Renderers ask for the value with a mode specific placeholder so an empty string is never printed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsbString(Option<String>);

impl UsbString {
    /// Build from raw string descriptor bytes
    pub fn from_raw(raw: &[u8]) -> Self {
        let s = sanitize(raw);
        if s.is_empty() {
            UsbString(None)
        } else {
            UsbString(Some(s))
        }
    }

    /// No string available
    pub fn absent() -> Self {
        UsbString(None)
    }

    /// The sanitized value if present
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Value or `placeholder` when absent
    pub fn or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.0.as_deref().unwrap_or(placeholder)
    }
}

impl fmt::Display for UsbString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.or("-"))
    }
}
