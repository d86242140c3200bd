//! Error type used within crate with From for commonly used crate errors
use std::error;
use std::{fmt, io};

/// Result type used within crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone)]
/// Kind of error produced
pub enum ErrorKind {
    /// Device descriptor could not be read; the device is skipped
    DescriptorUnavailable,
    /// Unable to open device to query string descriptors - check permissions
    OpenDenied,
    /// One configuration descriptor could not be read; a placeholder is kept at its index
    ConfigUnavailable,
    /// A string descriptor could not be read; the string is treated as absent
    StringUnavailable,
    /// USB context could not be created, nothing can be enumerated
    ContextInitFailed,
    /// libusb error
    LibUSB,
    /// [`std::io::Error`] probably not found when reading file to parse
    Io,
    /// Error parsing a dump or other encoded value
    Parsing,
    /// Error From other crate without enum variant
    Other(&'static str),
}

#[derive(Debug, PartialEq)]
/// listusb error which impl [`std::error`]
pub struct Error {
    /// The [`ErrorKind`]
    pub kind: ErrorKind,
    /// String description
    pub message: String,
}

impl Error {
    /// New error helper
    pub fn new(kind: ErrorKind, message: &str) -> Error {
        Error {
            kind,
            message: message.to_string(),
        }
    }

    /// The [`ErrorKind`]
    pub fn kind(&self) -> ErrorKind {
        self.kind.to_owned()
    }

    /// The description
    pub fn message(&self) -> &String {
        &self.message
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{:?} Error: {}", self.kind, self.message)
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parsing,
            message: error.to_string(),
        }
    }
}
