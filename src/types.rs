//! Types used in crate non-specific to a module
use std::fmt;

use serde::{Deserialize, Serialize};

/// A numerical `value` with a `unit`, such as the computed maximum power of a configuration
///
/// ```
/// use listusb::types::NumericalUnit;
///
/// let nu = NumericalUnit::milliamps(100);
/// assert_eq!(nu.to_string(), "100 mA");
/// assert_eq!(format!("{:#}", nu), "100mA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericalUnit<T> {
    /// The value
    pub value: T,
    /// Unit string, "mA" for power
    pub unit: String,
}

impl NumericalUnit<u32> {
    /// Value in milliamps
    pub fn milliamps(value: u32) -> Self {
        NumericalUnit {
            value,
            unit: String::from("mA"),
        }
    }
}

impl fmt::Display for NumericalUnit<u32> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // alternate drops the space for delimited output: "100mA"
        if f.alternate() {
            write!(f, "{}{}", self.value, self.unit)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_value_and_unit() {
        assert_eq!(
            serde_json::to_value(NumericalUnit::milliamps(500)).unwrap(),
            serde_json::json!({"value": 500, "unit": "mA"})
        );
    }

    #[test]
    fn test_alternate_display() {
        let nu = NumericalUnit::milliamps(896);
        assert_eq!(format!("{}", nu), "896 mA");
        assert_eq!(format!("{:#}", nu), "896mA");
    }
}
