//! Units understood by the metrics agent when it draws a graph.

use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// The unit of a graph.
///
/// The agent does not know about physical units: it only distinguishes how
/// the values should be formatted. Physical units such as watts are written
/// in the label of each metric instead.
///
/// # Example
/// ```
/// use metric_plugin::units::Unit;
///
/// let unit: Unit = "bytes/sec".parse().unwrap();
/// assert_eq!(unit, Unit::BytesPerSecond);
/// ```
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Unit {
    /// Any real number. This is the default.
    #[default]
    Float,

    /// Whole numbers, such as counters.
    Integer,

    /// Percent, between 0 and 100.
    Percentage,

    Seconds,
    Milliseconds,

    /// Amount of information.
    Bytes,

    BytesPerSecond,
    BitsPerSecond,

    /// Input/output operations per second.
    Iops,
}

impl Unit {
    /// Returns the name of the unit in the plugin protocol.
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Unit::Float => "float",
            Unit::Integer => "integer",
            Unit::Percentage => "percentage",
            Unit::Seconds => "seconds",
            Unit::Milliseconds => "milliseconds",
            Unit::Bytes => "bytes",
            Unit::BytesPerSecond => "bytes/sec",
            Unit::BitsPerSecond => "bits/sec",
            Unit::Iops => "iops",
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_name())
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let res = match s {
            "float" => Unit::Float,
            "integer" => Unit::Integer,
            "percentage" => Unit::Percentage,
            "seconds" => Unit::Seconds,
            "milliseconds" => Unit::Milliseconds,
            "bytes" => Unit::Bytes,
            "bytes/sec" => Unit::BytesPerSecond,
            "bits/sec" => Unit::BitsPerSecond,
            "iops" => Unit::Iops,
            _ => return Err(anyhow!("Unknown graph unit {s}")),
        };
        Ok(res)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.protocol_name())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Unit::from_str(&s).map_err(serde::de::Error::custom)
    }
}
