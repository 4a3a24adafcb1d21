//! Error Types for Station Configuration and Sensor Faults
//!
//! ## Design Philosophy
//!
//! The hot path never fails: acquisition always yields a `Reading`, the
//! ledger never rejects an append and range queries clamp their arguments.
//! Errors exist for the edges around it:
//!
//! - a raw sensor channel producing no usable sample (reported, then
//!   absorbed by carrying the previous value forward)
//! - configuration values that make no sense (zero intervals, impossible
//!   UTC offsets)
//!
//! Errors stay `Copy` and allocation free so they can be logged through
//! `defmt` on the device.

use thiserror_no_std::Error;

/// Result type for station operations
pub type StationResult<T> = Result<T, StationError>;

/// Sensor channel identifier used in fault reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Air temperature
    Temperature,
    /// Relative humidity
    Humidity,
    /// Rain plate analog input
    Rain,
}

impl Channel {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Rain => "rain",
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Station errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum StationError {
    /// Every raw sample of a channel was NaN or infinite
    #[error("No valid samples from {channel} sensor")]
    SensorFault {
        /// Channel that failed
        channel: Channel,
    },

    /// UTC offset outside the range of real time zones
    #[error("UTC offset {hours}h outside [{min}, {max}]")]
    InvalidUtcOffset {
        /// Requested offset in hours
        hours: i32,
        /// Westernmost allowed offset
        min: i8,
        /// Easternmost allowed offset
        max: i8,
    },

    /// Configuration value rejected
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for StationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorFault { channel } =>
                defmt::write!(fmt, "No valid samples from {}", channel),
            Self::InvalidUtcOffset { hours, min, max } =>
                defmt::write!(fmt, "UTC offset {} outside [{}, {}]", hours, min, max),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid configuration: {}", reason),
        }
    }
}
