//! Canonical station reading
//!
//! One `Reading` is produced per acquisition cycle: the median-filtered
//! temperature and humidity, the rain classification with the raw ADC value
//! it was derived from, and the local time label. It is moved into the
//! history ledger on ingest and only ever read afterwards.

use crate::time::TimeLabel;

/// One filtered snapshot of every sensor channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Air temperature in °C (NaN when the sensor never produced a value)
    pub temperature: f32,
    /// Relative humidity in % (NaN when the sensor never produced a value)
    pub humidity: f32,
    /// `rain_raw` exceeded the calibrated threshold
    pub is_raining: bool,
    /// Raw rain plate ADC value
    pub rain_raw: u16,
    /// Local time the reading was taken, or the sentinel label
    pub timestamp: TimeLabel,
}

impl Reading {
    pub fn new(
        temperature: f32,
        humidity: f32,
        is_raining: bool,
        rain_raw: u16,
        timestamp: TimeLabel,
    ) -> Self {
        Self { temperature, humidity, is_raining, rain_raw, timestamp }
    }

    /// Placeholder served before the first hardware sample
    pub fn unavailable() -> Self {
        Self {
            temperature: f32::NAN,
            humidity: f32::NAN,
            is_raining: false,
            rain_raw: 0,
            timestamp: TimeLabel::sentinel(),
        }
    }

    /// Both climate channels carry a real measurement
    pub fn is_complete(&self) -> bool {
        self.temperature.is_finite() && self.humidity.is_finite()
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::unavailable()
    }
}
