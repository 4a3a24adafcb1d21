//! Sensor Sampling and Calibration Parameters
//!
//! Values match a DHT11 temperature/humidity sensor and a resistive rain
//! plate read through the 12-bit ESP32 ADC.

/// Largest value the rain ADC can report (12-bit).
pub const ADC_MAX: u16 = 4095;

/// Raw samples taken per channel for each median-filtered reading.
///
/// Odd so the median is a real sample, not an average of two.
pub const SAMPLES_PER_CHANNEL: usize = 3;

/// Raw rain samples averaged by a calibration run.
pub const CALIBRATION_SAMPLES: usize = 10;

/// Upper bound on samples per calibration run.
///
/// At the default 100 ms spacing this is already over a minute of blocking.
pub const MAX_CALIBRATION_SAMPLES: usize = 1_000;

/// Margin added to the dry baseline to form the rain threshold.
///
/// A wet plate moves the ADC reading by several hundred counts; 100 keeps
/// the threshold above baseline noise.
pub const CALIBRATION_MARGIN: u16 = 100;

/// Rain threshold used before the first calibration completes.
pub const DEFAULT_RAIN_THRESHOLD: u16 = 500;

/// Label stamped on readings when no synchronized clock is available.
pub const TIME_SENTINEL: &str = "--:-- --.--";
