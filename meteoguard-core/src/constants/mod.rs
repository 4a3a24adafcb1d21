//! Constants for MeteoGuard Core
//!
//! Every tunable used by the station lives here with its unit in the name.
//! `StationConfig` takes its defaults from these values.
//!
//! ## Organization
//!
//! - **Time**: loop cadences, rate limits and settling delays
//! - **Sensors**: ADC range, sample counts and calibration margin
//! - **Buffers**: history capacity and view sizes

/// Time-related constants for intervals, rate limits and delays.
pub mod time;

/// Sensor sampling and calibration parameters.
pub mod sensors;

/// History capacity and view sizes.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use time::{
    MS_PER_SECOND, MIN_SAMPLE_INTERVAL_MS, HISTORY_SAVE_INTERVAL_MS,
    MESSAGE_POLL_INTERVAL_MS, NETWORK_CHECK_INTERVAL_MS, WEB_UPDATE_INTERVAL_MS,
};

pub use sensors::{
    ADC_MAX, SAMPLES_PER_CHANNEL, CALIBRATION_SAMPLES, MAX_CALIBRATION_SAMPLES, CALIBRATION_MARGIN,
};

pub use buffers::{HISTORY_CAPACITY, CHAT_HISTORY_LEN};
