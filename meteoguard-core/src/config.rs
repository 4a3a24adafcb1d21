//! Station configuration
//!
//! Every interval and tunable the station uses, with defaults taken from
//! [`crate::constants`]. Built with `with_*` methods or deserialized from a
//! settings file when the `serde` feature is on; missing fields fall back to
//! their defaults.
//!
//! ```rust
//! use meteoguard_core::StationConfig;
//!
//! let config = StationConfig::default()
//!     .with_history_save_interval_ms(60_000)
//!     .with_rain_debounce_cycles(2);
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::constants::{
    sensors::{CALIBRATION_MARGIN, CALIBRATION_SAMPLES, DEFAULT_RAIN_THRESHOLD, MAX_CALIBRATION_SAMPLES},
    time::{
        CALIBRATION_SAMPLE_DELAY_MS, DEFAULT_UTC_OFFSET_HOURS, HISTORY_SAVE_INTERVAL_MS,
        MESSAGE_POLL_INTERVAL_MS, MIN_SAMPLE_INTERVAL_MS, NETWORK_CHECK_INTERVAL_MS,
        SENSOR_SETTLE_DELAY_MS,
    },
};
use crate::errors::{StationError, StationResult};
use crate::time::validate_utc_offset;

/// Tunables for acquisition, calibration and the loop cadence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationConfig {
    /// Calls to acquire closer together than this reuse the last reading
    pub min_sample_interval_ms: u64,

    /// Delay after each raw temperature/humidity sample
    pub settle_delay_ms: u32,

    /// Raw rain samples averaged by a calibration run
    pub calibration_samples: usize,

    /// Added to the averaged dry baseline to form the threshold
    pub calibration_margin: u16,

    /// Delay between calibration samples
    pub calibration_delay_ms: u32,

    /// Threshold in force until the first calibration
    pub initial_rain_threshold: u16,

    /// Run a calibration when the station starts
    pub calibrate_on_start: bool,

    pub history_save_interval_ms: u64,
    pub message_poll_interval_ms: u64,
    pub network_check_interval_ms: u64,

    /// Consecutive history saves a new rain state must persist before it
    /// is reported. 1 reports every change immediately.
    pub rain_debounce_cycles: u8,

    /// Local time zone as a whole-hour UTC offset
    pub utc_offset_hours: i8,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            min_sample_interval_ms: MIN_SAMPLE_INTERVAL_MS,
            settle_delay_ms: SENSOR_SETTLE_DELAY_MS,
            calibration_samples: CALIBRATION_SAMPLES,
            calibration_margin: CALIBRATION_MARGIN,
            calibration_delay_ms: CALIBRATION_SAMPLE_DELAY_MS,
            initial_rain_threshold: DEFAULT_RAIN_THRESHOLD,
            calibrate_on_start: true,
            history_save_interval_ms: HISTORY_SAVE_INTERVAL_MS,
            message_poll_interval_ms: MESSAGE_POLL_INTERVAL_MS,
            network_check_interval_ms: NETWORK_CHECK_INTERVAL_MS,
            rain_debounce_cycles: 1,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl StationConfig {
    pub fn with_min_sample_interval_ms(mut self, ms: u64) -> Self {
        self.min_sample_interval_ms = ms;
        self
    }

    pub fn with_settle_delay_ms(mut self, ms: u32) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    pub fn with_calibration(mut self, samples: usize, margin: u16) -> Self {
        self.calibration_samples = samples;
        self.calibration_margin = margin;
        self
    }

    pub fn with_initial_rain_threshold(mut self, threshold: u16) -> Self {
        self.initial_rain_threshold = threshold;
        self
    }

    pub fn with_calibrate_on_start(mut self, enabled: bool) -> Self {
        self.calibrate_on_start = enabled;
        self
    }

    pub fn with_history_save_interval_ms(mut self, ms: u64) -> Self {
        self.history_save_interval_ms = ms;
        self
    }

    pub fn with_message_poll_interval_ms(mut self, ms: u64) -> Self {
        self.message_poll_interval_ms = ms;
        self
    }

    pub fn with_network_check_interval_ms(mut self, ms: u64) -> Self {
        self.network_check_interval_ms = ms;
        self
    }

    pub fn with_rain_debounce_cycles(mut self, cycles: u8) -> Self {
        self.rain_debounce_cycles = cycles;
        self
    }

    pub fn with_utc_offset_hours(mut self, hours: i8) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    /// Reject configurations the station cannot run with
    pub fn validate(&self) -> StationResult<()> {
        if self.calibration_samples == 0 {
            return Err(StationError::InvalidConfig {
                reason: "calibration needs at least one sample",
            });
        }

        if self.calibration_samples > MAX_CALIBRATION_SAMPLES {
            return Err(StationError::InvalidConfig {
                reason: "calibration sample count too large",
            });
        }

        if self.history_save_interval_ms == 0
            || self.message_poll_interval_ms == 0
            || self.network_check_interval_ms == 0
        {
            return Err(StationError::InvalidConfig {
                reason: "loop intervals must be non-zero",
            });
        }

        if self.rain_debounce_cycles == 0 {
            return Err(StationError::InvalidConfig {
                reason: "rain debounce needs at least one cycle",
            });
        }

        validate_utc_offset(self.utc_offset_hours as i32)?;
        Ok(())
    }
}
