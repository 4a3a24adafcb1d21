//! Time-Related Constants
//!
//! Intervals driving the cooperative station loop, plus the sensor settling
//! delays. All loop intervals are in milliseconds of monotonic time.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE;

/// Seconds per hour, used for UTC offsets.
pub const SECONDS_PER_HOUR: i32 = 3600;

// ===== ACQUISITION =====

/// Minimum spacing between two hardware samples (milliseconds).
///
/// DHT-class sensors return garbage or stale data when polled faster than
/// about 0.5 Hz. Calls inside this window reuse the last reading.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 2000;

/// Settling delay between consecutive raw sensor reads (milliseconds).
pub const SENSOR_SETTLE_DELAY_MS: u32 = 100;

/// Delay between raw rain samples taken during calibration (milliseconds).
pub const CALIBRATION_SAMPLE_DELAY_MS: u32 = 100;

// ===== LOOP CADENCES =====

/// How often a reading is appended to the history ledger (5 minutes).
///
/// 50 slots at this cadence cover a little over four hours.
pub const HISTORY_SAVE_INTERVAL_MS: u64 = 5 * MS_PER_MINUTE;

/// How often the chat bot is polled for new messages.
pub const MESSAGE_POLL_INTERVAL_MS: u64 = 1000;

/// How often network health is checked.
pub const NETWORK_CHECK_INTERVAL_MS: u64 = 10 * MS_PER_SECOND;

/// Minimum spacing between two full dashboard renders.
///
/// Requests inside this window are answered with 429.
pub const WEB_UPDATE_INTERVAL_MS: u64 = 5000;

// ===== TIME ZONES =====

/// Westernmost supported UTC offset in hours.
pub const MIN_UTC_OFFSET_HOURS: i8 = -12;

/// Easternmost supported UTC offset in hours.
pub const MAX_UTC_OFFSET_HOURS: i8 = 14;

/// Default UTC offset in hours (Moscow time).
pub const DEFAULT_UTC_OFFSET_HOURS: i8 = 3;
