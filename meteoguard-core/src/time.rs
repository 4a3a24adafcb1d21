//! Time management for the station
//!
//! Two different notions of time flow through the system:
//! - Monotonic milliseconds (`Timestamp`) drive the loop cadence and the
//!   acquisition rate limit. They never go backwards.
//! - Local wall-clock time (`LocalTime`) only labels readings. It may be
//!   missing entirely until the network clock has synchronized.

use core::fmt::Write;

use crate::constants::buffers::TIME_LABEL_LEN;
use crate::constants::sensors::TIME_SENTINEL;
use crate::constants::time::{MAX_UTC_OFFSET_HOURS, MIN_UTC_OFFSET_HOURS};
use crate::errors::{StationError, StationResult};

pub use crate::traits::time::{Clock, TimeSource};

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Monotonic time source backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Controllable time source for testing
///
/// Interior mutability lets tests advance time while the station holds a
/// shared reference.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    now: core::cell::Cell<Timestamp>,
}

impl MockTimeSource {
    pub fn new(start: Timestamp) -> Self {
        Self { now: core::cell::Cell::new(start) }
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.now.set(timestamp);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Wall-clock time of day as reported by a synchronized clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTime {
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    /// 1..=31
    pub day: u8,
    /// 1..=12
    pub month: u8,
}

impl LocalTime {
    /// Build a local time, rejecting impossible field values
    pub fn new(hour: u8, minute: u8, day: u8, month: u8) -> Option<Self> {
        let valid = hour < 24
            && minute < 60
            && (1..=31).contains(&day)
            && (1..=12).contains(&month);

        valid.then_some(Self { hour, minute, day, month })
    }
}

/// Fixed-capacity `HH:MM DD.MM` label attached to every reading
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeLabel(heapless::String<TIME_LABEL_LEN>);

impl TimeLabel {
    /// Label used when no clock is synchronized
    pub fn sentinel() -> Self {
        let mut label = heapless::String::new();
        // The sentinel is exactly TIME_LABEL_LEN bytes
        let _ = label.push_str(TIME_SENTINEL);
        Self(label)
    }

    /// Format a local time as `HH:MM DD.MM`
    pub fn from_local(time: &LocalTime) -> Self {
        let mut label = heapless::String::new();
        let written = write!(
            label,
            "{:02}:{:02} {:02}.{:02}",
            time.hour, time.minute, time.day, time.month
        );

        match written {
            Ok(()) => Self(label),
            Err(_) => Self::sentinel(),
        }
    }

    /// Label for an optional clock reading
    pub fn from_clock(time: Option<LocalTime>) -> Self {
        time.as_ref().map_or_else(Self::sentinel, Self::from_local)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether this label came from a synchronized clock
    pub fn is_synchronized(&self) -> bool {
        self.0.as_str() != TIME_SENTINEL
    }
}

impl Default for TimeLabel {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl core::fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a UTC offset against the range of real time zones
pub fn validate_utc_offset(hours: i32) -> StationResult<i8> {
    if hours < MIN_UTC_OFFSET_HOURS as i32 || hours > MAX_UTC_OFFSET_HOURS as i32 {
        return Err(StationError::InvalidUtcOffset {
            hours,
            min: MIN_UTC_OFFSET_HOURS,
            max: MAX_UTC_OFFSET_HOURS,
        });
    }
    Ok(hours as i8)
}

/// Clock that never synchronizes
///
/// Readings stamped through it always carry the sentinel label.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClock;

impl Clock for NoClock {
    fn now_local(&self) -> Option<LocalTime> {
        None
    }
}

/// Clock returning a fixed local time, for tests and demos
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    time: Option<LocalTime>,
}

impl FixedClock {
    pub fn new(time: LocalTime) -> Self {
        Self { time: Some(time) }
    }

    pub fn set(&mut self, time: Option<LocalTime>) {
        self.time = time;
    }
}

impl Clock for FixedClock {
    fn now_local(&self) -> Option<LocalTime> {
        self.time
    }
}

/// System wall clock shifted by a whole-hour UTC offset
///
/// Reports no time until the system clock has been set past 2016, which is
/// how an unsynchronized board looks after boot.
#[cfg(feature = "chrono")]
#[derive(Debug, Clone)]
pub struct SystemClock {
    utc_offset_hours: i8,
}

#[cfg(feature = "chrono")]
impl SystemClock {
    /// Years before this are treated as "never synchronized"
    const FIRST_PLAUSIBLE_YEAR: i32 = 2016;

    pub fn new(utc_offset_hours: i8) -> StationResult<Self> {
        let utc_offset_hours = validate_utc_offset(utc_offset_hours as i32)?;
        Ok(Self { utc_offset_hours })
    }

}

#[cfg(feature = "chrono")]
impl Clock for SystemClock {
    fn now_local(&self) -> Option<LocalTime> {
        use chrono::{Datelike, FixedOffset, Timelike, Utc};

        let seconds = self.utc_offset_hours as i32 * crate::constants::time::SECONDS_PER_HOUR;
        let offset = FixedOffset::east_opt(seconds)?;
        let now = Utc::now().with_timezone(&offset);

        if now.year() < Self::FIRST_PLAUSIBLE_YEAR {
            return None;
        }

        LocalTime::new(now.hour() as u8, now.minute() as u8, now.day() as u8, now.month() as u8)
    }

    fn utc_offset(&self) -> Option<i8> {
        Some(self.utc_offset_hours)
    }

    fn set_utc_offset(&mut self, hours: i32) -> StationResult<()> {
        self.utc_offset_hours = validate_utc_offset(hours)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_advances() {
        let time = MockTimeSource::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);
    }

    #[test]
    fn label_is_zero_padded() {
        let time = LocalTime::new(7, 5, 3, 9).unwrap();
        assert_eq!(TimeLabel::from_local(&time).as_str(), "07:05 03.09");
    }

    #[test]
    fn missing_clock_gives_sentinel() {
        let label = TimeLabel::from_clock(NoClock.now_local());
        assert_eq!(label.as_str(), "--:-- --.--");
        assert!(!label.is_synchronized());
    }

    #[test]
    fn impossible_local_time_rejected() {
        assert!(LocalTime::new(24, 0, 1, 1).is_none());
        assert!(LocalTime::new(12, 60, 1, 1).is_none());
        assert!(LocalTime::new(12, 0, 0, 1).is_none());
        assert!(LocalTime::new(12, 0, 1, 13).is_none());
        assert!(LocalTime::new(23, 59, 31, 12).is_some());
    }

    #[test]
    fn utc_offset_bounds() {
        assert_eq!(validate_utc_offset(-12), Ok(-12));
        assert_eq!(validate_utc_offset(14), Ok(14));
        assert!(validate_utc_offset(15).is_err());
        assert!(validate_utc_offset(-13).is_err());
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn system_clock_rejects_bad_offset() {
        let mut clock = SystemClock::new(3).unwrap();
        assert!(clock.set_utc_offset(20).is_err());
        assert_eq!(clock.utc_offset(), Some(3));

        clock.set_utc_offset(-5).unwrap();
        assert_eq!(clock.utc_offset(), Some(-5));
    }
}
