//! Time Source Abstractions
//!
//! ## Monotonic vs Wall Clock
//!
//! `TimeSource` is the loop's heartbeat: milliseconds since boot, never
//! adjusted. Interval checks compare against it.
//!
//! `Clock` answers "what time is it here", for labels only. It returns
//! `None` until the device has synchronized (NTP on the ESP32), and callers
//! must cope with that rather than wait for it.

use crate::errors::StationResult;
use crate::time::{LocalTime, Timestamp};

/// Source of monotonic time for the station loop
///
/// ## Implementation Requirements
///
/// - `now()` must never decrease
/// - Wraparound of the underlying hardware counter must be handled by the
///   implementation; the station assumes a 64-bit millisecond count
pub trait TimeSource {
    /// Get current timestamp in milliseconds since boot
    fn now(&self) -> Timestamp;
}

/// Source of local wall-clock time
pub trait Clock {
    /// Current local time, or `None` if the clock is not synchronized
    fn now_local(&self) -> Option<LocalTime>;

    /// Whole-hour UTC offset, for clocks that track a time zone
    fn utc_offset(&self) -> Option<i8> {
        None
    }

    /// Move the clock to another time zone
    ///
    /// Clocks without a zone accept and ignore this. Out-of-range offsets
    /// are rejected and leave the clock unchanged.
    fn set_utc_offset(&mut self, hours: i32) -> StationResult<()> {
        crate::time::validate_utc_offset(hours).map(|_| ())
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_local(&self) -> Option<LocalTime> {
        (**self).now_local()
    }

    fn utc_offset(&self) -> Option<i8> {
        (**self).utc_offset()
    }
}
