//! Core engine for MeteoGuard
//!
//! Samples a temperature/humidity sensor and a resistive rain plate,
//! suppresses single-sample spikes with a median filter, classifies rain
//! against a calibrated threshold and keeps the last
//! [`HISTORY_CAPACITY`](constants::HISTORY_CAPACITY) readings in a
//! fixed-size ring ledger.
//!
//! Key constraints:
//! - Runs on a single cooperative loop on a small microcontroller
//! - No heap allocation anywhere in the core
//! - Hardware reached only through [`SensorDriver`], `embedded_hal` delays
//!   and [`Clock`]
//!
//! ```no_run
//! use meteoguard_core::{Station, StationConfig, StationEvent, time::NoClock};
//! # use meteoguard_core::SensorDriver;
//! # struct Board;
//! # impl SensorDriver for Board {
//! #     fn read_temperature_raw(&mut self) -> f32 { 20.0 }
//! #     fn read_humidity_raw(&mut self) -> f32 { 50.0 }
//! #     fn read_rain_analog(&mut self) -> u16 { 300 }
//! # }
//! # struct Delay;
//! # impl embedded_hal::delay::DelayNs for Delay { fn delay_ns(&mut self, _: u32) {} }
//! # fn millis() -> u64 { 0 }
//!
//! let mut station: Station<_, _, _> =
//!     Station::new(Board, Delay, NoClock, StationConfig::default(), millis())?;
//!
//! loop {
//!     for event in station.tick(millis()) {
//!         if let StationEvent::RainStarted(reading) = event {
//!             // notify subscribers
//!         }
//!     }
//! }
//! # Ok::<(), meteoguard_core::StationError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod acquisition;
pub mod alerts;
pub mod buffer;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod ledger;
pub mod reading;
pub mod scheduler;
pub mod station;
pub mod time;
pub mod traits;

// Public API
pub use acquisition::Sampler;
pub use alerts::{RainAlert, RainTransition};
pub use calibration::RainCalibration;
pub use config::StationConfig;
pub use errors::{Channel, StationError, StationResult};
pub use ledger::HistoryLedger;
pub use reading::Reading;
pub use station::{Station, StationEvent, StationEvents};
pub use time::{LocalTime, TimeLabel, Timestamp};
pub use traits::{Clock, SensorDriver, TimeSource};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
