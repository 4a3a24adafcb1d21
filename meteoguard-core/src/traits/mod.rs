//! Core Traits and Abstractions for MeteoGuard
//!
//! The station talks to hardware and wall-clock time only through these
//! traits, so the whole core runs unchanged against mocks on a host.
//!
//! ## Module Organization
//!
//! - [`sensor`] - Raw sensor driver seam
//! - [`time`] - Monotonic and wall-clock time sources
//!
//! Settling delays use `embedded_hal::delay::DelayNs` directly rather than a
//! trait of our own.

pub mod sensor;
pub mod time;

pub use sensor::SensorDriver;
pub use time::{Clock, TimeSource};
