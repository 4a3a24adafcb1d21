//! Common test utilities for connector integration tests
//!
//! - Adjustable sensor board and no-op delay
//! - Station factory with calibration at a known baseline
//! - Connector that records instead of sending

#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use meteoguard_connectors::{Connector, CsrfToken, OutgoingMessage};
use meteoguard_core::{time::FixedClock, LocalTime, SensorDriver, Station, StationConfig};

pub const TOKEN: &str = "0123456789abcdefghijABCDEFGHIJkl";

/// Board whose readings tests set directly
#[derive(Debug, Clone)]
pub struct Board {
    pub temperature: f32,
    pub humidity: f32,
    pub rain: u16,
}

impl SensorDriver for Board {
    fn read_temperature_raw(&mut self) -> f32 {
        self.temperature
    }

    fn read_humidity_raw(&mut self) -> f32 {
        self.humidity
    }

    fn read_rain_analog(&mut self) -> u16 {
        self.rain
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub type TestStation = Station<Board, NoDelay, FixedClock>;

/// Station calibrated against a dry baseline of 300 (threshold 400)
pub fn station() -> TestStation {
    let board = Board {
        temperature: 21.0,
        humidity: 48.0,
        rain: 300,
    };
    let clock = FixedClock::new(LocalTime::new(12, 0, 15, 5).unwrap());

    Station::new(board, NoDelay, clock, StationConfig::default(), 0).unwrap()
}

pub fn csrf() -> CsrfToken {
    CsrfToken::from_string(TOKEN).unwrap()
}

/// Collects every message it is asked to send
#[derive(Debug, Default)]
pub struct RecordingConnector {
    pub sent: Vec<OutgoingMessage>,
}

impl Connector for RecordingConnector {
    type Error = std::convert::Infallible;

    fn send(&mut self, message: &OutgoingMessage) -> Result<(), Self::Error> {
        self.sent.push(message.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}
