//! Common test utilities for integration tests
//!
//! - Scripted sensor driver replaying queued raw samples
//! - Delay that records instead of sleeping
//! - Reading fixtures

#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use meteoguard_core::{Reading, SensorDriver, TimeLabel};

/// Sensor driver fed from queues
///
/// When a queue runs dry the driver keeps returning the last value it
/// handed out for that channel.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    temperatures: VecDeque<f32>,
    humidities: VecDeque<f32>,
    rain: VecDeque<u16>,
    last_temperature: f32,
    last_humidity: f32,
    last_rain: u16,
    pub reads: usize,
}

impl ScriptedSensor {
    pub fn steady(temperature: f32, humidity: f32, rain: u16) -> Self {
        Self {
            last_temperature: temperature,
            last_humidity: humidity,
            last_rain: rain,
            ..Self::default()
        }
    }

    pub fn queue_temperatures(&mut self, values: &[f32]) -> &mut Self {
        self.temperatures.extend(values.iter().copied());
        self
    }

    pub fn queue_humidities(&mut self, values: &[f32]) -> &mut Self {
        self.humidities.extend(values.iter().copied());
        self
    }

    pub fn queue_rain(&mut self, values: &[u16]) -> &mut Self {
        self.rain.extend(values.iter().copied());
        self
    }

    pub fn set_rain(&mut self, value: u16) {
        self.rain.clear();
        self.last_rain = value;
    }
}

impl SensorDriver for ScriptedSensor {
    fn read_temperature_raw(&mut self) -> f32 {
        self.reads += 1;
        if let Some(value) = self.temperatures.pop_front() {
            self.last_temperature = value;
        }
        self.last_temperature
    }

    fn read_humidity_raw(&mut self) -> f32 {
        if let Some(value) = self.humidities.pop_front() {
            self.last_humidity = value;
        }
        self.last_humidity
    }

    fn read_rain_analog(&mut self) -> u16 {
        if let Some(value) = self.rain.pop_front() {
            self.last_rain = value;
        }
        self.last_rain
    }
}

/// Delay that only totals the requested time
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Reading whose temperature encodes `n`, for ordering checks
pub fn numbered(n: u32) -> Reading {
    Reading::new(n as f32, 50.0, false, 0, TimeLabel::sentinel())
}
