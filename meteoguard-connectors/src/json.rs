//! JSON feed for the dashboard script
//!
//! Field names match what the dashboard's script polls for. Temperatures and
//! humidities are rounded to one decimal; a non-finite value (sensor never
//! produced one) goes out as `null` rather than an invalid JSON number.

use meteoguard_core::{filter::round1, HistoryLedger, Reading};
use serde::Serialize;

use crate::ConnectorError;

/// Body of `/sensor-data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorData<'a> {
    pub temp: Option<f32>,
    pub hum: Option<f32>,
    pub rain: bool,
    #[serde(rename = "rainValue")]
    pub rain_value: u16,
    pub threshold: u16,
    pub time: &'a str,
}

impl<'a> SensorData<'a> {
    pub fn new(reading: &'a Reading, threshold: u16) -> Self {
        Self {
            temp: display_value(reading.temperature),
            hum: display_value(reading.humidity),
            rain: reading.is_raining,
            rain_value: reading.rain_raw,
            threshold,
            time: reading.timestamp.as_str(),
        }
    }
}

/// One entry of `/history-data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord<'a> {
    pub time: &'a str,
    pub temp: Option<f32>,
    pub hum: Option<f32>,
    pub rain: bool,
}

impl<'a> From<&'a Reading> for HistoryRecord<'a> {
    fn from(reading: &'a Reading) -> Self {
        Self {
            time: reading.timestamp.as_str(),
            temp: display_value(reading.temperature),
            hum: display_value(reading.humidity),
            rain: reading.is_raining,
        }
    }
}

/// Body of `/history-data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryData<'a> {
    pub history: Vec<HistoryRecord<'a>>,
}

impl<'a> HistoryData<'a> {
    pub fn new<const N: usize>(ledger: &'a HistoryLedger<N>) -> Self {
        Self {
            history: ledger.all().map(HistoryRecord::from).collect(),
        }
    }
}

/// Round for display, `None` for values that cannot be shown
pub fn display_value(value: f32) -> Option<f32> {
    value.is_finite().then(|| round1(value))
}

pub fn sensor_data(reading: &Reading, threshold: u16) -> Result<String, ConnectorError> {
    Ok(serde_json::to_string(&SensorData::new(reading, threshold))?)
}

pub fn history_data<const N: usize>(ledger: &HistoryLedger<N>) -> Result<String, ConnectorError> {
    Ok(serde_json::to_string(&HistoryData::new(ledger))?)
}
