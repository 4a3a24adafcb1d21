//! Station configuration from JSON
//!
//! Any field left out takes its default, so a settings file only needs the
//! values it changes:
//!
//! ```json
//! { "history_save_interval_ms": 60000, "utc_offset_hours": 1 }
//! ```

use std::fs;
use std::path::Path;

use meteoguard_core::StationConfig;

use crate::ConnectorError;

/// Parse and validate a configuration document
pub fn load_station_config(json: &str) -> Result<StationConfig, ConnectorError> {
    let config: StationConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate a configuration file
pub fn load_station_config_file(path: impl AsRef<Path>) -> Result<StationConfig, ConnectorError> {
    let text = fs::read_to_string(path)?;
    load_station_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config = load_station_config(r#"{"history_save_interval_ms": 60000}"#).unwrap();

        assert_eq!(config.history_save_interval_ms, 60_000);
        assert_eq!(config.message_poll_interval_ms, 1_000);
        assert_eq!(config.calibration_margin, 100);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = load_station_config(r#"{"utc_offset_hours": 20}"#).unwrap_err();
        assert!(matches!(err, ConnectorError::Station(_)));

        let err = load_station_config("not json").unwrap_err();
        assert!(matches!(err, ConnectorError::Serialization(_)));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.json");
        fs::write(&path, r#"{"rain_debounce_cycles": 3}"#).unwrap();

        assert_eq!(load_station_config_file(&path).unwrap().rain_debounce_cycles, 3);
        assert!(matches!(
            load_station_config_file(dir.path().join("missing.json")),
            Err(ConnectorError::Io(_))
        ));
    }
}
