//! Presentation Connectors for MeteoGuard
//!
//! ## Overview
//!
//! The core crate measures and remembers; this crate shows. Every view here
//! reads the station's latest reading and history ledger and never mutates
//! them, except through the explicit operator actions (calibrate, threshold
//! override, time zone, reboot request) that the station itself exposes.
//!
//! ## Surfaces
//!
//! ### JSON feed ([`json`])
//!
//! The two endpoints polled by the dashboard's script:
//! - `/sensor-data`: current reading, raw rain value and threshold
//! - `/history-data`: the whole ledger, oldest first
//!
//! ### Dashboard ([`dashboard`])
//!
//! Server-rendered cards, history table rows and chart series.
//!
//! ### HTTP routing ([`http`])
//!
//! Transport-agnostic [`http::Request`] / [`http::Response`] values and a
//! [`http::Router`] mapping the station's routes onto them. The embedding
//! web server owns sockets; the router owns semantics.
//!
//! ### Chat bot ([`chat`], [`telegram`])
//!
//! Command handling and message formatting for the Telegram bot, plus a
//! blocking `ureq` client behind the `telegram` feature.
//!
//! ### Settings ([`settings`], [`csrf`], [`ota`])
//!
//! Wi-Fi and OTA credentials with their length rules, a pluggable
//! [`settings::SettingsStore`], CSRF tokens for state-changing forms and
//! HTTP Basic checks for firmware upload.
//!
//! ## Example Usage
//!
//! ```rust
//! use meteoguard_connectors::json;
//! use meteoguard_core::{Reading, TimeLabel};
//!
//! let reading = Reading::new(21.34, 55.0, false, 310, TimeLabel::sentinel());
//! let body = json::sensor_data(&reading, 400)?;
//!
//! assert!(body.contains("\"temp\":21.3"));
//! # Ok::<(), meteoguard_connectors::ConnectorError>(())
//! ```

pub mod chat;
pub mod config;
pub mod csrf;
pub mod dashboard;
pub mod http;
pub mod json;
pub mod settings;

#[cfg(feature = "ota")]
pub mod ota;

#[cfg(feature = "telegram")]
pub mod telegram;

// Re-export common types
pub use chat::{ChatBot, Command, IncomingMessage, OutgoingMessage};
pub use config::{load_station_config, load_station_config_file};
pub use csrf::CsrfToken;
pub use http::{Method, Request, Response, Router};
pub use settings::{MemoryStore, OtaSettings, SettingsError, SettingsStore, WifiSettings};

#[cfg(feature = "telegram")]
pub use telegram::{TelegramConfig, TelegramConnector, TelegramError};

use meteoguard_core::StationError;
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Not connected")]
    NotConnected,

    #[error("Station error: {0}")]
    Station(#[from] StationError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Serialization(err.to_string())
    }
}

/// Outbound message channel (chat bot, notifications)
pub trait Connector {
    type Error;

    /// Deliver one message
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), Self::Error>;

    /// Check if the transport is currently usable
    fn is_connected(&self) -> bool;
}

/// Delivery statistics common to all connectors
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Messages delivered
    pub messages_sent: u64,
    /// Messages that failed to deliver
    pub messages_failed: u64,
    /// Updates received from the remote side
    pub messages_received: u64,
    /// Last error message
    pub last_error: Option<String>,
}

impl ConnectionStats {
    pub fn record_failure(&mut self, error: impl ToString) {
        self.messages_failed += 1;
        self.last_error = Some(error.to_string());
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_errors_convert() {
        let err: ConnectorError = StationError::InvalidConfig { reason: "test" }.into();
        assert!(matches!(err, ConnectorError::Station(_)));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn stats_record_failures() {
        let mut stats = ConnectionStats::default();
        stats.record_failure("timeout");

        assert_eq!(stats.messages_failed, 1);
        assert_eq!(stats.last_error.as_deref(), Some("timeout"));
    }
}
