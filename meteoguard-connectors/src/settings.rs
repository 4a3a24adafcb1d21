//! Network and OTA credentials
//!
//! ## Length Rules
//!
//! The radio stack stores credentials in fixed C buffers, one byte of which
//! is the terminator:
//!
//! | Field          | Bytes    |
//! |----------------|----------|
//! | Wi-Fi SSID     | 1..=31   |
//! | Wi-Fi password | 0..=63   |
//! | OTA username   | 1..=31   |
//! | OTA password   | 1..=63   |
//!
//! Lengths are counted in bytes, not characters.
//!
//! ## Defaults
//!
//! A fresh device has nothing stored. It falls back to its own access point
//! credentials and a default OTA login, and writes those back so the next
//! boot finds them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_SSID_LEN: usize = 31;
pub const MAX_WIFI_PASSWORD_LEN: usize = 63;
pub const MAX_OTA_USER_LEN: usize = 31;
pub const MAX_OTA_PASSWORD_LEN: usize = 63;

pub const DEFAULT_AP_SSID: &str = "MeteoStation-AP";
pub const DEFAULT_AP_PASSWORD: &str = "meteo12345";
pub const DEFAULT_OTA_USER: &str = "admin";
pub const DEFAULT_OTA_PASSWORD: &str = "meteo123";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("SSID must be 1 to 31 bytes, got {0}")]
    InvalidSsidLength(usize),

    #[error("Wi-Fi password must be at most 63 bytes, got {0}")]
    PasswordTooLong(usize),

    #[error("OTA username must be 1 to 31 bytes, got {0}")]
    InvalidOtaUserLength(usize),

    #[error("OTA password must be 1 to 63 bytes, got {0}")]
    InvalidOtaPasswordLength(usize),

    #[error("Settings storage error: {0}")]
    Storage(String),
}

/// Wi-Fi station credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWifiSettings")]
pub struct WifiSettings {
    ssid: String,
    password: String,
}

impl WifiSettings {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Result<Self, SettingsError> {
        let ssid = ssid.into();
        let password = password.into();

        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
            return Err(SettingsError::InvalidSsidLength(ssid.len()));
        }
        if password.len() > MAX_WIFI_PASSWORD_LEN {
            return Err(SettingsError::PasswordTooLong(password.len()));
        }

        Ok(Self { ssid, password })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Default for WifiSettings {
    fn default() -> Self {
        Self {
            ssid: DEFAULT_AP_SSID.into(),
            password: DEFAULT_AP_PASSWORD.into(),
        }
    }
}

#[derive(Deserialize)]
struct RawWifiSettings {
    ssid: String,
    #[serde(default)]
    password: String,
}

impl TryFrom<RawWifiSettings> for WifiSettings {
    type Error = SettingsError;

    fn try_from(raw: RawWifiSettings) -> Result<Self, Self::Error> {
        Self::new(raw.ssid, raw.password)
    }
}

/// Firmware upload credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOtaSettings")]
pub struct OtaSettings {
    username: String,
    password: String,
}

impl OtaSettings {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, SettingsError> {
        let username = username.into();
        let password = password.into();

        if username.is_empty() || username.len() > MAX_OTA_USER_LEN {
            return Err(SettingsError::InvalidOtaUserLength(username.len()));
        }
        if password.is_empty() || password.len() > MAX_OTA_PASSWORD_LEN {
            return Err(SettingsError::InvalidOtaPasswordLength(password.len()));
        }

        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

#[derive(Deserialize)]
struct RawOtaSettings {
    username: String,
    password: String,
}

impl TryFrom<RawOtaSettings> for OtaSettings {
    type Error = SettingsError;

    fn try_from(raw: RawOtaSettings) -> Result<Self, Self::Error> {
        Self::new(raw.username, raw.password)
    }
}

impl Default for OtaSettings {
    fn default() -> Self {
        Self {
            username: DEFAULT_OTA_USER.into(),
            password: DEFAULT_OTA_PASSWORD.into(),
        }
    }
}

/// Persistent credential storage
pub trait SettingsStore {
    fn load_wifi(&self) -> Result<Option<WifiSettings>, SettingsError>;
    fn save_wifi(&mut self, settings: &WifiSettings) -> Result<(), SettingsError>;
    fn load_ota(&self) -> Result<Option<OtaSettings>, SettingsError>;
    fn save_ota(&mut self, settings: &OtaSettings) -> Result<(), SettingsError>;

    /// Stored Wi-Fi settings, writing the access point defaults if none
    fn wifi_or_default(&mut self) -> Result<WifiSettings, SettingsError> {
        match self.load_wifi()? {
            Some(settings) => Ok(settings),
            None => {
                let defaults = WifiSettings::default();
                self.save_wifi(&defaults)?;
                Ok(defaults)
            }
        }
    }

    /// Stored OTA settings, writing the default login if none
    fn ota_or_default(&mut self) -> Result<OtaSettings, SettingsError> {
        match self.load_ota()? {
            Some(settings) => Ok(settings),
            None => {
                let defaults = OtaSettings::default();
                self.save_ota(&defaults)?;
                Ok(defaults)
            }
        }
    }
}

/// Volatile store, for tests and hosts without flash
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    wifi: Option<WifiSettings>,
    ota: Option<OtaSettings>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load_wifi(&self) -> Result<Option<WifiSettings>, SettingsError> {
        Ok(self.wifi.clone())
    }

    fn save_wifi(&mut self, settings: &WifiSettings) -> Result<(), SettingsError> {
        self.wifi = Some(settings.clone());
        Ok(())
    }

    fn load_ota(&self) -> Result<Option<OtaSettings>, SettingsError> {
        Ok(self.ota.clone())
    }

    fn save_ota(&mut self, settings: &OtaSettings) -> Result<(), SettingsError> {
        self.ota = Some(settings.clone());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    wifi: Option<WifiSettings>,
    #[serde(default)]
    ota: Option<OtaSettings>,
}

/// Store backed by one JSON file
///
/// A missing file reads as empty. Every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(StoredSettings::default());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| SettingsError::Storage(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| SettingsError::Storage(e.to_string()))
    }

    fn write(&self, stored: &StoredSettings) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(stored).map_err(|e| SettingsError::Storage(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| SettingsError::Storage(e.to_string()))
    }
}

impl SettingsStore for JsonFileStore {
    fn load_wifi(&self) -> Result<Option<WifiSettings>, SettingsError> {
        Ok(self.read()?.wifi)
    }

    fn save_wifi(&mut self, settings: &WifiSettings) -> Result<(), SettingsError> {
        let mut stored = self.read()?;
        stored.wifi = Some(settings.clone());
        self.write(&stored)
    }

    fn load_ota(&self) -> Result<Option<OtaSettings>, SettingsError> {
        Ok(self.read()?.ota)
    }

    fn save_ota(&mut self, settings: &OtaSettings) -> Result<(), SettingsError> {
        let mut stored = self.read()?;
        stored.ota = Some(settings.clone());
        self.write(&stored)
    }
}
