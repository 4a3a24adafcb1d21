//! Chat bot commands and messages
//!
//! Transport-free: [`ChatBot`] turns an [`IncomingMessage`] into an
//! [`OutgoingMessage`] and station events into notifications. Delivering
//! them is a [`Connector`](crate::Connector)'s job.
//!
//! Only the configured chat is served. Anyone else gets a refusal and the
//! station is not touched.

use std::fmt::Write;

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use meteoguard_core::{
    constants::CHAT_HISTORY_LEN, Clock, HistoryLedger, Reading, SensorDriver, Station,
    StationEvent, Timestamp,
};
use serde::{Deserialize, Serialize};

pub const BUTTON_STATUS: &str = "📊 Current readings";
pub const BUTTON_HISTORY: &str = "⏳ History";
pub const BUTTON_CALIBRATE: &str = "🔧 Calibrate";
pub const BUTTON_REBOOT: &str = "🔄 Reboot";
pub const BUTTON_MENU: &str = "Menu";

/// What a chat message asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Menu,
    Status,
    History,
    Calibrate,
    Reboot,
    Unknown,
}

impl Command {
    /// Match a slash command or the label of a keyboard button
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "/start" | "/help" | BUTTON_MENU => Command::Menu,
            "/status" | BUTTON_STATUS => Command::Status,
            "/history" | BUTTON_HISTORY => Command::History,
            "/calibrate" | BUTTON_CALIBRATE => Command::Calibrate,
            "/reboot" | BUTTON_REBOOT => Command::Reboot,
            _ => Command::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
}

/// Persistent reply keyboard shown under the chat input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboard {
    pub keyboard: Vec<Vec<String>>,
    pub resize_keyboard: bool,
}

impl ReplyKeyboard {
    /// The main menu: two rows of actions and a menu button
    pub fn main_menu() -> Self {
        let row = |labels: &[&str]| labels.iter().map(|l| l.to_string()).collect();
        Self {
            keyboard: vec![
                row(&[BUTTON_STATUS, BUTTON_HISTORY]),
                row(&[BUTTON_CALIBRATE, BUTTON_REBOOT]),
                row(&[BUTTON_MENU]),
            ],
            resize_keyboard: true,
        }
    }
}

/// A message received from the bot API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub update_id: i64,
    pub chat_id: String,
    pub text: String,
}

/// A message to deliver; serializes as a `sendMessage` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub chat_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboard>,
}

impl OutgoingMessage {
    pub fn plain(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }

    pub fn markdown(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            parse_mode: Some(ParseMode::Markdown),
            ..Self::plain(chat_id, text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: ReplyKeyboard) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

/// Command handler bound to one authorized chat
#[derive(Debug, Clone)]
pub struct ChatBot {
    chat_id: String,
}

impl ChatBot {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self { chat_id: chat_id.into() }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn is_authorized(&self, message: &IncomingMessage) -> bool {
        message.chat_id == self.chat_id
    }

    /// Answer one message, running whatever station action it asks for
    ///
    /// `rssi` is the current Wi-Fi signal in dBm, if connected.
    pub fn handle<S, D, C, const N: usize>(
        &self,
        message: &IncomingMessage,
        station: &mut Station<S, D, C, N>,
        now: Timestamp,
        rssi: Option<i32>,
    ) -> OutgoingMessage
    where
        S: SensorDriver,
        D: DelayNs,
        C: Clock,
    {
        if !self.is_authorized(message) {
            warn!("Refused chat message from {}", message.chat_id);
            return OutgoingMessage::plain(&message.chat_id, "⛔ Access denied");
        }

        info!("Chat command: {}", message.text);
        let chat_id = &message.chat_id;

        match Command::parse(&message.text) {
            Command::Menu => {
                OutgoingMessage::markdown(chat_id, menu_text()).with_keyboard(ReplyKeyboard::main_menu())
            }
            Command::Status => {
                let reading = station.current(now);
                OutgoingMessage::markdown(chat_id, status_text(reading, rssi))
            }
            Command::History => {
                OutgoingMessage::markdown(chat_id, history_text(station.ledger(), CHAT_HISTORY_LEN))
            }
            Command::Calibrate => {
                let threshold = station.calibrate();
                OutgoingMessage::markdown(
                    chat_id,
                    format!("🔧 *Rain sensor calibrated*\nNew threshold: {threshold}"),
                )
            }
            Command::Reboot => {
                station.request_reboot();
                OutgoingMessage::markdown(chat_id, "🔁 *Rebooting...*")
            }
            Command::Unknown => {
                OutgoingMessage::markdown(chat_id, "❌ Unknown command. Press *Menu*")
            }
        }
    }

    /// Notification for a station event, if it warrants one
    pub fn notification(&self, event: &StationEvent) -> Option<OutgoingMessage> {
        let text = match event {
            StationEvent::RainStarted(reading) => format!(
                "🌧️ *Rain started!*\nTemperature: {}°C\nHumidity: {}%",
                format_value(reading.temperature),
                format_value(reading.humidity)
            ),
            StationEvent::RainStopped(reading) => format!(
                "☀️ *Rain stopped*\nTemperature: {}°C\nHumidity: {}%",
                format_value(reading.temperature),
                format_value(reading.humidity)
            ),
            StationEvent::RebootRequested => return Some(self.reboot_notice()),
            _ => return None,
        };

        Some(OutgoingMessage::markdown(&self.chat_id, text))
    }

    pub fn startup_notice(&self, address: &str) -> OutgoingMessage {
        OutgoingMessage::markdown(
            &self.chat_id,
            format!("🚀 *Weather station started!*\nIP: {address}\nPress *Menu* for controls"),
        )
    }

    pub fn reboot_notice(&self) -> OutgoingMessage {
        OutgoingMessage::markdown(&self.chat_id, "🔁 *Weather station is rebooting...*")
    }
}

/// One decimal, or `--` for a channel with no value
pub fn format_value(value: f32) -> String {
    match crate::json::display_value(value) {
        Some(v) => format!("{v:.1}"),
        None => "--".to_string(),
    }
}

pub fn menu_text() -> String {
    let mut text = String::from("📡 *Weather station - Main menu*\n\n");
    text.push_str("Choose an action:\n\n");
    text.push_str("📊 *Current readings* - live sensor data\n");
    text.push_str("⏳ *History* - latest measurements\n");
    text.push_str("🔧 *Calibrate* - calibrate the rain sensor\n");
    text.push_str("🔄 *Reboot* - restart the station\n\n");
    text.push_str("Press *Menu* to bring this menu back");
    text
}

pub fn status_text(reading: &Reading, rssi: Option<i32>) -> String {
    let mut text = String::from("📊 *Current readings*\n\n");
    let _ = writeln!(text, "🌡️ Temperature: *{} °C*", format_value(reading.temperature));
    let _ = writeln!(text, "💧 Humidity: *{} %*", format_value(reading.humidity));
    text.push_str(if reading.is_raining {
        "🌧️ Conditions: *Raining*\n"
    } else {
        "☀️ Conditions: *Dry*\n"
    });
    if let Some(rssi) = rssi {
        let _ = writeln!(text, "📶 Wi-Fi signal: {rssi} dBm");
    }
    let _ = write!(text, "🕒 Last update: {}", reading.timestamp);
    text
}

/// The `n` most recent readings, oldest first
pub fn history_text<const N: usize>(ledger: &HistoryLedger<N>, n: usize) -> String {
    let mut text = format!("⏳ *Last {n} measurements*\n\n");
    for reading in ledger.recent_n(n) {
        let _ = writeln!(text, "🕒 {}", reading.timestamp);
        let _ = writeln!(
            text,
            "🌡️ {} °C  💧 {} %",
            format_value(reading.temperature),
            format_value(reading.humidity)
        );
        text.push_str(if reading.is_raining { "🌧️ *Rain*\n\n" } else { "☀️ *Dry*\n\n" });
    }
    text
}
