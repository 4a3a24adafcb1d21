//! Telegram Bot API client
//!
//! Blocking `ureq` client for the two calls the station needs:
//! `getUpdates` to poll for commands and `sendMessage` to answer them and
//! push notifications. Polling is short (no long-poll timeout) because it
//! runs inside the station's cooperative loop.
//!
//! ```no_run
//! use meteoguard_connectors::{Connector, OutgoingMessage};
//! use meteoguard_connectors::telegram::{TelegramConfig, TelegramConnector};
//!
//! let mut bot = TelegramConnector::new(TelegramConfig::new("123:ABC").timeout_secs(5))?;
//! for message in bot.poll_updates()? {
//!     bot.send(&OutgoingMessage::plain(&message.chat_id, "pong"))?;
//! }
//! # Ok::<(), meteoguard_connectors::TelegramError>(())
//! ```

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::chat::{IncomingMessage, OutgoingMessage};
use crate::{ConnectionStats, Connector};

const MAX_BACKOFF_MS: u64 = 30_000;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    /// Network or transport failure
    #[error("Request failed: {0}")]
    Request(String),

    /// The API answered with an error
    #[error("API error {status}: {description}")]
    Api { status: u16, description: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    pub token: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Retries for transport errors, 429 and 5xx
    pub max_retries: u32,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Text messages from one `getUpdates` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    pub messages: Vec<IncomingMessage>,
    /// Highest update id seen, text or not
    pub last_update_id: Option<i64>,
}

/// Decode a `getUpdates` body
///
/// Updates without a text message (edits, stickers, joins) are skipped but
/// still count towards `last_update_id`.
pub fn parse_updates(body: &str) -> Result<UpdateBatch, TelegramError> {
    let response: ApiResponse<Vec<Update>> =
        serde_json::from_str(body).map_err(|e| TelegramError::Serialization(e.to_string()))?;

    if !response.ok {
        return Err(TelegramError::Api {
            status: 200,
            description: response.description.unwrap_or_default(),
        });
    }

    let updates = response.result.unwrap_or_default();
    let last_update_id = updates.iter().map(|u| u.update_id).max();

    let messages = updates
        .into_iter()
        .filter_map(|update| {
            let message = update.message?;
            Some(IncomingMessage {
                update_id: update.update_id,
                chat_id: message.chat.id.to_string(),
                text: message.text?,
            })
        })
        .collect();

    Ok(UpdateBatch { messages, last_update_id })
}

/// Blocking Telegram client
pub struct TelegramConnector {
    config: TelegramConfig,
    agent: ureq::Agent,
    next_offset: i64,
    connected: bool,
    stats: ConnectionStats,
}

impl TelegramConnector {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        if config.token.trim().is_empty() {
            return Err(TelegramError::Config("Bot token is empty".into()));
        }
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(TelegramError::Config("Base URL must start with http:// or https://".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&format!("MeteoGuard/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            config,
            agent,
            next_offset: 0,
            connected: false,
            stats: ConnectionStats::default(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.config.base_url.trim_end_matches('/'), self.config.token, method)
    }

    /// Fetch messages received since the last poll
    ///
    /// Every fetched update is acknowledged by the next poll.
    pub fn poll_updates(&mut self) -> Result<Vec<IncomingMessage>, TelegramError> {
        let request = self
            .agent
            .get(&self.method_url("getUpdates"))
            .query("offset", &self.next_offset.to_string())
            .query("timeout", "0");

        let body = self.execute(request, None)?;
        let UpdateBatch { messages, last_update_id } = parse_updates(&body)?;

        if let Some(last) = last_update_id {
            self.next_offset = last + 1;
        }

        self.stats.messages_received += messages.len() as u64;
        debug!("Telegram poll returned {} messages", messages.len());
        Ok(messages)
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    fn execute(&mut self, request: ureq::Request, body: Option<&str>) -> Result<String, TelegramError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                thread::sleep(retry_backoff(attempt));
            }

            let response = match body {
                Some(json) => request
                    .clone()
                    .set("Content-Type", "application/json")
                    .send_string(json),
                None => request.clone().call(),
            };

            match response {
                Ok(resp) => {
                    self.connected = true;
                    return resp.into_string().map_err(|e| TelegramError::Request(e.to_string()));
                }
                Err(ureq::Error::Status(code, resp)) => {
                    let error = TelegramError::Api {
                        status: code,
                        description: resp.into_string().unwrap_or_default(),
                    };
                    if code >= 500 || code == 429 {
                        last_error = Some(error);
                        continue;
                    }
                    self.stats.record_failure(&error);
                    return Err(error);
                }
                Err(ureq::Error::Transport(e)) => {
                    self.connected = false;
                    last_error = Some(TelegramError::Request(e.to_string()));
                }
            }
        }

        let error = last_error.unwrap_or_else(|| TelegramError::Request("Unknown error".into()));
        warn!("Telegram request failed: {error}");
        self.stats.record_failure(&error);
        Err(error)
    }
}

impl Connector for TelegramConnector {
    type Error = TelegramError;

    fn send(&mut self, message: &OutgoingMessage) -> Result<(), Self::Error> {
        let json = serde_json::to_string(message).map_err(|e| TelegramError::Serialization(e.to_string()))?;
        let request = self.agent.post(&self.method_url("sendMessage"));

        self.execute(request, Some(&json))?;
        self.stats.messages_sent += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Delay before retry `attempt`: 100 ms doubled per attempt, capped at 30 s
fn retry_backoff(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(100u64.saturating_mul(factor).min(MAX_BACKOFF_MS))
}
