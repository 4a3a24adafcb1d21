//! Integration tests for the chat bot
//!
//! Drives `ChatBot` against a real `Station` and delivers through a
//! recording connector:
//! - Authorization by chat id
//! - Every command and its station side effect
//! - Notifications for loop events

#![cfg(test)]

mod common;

use meteoguard_connectors::{chat::ParseMode, ChatBot, Connector, IncomingMessage};
use meteoguard_core::StationEvent;

use common::{station, RecordingConnector};

const CHAT: &str = "424242";

fn message(chat_id: &str, text: &str) -> IncomingMessage {
    IncomingMessage {
        update_id: 1,
        chat_id: chat_id.to_string(),
        text: text.to_string(),
    }
}

#[test]
fn test_foreign_chat_refused() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();

    let reply = bot.handle(&message("999", "/reboot"), &mut station, 0, None);

    assert_eq!(reply.chat_id, "999");
    assert!(reply.text.contains("Access denied"));
    assert!(station.tick(1).is_empty());
}

#[test]
fn test_menu_has_keyboard() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();

    for text in ["/start", "/help", "Menu"] {
        let reply = bot.handle(&message(CHAT, text), &mut station, 0, None);
        assert!(reply.reply_markup.is_some());
        assert_eq!(reply.parse_mode, Some(ParseMode::Markdown));
    }
}

#[test]
fn test_status_reports_current_reading() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();
    station.driver_mut().rain = 800;

    let reply = bot.handle(&message(CHAT, "/status"), &mut station, 0, Some(-70));

    assert!(reply.text.contains("21.0 °C"));
    assert!(reply.text.contains("48.0 %"));
    assert!(reply.text.contains("Raining"));
    assert!(reply.text.contains("-70 dBm"));
    assert!(reply.text.contains("12:00 15.05"));
}

#[test]
fn test_history_lists_last_five() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();

    for i in 1..=7u64 {
        station.driver_mut().temperature = i as f32 * 10.0;
        station.tick(i * 300_001);
    }

    let reply = bot.handle(&message(CHAT, "/history"), &mut station, 0, None);

    assert!(!reply.text.contains("20.0 °C"));
    assert!(reply.text.contains("30.0 °C"));
    assert!(reply.text.contains("70.0 °C"));
    assert_eq!(reply.text.matches("🕒").count(), 5);
}

#[test]
fn test_calibrate_reports_threshold() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();
    station.driver_mut().rain = 500;

    let reply = bot.handle(&message(CHAT, "/calibrate"), &mut station, 0, None);

    assert!(reply.text.contains("600"));
    assert_eq!(station.threshold(), 600);
}

#[test]
fn test_reboot_requests_restart() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();

    let reply = bot.handle(&message(CHAT, "/reboot"), &mut station, 0, None);
    assert!(reply.text.contains("Rebooting"));

    let events = station.tick(1);
    assert_eq!(events.as_slice(), &[StationEvent::RebootRequested]);
}

#[test]
fn test_unknown_command() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();

    let reply = bot.handle(&message(CHAT, "hello"), &mut station, 0, None);
    assert!(reply.text.contains("Unknown command"));
}

#[test]
fn test_rain_notifications_delivered() {
    let bot = ChatBot::new(CHAT);
    let mut station = station();
    let mut outbox = RecordingConnector::default();

    outbox.send(&bot.startup_notice("192.168.1.20")).unwrap();

    for (i, raw) in [900u16, 900, 100].iter().enumerate() {
        station.driver_mut().rain = *raw;
        for event in station.tick((i as u64 + 1) * 300_001) {
            if let Some(notice) = bot.notification(&event) {
                outbox.send(&notice).unwrap();
            }
        }
    }

    let texts: Vec<&str> = outbox.sent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts.len(), 3);
    assert!(texts[0].contains("192.168.1.20"));
    assert!(texts[1].contains("Rain started"));
    assert!(texts[2].contains("Rain stopped"));
    assert!(outbox.sent.iter().all(|m| m.chat_id == CHAT));
}
