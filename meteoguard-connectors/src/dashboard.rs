//! Server-rendered dashboard
//!
//! Produces the dynamic parts of the station page: current-reading cards,
//! the history table, chart series and the settings forms. Every string
//! that came from outside (time labels, SSIDs, usernames) is HTML escaped.
//! Styling is left to the embedding page.

use std::fmt::Write;

use meteoguard_core::{
    constants::time::{MAX_UTC_OFFSET_HOURS, MIN_UTC_OFFSET_HOURS},
    HistoryLedger, Reading,
};
use serde::Serialize;

use crate::chat::format_value;
use crate::csrf::CsrfToken;
use crate::json::display_value;
use crate::settings::{OtaSettings, WifiSettings, MAX_OTA_PASSWORD_LEN, MAX_OTA_USER_LEN, MAX_SSID_LEN, MAX_WIFI_PASSWORD_LEN};

/// How the station is attached to the network
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkStatus {
    pub address: String,
    /// Signal strength in dBm, when connected to an access point
    pub rssi: Option<i32>,
    /// Running its own setup access point
    pub access_point: bool,
}

/// Chart data, one entry per ledger reading, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub temperatures: Vec<Option<f32>>,
    pub humidities: Vec<Option<f32>>,
    pub rain: Vec<bool>,
}

impl ChartSeries {
    pub fn from_ledger<const N: usize>(ledger: &HistoryLedger<N>) -> Self {
        let mut series = Self::default();
        for reading in ledger.all() {
            series.labels.push(reading.timestamp.as_str().to_string());
            series.temperatures.push(display_value(reading.temperature));
            series.humidities.push(display_value(reading.humidity));
            series.rain.push(reading.is_raining);
        }
        series
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Temperature, humidity and rain cards
pub fn reading_cards(reading: &Reading, threshold: u16) -> String {
    let mut html = String::from("<div class=\"dashboard\">");

    let _ = write!(
        html,
        "<div class=\"card temperature\"><h2>Temperature</h2><div class=\"card-value\">{} °C</div></div>",
        format_value(reading.temperature)
    );
    let _ = write!(
        html,
        "<div class=\"card humidity\"><h2>Humidity</h2><div class=\"card-value\">{} %</div></div>",
        format_value(reading.humidity)
    );

    let (class, status) = if reading.is_raining {
        ("status-rain", "Raining")
    } else {
        ("status-dry", "Dry")
    };
    let _ = write!(
        html,
        "<div class=\"card rain\"><h2>Rain</h2><div class=\"card-value\">{}</div>\
         <div class=\"card-status {class}\">{status}</div>\
         <p class=\"card-description\">Threshold: {threshold}</p></div>",
        reading.rain_raw
    );

    html.push_str("</div>");
    html
}

/// `<tr>` rows for the history table, oldest first
pub fn history_rows<const N: usize>(ledger: &HistoryLedger<N>) -> String {
    let mut html = String::new();
    for reading in ledger.all() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{} °C</td><td>{} %</td><td>{}</td></tr>",
            escape_html(reading.timestamp.as_str()),
            format_value(reading.temperature),
            format_value(reading.humidity),
            if reading.is_raining { "Yes" } else { "No" }
        );
    }
    html
}

/// Everything the page shows, borrowed from the station and settings
pub struct DashboardView<'a, const N: usize> {
    pub reading: &'a Reading,
    pub threshold: u16,
    pub ledger: &'a HistoryLedger<N>,
    pub network: &'a NetworkStatus,
    pub wifi: &'a WifiSettings,
    pub ota: &'a OtaSettings,
    pub csrf: &'a CsrfToken,
    pub utc_offset: Option<i8>,
}

impl<const N: usize> DashboardView<'_, N> {
    pub fn render(&self) -> String {
        let mut html = String::from(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
             <title>Weather station</title></head><body><div class=\"container\">",
        );

        if self.network.access_point {
            html.push_str(
                "<div class=\"alert alert-warning\"><h3>Wi-Fi setup mode</h3>\
                 <p>The station is not connected to Wi-Fi. Configure a network below.</p></div>",
            );
        }

        let signal = match (self.network.access_point, self.network.rssi) {
            (true, _) => "Access point".to_string(),
            (false, Some(rssi)) => format!("{rssi} dBm"),
            (false, None) => "--".to_string(),
        };
        let _ = write!(
            html,
            "<div class=\"info-bar\"><div>{}</div><div>Last update: {}</div><div>{}</div></div>",
            escape_html(&self.network.address),
            escape_html(self.reading.timestamp.as_str()),
            signal
        );

        html.push_str(&reading_cards(self.reading, self.threshold));
        self.render_forms(&mut html);

        html.push_str(
            "<div class=\"control-panel\"><h3>History</h3>\
             <div class=\"chart-container\"><canvas id=\"historyChart\"></canvas></div>\
             <table><thead><tr><th>Time</th><th>Temp.</th><th>Hum.</th><th>Rain</th></tr></thead><tbody>",
        );
        html.push_str(&history_rows(self.ledger));
        html.push_str("</tbody></table></div>");

        let series = serde_json::to_string(&ChartSeries::from_ledger(self.ledger)).unwrap_or_else(|_| "{}".into());
        // JSON inside a script element must not close it
        let _ = write!(
            html,
            "<script>const chartSeries = {};</script>",
            series.replace("</", "<\\/")
        );

        html.push_str("</div></body></html>");
        html
    }

    fn render_forms(&self, html: &mut String) {
        let csrf = self.csrf.as_str();

        let _ = write!(
            html,
            "<div class=\"controls\"><form action=\"/savewifi\" method=\"post\">\
             <input type=\"hidden\" name=\"csrf\" value=\"{csrf}\">\
             <input type=\"text\" name=\"ssid\" value=\"{}\" maxlength=\"{MAX_SSID_LEN}\" required>\
             <input type=\"password\" name=\"password\" maxlength=\"{MAX_WIFI_PASSWORD_LEN}\">\
             <button type=\"submit\">Save</button></form>",
            escape_html(self.wifi.ssid())
        );

        html.push_str("<form action=\"/settz\" method=\"get\"><select name=\"tz\">");
        for offset in MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS {
            let selected = if Some(offset) == self.utc_offset { " selected" } else { "" };
            let _ = write!(html, "<option value=\"{offset}\"{selected}>UTC{offset:+}</option>");
        }
        let _ = write!(
            html,
            "</select><input type=\"number\" name=\"rain_threshold\" value=\"{}\">\
             <button type=\"submit\">Update</button></form>\
             <form action=\"/calibrate\" method=\"get\"><button type=\"submit\">Calibrate sensor</button></form>",
            self.threshold
        );

        let _ = write!(
            html,
            "<form action=\"/saveota\" method=\"post\">\
             <input type=\"hidden\" name=\"csrf\" value=\"{csrf}\">\
             <input type=\"text\" name=\"ota_user\" value=\"{}\" maxlength=\"{MAX_OTA_USER_LEN}\" required>\
             <input type=\"password\" name=\"ota_pass\" maxlength=\"{MAX_OTA_PASSWORD_LEN}\" required>\
             <button type=\"submit\">Save</button></form>\
             <form action=\"/reset\" method=\"get\"><button type=\"submit\">Reboot</button></form></div>",
            escape_html(self.ota.username())
        );
    }
}
