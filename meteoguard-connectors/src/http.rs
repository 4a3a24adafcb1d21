//! HTTP routes for the station
//!
//! ## Overview
//!
//! The embedding web server parses requests into [`Request`] values and
//! writes [`Response`] values back; [`Router`] decides what each route does.
//! Nothing here touches sockets, so the same routes serve an ESP32 web
//! server, a host simulator and the tests.
//!
//! ## Routes
//!
//! | Path            | Effect                                              |
//! |-----------------|-----------------------------------------------------|
//! | `/`             | Dashboard; 429 if re-requested within 5 s           |
//! | `/sensor-data`  | Current reading as JSON                             |
//! | `/history-data` | Whole ledger as JSON                                |
//! | `/settz`        | `tz` and/or `rain_threshold`, then 303 to `/`       |
//! | `/calibrate`    | Recalibrate the rain plate, then 303 to `/`         |
//! | `/savewifi`     | POST + CSRF; store Wi-Fi credentials and reboot     |
//! | `/saveota`      | POST + CSRF; store OTA credentials, then 303 to `/` |
//! | `/reset`        | Request a reboot                                    |
//! | `/update`       | OTA upload gate, HTTP Basic (feature `ota`)         |
//!
//! ## Parameter Handling
//!
//! - An out-of-range `tz` is ignored
//! - `rain_threshold` is clamped to the ADC range
//! - Unparseable numbers are ignored

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use meteoguard_core::{
    constants::{ADC_MAX, WEB_UPDATE_INTERVAL_MS},
    Clock, SensorDriver, Station, Timestamp,
};

use crate::csrf::CsrfToken;
use crate::dashboard::{DashboardView, NetworkStatus};
use crate::json;
use crate::settings::{OtaSettings, SettingsError, SettingsStore, WifiSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

/// A parsed request: method, path, query/form parameters, headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Split a request target like `/settz?tz=3` into path and parameters
    pub fn from_target(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let mut request = Self::new(method, path);
        request.add_form(query);
        request
    }

    /// Add `application/x-www-form-urlencoded` parameters, e.g. a POST body
    pub fn add_form(&mut self, body: &str) {
        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.params.push((url_decode(name), url_decode(value)));
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a parameter
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header value, matched case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Percent-decode a form component; `+` is a space
pub fn url_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let pair = &bytes[i + 1..i + 3];
                let hex = pair
                    .iter()
                    .all(u8::is_ascii_hexdigit)
                    .then(|| std::str::from_utf8(pair).ok())
                    .flatten();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        decoded.push(byte);
                        i += 2;
                    }
                    None => decoded.push(b'%'),
                }
            }
            byte => decoded.push(byte),
        }
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, "text/html; charset=UTF-8", body)
    }

    /// JSON body, readable cross-origin
    pub fn json(body: impl Into<String>) -> Self {
        Self::new(200, "application/json", body).with_header("Access-Control-Allow-Origin", "*")
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, "text/plain; charset=UTF-8", body)
    }

    /// 303 See Other
    pub fn redirect(location: &str) -> Self {
        Self::new(303, "text/plain; charset=UTF-8", "").with_header("Location", location)
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not found")
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn storage_failure(err: SettingsError) -> Response {
    warn!("Settings storage failed: {err}");
    Response::text(500, "Settings storage error")
}

/// Maps requests onto station and settings operations
#[derive(Debug, Clone)]
pub struct Router {
    csrf: CsrfToken,
    network: NetworkStatus,
    page_interval_ms: u64,
    last_page: Option<Timestamp>,
}

impl Router {
    pub fn new(csrf: CsrfToken) -> Self {
        Self {
            csrf,
            network: NetworkStatus::default(),
            page_interval_ms: WEB_UPDATE_INTERVAL_MS,
            last_page: None,
        }
    }

    /// Minimum spacing between dashboard renders
    pub fn with_page_interval_ms(mut self, ms: u64) -> Self {
        self.page_interval_ms = ms;
        self
    }

    pub fn set_network(&mut self, network: NetworkStatus) {
        self.network = network;
    }

    pub fn csrf(&self) -> &CsrfToken {
        &self.csrf
    }

    pub fn handle<S, D, C, St, const N: usize>(
        &mut self,
        request: &Request,
        station: &mut Station<S, D, C, N>,
        settings: &mut St,
        now: Timestamp,
    ) -> Response
    where
        S: SensorDriver,
        D: DelayNs,
        C: Clock,
        St: SettingsStore + ?Sized,
    {
        match request.path.as_str() {
            "/" => self.dashboard(station, settings, now),
            "/sensor-data" => {
                let threshold = station.threshold();
                json_response(json::sensor_data(station.current(now), threshold))
            }
            "/history-data" => json_response(json::history_data(station.ledger())),
            "/settz" => set_time_zone(request, station),
            "/calibrate" => {
                let threshold = station.calibrate();
                info!("Calibrated from web, threshold {threshold}");
                Response::redirect("/")
            }
            "/savewifi" => self.save_wifi(request, station, settings),
            "/saveota" => self.save_ota(request, settings),
            "/reset" => {
                station.request_reboot();
                Response::text(200, "Rebooting...")
            }
            #[cfg(feature = "ota")]
            "/update" => update_gate(request, settings),
            _ => Response::not_found(),
        }
    }

    fn dashboard<S, D, C, St, const N: usize>(
        &mut self,
        station: &mut Station<S, D, C, N>,
        settings: &mut St,
        now: Timestamp,
    ) -> Response
    where
        S: SensorDriver,
        D: DelayNs,
        C: Clock,
        St: SettingsStore + ?Sized,
    {
        if let Some(last) = self.last_page {
            if now.saturating_sub(last) <= self.page_interval_ms {
                return Response::text(429, "Please wait...");
            }
        }

        let wifi = match settings.wifi_or_default() {
            Ok(wifi) => wifi,
            Err(err) => return storage_failure(err),
        };
        let ota = match settings.ota_or_default() {
            Ok(ota) => ota,
            Err(err) => return storage_failure(err),
        };

        let reading = station.current(now).clone();
        let view = DashboardView {
            reading: &reading,
            threshold: station.threshold(),
            ledger: station.ledger(),
            network: &self.network,
            wifi: &wifi,
            ota: &ota,
            csrf: &self.csrf,
            utc_offset: station.clock().utc_offset(),
        };

        self.last_page = Some(now);
        Response::html(view.render())
    }

    fn save_wifi<S, D, C, St, const N: usize>(
        &self,
        request: &Request,
        station: &mut Station<S, D, C, N>,
        settings: &mut St,
    ) -> Response
    where
        S: SensorDriver,
        D: DelayNs,
        C: Clock,
        St: SettingsStore + ?Sized,
    {
        if let Some(rejected) = self.check_form(request) {
            return rejected;
        }

        let wifi = match WifiSettings::new(
            request.arg("ssid").unwrap_or_default(),
            request.arg("password").unwrap_or_default(),
        ) {
            Ok(wifi) => wifi,
            Err(err) => return Response::text(400, err.to_string()),
        };

        if let Err(err) = settings.save_wifi(&wifi) {
            return storage_failure(err);
        }

        info!("Wi-Fi settings saved for {}", wifi.ssid());
        station.request_reboot();
        Response::text(200, "Wi-Fi settings saved! Rebooting...")
    }

    fn save_ota<St>(&self, request: &Request, settings: &mut St) -> Response
    where
        St: SettingsStore + ?Sized,
    {
        if let Some(rejected) = self.check_form(request) {
            return rejected;
        }

        let ota = match OtaSettings::new(
            request.arg("ota_user").unwrap_or_default(),
            request.arg("ota_pass").unwrap_or_default(),
        ) {
            Ok(ota) => ota,
            Err(err) => return Response::text(400, err.to_string()),
        };

        if let Err(err) = settings.save_ota(&ota) {
            return storage_failure(err);
        }

        info!("OTA credentials updated");
        Response::redirect("/")
    }

    /// CSRF first, then method: GET passes CSRF and fails on method
    fn check_form(&self, request: &Request) -> Option<Response> {
        if !self.csrf.verify(request.method, request.arg("csrf")) {
            warn!("Rejected {} with bad CSRF token", request.path);
            return Some(Response::text(403, "CSRF token error"));
        }
        if request.method != Method::Post {
            return Some(Response::text(400, "Invalid request method"));
        }
        None
    }
}

fn json_response(body: Result<String, crate::ConnectorError>) -> Response {
    match body {
        Ok(body) => Response::json(body),
        Err(err) => {
            warn!("JSON encoding failed: {err}");
            Response::text(500, "Encoding error")
        }
    }
}

fn set_time_zone<S, D, C, const N: usize>(request: &Request, station: &mut Station<S, D, C, N>) -> Response
where
    S: SensorDriver,
    D: DelayNs,
    C: Clock,
{
    if let Some(tz) = request.arg("tz").and_then(|v| v.trim().parse::<i32>().ok()) {
        if let Err(err) = station.set_utc_offset(tz) {
            warn!("Ignoring time zone: {err}");
        }
    }

    if let Some(raw) = request.arg("rain_threshold").and_then(|v| v.trim().parse::<i64>().ok()) {
        station.set_threshold(raw.clamp(0, ADC_MAX as i64) as u16);
    }

    Response::redirect("/")
}

#[cfg(feature = "ota")]
fn update_gate<St>(request: &Request, settings: &mut St) -> Response
where
    St: SettingsStore + ?Sized,
{
    let ota = match settings.ota_or_default() {
        Ok(ota) => ota,
        Err(err) => return storage_failure(err),
    };

    if crate::ota::authorize(request.header_value("Authorization"), &ota) {
        Response::text(200, "Ready for firmware upload")
    } else {
        Response::text(401, "Authentication required")
            .with_header("WWW-Authenticate", "Basic realm=\"MeteoStation\"")
    }
}
