//! Host simulation of a weather station
//!
//! Runs the station loop against a simulated board on accelerated time,
//! answers a few HTTP requests and chat commands, and prints what a real
//! deployment would send.
//!
//! ```text
//! RUST_LOG=debug cargo run -p meteoguard-connectors --example host_station
//! ```

use std::convert::Infallible;
use std::f32::consts::PI;

use embedded_hal::delay::DelayNs;
use log::info;
use meteoguard_connectors::{
    dashboard::NetworkStatus, load_station_config, ChatBot, Connector, CsrfToken, IncomingMessage,
    MemoryStore, OutgoingMessage, Request, Router,
};
use meteoguard_core::{
    time::{MockTimeSource, SystemClock},
    SensorDriver, Station, StationEvent, TimeSource,
};
use rand::Rng;

/// Board with a slow temperature swing, sensor noise and a shower
struct SimulatedBoard {
    minute: u32,
    rng: rand::rngs::ThreadRng,
}

impl SimulatedBoard {
    fn raining(&self) -> bool {
        (40..70).contains(&self.minute)
    }
}

impl SensorDriver for SimulatedBoard {
    fn read_temperature_raw(&mut self) -> f32 {
        // Occasional wild sample for the median to reject
        if self.rng.gen_ratio(1, 20) {
            return 85.0;
        }
        let phase = self.minute as f32 / 120.0 * 2.0 * PI;
        18.0 + 4.0 * phase.sin() + self.rng.gen_range(-0.2..0.2)
    }

    fn read_humidity_raw(&mut self) -> f32 {
        if self.rng.gen_ratio(1, 30) {
            return f32::NAN;
        }
        let base = if self.raining() { 92.0 } else { 60.0 };
        base + self.rng.gen_range(-1.0..1.0)
    }

    fn read_rain_analog(&mut self) -> u16 {
        let base = if self.raining() { 1_400 } else { 300 };
        base + self.rng.gen_range(0..20)
    }
}

struct InstantDelay;

impl DelayNs for InstantDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Prints messages instead of delivering them
struct ConsoleConnector;

impl Connector for ConsoleConnector {
    type Error = Infallible;

    fn send(&mut self, message: &OutgoingMessage) -> Result<(), Self::Error> {
        println!("--> chat {}\n{}\n", message.chat_id, message.text);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_station_config(
        r#"{ "history_save_interval_ms": 600000, "utc_offset_hours": 3, "rain_debounce_cycles": 1 }"#,
    )?;
    let clock = SystemClock::new(config.utc_offset_hours)?;
    let time = MockTimeSource::new(0);

    let board = SimulatedBoard {
        minute: 0,
        rng: rand::thread_rng(),
    };
    let mut station: Station<_, _, _> = Station::new(board, InstantDelay, clock, config, time.now())?;

    let mut store = MemoryStore::new();
    let mut router = Router::new(CsrfToken::generate());
    router.set_network(NetworkStatus {
        address: "192.168.1.50".into(),
        rssi: Some(-58),
        access_point: false,
    });

    let bot = ChatBot::new("1001");
    let mut chat = ConsoleConnector;
    chat.send(&bot.startup_notice("192.168.1.50"))?;

    let script = [
        (15, "/status"),
        (45, "/history"),
        (90, "/calibrate"),
        (100, "/history"),
    ];

    for minute in 0..120u32 {
        time.advance(60_000);
        station.driver_mut().minute = minute;

        for event in station.tick(time.now()) {
            match &event {
                StationEvent::HistorySaved { len } => info!("History holds {len} readings"),
                StationEvent::PollMessages => {
                    for (at, text) in script.iter().filter(|(at, _)| *at == minute) {
                        let incoming = IncomingMessage {
                            update_id: *at as i64,
                            chat_id: "1001".into(),
                            text: text.to_string(),
                        };
                        let reply = bot.handle(&incoming, &mut station, time.now(), Some(-58));
                        chat.send(&reply)?;
                    }
                }
                _ => {}
            }

            if let Some(notice) = bot.notification(&event) {
                chat.send(&notice)?;
            }
        }
    }

    let feed = router.handle(&Request::get("/sensor-data"), &mut station, &mut store, time.now());
    println!("GET /sensor-data -> {} {}", feed.status, feed.body);

    let history = router.handle(&Request::get("/history-data"), &mut station, &mut store, time.now());
    println!("GET /history-data -> {} ({} bytes)", history.status, history.body.len());

    let page = router.handle(&Request::get("/"), &mut station, &mut store, time.now());
    println!("GET / -> {} ({} bytes)", page.status, page.body.len());

    info!("Sensor faults during run: {}", station.sensor_faults());
    Ok(())
}
