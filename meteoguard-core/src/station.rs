//! The station loop
//!
//! [`Station`] ties acquisition, the history ledger, rain alerts and the
//! loop scheduler together. The host calls [`Station::tick`] once per pass
//! of its main loop with the current monotonic time and acts on the
//! returned [`StationEvent`]s: answering chat messages, supervising the
//! network, sending notifications, restarting.
//!
//! Everything here runs on the one loop thread. Request handlers get
//! `&mut Station` for mutations and `&Station` for reads, so a reading is
//! never observed half-written.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::acquisition::Sampler;
use crate::alerts::{RainAlert, RainTransition};
use crate::config::StationConfig;
use crate::constants::{buffers::MAX_TICK_EVENTS, HISTORY_CAPACITY};
use crate::errors::StationResult;
use crate::ledger::HistoryLedger;
use crate::reading::Reading;
use crate::scheduler::{Scheduler, Task};
use crate::time::Timestamp;
use crate::traits::{Clock, SensorDriver};

/// Something the host should act on after a tick
#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    /// A reading was appended; `len` is the ledger size afterwards
    HistorySaved { len: usize },
    RainStarted(Reading),
    RainStopped(Reading),
    /// Time to poll the chat bot
    PollMessages,
    /// Time to check the network link
    CheckNetwork,
    /// A restart was requested since the last tick
    RebootRequested,
}

pub type StationEvents = Vec<StationEvent, MAX_TICK_EVENTS>;

pub struct Station<S, D, C, const N: usize = HISTORY_CAPACITY> {
    sampler: Sampler<S, D, C>,
    ledger: HistoryLedger<N>,
    rain_alert: RainAlert,
    scheduler: Scheduler,
    config: StationConfig,
    reboot_requested: bool,
}

impl<S, D, C, const N: usize> Station<S, D, C, N>
where
    S: SensorDriver,
    D: DelayNs,
    C: Clock,
{
    /// Validate `config`, move `clock` to the configured UTC offset, set up
    /// the loop timers from `now` and, unless disabled, calibrate the rain plate
    pub fn new(driver: S, delay: D, mut clock: C, config: StationConfig, now: Timestamp) -> StationResult<Self> {
        config.validate()?;
        clock.set_utc_offset(config.utc_offset_hours.into())?;

        let mut station = Self {
            sampler: Sampler::new(driver, delay, clock, &config),
            ledger: HistoryLedger::new(),
            rain_alert: RainAlert::new(config.rain_debounce_cycles),
            scheduler: Scheduler::new(&config, now),
            config,
            reboot_requested: false,
        };

        if station.config.calibrate_on_start {
            station.calibrate();
        }

        log_info!("Station started, rain threshold {}", station.threshold());
        Ok(station)
    }

    /// One pass of the main loop
    pub fn tick(&mut self, now: Timestamp) -> StationEvents {
        let mut events = StationEvents::new();

        for task in self.scheduler.due(now) {
            match task {
                Task::CheckNetwork => push(&mut events, StationEvent::CheckNetwork),
                Task::PollMessages => push(&mut events, StationEvent::PollMessages),
                Task::SaveHistory => self.save_history(now, &mut events),
            }
        }

        if core::mem::take(&mut self.reboot_requested) {
            push(&mut events, StationEvent::RebootRequested);
        }

        events
    }

    fn save_history(&mut self, now: Timestamp, events: &mut StationEvents) {
        let reading = self.sampler.acquire(now).clone();
        self.ledger.append(reading.clone());
        log_debug!("History saved, {} readings", self.ledger.len());
        push(events, StationEvent::HistorySaved { len: self.ledger.len() });

        match self.rain_alert.observe(reading.is_raining) {
            Some(RainTransition::Started) => {
                log_info!("Rain started, raw {}", reading.rain_raw);
                push(events, StationEvent::RainStarted(reading));
            }
            Some(RainTransition::Stopped) => {
                log_info!("Rain stopped, raw {}", reading.rain_raw);
                push(events, StationEvent::RainStopped(reading));
            }
            None => {}
        }
    }

    /// Current conditions, sampled unless the last sample is still fresh
    pub fn current(&mut self, now: Timestamp) -> &Reading {
        self.sampler.acquire(now)
    }

    /// Last reading without sampling
    pub fn latest(&self) -> &Reading {
        self.sampler.last()
    }

    /// Re-calibrate the rain plate, returning the new threshold
    pub fn calibrate(&mut self) -> u16 {
        self.sampler.calibrate()
    }

    pub fn set_threshold(&mut self, threshold: u16) {
        log_info!("Rain threshold set to {}", threshold);
        self.sampler.set_threshold(threshold);
    }

    pub fn threshold(&self) -> u16 {
        self.sampler.threshold()
    }

    pub fn ledger(&self) -> &HistoryLedger<N> {
        &self.ledger
    }

    /// Ask the host to restart on the next tick
    pub fn request_reboot(&mut self) {
        self.reboot_requested = true;
    }

    pub fn is_raining(&self) -> bool {
        self.rain_alert.is_raining()
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn sensor_faults(&self) -> u32 {
        self.sampler.faults()
    }

    /// Move the station clock to another time zone
    pub fn set_utc_offset(&mut self, hours: i32) -> StationResult<()> {
        self.sampler.clock_mut().set_utc_offset(hours)?;
        log_info!("UTC offset set to {}", hours);
        Ok(())
    }

    pub fn clock(&self) -> &C {
        self.sampler.clock()
    }

    pub fn clock_mut(&mut self) -> &mut C {
        self.sampler.clock_mut()
    }

    pub fn driver_mut(&mut self) -> &mut S {
        self.sampler.driver_mut()
    }
}

// MAX_TICK_EVENTS covers one of each event a single tick can produce
fn push(events: &mut StationEvents, event: StationEvent) {
    let _ = events.push(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::NoClock;

    struct Plate {
        rain: u16,
    }

    impl SensorDriver for Plate {
        fn read_temperature_raw(&mut self) -> f32 {
            18.5
        }

        fn read_humidity_raw(&mut self) -> f32 {
            70.0
        }

        fn read_rain_analog(&mut self) -> u16 {
            self.rain
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn station(config: StationConfig) -> Station<Plate, NoDelay, NoClock> {
        Station::new(Plate { rain: 300 }, NoDelay, NoClock, config, 0).unwrap()
    }

    #[test]
    fn calibrates_on_start() {
        assert_eq!(station(StationConfig::default()).threshold(), 400);

        let manual = station(StationConfig::default().with_calibrate_on_start(false));
        assert_eq!(manual.threshold(), 500);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = StationConfig::default().with_history_save_interval_ms(0);
        assert!(Station::<_, _, _>::new(Plate { rain: 0 }, NoDelay, NoClock, config, 0).is_err());
    }

    #[test]
    fn history_saved_on_interval() {
        let mut station = station(StationConfig::default());

        let events = station.tick(300_001);
        assert!(events.contains(&StationEvent::HistorySaved { len: 1 }));
        assert_eq!(station.ledger().len(), 1);

        assert!(station.tick(300_002).is_empty());
    }

    #[test]
    fn rain_transitions_reported() {
        let mut station = station(StationConfig::default());
        station.driver_mut().rain = 900;

        let events = station.tick(300_001);
        assert!(matches!(events.last(), Some(StationEvent::RainStarted(r)) if r.rain_raw == 900));

        station.driver_mut().rain = 300;
        let events = station.tick(600_002);
        assert!(matches!(events.last(), Some(StationEvent::RainStopped(_))));
        assert!(!station.is_raining());
    }

    #[test]
    fn reboot_reported_once() {
        let mut station = station(StationConfig::default());
        station.request_reboot();

        assert_eq!(station.tick(1).as_slice(), &[StationEvent::RebootRequested]);
        assert!(station.tick(2).is_empty());
    }

    #[test]
    fn threshold_override() {
        let mut station = station(StationConfig::default());
        station.set_threshold(800);
        station.driver_mut().rain = 801;

        assert!(station.current(0).is_raining);
        assert_eq!(station.latest().rain_raw, 801);
    }

    #[cfg(feature = "std")]
    #[test]
    fn configured_offset_applied_to_clock() {
        use crate::time::SystemClock;

        let config = StationConfig::default().with_utc_offset_hours(-5);
        let clock = SystemClock::new(0).unwrap();
        let station = Station::<_, _, _>::new(Plate { rain: 300 }, NoDelay, clock, config, 0).unwrap();

        assert_eq!(station.clock().utc_offset(), Some(-5));
    }
}
