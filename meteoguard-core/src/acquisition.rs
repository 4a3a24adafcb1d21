//! Median-filtered sensor acquisition
//!
//! Each acquisition takes [`SAMPLES_PER_CHANNEL`] raw temperature and
//! humidity samples with a settling delay after each pair, reduces each
//! channel to its median, reads the rain plate once and stamps the result
//! with the local time label. Calls arriving within the minimum sampling
//! interval get the previous reading back untouched.
//!
//! Non-finite raw samples are dropped before the median. A channel with no
//! finite sample keeps its previous value and counts as a sensor fault.

use embedded_hal::delay::DelayNs;

use crate::calibration::{self, RainCalibration};
use crate::config::StationConfig;
use crate::constants::SAMPLES_PER_CHANNEL;
use crate::errors::{Channel, StationError};
use crate::filter;
use crate::reading::Reading;
use crate::time::{TimeLabel, Timestamp};
use crate::traits::{Clock, SensorDriver};

/// Owns the sensor driver and produces [`Reading`]s from it
pub struct Sampler<S, D, C> {
    driver: S,
    delay: D,
    clock: C,
    calibration: RainCalibration,
    min_interval_ms: u64,
    settle_delay_ms: u32,
    calibration_samples: usize,
    calibration_margin: u16,
    calibration_delay_ms: u32,
    last: Reading,
    last_sampled_at: Option<Timestamp>,
    faults: u32,
}

impl<S, D, C> Sampler<S, D, C>
where
    S: SensorDriver,
    D: DelayNs,
    C: Clock,
{
    pub fn new(driver: S, delay: D, clock: C, config: &StationConfig) -> Self {
        Self {
            driver,
            delay,
            clock,
            calibration: RainCalibration::new(config.initial_rain_threshold),
            min_interval_ms: config.min_sample_interval_ms,
            settle_delay_ms: config.settle_delay_ms,
            calibration_samples: config.calibration_samples,
            calibration_margin: config.calibration_margin,
            calibration_delay_ms: config.calibration_delay_ms,
            last: Reading::unavailable(),
            last_sampled_at: None,
            faults: 0,
        }
    }

    /// Produce a reading, sampling the hardware only if the last sample is
    /// at least the minimum interval old
    ///
    /// The very first call always samples.
    pub fn acquire(&mut self, now: Timestamp) -> &Reading {
        if let Some(at) = self.last_sampled_at {
            if now.saturating_sub(at) < self.min_interval_ms {
                return &self.last;
            }
        }

        self.sample(now)
    }

    /// Sample the hardware regardless of the rate limit
    pub fn sample(&mut self, now: Timestamp) -> &Reading {
        let mut temperatures = [f32::NAN; SAMPLES_PER_CHANNEL];
        let mut humidities = [f32::NAN; SAMPLES_PER_CHANNEL];

        for i in 0..SAMPLES_PER_CHANNEL {
            temperatures[i] = self.driver.read_temperature_raw();
            humidities[i] = self.driver.read_humidity_raw();
            self.delay.delay_ms(self.settle_delay_ms);
        }

        let previous = (self.last.temperature, self.last.humidity);
        let temperature = self.filter_channel(Channel::Temperature, &temperatures, previous.0);
        let humidity = self.filter_channel(Channel::Humidity, &humidities, previous.1);

        let rain_raw = self.driver.read_rain_analog();
        let is_raining = self.calibration.is_raining(rain_raw);

        let timestamp = TimeLabel::from_clock(self.clock.now_local());

        log_debug!(
            "Sampled t={} h={} rain={} raining={}",
            temperature,
            humidity,
            rain_raw,
            is_raining
        );

        self.last = Reading::new(temperature, humidity, is_raining, rain_raw, timestamp);
        self.last_sampled_at = Some(now);
        &self.last
    }

    fn filter_channel(
        &mut self,
        channel: Channel,
        samples: &[f32; SAMPLES_PER_CHANNEL],
        previous: f32,
    ) -> f32 {
        match filter::median(samples) {
            Some(value) => value,
            None => {
                self.faults = self.faults.saturating_add(1);
                log_warn!(
                    "{}, keeping previous value",
                    StationError::SensorFault { channel }
                );
                previous
            }
        }
    }

    /// Re-derive the rain threshold from the current dry baseline
    pub fn calibrate(&mut self) -> u16 {
        self.calibration = calibration::calibrate(
            &mut self.driver,
            &mut self.delay,
            self.calibration_samples,
            self.calibration_margin,
            self.calibration_delay_ms,
        );
        self.calibration.threshold()
    }

    /// Operator override of the threshold; the next calibration replaces it
    pub fn set_threshold(&mut self, threshold: u16) {
        self.calibration = RainCalibration::new(threshold);
    }

    pub fn threshold(&self) -> u16 {
        self.calibration.threshold()
    }

    pub fn calibration(&self) -> RainCalibration {
        self.calibration
    }

    /// Last produced reading without touching the hardware
    pub fn last(&self) -> &Reading {
        &self.last
    }

    /// Acquisitions where at least one channel had no finite sample
    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn driver_mut(&mut self) -> &mut S {
        &mut self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{FixedClock, LocalTime, NoClock};

    struct Script {
        temperatures: [f32; 3],
        humidities: [f32; 3],
        rain: u16,
        cursor: usize,
        temperature_reads: usize,
    }

    impl Script {
        fn new(temperatures: [f32; 3], humidities: [f32; 3], rain: u16) -> Self {
            Self {
                temperatures,
                humidities,
                rain,
                cursor: 0,
                temperature_reads: 0,
            }
        }
    }

    impl SensorDriver for Script {
        fn read_temperature_raw(&mut self) -> f32 {
            self.temperature_reads += 1;
            self.temperatures[self.cursor % 3]
        }

        fn read_humidity_raw(&mut self) -> f32 {
            let value = self.humidities[self.cursor % 3];
            self.cursor += 1;
            value
        }

        fn read_rain_analog(&mut self) -> u16 {
            self.rain
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ms: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += (ns / 1_000_000) as u64;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms as u64;
        }
    }

    fn sampler(script: Script) -> Sampler<Script, CountingDelay, NoClock> {
        Sampler::new(script, CountingDelay::default(), NoClock, &StationConfig::default())
    }

    #[test]
    fn median_rejects_spike() {
        let script = Script::new([21.0, 99.9, 21.3], [55.0, 56.0, 54.0], 100);
        let mut sampler = sampler(script);

        let reading = sampler.acquire(0).clone();
        assert_eq!(reading.temperature, 21.3);
        assert_eq!(reading.humidity, 55.0);
        assert!(!reading.is_raining);
        assert_eq!(sampler.delay.total_ms, 300);
    }

    #[test]
    fn rate_limited_within_interval() {
        let mut sampler = sampler(Script::new([20.0; 3], [50.0; 3], 100));

        sampler.acquire(10_000);
        sampler.acquire(11_999);
        assert_eq!(sampler.driver_mut().temperature_reads, 3);

        sampler.acquire(12_000);
        assert_eq!(sampler.driver_mut().temperature_reads, 6);
    }

    #[test]
    fn nan_channel_carries_previous_value() {
        let mut sampler = sampler(Script::new([20.0; 3], [50.0; 3], 100));
        sampler.acquire(0);

        sampler.driver_mut().temperatures = [f32::NAN; 3];
        let reading = sampler.acquire(5_000).clone();

        assert_eq!(reading.temperature, 20.0);
        assert_eq!(reading.humidity, 50.0);
        assert_eq!(sampler.faults(), 1);
    }

    #[test]
    fn single_nan_sample_ignored() {
        let mut sampler = sampler(Script::new([20.0, f32::NAN, 22.0], [50.0; 3], 100));
        assert_eq!(sampler.acquire(0).temperature, 21.0);
        assert_eq!(sampler.faults(), 0);
    }

    #[test]
    fn rain_uses_threshold() {
        let mut sampler = sampler(Script::new([20.0; 3], [50.0; 3], 401));
        sampler.set_threshold(400);
        assert!(sampler.acquire(0).is_raining);

        sampler.driver_mut().rain = 400;
        assert!(!sampler.sample(1).is_raining);
    }

    #[test]
    fn calibration_from_driver() {
        let mut sampler = sampler(Script::new([20.0; 3], [50.0; 3], 300));
        assert_eq!(sampler.calibrate(), 400);
        assert_eq!(sampler.delay.total_ms, 1_000);
    }

    #[test]
    fn timestamp_from_clock() {
        let clock = FixedClock::new(LocalTime::new(14, 5, 3, 7).unwrap());
        let mut sampler = Sampler::new(
            Script::new([20.0; 3], [50.0; 3], 0),
            CountingDelay::default(),
            clock,
            &StationConfig::default(),
        );

        assert_eq!(sampler.acquire(0).timestamp.as_str(), "14:05 03.07");
    }

    #[test]
    fn unsynchronized_clock_uses_sentinel() {
        let mut sampler = sampler(Script::new([20.0; 3], [50.0; 3], 0));
        assert_eq!(sampler.acquire(0).timestamp.as_str(), "--:-- --.--");
    }
}
