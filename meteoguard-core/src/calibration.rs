//! Rain plate calibration
//!
//! The rain plate is a resistive grid: dry, it reads a board-specific
//! baseline; wet, the reading climbs by hundreds of counts. Calibration
//! samples the dry baseline and places the threshold a fixed margin above
//! it. Classification is a strict comparison with no hysteresis, so a value
//! sitting exactly on the threshold counts as dry.

use embedded_hal::delay::DelayNs;

use crate::traits::SensorDriver;

/// Threshold separating dry from wet rain plate readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RainCalibration {
    threshold: u16,
}

impl RainCalibration {
    pub const fn new(threshold: u16) -> Self {
        Self { threshold }
    }

    /// Threshold from a set of dry baseline samples: integer mean + margin
    ///
    /// An empty sample set leaves only the margin.
    pub fn from_baseline(samples: &[u16], margin: u16) -> Self {
        let sum = samples
            .iter()
            .fold(0u64, |acc, &s| acc.saturating_add(u64::from(s)));
        Self::from_sum(sum, samples.len() as u64, margin)
    }

    fn from_sum(sum: u64, count: u64, margin: u16) -> Self {
        let average = sum.checked_div(count).unwrap_or(0);
        let average = u16::try_from(average).unwrap_or(u16::MAX);
        Self::new(average.saturating_add(margin))
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn is_raining(&self, raw: u16) -> bool {
        raw > self.threshold
    }
}

/// Sample the rain plate and derive a fresh calibration
///
/// Blocks for `samples × delay_ms`. The caller decides when the plate is dry
/// enough for this to mean anything.
pub fn calibrate<S, D>(
    driver: &mut S,
    delay: &mut D,
    samples: usize,
    margin: u16,
    delay_ms: u32,
) -> RainCalibration
where
    S: SensorDriver + ?Sized,
    D: DelayNs + ?Sized,
{
    let mut sum: u64 = 0;
    for _ in 0..samples {
        sum = sum.saturating_add(u64::from(driver.read_rain_analog()));
        delay.delay_ms(delay_ms);
    }

    let calibration = RainCalibration::from_sum(sum, samples as u64, margin);

    log_info!("Rain sensor calibrated, threshold {}", calibration.threshold());
    calibration
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantRain(u16);

    impl SensorDriver for ConstantRain {
        fn read_temperature_raw(&mut self) -> f32 {
            20.0
        }

        fn read_humidity_raw(&mut self) -> f32 {
            50.0
        }

        fn read_rain_analog(&mut self) -> u16 {
            self.0
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn large_sample_count_does_not_overflow() {
        let calibration = calibrate(&mut ConstantRain(4095), &mut NoDelay, 1_100_000, 100, 0);
        assert_eq!(calibration.threshold(), 4195);

        let samples = [4095u16; 2_000];
        assert_eq!(RainCalibration::from_baseline(&samples, 0).threshold(), 4095);
    }

    #[test]
    fn baseline_plus_margin() {
        let samples = [290, 310, 300, 295, 305, 300, 300, 298, 302, 300];
        let calibration = RainCalibration::from_baseline(&samples, 100);

        assert_eq!(calibration.threshold(), 400);
        assert!(calibration.is_raining(401));
        assert!(!calibration.is_raining(400));
        assert!(!calibration.is_raining(399));
    }

    #[test]
    fn calibrate_reads_driver() {
        let calibration = calibrate(&mut ConstantRain(300), &mut NoDelay, 10, 100, 100);
        assert_eq!(calibration.threshold(), 400);
    }

    #[test]
    fn no_samples_leaves_margin() {
        assert_eq!(RainCalibration::from_baseline(&[], 100).threshold(), 100);
        assert_eq!(calibrate(&mut ConstantRain(300), &mut NoDelay, 0, 100, 0).threshold(), 100);
    }

    #[test]
    fn threshold_saturates() {
        assert_eq!(RainCalibration::from_baseline(&[u16::MAX], 100).threshold(), u16::MAX);
    }
}
