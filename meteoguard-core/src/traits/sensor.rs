//! Raw Sensor Driver Seam
//!
//! ## Contract
//!
//! The driver hands back exactly what the hardware reported. It does not
//! filter, retry or substitute values: a failed DHT read comes back as NaN
//! and the rain ADC value is passed through untouched. Outlier rejection and
//! fault handling belong to the acquisition layer.
//!
//! ## Example Implementation
//!
//! ```rust
//! use meteoguard_core::traits::SensorDriver;
//!
//! struct Bench {
//!     temperature: f32,
//! }
//!
//! impl SensorDriver for Bench {
//!     fn read_temperature_raw(&mut self) -> f32 {
//!         self.temperature
//!     }
//!
//!     fn read_humidity_raw(&mut self) -> f32 {
//!         f32::NAN // humidity element not fitted
//!     }
//!
//!     fn read_rain_analog(&mut self) -> u16 {
//!         0
//!     }
//! }
//! ```

/// Raw access to the temperature/humidity sensor and the rain plate ADC
pub trait SensorDriver {
    /// Air temperature in °C, or NaN when the read failed
    fn read_temperature_raw(&mut self) -> f32;

    /// Relative humidity in %, or NaN when the read failed
    fn read_humidity_raw(&mut self) -> f32;

    /// Raw rain plate ADC value in `0..=ADC_MAX`
    fn read_rain_analog(&mut self) -> u16;
}

impl<T: SensorDriver + ?Sized> SensorDriver for &mut T {
    fn read_temperature_raw(&mut self) -> f32 {
        (**self).read_temperature_raw()
    }

    fn read_humidity_raw(&mut self) -> f32 {
        (**self).read_humidity_raw()
    }

    fn read_rain_analog(&mut self) -> u16 {
        (**self).read_rain_analog()
    }
}
