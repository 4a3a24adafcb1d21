//! Outlier-Resistant Median Filtering
//!
//! ## Why a Median?
//!
//! Cheap single-wire sensors (DHT11/DHT22) occasionally return a single
//! wildly wrong sample: a bit flip in the transfer, a read taken while the
//! element was still settling. With three samples the median discards one
//! such spike completely, where a mean would drag the result halfway to it:
//!
//! ```text
//! samples: [21.0, 99.9, 21.3]
//! mean:    47.4   (useless)
//! median:  21.3   (spike rejected)
//! ```
//!
//! ## Non-Finite Samples
//!
//! A failed read reaches us as NaN. `median` drops non-finite samples before
//! sorting, so one or two failed reads out of three still yield a value. Only
//! when every sample failed is there no median at all.

use heapless::Vec;

/// Median of a triplet: sort ascending, take the middle element
///
/// Expects finite input; NaN sorts above every number under `total_cmp`.
pub fn median3(samples: [f32; 3]) -> f32 {
    let mut sorted = samples;
    sorted.sort_unstable_by(f32::total_cmp);
    sorted[1]
}

/// Median of the finite values in `samples`
///
/// With an even number of finite values the two middle values are averaged.
/// Returns `None` when no sample is finite.
pub fn median<const N: usize>(samples: &[f32; N]) -> Option<f32> {
    let mut finite: Vec<f32, N> = samples.iter().copied().filter(|v| v.is_finite()).collect();

    if finite.is_empty() {
        return None;
    }

    finite.sort_unstable_by(f32::total_cmp);

    let mid = finite.len() / 2;
    if finite.len() % 2 == 1 {
        Some(finite[mid])
    } else {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    }
}

/// Round to one decimal place, the resolution every view displays
pub fn round1(value: f32) -> f32 {
    libm::roundf(value * 10.0) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_outlier_rejected() {
        assert_eq!(median3([21.0, 99.9, 21.3]), 21.3);
        assert_eq!(median(&[21.0, 99.9, 21.3]), Some(21.3));
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(median3([3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median3([2.0, 3.0, 1.0]), 2.0);
    }

    #[test]
    fn nan_samples_dropped() {
        // One failed read: median of the remaining two
        assert_eq!(median(&[f32::NAN, 20.0, 22.0]), Some(21.0));

        // Two failed reads: the survivor
        assert_eq!(median(&[f32::NAN, 20.5, f32::INFINITY]), Some(20.5));

        // Nothing usable
        assert_eq!(median(&[f32::NAN; 3]), None);
    }

    #[test]
    fn rounding_to_one_decimal() {
        assert_eq!(round1(21.34), 21.3);
        assert_eq!(round1(21.36), 21.4);
        assert_eq!(round1(-0.04), 0.0);
    }
}
