//! "Nice" quantitative binning of an observed data span.
//!
//! The error thresholds come from empirical nice-number tables and are kept
//! as is so bin boundaries match the backend's.

/// Amount added to `data_max` when the observed span is empty
pub const EQUAL_BOUNDS_EPSILON: f64 = 0.1;

/// Relative widening used when `EQUAL_BOUNDS_EPSILON` is lost to the
/// magnitude of the bounds
pub const RELATIVE_BOUNDS_EPSILON: f64 = 1e-9;

/// `(error threshold, step multiplier)` pairs, checked in order
pub const NICE_ERROR_THRESHOLDS: [(f64, f64); 3] = [(0.15, 10.0), (0.35, 5.0), (0.75, 2.0)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NiceRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NiceRange {
    pub fn bin_count(&self) -> usize {
        if self.step <= 0.0 {
            return 0;
        }
        ((self.max - self.min) / self.step).round().max(0.0) as usize
    }
}

/// Snaps `[data_min, data_max]` outward to multiples of a round step giving
/// roughly `target_bins` bins
pub fn nice_range(data_min: f64, data_max: f64, target_bins: usize, is_integer: bool) -> NiceRange {
    if !data_min.is_finite() || !data_max.is_finite() {
        return NiceRange {
            min: 0.0,
            max: 1.0,
            step: 1.0,
        };
    }
    let (data_min, mut data_max) = if data_min <= data_max {
        (data_min, data_max)
    } else {
        (data_max, data_min)
    };
    if data_min == data_max {
        data_max += EQUAL_BOUNDS_EPSILON;
        if data_max == data_min {
            data_max += data_min.abs() * RELATIVE_BOUNDS_EPSILON;
        }
    }

    let target = target_bins.max(1) as f64;
    let span = data_max - data_min;
    let mut step = 10f64.powf((span / target).log10().floor());
    let err = target / span * step;

    if let Some((_, multiplier)) = NICE_ERROR_THRESHOLDS
        .iter()
        .find(|(threshold, _)| err <= *threshold)
    {
        step *= multiplier;
    }

    if is_integer {
        step = step.ceil();
    }

    NiceRange {
        min: (data_min / step).floor() * step,
        max: (data_max / step).floor() * step + step,
        step,
    }
}
