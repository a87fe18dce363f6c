use binviz_common::descriptor::BinRangeDescriptor;
use indexmap::IndexMap;

use crate::error::BinvizScaleError;
use crate::nice::nice_range;
use crate::temporal::TemporalBinRange;

/// Upper bound on the number of bins enumerated for one axis
pub const MAX_BIN_COUNT: usize = 10_000;

/// Axis label for one bin
#[derive(Debug, Clone, PartialEq)]
pub struct BinLabel {
    pub value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub label: String,
}

/// Discretization scheme of one axis
#[derive(Debug, Clone, PartialEq)]
pub enum BinRange {
    Quantitative(QuantitativeBinRange),
    Nominal(NominalBinRange),
    Alphabetic(AlphabeticBinRange),
    Temporal(TemporalBinRange),
}

impl BinRange {
    /// Builds the range described by a binned axis descriptor. Returns
    /// `Ok(None)` for the aggregate marker.
    pub fn from_descriptor(descriptor: &BinRangeDescriptor) -> Result<Option<Self>, BinvizScaleError> {
        let range = match descriptor {
            BinRangeDescriptor::Quantitative {
                min,
                max,
                step,
                is_integer,
            } => BinRange::Quantitative(QuantitativeBinRange::new(*min, *max, *step, *is_integer)),
            BinRangeDescriptor::Nominal { labels } => {
                BinRange::Nominal(NominalBinRange::new(labels.clone()))
            }
            BinRangeDescriptor::Alphabetic { labels, prefix } => {
                BinRange::Alphabetic(AlphabeticBinRange::new(labels.clone(), prefix.clone()))
            }
            BinRangeDescriptor::Temporal {
                min,
                max,
                step,
                granularity,
                timezone,
            } => BinRange::Temporal(TemporalBinRange::new(
                *min,
                *max,
                *step,
                *granularity,
                timezone.as_deref(),
            )?),
            BinRangeDescriptor::Aggregate => return Ok(None),
        };
        Ok(Some(range))
    }

    /// Start values of every bin, in order
    pub fn bins(&self) -> Vec<f64> {
        match self {
            BinRange::Quantitative(r) => r.bins(),
            BinRange::Nominal(r) => r.ordinals.bins(),
            BinRange::Alphabetic(r) => r.ordinals.bins(),
            BinRange::Temporal(r) => r.bins(),
        }
    }

    pub fn value_from_index(&self, index: i64) -> f64 {
        match self {
            BinRange::Quantitative(r) => r.value_from_index(index),
            BinRange::Nominal(_) | BinRange::Alphabetic(_) => index as f64,
            BinRange::Temporal(r) => r.value_from_index(index),
        }
    }

    /// Start of the bin following the one starting at `value`
    pub fn add_step(&self, value: f64) -> f64 {
        match self {
            BinRange::Quantitative(r) => value + r.step,
            BinRange::Nominal(_) | BinRange::Alphabetic(_) => value + 1.0,
            BinRange::Temporal(r) => r.add_step(value),
        }
    }

    /// Index of the bin containing `value`
    pub fn index_of(&self, value: f64) -> i64 {
        match self {
            BinRange::Quantitative(r) => r.index_of(value),
            BinRange::Nominal(_) | BinRange::Alphabetic(_) => value.floor() as i64,
            BinRange::Temporal(r) => r.index_of(value),
        }
    }

    pub fn label(&self, value: f64) -> String {
        match self {
            BinRange::Quantitative(r) => r.label(value),
            BinRange::Nominal(r) => r.ordinals.label(value).to_string(),
            BinRange::Alphabetic(r) => r.label(value),
            BinRange::Temporal(r) => r.label(value),
        }
    }

    /// `(value, bin start, bin end, display string)` for every bin
    pub fn labels(&self) -> Vec<BinLabel> {
        self.bins()
            .into_iter()
            .map(|value| BinLabel {
                value,
                min_value: value,
                max_value: self.add_step(value),
                label: self.label(value),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantitativeBinRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub is_integer: bool,
}

impl QuantitativeBinRange {
    pub fn new(min: f64, max: f64, step: f64, is_integer: bool) -> Self {
        Self {
            min,
            max,
            step,
            is_integer,
        }
    }

    /// Nice range around an observed span
    pub fn from_data(data_min: f64, data_max: f64, target_bins: usize, is_integer: bool) -> Self {
        let nice = nice_range(data_min, data_max, target_bins, is_integer);
        Self::new(nice.min, nice.max, nice.step, is_integer)
    }

    pub fn bin_count(&self) -> usize {
        if self.step <= 0.0 || !self.step.is_finite() {
            return 1;
        }
        let count = ((self.max - self.min) / self.step - 1e-9).ceil().max(1.0) as usize;
        count.min(MAX_BIN_COUNT)
    }

    pub fn bins(&self) -> Vec<f64> {
        (0..self.bin_count())
            .map(|i| self.value_from_index(i as i64))
            .collect()
    }

    pub fn value_from_index(&self, index: i64) -> f64 {
        self.min + index as f64 * self.step
    }

    pub fn index_of(&self, value: f64) -> i64 {
        if self.step <= 0.0 {
            return 0;
        }
        ((value - self.min) / self.step).floor() as i64
    }

    pub fn label(&self, value: f64) -> String {
        let decimals = if self.is_integer {
            0
        } else {
            decimals_for_step(self.step)
        };
        format!("{value:.decimals$}")
    }
}

/// Fraction digits needed to print multiples of `step` exactly
fn decimals_for_step(step: f64) -> usize {
    (0..=10)
        .find(|d| {
            let scaled = step * 10f64.powi(*d as i32);
            (scaled - scaled.round()).abs() < 1e-9 * scaled.abs().max(1.0)
        })
        .unwrap_or(10)
}

/// Ordinal values with labels; the bin index is the value
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalLabels {
    labels: IndexMap<i64, String>,
}

impl OrdinalLabels {
    fn new(mut labels: IndexMap<i64, String>) -> Self {
        labels.sort_keys();
        Self { labels }
    }

    fn bins(&self) -> Vec<f64> {
        self.labels
            .keys()
            .take(MAX_BIN_COUNT)
            .map(|k| *k as f64)
            .collect()
    }

    fn label(&self, value: f64) -> &str {
        self.labels
            .get(&(value.floor() as i64))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NominalBinRange {
    ordinals: OrdinalLabels,
}

impl NominalBinRange {
    pub fn new(labels: IndexMap<i64, String>) -> Self {
        Self {
            ordinals: OrdinalLabels::new(labels),
        }
    }

    pub fn raw_label(&self, value: f64) -> &str {
        self.ordinals.label(value)
    }
}

/// Strings grouped by leading characters after a shared `prefix`
#[derive(Debug, Clone, PartialEq)]
pub struct AlphabeticBinRange {
    ordinals: OrdinalLabels,
    prefix: String,
}

impl AlphabeticBinRange {
    pub fn new(labels: IndexMap<i64, String>, prefix: String) -> Self {
        Self {
            ordinals: OrdinalLabels::new(labels),
            prefix,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn label(&self, value: f64) -> String {
        format!("{}{}", self.prefix, self.ordinals.label(value))
    }
}
