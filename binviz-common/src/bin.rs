use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateParameters, AggregateResult};
use crate::brush::{validate_roles, Brush};
use crate::descriptor::BinRangeDescriptor;
use crate::error::BinvizCommonError;

/// Multi-dimensional bin index, one entry per binned axis. Encoded on the
/// wire as the comma separated indices, e.g. `"3,7"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BinIndex(pub Vec<i64>);

impl BinIndex {
    pub fn new(indices: impl Into<Vec<i64>>) -> Self {
        Self(indices.into())
    }

    pub fn get(&self, dim: usize) -> Option<i64> {
        self.0.get(dim).copied()
    }

    pub fn parse(key: &str) -> Result<Self, BinvizCommonError> {
        if key.trim().is_empty() {
            return Ok(Self::default());
        }
        key.split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map_err(|_| BinvizCommonError::InvalidBinKey(key.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for BinIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl TryFrom<String> for BinIndex {
    type Error = BinvizCommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BinIndex> for String {
    fn from(value: BinIndex) -> Self {
        value.to_string()
    }
}

/// Aggregate results of one bin, laid out parameter-major:
/// `results[parameter * brush_count + brush]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub results: Vec<Option<AggregateResult>>,
}

impl Bin {
    pub fn new(results: Vec<Option<AggregateResult>>) -> Self {
        Self { results }
    }
}

/// A completed backend response for one visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramResult {
    pub aggregate_parameters: Vec<AggregateParameters>,
    pub brushes: Vec<Brush>,
    pub x_bin_range: BinRangeDescriptor,
    pub y_bin_range: BinRangeDescriptor,
    #[serde(default)]
    pub bins: IndexMap<BinIndex, Bin>,
}

impl HistogramResult {
    /// Parses and validates a result
    pub fn from_json(value: serde_json::Value) -> Result<Self, BinvizCommonError> {
        for axis in ["x_bin_range", "y_bin_range"] {
            if let Some(descriptor) = value.get(axis) {
                BinRangeDescriptor::from_json(descriptor.clone())?;
            }
        }
        let result: Self = serde_json::from_value(value)?;
        result.validate()?;
        Ok(result)
    }

    /// Number of result slots every bin should hold
    pub fn expected_results(&self) -> usize {
        self.aggregate_parameters.len() * self.brushes.len()
    }

    /// Bins whose result array does not hold one slot per parameter and brush
    pub fn malformed_bins(&self) -> impl Iterator<Item = &BinIndex> + '_ {
        let expected = self.expected_results();
        self.bins
            .iter()
            .filter(move |(_, bin)| bin.results.len() != expected)
            .map(|(index, _)| index)
    }

    /// Checks brush role uniqueness. Bins with the wrong number of results
    /// are kept; their missing slots resolve to nothing.
    pub fn validate(&self) -> Result<(), BinvizCommonError> {
        validate_roles(&self.brushes)?;
        let expected = self.expected_results();
        for index in self.malformed_bins() {
            tracing::warn!(
                "bin {index} holds {} results, expected {expected}",
                self.bins[index].results.len()
            );
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}
