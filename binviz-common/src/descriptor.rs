use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::BinvizCommonError;

/// Calendar unit a temporal axis is binned by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalGranularity {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Server supplied description of how one axis was binned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BinRangeDescriptor {
    Quantitative {
        min: f64,
        max: f64,
        step: f64,
        #[serde(default)]
        is_integer: bool,
    },
    Nominal {
        #[serde(deserialize_with = "deserialize_labels")]
        labels: IndexMap<i64, String>,
    },
    Alphabetic {
        #[serde(deserialize_with = "deserialize_labels")]
        labels: IndexMap<i64, String>,
        #[serde(default)]
        prefix: String,
    },
    Temporal {
        /// Milliseconds since the unix epoch
        min: f64,
        max: f64,
        step: i32,
        granularity: TemporalGranularity,
        #[serde(default)]
        timezone: Option<String>,
    },
    /// The axis is not binned, it shows an aggregate value
    Aggregate,
}

// Internally tagged enums buffer their content, which loses the string to
// integer key coercion serde_json does for maps.
fn deserialize_labels<'de, D>(deserializer: D) -> Result<IndexMap<i64, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = IndexMap::<String, String>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, label)| {
            key.parse::<i64>()
                .map(|value| (value, label))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

const KNOWN_SHAPES: &[&str] = &[
    "quantitative",
    "nominal",
    "alphabetic",
    "temporal",
    "aggregate",
];

impl BinRangeDescriptor {
    /// Parses a descriptor, reporting an unknown `type` tag as
    /// [`BinvizCommonError::UnrecognizedBinRange`]
    pub fn from_json(value: serde_json::Value) -> Result<Self, BinvizCommonError> {
        let shape = value
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or_default();
        if !KNOWN_SHAPES.contains(&shape) {
            return Err(BinvizCommonError::UnrecognizedBinRange(shape.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, BinRangeDescriptor::Aggregate)
    }
}
