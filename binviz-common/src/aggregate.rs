use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::transform::{AggregateFunction, AxisTransform};

/// Kind of an aggregate computation. Parameter lookup matches on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Count,
    Sum,
    Average,
    SumEstimation,
    Margin,
}

/// Fields shared by the plain aggregate computations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateFields {
    pub attribute: Arc<Attribute>,
    #[serde(default)]
    pub distinct: Option<Arc<Attribute>>,
}

/// Margin-of-error companion of a primary aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginParameters {
    #[serde(default)]
    pub attribute: Option<Arc<Attribute>>,
    #[serde(default)]
    pub function: AggregateFunction,
    #[serde(default)]
    pub distinct: Option<Arc<Attribute>>,
}

/// One aggregate the backend computes for every bin and brush
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregateParameters {
    Count(AggregateFields),
    Sum(AggregateFields),
    Average(AggregateFields),
    SumEstimation(AggregateFields),
    Margin(MarginParameters),
}

impl AggregateParameters {
    /// Parameters computing the primary aggregate of `transform`. `None` and
    /// functions without a backend counterpart yield no parameters.
    pub fn for_transform(
        transform: &AxisTransform,
        distinct: Option<&Arc<Attribute>>,
    ) -> Option<Self> {
        let fields = AggregateFields {
            attribute: transform.attribute.clone(),
            distinct: distinct.cloned(),
        };
        match transform.aggregate {
            AggregateFunction::Count => Some(AggregateParameters::Count(fields)),
            AggregateFunction::Sum => Some(AggregateParameters::Sum(fields)),
            AggregateFunction::Average => Some(AggregateParameters::Average(fields)),
            AggregateFunction::None | AggregateFunction::SumE => None,
        }
    }

    /// Margin parameters with function and attribute taken from `transform`
    pub fn margin_for(transform: &AxisTransform, template: &MarginParameters) -> Self {
        AggregateParameters::Margin(MarginParameters {
            attribute: Some(transform.attribute.clone()),
            function: transform.aggregate,
            distinct: template.distinct.clone(),
        })
    }

    pub fn kind(&self) -> AggregateKind {
        match self {
            AggregateParameters::Count(_) => AggregateKind::Count,
            AggregateParameters::Sum(_) => AggregateKind::Sum,
            AggregateParameters::Average(_) => AggregateKind::Average,
            AggregateParameters::SumEstimation(_) => AggregateKind::SumEstimation,
            AggregateParameters::Margin(_) => AggregateKind::Margin,
        }
    }
}

/// Builds the ordered parameter list for a request: one entry per distinct
/// aggregate transform, each followed by its margin companion when
/// `with_margins` is set.
pub fn parameter_set<'a>(
    transforms: impl IntoIterator<Item = &'a AxisTransform>,
    distinct: Option<&Arc<Attribute>>,
    with_margins: bool,
) -> Vec<AggregateParameters> {
    let mut seen: Vec<&AxisTransform> = Vec::new();
    let mut params = Vec::new();
    for transform in transforms {
        if seen.contains(&transform) {
            continue;
        }
        seen.push(transform);
        let Some(primary) = AggregateParameters::for_transform(transform, distinct) else {
            continue;
        };
        params.push(primary);
        if with_margins {
            let template = MarginParameters {
                distinct: distinct.cloned(),
                ..Default::default()
            };
            params.push(AggregateParameters::margin_for(transform, &template));
        }
    }
    params
}

/// One scalar or interval result inside a bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregateResult {
    Value {
        result: f64,
    },
    Margin {
        margin: f64,
        absolute_margin: f64,
        #[serde(default)]
        sum_estimation: f64,
    },
}

impl AggregateResult {
    pub fn value(&self) -> Option<f64> {
        match self {
            AggregateResult::Value { result } if result.is_finite() => Some(*result),
            _ => None,
        }
    }

    pub fn absolute_margin(&self) -> Option<f64> {
        match self {
            AggregateResult::Margin {
                absolute_margin, ..
            } if absolute_margin.is_finite() => Some(*absolute_margin),
            _ => None,
        }
    }
}
