use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::attribute::Attribute;

/// Aggregate applied to an attribute on one chart axis
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregateFunction {
    #[default]
    None,
    Count,
    Sum,
    #[strum(serialize = "avg")]
    #[serde(rename = "avg")]
    Average,
    /// Weighted sum estimate
    #[strum(serialize = "sum_e")]
    #[serde(rename = "sum_e")]
    SumE,
}

/// An attribute paired with the aggregate measured on an axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisTransform {
    pub attribute: Arc<Attribute>,
    #[serde(default)]
    pub aggregate: AggregateFunction,
}

impl AxisTransform {
    pub fn new(attribute: Arc<Attribute>, aggregate: AggregateFunction) -> Self {
        Self {
            attribute,
            aggregate,
        }
    }

    /// Whether the axis shows an aggregate value rather than binned data
    pub fn is_aggregate(&self) -> bool {
        self.aggregate != AggregateFunction::None
    }

    /// Label such as `avg(Price)`, or the bare attribute name when no
    /// aggregate is applied
    pub fn label(&self) -> String {
        match self.aggregate {
            AggregateFunction::None => self.attribute.display_name().to_string(),
            aggregate => format!("{}({})", aggregate, self.attribute.display_name()),
        }
    }
}

impl PartialEq for AxisTransform {
    fn eq(&self, other: &Self) -> bool {
        self.aggregate == other.aggregate && self.attribute.id() == other.attribute.id()
    }
}

impl Eq for AxisTransform {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeType;

    fn price() -> Arc<Attribute> {
        Arc::new(Attribute::column("Price", AttributeType::Float))
    }

    #[test]
    fn test_label() {
        assert_eq!(
            AxisTransform::new(price(), AggregateFunction::Average).label(),
            "avg(Price)"
        );
        assert_eq!(
            AxisTransform::new(price(), AggregateFunction::Count).label(),
            "count(Price)"
        );
        assert_eq!(
            AxisTransform::new(price(), AggregateFunction::None).label(),
            "Price"
        );
    }

    #[test]
    fn test_equality() {
        let a = AxisTransform::new(price(), AggregateFunction::Sum);
        let b = AxisTransform::new(price(), AggregateFunction::Sum);
        let c = AxisTransform::new(price(), AggregateFunction::Count);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_aggregate());
        assert!(!AxisTransform::new(price(), AggregateFunction::None).is_aggregate());
    }
}
