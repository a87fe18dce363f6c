use binviz_common::bin::BinIndex;
use binviz_common::transform::AxisTransform;
use binviz_common::types::{Axis, ChartType};
use binviz_scales::bin_range::BinRange;
use chrono::DateTime;

use crate::filter::{FilterModel, FilterValue, Operator, ValueComparison};

/// Predicates selecting the rows of one clicked bin. Each binned axis adds
/// the predicates matching its bin; aggregate axes add nothing.
pub fn filter_model_for_bin(
    bin_index: &BinIndex,
    chart_type: ChartType,
    x: (&AxisTransform, &BinRange),
    y: (&AxisTransform, &BinRange),
) -> FilterModel {
    let mut model = FilterModel::default();
    for (axis, (transform, range)) in [(Axis::X, x), (Axis::Y, y)] {
        if !chart_type.is_binned(axis) {
            continue;
        }
        let dim = if bin_index.0.len() >= 2 { axis.dim() } else { 0 };
        let Some(index) = bin_index.get(dim) else {
            continue;
        };
        let attribute = &transform.attribute;
        let start = range.value_from_index(index);
        let comparison = |operator, value| ValueComparison::new(attribute.clone(), operator, value);

        match range {
            BinRange::Quantitative(_) => {
                let end = range.add_step(start);
                model.push(comparison(Operator::GreaterOrEqual, FilterValue::Number(start)));
                model.push(comparison(Operator::Less, FilterValue::Number(end)));
            }
            BinRange::Nominal(r) => {
                let label = r.raw_label(start).to_string();
                model.push(comparison(Operator::Equal, FilterValue::Text(label)));
            }
            BinRange::Alphabetic(r) => {
                model.push(comparison(Operator::StartsWith, FilterValue::Text(r.label(start))));
            }
            BinRange::Temporal(_) => {
                let end = range.add_step(start);
                model.push(comparison(Operator::GreaterOrEqual, temporal_value(start)));
                model.push(comparison(Operator::Less, temporal_value(end)));
            }
        }
    }
    model
}

fn temporal_value(millis: f64) -> FilterValue {
    match DateTime::from_timestamp_millis(millis.round() as i64) {
        Some(dt) => FilterValue::DateTime(dt),
        None => FilterValue::Number(millis),
    }
}
