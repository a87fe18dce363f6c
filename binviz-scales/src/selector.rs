use std::sync::Arc;

use binviz_common::attribute::Attribute;
use binviz_common::bin::HistogramResult;
use binviz_common::brush::{find_role, BrushRole};
use binviz_common::descriptor::BinRangeDescriptor;
use binviz_common::key::AggregateKeyResolver;
use binviz_common::transform::AxisTransform;
use binviz_common::types::ChartType;

use crate::bin_range::{BinRange, QuantitativeBinRange};
use crate::error::BinvizScaleError;

/// What an aggregate axis measures, used to fit a range to the values in a result
#[derive(Debug, Clone, Copy)]
pub struct AggregateAxis<'a> {
    pub result: &'a HistogramResult,
    pub transform: &'a AxisTransform,
    pub distinct: Option<&'a Arc<Attribute>>,
    pub chart_type: ChartType,
}

/// Picks the bin range model for an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinRangeSelector {
    /// Target bin count for aggregate axes of bar and point charts
    pub bar_target_bins: usize,
    /// Target bin count for aggregate axes of heatmaps
    pub heatmap_target_bins: usize,
}

impl Default for BinRangeSelector {
    fn default() -> Self {
        Self {
            bar_target_bins: 10,
            heatmap_target_bins: 5,
        }
    }
}

impl BinRangeSelector {
    /// Binned axes map their descriptor to the matching model. Aggregate
    /// axes get a nice quantitative range fitted to the All brush values.
    pub fn select(
        &self,
        descriptor: &BinRangeDescriptor,
        aggregate: Option<AggregateAxis<'_>>,
    ) -> Result<BinRange, BinvizScaleError> {
        if let Some(axis) = aggregate {
            return Ok(BinRange::Quantitative(self.fit_aggregate(&axis)));
        }
        BinRange::from_descriptor(descriptor)?.ok_or(BinvizScaleError::MissingAggregateContext)
    }

    fn fit_aggregate(&self, axis: &AggregateAxis<'_>) -> QuantitativeBinRange {
        let (observed_min, observed_max) = find_role(&axis.result.brushes, BrushRole::All)
            .and_then(|all| {
                AggregateKeyResolver::for_result(axis.result).extent(
                    axis.result.bins.values(),
                    axis.distinct,
                    axis.transform,
                    all.index,
                )
            })
            .unwrap_or((0.0, 0.0));

        match axis.chart_type {
            ChartType::HeatMap => QuantitativeBinRange::from_data(
                observed_min,
                observed_max,
                self.heatmap_target_bins,
                false,
            ),
            ChartType::VerticalBar | ChartType::HorizontalBar | ChartType::SinglePoint => {
                QuantitativeBinRange::from_data(
                    f64::min(0.0, observed_min),
                    f64::max(0.0, observed_max),
                    self.bar_target_bins,
                    false,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binviz_common::aggregate::{AggregateFields, AggregateParameters, AggregateResult};
    use binviz_common::attribute::AttributeType;
    use binviz_common::bin::{Bin, BinIndex};
    use binviz_common::brush::Brush;
    use binviz_common::transform::AggregateFunction;
    use indexmap::IndexMap;

    fn count_transform() -> AxisTransform {
        AxisTransform::new(
            Arc::new(Attribute::column("age", AttributeType::Int)),
            AggregateFunction::Count,
        )
    }

    fn result(values: &[(f64, f64)]) -> HistogramResult {
        let bins: IndexMap<BinIndex, Bin> = values
            .iter()
            .enumerate()
            .map(|(i, (all, user))| {
                (
                    BinIndex::new(vec![i as i64]),
                    Bin::new(vec![
                        Some(AggregateResult::Value { result: *user }),
                        Some(AggregateResult::Value { result: *all }),
                    ]),
                )
            })
            .collect();
        HistogramResult {
            aggregate_parameters: vec![AggregateParameters::Count(AggregateFields {
                attribute: count_transform().attribute,
                distinct: None,
            })],
            // The All brush is deliberately not first
            brushes: vec![Brush::new(BrushRole::User, 0), Brush::new(BrushRole::All, 1)],
            x_bin_range: BinRangeDescriptor::Quantitative {
                min: 0.0,
                max: 30.0,
                step: 10.0,
                is_integer: false,
            },
            y_bin_range: BinRangeDescriptor::Aggregate,
            bins,
        }
    }

    #[test]
    fn test_binned_axis_uses_descriptor() -> Result<(), BinvizScaleError> {
        let result = result(&[(1.0, 0.0)]);
        let range = BinRangeSelector::default().select(&result.x_bin_range, None)?;
        assert!(matches!(range, BinRange::Quantitative(r) if r.step == 10.0 && r.max == 30.0));
        Ok(())
    }

    #[test]
    fn test_aggregate_marker_without_context_is_an_error() {
        let result = BinRangeSelector::default().select(&BinRangeDescriptor::Aggregate, None);
        assert!(matches!(result, Err(BinvizScaleError::MissingAggregateContext)));
    }

    #[test]
    fn test_bar_aggregate_axis_includes_zero() -> Result<(), BinvizScaleError> {
        let result = result(&[(12.0, 500.0), (97.0, 3.0), (40.0, 1.0)]);
        let transform = count_transform();
        let range = BinRangeSelector::default().select(
            &result.y_bin_range,
            Some(AggregateAxis {
                result: &result,
                transform: &transform,
                distinct: None,
                chart_type: ChartType::VerticalBar,
            }),
        )?;
        // User brush values are ignored, only the All brush counts
        assert_eq!(
            range,
            BinRange::Quantitative(QuantitativeBinRange::new(0.0, 100.0, 10.0, false))
        );
        Ok(())
    }

    #[test]
    fn test_heatmap_aggregate_axis_fits_raw_span() -> Result<(), BinvizScaleError> {
        let result = result(&[(52.0, 0.0), (97.0, 0.0)]);
        let transform = count_transform();
        let range = BinRangeSelector::default().select(
            &result.y_bin_range,
            Some(AggregateAxis {
                result: &result,
                transform: &transform,
                distinct: None,
                chart_type: ChartType::HeatMap,
            }),
        )?;
        match range {
            BinRange::Quantitative(r) => {
                assert!(r.min > 0.0, "heatmap ranges do not snap to zero: {r:?}");
                assert!(r.min <= 52.0 && r.max >= 97.0);
            }
            other => panic!("expected quantitative range, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_empty_result_gives_small_range() -> Result<(), BinvizScaleError> {
        let result = result(&[]);
        let transform = count_transform();
        let range = BinRangeSelector::default().select(
            &result.y_bin_range,
            Some(AggregateAxis {
                result: &result,
                transform: &transform,
                distinct: None,
                chart_type: ChartType::VerticalBar,
            }),
        )?;
        match range {
            BinRange::Quantitative(r) => assert!(r.max > r.min && r.step > 0.0),
            other => panic!("expected quantitative range, got {other:?}"),
        }
        Ok(())
    }
}
