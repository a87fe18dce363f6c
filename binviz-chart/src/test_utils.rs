use std::sync::Arc;

use binviz_common::aggregate::{parameter_set, AggregateResult};
use binviz_common::attribute::{Attribute, AttributeType};
use binviz_common::bin::{Bin, BinIndex, HistogramResult};
use binviz_common::brush::{Brush, BrushRole};
use binviz_common::descriptor::BinRangeDescriptor;
use binviz_common::key::AggregateKeyResolver;
use binviz_common::transform::{AggregateFunction, AxisTransform};
use binviz_common::types::{Axis, ChartType};
use binviz_scales::bin_range::BinRange;
use binviz_scales::selector::AggregateAxis;
use indexmap::IndexMap;

use crate::config::HistogramConfig;
use crate::mapper::CoordinateMapper;
use crate::primitive::{AxisTransforms, PrimitiveBuilder};

pub(crate) fn value(result: f64) -> Option<AggregateResult> {
    Some(AggregateResult::Value { result })
}

pub(crate) fn margin(absolute_margin: f64) -> Option<AggregateResult> {
    Some(AggregateResult::Margin {
        margin: absolute_margin,
        absolute_margin,
        sum_estimation: 0.0,
    })
}

pub(crate) fn transform(name: &str, aggregate: AggregateFunction) -> AxisTransform {
    AxisTransform::new(
        Arc::new(Attribute::column(name, AttributeType::Float)),
        aggregate,
    )
}

/// All, two user brushes, Overlap and Rest, addressed by position
pub(crate) fn brushes() -> Vec<Brush> {
    vec![
        Brush::new(BrushRole::All, 0),
        Brush::new(BrushRole::User, 1),
        Brush::new(BrushRole::User, 2),
        Brush::new(BrushRole::Overlap, 3),
        Brush::new(BrushRole::Rest, 4),
    ]
}

pub(crate) fn tens() -> BinRangeDescriptor {
    BinRangeDescriptor::Quantitative {
        min: 0.0,
        max: 50.0,
        step: 10.0,
        is_integer: false,
    }
}

pub(crate) struct Fixture {
    pub result: HistogramResult,
    pub transforms: AxisTransforms,
    pub config: HistogramConfig,
    pub mapper: CoordinateMapper,
    pub x_range: BinRange,
    pub y_range: BinRange,
    pub chart_type: ChartType,
    pub normalization: Option<Axis>,
    pub value_range: (f64, f64),
}

impl Fixture {
    /// Lays out `result` the way a view does, without normalization
    pub fn new(result: HistogramResult, transforms: AxisTransforms) -> Self {
        let config = HistogramConfig::default();
        let chart_type = transforms.chart_type();
        let selector = config.selector();
        let select = |descriptor: &BinRangeDescriptor, transform: &AxisTransform| {
            let aggregate = transform.is_aggregate().then_some(AggregateAxis {
                result: &result,
                transform,
                distinct: None,
                chart_type,
            });
            selector.select(descriptor, aggregate).unwrap()
        };
        let x_range = select(&result.x_bin_range, &transforms.x);
        let y_range = select(&result.y_bin_range, &transforms.y);

        let mut mapper = CoordinateMapper::from_config(&config);
        mapper.set_axis_ranges(&x_range.labels(), &y_range.labels());

        let value_range = AggregateKeyResolver::for_result(&result)
            .extent(result.bins.values(), None, &transforms.value, 0)
            .unwrap_or((0.0, 0.0));

        Self {
            result,
            transforms,
            config,
            mapper,
            x_range,
            y_range,
            chart_type,
            normalization: None,
            value_range,
        }
    }

    pub fn builder(&self) -> PrimitiveBuilder<'_> {
        PrimitiveBuilder {
            mapper: &self.mapper,
            resolver: AggregateKeyResolver::for_result(&self.result),
            transforms: &self.transforms,
            distinct: None,
            x_range: &self.x_range,
            y_range: &self.y_range,
            chart_type: self.chart_type,
            normalization: self.normalization,
            value_range: self.value_range,
            config: &self.config,
        }
    }
}

fn result(
    transforms: &AxisTransforms,
    x_bin_range: BinRangeDescriptor,
    y_bin_range: BinRangeDescriptor,
    bins: IndexMap<BinIndex, Bin>,
) -> HistogramResult {
    HistogramResult {
        aggregate_parameters: parameter_set(transforms.iter(), None, true),
        brushes: brushes(),
        x_bin_range,
        y_bin_range,
        bins,
    }
}

/// Primary values per brush followed by empty margin slots
fn bin(values: &[f64]) -> Bin {
    let mut results: Vec<_> = values.iter().map(|v| value(*v)).collect();
    results.extend(values.iter().map(|_| None));
    Bin::new(results)
}

/// Vertical bars over `[0, 50)` in steps of 10, one value per brush
pub(crate) fn bar_fixture(aggregate: AggregateFunction, bins: &[(i64, [f64; 5])]) -> Fixture {
    let y = transform("price", aggregate);
    let transforms = AxisTransforms::new(transform("price", AggregateFunction::None), y.clone(), y);
    let bins = bins
        .iter()
        .map(|(i, values)| (BinIndex::new(vec![*i]), bin(values)))
        .collect();
    let result = result(&transforms, tens(), BinRangeDescriptor::Aggregate, bins);
    Fixture::new(result, transforms)
}

/// Horizontal bars over `[0, 50)` in steps of 10 on the y axis
pub(crate) fn hbar_fixture(aggregate: AggregateFunction, bins: &[(i64, [f64; 5])]) -> Fixture {
    let x = transform("price", aggregate);
    let transforms = AxisTransforms::new(x.clone(), transform("price", AggregateFunction::None), x);
    let bins = bins
        .iter()
        .map(|(i, values)| (BinIndex::new(vec![*i]), bin(values)))
        .collect();
    let result = result(&transforms, BinRangeDescriptor::Aggregate, tens(), bins);
    Fixture::new(result, transforms)
}

/// Heatmap over two `[0, 50)` axes colored by count
pub(crate) fn heat_fixture(cells: &[(&str, [f64; 5])]) -> Fixture {
    let transforms = AxisTransforms::new(
        transform("price", AggregateFunction::None),
        transform("rating", AggregateFunction::None),
        transform("price", AggregateFunction::Count),
    );
    let bins = cells
        .iter()
        .map(|(key, values)| (BinIndex::parse(key).unwrap(), bin(values)))
        .collect();
    let result = result(&transforms, tens(), tens(), bins);
    Fixture::new(result, transforms)
}

/// One point at the average of x and the count of y, equal for every brush
pub(crate) fn point_fixture(x: f64, y: f64) -> Fixture {
    let transforms = AxisTransforms::new(
        transform("price", AggregateFunction::Average),
        transform("price", AggregateFunction::Count),
        transform("price", AggregateFunction::Count),
    );
    // Average and its margin, then count and its margin
    let mut results = vec![value(x); 5];
    results.extend(vec![None; 5]);
    results.extend(vec![value(y); 5]);
    results.extend(vec![None; 5]);
    let bins = IndexMap::from([(BinIndex::new(vec![0]), Bin::new(results))]);
    let result = result(
        &transforms,
        BinRangeDescriptor::Aggregate,
        BinRangeDescriptor::Aggregate,
        bins,
    );
    Fixture::new(result, transforms)
}
