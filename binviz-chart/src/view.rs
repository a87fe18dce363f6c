use std::sync::Arc;

use binviz_common::aggregate::{parameter_set, AggregateParameters};
use binviz_common::attribute::Attribute;
use binviz_common::bin::{BinIndex, HistogramResult};
use binviz_common::brush::{find_role, BrushRole};
use binviz_common::descriptor::BinRangeDescriptor;
use binviz_common::key::AggregateKeyResolver;
use binviz_common::transform::AxisTransform;
use binviz_common::types::{Axis, ChartType};
use binviz_scales::bin_range::{BinLabel, BinRange};
use binviz_scales::selector::AggregateAxis;
use tracing::{debug, warn};

use crate::config::HistogramConfig;
use crate::error::BinvizChartError;
use crate::filter::FilterModel;
use crate::mapper::CoordinateMapper;
use crate::primitive::{AxisTransforms, BinPrimitives, PrimitiveBuilder};
use crate::request::{RequestId, RequestTracker};
use crate::selection::filter_model_for_bin;

/// Change that makes the cached layout out of date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    AxisChanged,
    ResultArrived,
    PanelResized,
    NormalizationChanged,
}

/// Everything the renderer needs for one result
#[derive(Debug, Clone)]
pub struct HistogramLayout {
    pub chart_type: ChartType,
    pub x_range: BinRange,
    pub y_range: BinRange,
    pub x_labels: Vec<BinLabel>,
    pub y_labels: Vec<BinLabel>,
    pub mapper: CoordinateMapper,
    pub value_range: (f64, f64),
    pub bins: Vec<BinPrimitives>,
}

impl HistogramLayout {
    /// Bin whose hit rect contains the render space point, topmost first
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&BinIndex> {
        self.bins
            .iter()
            .rev()
            .find(|b| b.hit_rect.is_some_and(|r| r.contains(x, y)))
            .map(|b| &b.bin_index)
    }
}

/// Output of the axis phase, consumed by the primitive phase
struct AxisLayout {
    chart_type: ChartType,
    x_range: BinRange,
    y_range: BinRange,
    x_labels: Vec<BinLabel>,
    y_labels: Vec<BinLabel>,
    mapper: CoordinateMapper,
}

/// One histogram visualization. Setters raise an [`Invalidation`] and the
/// layout is recomputed the next time it is requested.
#[derive(Debug, Clone)]
pub struct HistogramView {
    config: HistogramConfig,
    transforms: AxisTransforms,
    distinct: Option<Arc<Attribute>>,
    normalization: Option<Axis>,
    panel_size: (f64, f64),
    requests: RequestTracker,
    result: Option<HistogramResult>,
    layout: Option<HistogramLayout>,
}

impl HistogramView {
    pub fn new(config: HistogramConfig, transforms: AxisTransforms) -> Self {
        let panel_size = (config.render_dimension, config.render_dimension);
        Self {
            config,
            transforms,
            distinct: None,
            normalization: None,
            panel_size,
            requests: RequestTracker::new(),
            result: None,
            layout: None,
        }
    }

    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    pub fn transforms(&self) -> &AxisTransforms {
        &self.transforms
    }

    pub fn chart_type(&self) -> ChartType {
        self.transforms.chart_type()
    }

    pub fn result(&self) -> Option<&HistogramResult> {
        self.result.as_ref()
    }

    fn invalidate(&mut self, event: Invalidation) {
        debug!("Histogram layout invalidated: {:?}", event);
        self.layout = None;
    }

    /// Replaces the axis transforms. The current result and any request in
    /// flight answer the old query, so both are dropped.
    pub fn set_transforms(&mut self, transforms: AxisTransforms, distinct: Option<Arc<Attribute>>) {
        self.transforms = transforms;
        self.distinct = distinct;
        self.result = None;
        self.requests.invalidate();
        self.invalidate(Invalidation::AxisChanged);
    }

    pub fn set_panel_size(&mut self, width: f64, height: f64) {
        self.panel_size = (width, height);
        self.invalidate(Invalidation::PanelResized);
    }

    pub fn set_normalization(&mut self, normalization: Option<Axis>) {
        self.normalization = normalization;
        self.invalidate(Invalidation::NormalizationChanged);
    }

    /// Aggregates to request for the current transforms
    pub fn query_parameters(&self) -> Vec<AggregateParameters> {
        parameter_set(self.transforms.iter(), self.distinct.as_ref(), true)
    }

    pub fn issue_request(&mut self) -> RequestId {
        self.requests.issue()
    }

    pub fn is_stale(&self, id: RequestId) -> bool {
        self.requests.is_stale(id)
    }

    /// Stores the response to request `id`. Responses to superseded requests
    /// are dropped and `false` is returned.
    pub fn accept_result(
        &mut self,
        id: RequestId,
        result: HistogramResult,
    ) -> Result<bool, BinvizChartError> {
        if self.requests.is_stale(id) {
            warn!(
                "Discarding stale histogram result {:?}, latest is {:?}",
                id,
                self.requests.latest()
            );
            return Ok(false);
        }
        result.validate()?;
        self.result = Some(result);
        self.invalidate(Invalidation::ResultArrived);
        Ok(true)
    }

    /// Cached layout, recomputed when invalidated. `None` until a result
    /// has been accepted.
    pub fn layout(&mut self) -> Result<Option<&HistogramLayout>, BinvizChartError> {
        if self.layout.is_none() {
            let layout = match &self.result {
                Some(result) => {
                    let axes = self.layout_axes(result)?;
                    Some(self.layout_primitives(result, &axes))
                }
                None => None,
            };
            self.layout = layout;
        }
        Ok(self.layout.as_ref())
    }

    /// Predicates selecting a clicked bin of the current layout
    pub fn filter_for_bin(
        &mut self,
        bin_index: &BinIndex,
    ) -> Result<Option<FilterModel>, BinvizChartError> {
        let transforms = self.transforms.clone();
        let Some(layout) = self.layout()? else {
            return Ok(None);
        };
        let model = filter_model_for_bin(
            bin_index,
            layout.chart_type,
            (&transforms.x, &layout.x_range),
            (&transforms.y, &layout.y_range),
        );
        Ok((!model.is_empty()).then_some(model))
    }

    #[tracing::instrument(skip_all)]
    fn layout_axes(&self, result: &HistogramResult) -> Result<AxisLayout, BinvizChartError> {
        let chart_type = self.transforms.chart_type();
        let x_range = self.select_range(result, &result.x_bin_range, &self.transforms.x)?;
        let y_range = self.select_range(result, &result.y_bin_range, &self.transforms.y)?;
        let x_labels = x_range.labels();
        let y_labels = y_range.labels();

        let mut mapper = CoordinateMapper::from_config(&self.config);
        mapper.set_panel_size(self.panel_size.0, self.panel_size.1);
        mapper.set_axis_ranges(&x_labels, &y_labels);

        Ok(AxisLayout {
            chart_type,
            x_range,
            y_range,
            x_labels,
            y_labels,
            mapper,
        })
    }

    fn select_range(
        &self,
        result: &HistogramResult,
        descriptor: &BinRangeDescriptor,
        transform: &AxisTransform,
    ) -> Result<BinRange, BinvizChartError> {
        let aggregate = transform.is_aggregate().then_some(AggregateAxis {
            result,
            transform,
            distinct: self.distinct.as_ref(),
            chart_type: self.transforms.chart_type(),
        });
        Ok(self.config.selector().select(descriptor, aggregate)?)
    }

    #[tracing::instrument(skip_all)]
    fn layout_primitives(&self, result: &HistogramResult, axes: &AxisLayout) -> HistogramLayout {
        let resolver = AggregateKeyResolver::for_result(result);
        let value_range = match axes.chart_type {
            ChartType::HeatMap => find_role(&result.brushes, BrushRole::All)
                .and_then(|all| {
                    resolver.extent(
                        result.bins.values(),
                        self.distinct.as_ref(),
                        &self.transforms.value,
                        all.index,
                    )
                })
                .unwrap_or((0.0, 0.0)),
            _ => (0.0, 0.0),
        };

        let builder = PrimitiveBuilder {
            mapper: &axes.mapper,
            resolver,
            transforms: &self.transforms,
            distinct: self.distinct.as_ref(),
            x_range: &axes.x_range,
            y_range: &axes.y_range,
            chart_type: axes.chart_type,
            normalization: self.normalization,
            value_range,
            config: &self.config,
        };
        let bins = result
            .bins
            .iter()
            .map(|(index, bin)| builder.build(index, bin, &result.brushes))
            .collect();

        HistogramLayout {
            chart_type: axes.chart_type,
            x_range: axes.x_range.clone(),
            y_range: axes.y_range.clone(),
            x_labels: axes.x_labels.clone(),
            y_labels: axes.y_labels.clone(),
            mapper: axes.mapper.clone(),
            value_range,
            bins,
        }
    }
}
