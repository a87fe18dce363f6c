use std::sync::Arc;

use binviz_common::aggregate::MarginParameters;
use binviz_common::attribute::Attribute;
use binviz_common::bin::{Bin, BinIndex};
use binviz_common::brush::{draw_order, Brush, BrushRole};
use binviz_common::key::AggregateKeyResolver;
use binviz_common::transform::AxisTransform;
use binviz_common::types::{Axis, ChartType, Rect};
use binviz_scales::bin_range::BinRange;
use binviz_scales::color::heat_color;

use crate::config::HistogramConfig;
use crate::constants::{OPACITY_FLOOR, OPACITY_SCALE};
use crate::mapper::CoordinateMapper;
use crate::stack::{stack_primitives, StackMode};

/// Transforms shown on each axis, plus the value encoded by heatmap color
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTransforms {
    pub x: AxisTransform,
    pub y: AxisTransform,
    pub value: AxisTransform,
}

impl AxisTransforms {
    pub fn new(x: AxisTransform, y: AxisTransform, value: AxisTransform) -> Self {
        Self { x, y, value }
    }

    pub fn get(&self, axis: Axis) -> &AxisTransform {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn chart_type(&self) -> ChartType {
        ChartType::from_axes(self.x.is_aggregate(), self.y.is_aggregate())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisTransform> {
        [&self.x, &self.y, &self.value].into_iter()
    }
}

/// One drawable rectangle, in render space
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub rect: Rect,
    /// Error bar of a bar's value. A missing margin result gives a zero
    /// extent rect at the bar end. Points and heat cells have none.
    pub margin_rect: Option<Rect>,
    pub color: [f32; 4],
    pub opacity: f64,
    pub brush_index: i32,
    pub brush_role: BrushRole,
    pub bar_axis: Option<Axis>,
    pub data_value: f64,
}

impl Primitive {
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.rect = self.rect.translate(dx, dy);
        self.margin_rect = self.margin_rect.map(|m| m.translate(dx, dy));
    }
}

/// Primitives of one bin, back to front, and the area that selects the bin
#[derive(Debug, Clone, PartialEq)]
pub struct BinPrimitives {
    pub bin_index: BinIndex,
    pub primitives: Vec<Primitive>,
    pub hit_rect: Option<Rect>,
}

/// Turns the aggregate results of a bin into primitives
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveBuilder<'a> {
    pub mapper: &'a CoordinateMapper,
    pub resolver: AggregateKeyResolver<'a>,
    pub transforms: &'a AxisTransforms,
    pub distinct: Option<&'a Arc<Attribute>>,
    pub x_range: &'a BinRange,
    pub y_range: &'a BinRange,
    pub chart_type: ChartType,
    pub normalization: Option<Axis>,
    /// Extent of the heatmap value over all bins
    pub value_range: (f64, f64),
    pub config: &'a HistogramConfig,
}

impl<'a> PrimitiveBuilder<'a> {
    pub fn build(&self, bin_index: &BinIndex, bin: &Bin, brushes: &[Brush]) -> BinPrimitives {
        let ordered = draw_order(brushes);
        let mut primitives = match self.chart_type {
            ChartType::VerticalBar | ChartType::HorizontalBar => {
                let brush_max = self.brush_max(bin, &ordered);
                ordered
                    .iter()
                    .filter_map(|b| self.bar(bin_index, bin, b, brush_max))
                    .collect()
            }
            ChartType::SinglePoint => ordered
                .iter()
                .filter_map(|b| self.point(bin, b))
                .collect(),
            ChartType::HeatMap => self.heat_cells(bin_index, bin, &ordered),
        };

        let aggregate = self
            .chart_type
            .bar_axis()
            .map(|axis| self.transforms.get(axis).aggregate)
            .unwrap_or_default();
        stack_primitives(
            &mut primitives,
            StackMode::for_chart(self.chart_type, aggregate),
        );

        // Back to front, which puts the All brush last
        primitives.reverse();
        let hit_rect = primitives
            .iter()
            .find(|p| p.brush_role == BrushRole::All)
            .map(|p| p.rect);

        BinPrimitives {
            bin_index: bin_index.clone(),
            primitives,
            hit_rect,
        }
    }

    fn value_transform(&self) -> &AxisTransform {
        match self.chart_type.bar_axis() {
            Some(axis) => self.transforms.get(axis),
            None => &self.transforms.value,
        }
    }

    fn brush_max(&self, bin: &Bin, brushes: &[&Brush]) -> f64 {
        let transform = self.value_transform();
        brushes
            .iter()
            .filter_map(|b| self.resolver.value(bin, self.distinct, transform, b.index))
            .fold(0.0, f64::max)
    }

    /// Screen extent of the bin along a binned axis
    fn bin_extent(&self, bin_index: &BinIndex, axis: Axis) -> Option<(f64, f64)> {
        // One dimensional indices address the single binned axis
        let dim = if bin_index.0.len() >= 2 { axis.dim() } else { 0 };
        let index = bin_index.get(dim)?;
        let range = match axis {
            Axis::X => self.x_range,
            Axis::Y => self.y_range,
        };
        let start = range.value_from_index(index);
        let end = range.add_step(start);
        Some((
            self.mapper.data_to_screen(axis, start),
            self.mapper.data_to_screen(axis, end),
        ))
    }

    fn bar(
        &self,
        bin_index: &BinIndex,
        bin: &Bin,
        brush: &Brush,
        brush_max: f64,
    ) -> Option<Primitive> {
        let bar_axis = self.chart_type.bar_axis()?;
        let transform = self.transforms.get(bar_axis);
        let value = self
            .resolver
            .value(bin, self.distinct, transform, brush.index)?;
        let (b0, b1) = self.bin_extent(bin_index, bar_axis.other())?;
        let range = self
            .mapper
            .normalized_range(value, self.normalization, bar_axis, brush_max);

        let rect = match bar_axis {
            Axis::Y => Rect::from_points(b0, range.from, b1, range.to),
            Axis::X => Rect::from_points(range.from, b0, range.to, b1),
        };
        let margin_rect = Some(self.margin_rect(bin, brush, value, bar_axis, brush_max, (b0, b1)));

        let data_range = self.mapper.data_range(bar_axis);
        let opacity = if self.normalization == Some(bar_axis.other()) && data_range != 0.0 {
            (OPACITY_SCALE * brush_max / data_range + OPACITY_FLOOR).min(1.0)
        } else {
            1.0
        };

        Some(Primitive {
            rect,
            margin_rect,
            color: self.config.brush_color(brush),
            opacity,
            brush_index: brush.index,
            brush_role: brush.role,
            bar_axis: Some(bar_axis),
            data_value: value,
        })
    }

    fn margin_rect(
        &self,
        bin: &Bin,
        brush: &Brush,
        value: f64,
        bar_axis: Axis,
        brush_max: f64,
        (b0, b1): (f64, f64),
    ) -> Rect {
        let transform = self.transforms.get(bar_axis);
        let key = self.resolver.resolve(
            self.distinct,
            transform,
            brush.index,
            Some(&MarginParameters::default()),
        );
        let margin = self
            .resolver
            .get_result(bin, key)
            .and_then(|r| r.absolute_margin())
            .unwrap_or(0.0);
        let screen = |v: f64| {
            let v = self
                .mapper
                .normalize_value(v, self.normalization, bar_axis, brush_max);
            self.mapper.data_to_screen(bar_axis, v)
        };
        let (lo, hi) = (screen(value - margin), screen(value + margin));
        let thickness = (b1 - b0).abs() * self.config.margin_width_fraction;
        let center = (b0 + b1) / 2.0;
        let (c0, c1) = (center - thickness / 2.0, center + thickness / 2.0);
        match bar_axis {
            Axis::Y => Rect::from_points(c0, lo, c1, hi),
            Axis::X => Rect::from_points(lo, c0, hi, c1),
        }
    }

    fn point(&self, bin: &Bin, brush: &Brush) -> Option<Primitive> {
        let x = self
            .resolver
            .value(bin, self.distinct, &self.transforms.x, brush.index)?;
        let y = self
            .resolver
            .value(bin, self.distinct, &self.transforms.y, brush.index)?;
        let r = self.config.point_radius;
        let (sx, sy) = (
            self.mapper.data_to_screen(Axis::X, x),
            self.mapper.data_to_screen(Axis::Y, y),
        );
        Some(Primitive {
            rect: Rect::new(sx - r, sy - r, 2.0 * r, 2.0 * r),
            margin_rect: None,
            color: self.config.brush_color(brush),
            opacity: 1.0,
            brush_index: brush.index,
            brush_role: brush.role,
            bar_axis: None,
            data_value: y,
        })
    }

    /// Heatmap cells are colored by value. Brush cells shrink around the
    /// center so their area shows the running share of the All value.
    fn heat_cells(&self, bin_index: &BinIndex, bin: &Bin, brushes: &[&Brush]) -> Vec<Primitive> {
        let (Some((x0, x1)), Some((y0, y1))) = (
            self.bin_extent(bin_index, Axis::X),
            self.bin_extent(bin_index, Axis::Y),
        ) else {
            return Vec::new();
        };
        let cell = Rect::from_points(x0, y0, x1, y1);
        let transform = &self.transforms.value;
        let all_value = brushes
            .iter()
            .find(|b| b.role == BrushRole::All)
            .and_then(|b| self.resolver.value(bin, self.distinct, transform, b.index))
            .unwrap_or(0.0);
        let (vmin, vmax) = self.value_range;

        let mut accumulated = 0.0;
        let mut cells = Vec::with_capacity(brushes.len());
        for brush in brushes {
            let Some(value) = self
                .resolver
                .value(bin, self.distinct, transform, brush.index)
            else {
                continue;
            };
            let fraction = if brush.role == BrushRole::All || all_value <= 0.0 {
                1.0
            } else if value == 0.0 {
                continue;
            } else {
                accumulated += value / all_value;
                f64::min(accumulated, 1.0)
            };
            let normalized = if vmax > vmin {
                (value - vmin) / (vmax - vmin)
            } else {
                1.0
            };
            cells.push(Primitive {
                rect: cell.scale_centered(fraction.sqrt()),
                margin_rect: None,
                color: heat_color(
                    self.config.heat_min_color,
                    self.config.brush_color(brush),
                    normalized,
                ),
                opacity: 1.0,
                brush_index: brush.index,
                brush_role: brush.role,
                bar_axis: None,
                data_value: value,
            });
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{bar_fixture, hbar_fixture, heat_fixture, margin, point_fixture, Fixture};
    use binviz_common::aggregate::AggregateResult;
    use binviz_common::transform::AggregateFunction;
    use float_cmp::assert_approx_eq;

    fn build(fixture: &Fixture, key: &str) -> BinPrimitives {
        let index = BinIndex::parse(key).unwrap();
        let bin = &fixture.result.bins[&index];
        fixture.builder().build(&index, bin, &fixture.result.brushes)
    }

    fn by_role(prims: &BinPrimitives, role: BrushRole) -> &Primitive {
        prims
            .primitives
            .iter()
            .find(|p| p.brush_role == role)
            .unwrap()
    }

    #[test]
    fn test_count_bars_stack_to_all_height() {
        // All, user 1, user 2, overlap, rest
        let fixture = bar_fixture(AggregateFunction::Count, &[(1, [10.0, 5.0, 0.0, 2.0, 3.0])]);
        let prims = build(&fixture, "1");

        assert_eq!(prims.primitives[prims.primitives.len() - 1].brush_role, BrushRole::All);
        let all = by_role(&prims, BrushRole::All);
        let stacked: f64 = prims
            .primitives
            .iter()
            .filter(|p| p.brush_role != BrushRole::All)
            .map(|p| p.rect.height)
            .sum();
        assert_approx_eq!(f64, stacked, all.rect.height, epsilon = 1e-9);

        let top = prims
            .primitives
            .iter()
            .filter(|p| p.brush_role != BrushRole::All && p.data_value != 0.0)
            .map(|p| p.rect.y)
            .fold(f64::INFINITY, f64::min);
        assert_approx_eq!(f64, top, all.rect.y, epsilon = 1e-9);

        // Bin 1 of [0, 50) in steps of 10 spans x 60..120 of the 300 unit space
        assert_approx_eq!(f64, all.rect.x, 60.0, epsilon = 1e-9);
        assert_approx_eq!(f64, all.rect.width, 60.0, epsilon = 1e-9);
        assert_eq!(prims.hit_rect, Some(all.rect));
    }

    #[test]
    fn test_bar_draw_order() {
        let fixture = bar_fixture(AggregateFunction::Count, &[(0, [10.0, 5.0, 1.0, 2.0, 3.0])]);
        let prims = build(&fixture, "0");
        let order: Vec<BrushRole> = prims.primitives.iter().map(|p| p.brush_role).collect();
        assert_eq!(
            order,
            vec![
                BrushRole::Rest,
                BrushRole::User,
                BrushRole::User,
                BrushRole::Overlap,
                BrushRole::All
            ]
        );
    }

    #[test]
    fn test_average_bars_side_by_side() {
        let fixture = bar_fixture(AggregateFunction::Average, &[(2, [4.0, 6.0, 2.0, 0.0, 5.0])]);
        let prims = build(&fixture, "2");
        let all = by_role(&prims, BrushRole::All);
        assert_approx_eq!(f64, all.rect.width, 60.0, epsilon = 1e-9);

        // Three non-zero brushes share the bin width
        let mut xs: Vec<f64> = prims
            .primitives
            .iter()
            .filter(|p| p.brush_role != BrushRole::All && p.data_value != 0.0)
            .map(|p| {
                assert_approx_eq!(f64, p.rect.width, 20.0, epsilon = 1e-9);
                p.rect.x
            })
            .collect();
        xs.sort_by(f64::total_cmp);
        assert_approx_eq!(f64, xs[0], 120.0, epsilon = 1e-9);
        assert_approx_eq!(f64, xs[2], 160.0, epsilon = 1e-9);

        // Bars still start at the zero baseline
        for p in &prims.primitives {
            assert_approx_eq!(f64, p.rect.y + p.rect.height, 300.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_margin_rect() {
        let mut fixture = bar_fixture(AggregateFunction::Count, &[(0, [10.0, 5.0, 1.0, 2.0, 3.0])]);
        let index = BinIndex::new(vec![0]);
        // Margin parameters follow the count parameters
        let brush_count = fixture.result.brushes.len();
        if let Some(bin) = fixture.result.bins.get_mut(&index) {
            bin.results[brush_count] = margin(2.0);
        }
        let prims = build(&fixture, "0");
        let all = by_role(&prims, BrushRole::All);
        let margin_rect = all.margin_rect.unwrap();
        let y_per_unit = 300.0 / fixture.mapper.data_range(Axis::Y);
        assert_approx_eq!(f64, margin_rect.height, 4.0 * y_per_unit, epsilon = 1e-9);
        assert_approx_eq!(f64, margin_rect.width, 6.0, epsilon = 1e-9);
        assert_approx_eq!(f64, margin_rect.center().0, all.rect.center().0, epsilon = 1e-9);
        // Brushes without a margin result get a zero margin at the bar end
        let rest = by_role(&prims, BrushRole::Rest);
        let rest_margin = rest.margin_rect.unwrap();
        assert_approx_eq!(f64, rest_margin.height, 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, rest_margin.y, rest.rect.y, epsilon = 1e-9);
        assert_approx_eq!(f64, rest_margin.center().0, rest.rect.center().0, epsilon = 1e-9);
    }

    #[test]
    fn test_horizontal_count_bars() {
        let mut fixture =
            hbar_fixture(AggregateFunction::Count, &[(1, [10.0, 5.0, 0.0, 2.0, 3.0])]);
        let index = BinIndex::new(vec![1]);
        let brush_count = fixture.result.brushes.len();
        if let Some(bin) = fixture.result.bins.get_mut(&index) {
            bin.results[brush_count] = margin(2.0);
        }
        let prims = build(&fixture, "1");
        assert_eq!(fixture.chart_type, ChartType::HorizontalBar);

        // Bin 1 of [0, 50) spans y 180..240 with the y axis flipped
        let all = by_role(&prims, BrushRole::All);
        assert_eq!(all.bar_axis, Some(Axis::X));
        assert_approx_eq!(f64, all.rect.x, 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, all.rect.y, 180.0, epsilon = 1e-9);
        assert_approx_eq!(f64, all.rect.height, 60.0, epsilon = 1e-9);

        let stacked: f64 = prims
            .primitives
            .iter()
            .filter(|p| p.brush_role != BrushRole::All)
            .map(|p| p.rect.width)
            .sum();
        assert_approx_eq!(f64, stacked, all.rect.width, epsilon = 1e-9);
        let right = prims
            .primitives
            .iter()
            .filter(|p| p.brush_role != BrushRole::All && p.data_value != 0.0)
            .map(|p| p.rect.x + p.rect.width)
            .fold(0.0, f64::max);
        assert_approx_eq!(f64, right, all.rect.x + all.rect.width, epsilon = 1e-9);

        let margin_rect = all.margin_rect.unwrap();
        let x_per_unit = 300.0 / fixture.mapper.data_range(Axis::X);
        assert_approx_eq!(f64, margin_rect.width, 4.0 * x_per_unit, epsilon = 1e-9);
        assert_approx_eq!(f64, margin_rect.height, 6.0, epsilon = 1e-9);
        assert_approx_eq!(f64, margin_rect.center().1, all.rect.center().1, epsilon = 1e-9);
    }

    #[test]
    fn test_horizontal_average_bars_side_by_side() {
        let fixture = hbar_fixture(AggregateFunction::Average, &[(2, [4.0, 6.0, 2.0, 0.0, 5.0])]);
        let prims = build(&fixture, "2");
        let all = by_role(&prims, BrushRole::All);
        assert_approx_eq!(f64, all.rect.y, 120.0, epsilon = 1e-9);
        assert_approx_eq!(f64, all.rect.height, 60.0, epsilon = 1e-9);

        let mut ys: Vec<f64> = prims
            .primitives
            .iter()
            .filter(|p| p.brush_role != BrushRole::All && p.data_value != 0.0)
            .map(|p| {
                assert_approx_eq!(f64, p.rect.height, 20.0, epsilon = 1e-9);
                p.rect.y
            })
            .collect();
        ys.sort_by(f64::total_cmp);
        assert_eq!(ys.len(), 3);
        assert_approx_eq!(f64, ys[0], 120.0, epsilon = 1e-9);
        assert_approx_eq!(f64, ys[2], 160.0, epsilon = 1e-9);

        // Bars start at the zero baseline on the left
        for p in &prims.primitives {
            assert_approx_eq!(f64, p.rect.x, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_missing_results_are_skipped() {
        let mut fixture = bar_fixture(AggregateFunction::Count, &[(0, [10.0, 5.0, 1.0, 2.0, 3.0])]);
        let index = BinIndex::new(vec![0]);
        if let Some(bin) = fixture.result.bins.get_mut(&index) {
            bin.results[1] = None;
            bin.results[4] = Some(AggregateResult::Value { result: f64::NAN });
        }
        let prims = build(&fixture, "0");
        assert_eq!(prims.primitives.len(), 3);
        assert!(prims.primitives.iter().all(|p| p.brush_index != 1 && p.brush_index != 4));
    }

    #[test]
    fn test_normalized_bars_fill_axis() {
        let mut fixture = bar_fixture(AggregateFunction::Count, &[(0, [10.0, 5.0, 1.0, 2.0, 3.0])]);
        fixture.normalization = Some(Axis::X);
        let prims = build(&fixture, "0");
        let all = by_role(&prims, BrushRole::All);
        assert_approx_eq!(f64, all.rect.height, 300.0, epsilon = 1e-9);
        let range = fixture.mapper.data_range(Axis::Y);
        assert_approx_eq!(f64, all.opacity, 0.6 * 10.0 / range + 0.4, epsilon = 1e-9);

        fixture.normalization = None;
        let prims = build(&fixture, "0");
        assert_eq!(by_role(&prims, BrushRole::All).opacity, 1.0);
    }

    #[test]
    fn test_heatmap_cells() {
        // Values of All, user 1, user 2, overlap, rest per cell
        let fixture = heat_fixture(&[
            ("0,0", [8.0, 2.0, 2.0, 0.0, 4.0]),
            ("1,1", [1.0, 1.0, 0.0, 0.0, 0.0]),
        ]);
        let prims = build(&fixture, "0,0");
        let all = by_role(&prims, BrushRole::All);
        let cell_area = all.rect.area();
        assert_approx_eq!(f64, cell_area, 60.0 * 60.0, epsilon = 1e-6);
        for (c, expected) in all.color.iter().zip(fixture.config.all_brush_color) {
            assert_approx_eq!(f32, *c, expected, epsilon = 1e-3);
        }

        // Running shares 0.25, 0.5 and 1.0 of the All value
        let areas: Vec<f64> = prims
            .primitives
            .iter()
            .filter(|p| p.brush_role != BrushRole::All)
            .map(|p| p.rect.area() / cell_area)
            .collect();
        assert_eq!(areas.len(), 3);
        assert_approx_eq!(f64, areas[0], 1.0, epsilon = 1e-9);
        assert_approx_eq!(f64, areas[1], 0.5, epsilon = 1e-9);
        assert_approx_eq!(f64, areas[2], 0.25, epsilon = 1e-9);
        for p in &prims.primitives {
            assert_approx_eq!(f64, p.rect.center().0, all.rect.center().0, epsilon = 1e-9);
        }

        // The smallest value gets the minimum color
        let low = build(&fixture, "1,1");
        let user = low
            .primitives
            .iter()
            .find(|p| p.brush_index == 1)
            .unwrap();
        assert_eq!(user.data_value, 1.0);
        for (c, m) in user.color.iter().zip(fixture.config.heat_min_color) {
            assert_approx_eq!(f32, *c, m, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_single_point() {
        let fixture = point_fixture(3.0, 40.0);
        let prims = build(&fixture, "0");
        let all = by_role(&prims, BrushRole::All);
        let r = fixture.config.point_radius;
        assert_approx_eq!(f64, all.rect.width, 2.0 * r);
        let (cx, cy) = all.rect.center();
        assert_approx_eq!(f64, cx, fixture.mapper.data_to_screen_x(3.0), epsilon = 1e-9);
        assert_approx_eq!(f64, cy, fixture.mapper.data_to_screen(Axis::Y, 40.0), epsilon = 1e-9);
        assert_eq!(prims.hit_rect, Some(all.rect));
    }
}
