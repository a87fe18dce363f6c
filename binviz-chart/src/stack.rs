use binviz_common::brush::BrushRole;
use binviz_common::transform::AggregateFunction;
use binviz_common::types::{Axis, ChartType, Rect};

use crate::primitive::Primitive;

/// How the brush primitives of one bin are arranged relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    /// Brushes are stacked end to end along the value axis
    Stacked(Axis),
    /// Brushes split the bin's thickness along the binned axis
    SideBySide(Axis),
}

impl StackMode {
    /// Count bars stack along the value axis and average bars sit side by
    /// side. Other combinations overlap.
    pub fn for_chart(chart_type: ChartType, aggregate: AggregateFunction) -> Option<Self> {
        let bar_axis = chart_type.bar_axis()?;
        match aggregate {
            AggregateFunction::Count => Some(StackMode::Stacked(bar_axis)),
            AggregateFunction::Average => Some(StackMode::SideBySide(bar_axis.other())),
            _ => None,
        }
    }
}

/// Non-All primitives with a non-zero value take part in stacking
fn participates(primitive: &Primitive) -> bool {
    primitive.brush_role != BrushRole::All && primitive.data_value != 0.0
}

/// Rearranges the primitives of one bin, given in draw order
pub fn stack_primitives(primitives: &mut [Primitive], mode: Option<StackMode>) {
    match mode {
        Some(StackMode::Stacked(axis)) => stack_along(primitives, axis),
        Some(StackMode::SideBySide(axis)) => side_by_side(primitives, axis),
        None => {}
    }
}

fn stack_along(primitives: &mut [Primitive], axis: Axis) {
    let mut offset = 0.0;
    for primitive in primitives.iter_mut().filter(|p| participates(p)) {
        // Screen y grows downwards, so stacking up moves rects towards zero
        let (dx, dy) = match axis {
            Axis::X => (offset, 0.0),
            Axis::Y => (0.0, -offset),
        };
        primitive.translate(dx, dy);
        offset += match axis {
            Axis::X => primitive.rect.width,
            Axis::Y => primitive.rect.height,
        };
    }
}

fn side_by_side(primitives: &mut [Primitive], axis: Axis) {
    let count = primitives.iter().filter(|p| participates(p)).count();
    if count == 0 {
        return;
    }
    let mut offset = 0.0;
    for primitive in primitives.iter_mut().filter(|p| participates(p)) {
        let rect = primitive.rect;
        primitive.rect = match axis {
            Axis::X => {
                let width = rect.width / count as f64;
                Rect::new(rect.x + offset, rect.y, width, rect.height)
            }
            Axis::Y => {
                let height = rect.height / count as f64;
                Rect::new(rect.x, rect.y + offset, rect.width, height)
            }
        };
        offset += match axis {
            Axis::X => primitive.rect.width,
            Axis::Y => primitive.rect.height,
        };
        if let Some(margin) = primitive.margin_rect.as_mut() {
            let (cx, cy) = primitive.rect.center();
            match axis {
                Axis::X => margin.x = cx - margin.width / 2.0,
                Axis::Y => margin.y = cy - margin.height / 2.0,
            }
        }
    }
}
