use binviz_common::types::Axis;
use binviz_scales::bin_range::BinLabel;
use binviz_scales::linear::LinearScale;

use crate::config::HistogramConfig;
use crate::constants::{
    AXIS_LABEL_PADDING, COMPACT_OFFSET, LABEL_CHAR_WIDTH, LABEL_FONT_HEIGHT, RIGHT_OFFSET,
    TOP_OFFSET,
};

/// Rough width of a label in logical units
pub fn estimate_label_width(label: &str) -> f64 {
    label.chars().count() as f64 * LABEL_CHAR_WIDTH
}

/// Screen extent of a bar along its value axis. `from` and `to` are the
/// mapped images of `min(0, v)` and `max(0, v)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRange {
    pub from: f64,
    pub to: f64,
    pub value: f64,
}

/// Maps data values into a square render space of `render_dimension` units
/// and computes the margins around it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    render_dimension: f64,
    compact_threshold: f64,
    panel_width: f64,
    panel_height: f64,
    data_mins: [f64; 2],
    data_maxs: [f64; 2],
    x_label_count: usize,
    max_x_label_width: f64,
    max_y_label_width: f64,
    x_scale: LinearScale,
    y_scale: LinearScale,
    y_scale_unflipped: LinearScale,
}

impl CoordinateMapper {
    pub fn new(render_dimension: f64, compact_threshold: f64) -> Self {
        let mut mapper = Self {
            render_dimension,
            compact_threshold,
            panel_width: render_dimension,
            panel_height: render_dimension,
            data_mins: [0.0, 0.0],
            data_maxs: [1.0, 1.0],
            x_label_count: 0,
            max_x_label_width: 0.0,
            max_y_label_width: 0.0,
            x_scale: LinearScale::default(),
            y_scale: LinearScale::default(),
            y_scale_unflipped: LinearScale::default(),
        };
        mapper.rebuild_scales();
        mapper
    }

    pub fn from_config(config: &HistogramConfig) -> Self {
        Self::new(config.render_dimension, config.compact_threshold)
    }

    pub fn render_dimension(&self) -> f64 {
        self.render_dimension
    }

    /// Device size of the panel the chart is shown in
    pub fn set_panel_size(&mut self, width: f64, height: f64) {
        self.panel_width = width;
        self.panel_height = height;
    }

    pub fn panel_size(&self) -> (f64, f64) {
        (self.panel_width, self.panel_height)
    }

    /// Sets both data domains from the first bin start to the last bin end of
    /// each axis. An empty axis spans `[0, 1]`.
    pub fn set_axis_ranges(&mut self, x_labels: &[BinLabel], y_labels: &[BinLabel]) {
        for (axis, labels) in [(Axis::X, x_labels), (Axis::Y, y_labels)] {
            let (min, max) = domain_of(labels);
            self.data_mins[axis.dim()] = min;
            self.data_maxs[axis.dim()] = max;
        }
        self.x_label_count = x_labels.len();
        self.max_x_label_width = max_label_width(x_labels);
        self.max_y_label_width = max_label_width(y_labels);
        self.rebuild_scales();
    }

    fn rebuild_scales(&mut self) {
        let r = self.render_dimension;
        let x_domain = (self.data_mins[0], self.data_maxs[0]);
        let y_domain = (self.data_mins[1], self.data_maxs[1]);
        self.x_scale = LinearScale::new(x_domain, (0.0, r));
        self.y_scale = LinearScale::new(y_domain, (r, 0.0));
        self.y_scale_unflipped = LinearScale::new(y_domain, (0.0, r));
    }

    pub fn data_min(&self, axis: Axis) -> f64 {
        self.data_mins[axis.dim()]
    }

    pub fn data_max(&self, axis: Axis) -> f64 {
        self.data_maxs[axis.dim()]
    }

    pub fn data_range(&self, axis: Axis) -> f64 {
        self.data_max(axis) - self.data_min(axis)
    }

    pub fn data_to_screen_x(&self, value: f64) -> f64 {
        self.x_scale.scale(value)
    }

    /// With `flip` larger values map closer to the top of the render space
    pub fn data_to_screen_y(&self, value: f64, flip: bool) -> f64 {
        if flip {
            self.y_scale.scale(value)
        } else {
            self.y_scale_unflipped.scale(value)
        }
    }

    pub fn data_to_screen(&self, axis: Axis, value: f64) -> f64 {
        match axis {
            Axis::X => self.data_to_screen_x(value),
            Axis::Y => self.data_to_screen_y(value, true),
        }
    }

    /// Rescales `value` so `brush_max` fills the whole `axis` range when the
    /// chart is normalized along the other axis.
    pub fn normalize_value(
        &self,
        value: f64,
        normalization: Option<Axis>,
        axis: Axis,
        brush_max: f64,
    ) -> f64 {
        if normalization == Some(axis.other()) && brush_max != 0.0 {
            value / brush_max * self.data_range(axis)
        } else {
            value
        }
    }

    pub fn normalized_range(
        &self,
        value: f64,
        normalization: Option<Axis>,
        axis: Axis,
        brush_max: f64,
    ) -> NormalizedRange {
        let value = self.normalize_value(value, normalization, axis, brush_max);
        NormalizedRange {
            from: self.data_to_screen(axis, value.min(0.0)),
            to: self.data_to_screen(axis, value.max(0.0)),
            value,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.panel_width < self.compact_threshold || self.panel_height < self.compact_threshold
    }

    /// Rotation of x tick labels in radians. Labels wider than their bin slot
    /// are tilted until their horizontal footprint fits.
    pub fn label_angle(&self) -> f64 {
        if self.x_label_count == 0 || self.max_x_label_width <= 0.0 {
            return 0.0;
        }
        let slot = self.render_dimension / self.x_label_count as f64;
        if self.max_x_label_width <= slot {
            0.0
        } else {
            (slot / self.max_x_label_width).clamp(0.0, 1.0).acos()
        }
    }

    pub fn left_offset(&self) -> f64 {
        if self.is_compact() {
            return COMPACT_OFFSET;
        }
        AXIS_LABEL_PADDING + self.max_y_label_width + LABEL_FONT_HEIGHT
    }

    pub fn right_offset(&self) -> f64 {
        if self.is_compact() {
            return COMPACT_OFFSET;
        }
        // Half of the last, horizontal label may stick out past the plot
        let angle = self.label_angle();
        let overhang = if angle == 0.0 {
            self.max_x_label_width / 2.0
        } else {
            0.0
        };
        RIGHT_OFFSET.max(overhang)
    }

    pub fn top_offset(&self) -> f64 {
        if self.is_compact() {
            return COMPACT_OFFSET;
        }
        TOP_OFFSET
    }

    pub fn bottom_offset(&self) -> f64 {
        if self.is_compact() {
            return COMPACT_OFFSET;
        }
        let angle = self.label_angle();
        let label_extent =
            self.max_x_label_width * angle.sin() + LABEL_FONT_HEIGHT * angle.cos();
        AXIS_LABEL_PADDING + label_extent + LABEL_FONT_HEIGHT
    }
}

fn domain_of(labels: &[BinLabel]) -> (f64, f64) {
    let (Some(first), Some(last)) = (labels.first(), labels.last()) else {
        return (0.0, 1.0);
    };
    let min = first.min_value.min(last.min_value);
    let max = first.max_value.max(last.max_value);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        return (min, min + 1.0);
    }
    (min, max)
}

fn max_label_width(labels: &[BinLabel]) -> f64 {
    labels
        .iter()
        .map(|l| estimate_label_width(&l.label))
        .fold(0.0, f64::max)
}
