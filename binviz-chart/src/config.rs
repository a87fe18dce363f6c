use binviz_common::brush::{Brush, BrushRole};
use binviz_scales::selector::BinRangeSelector;
use serde::{Deserialize, Serialize};

use crate::constants::{COMPACT_THRESHOLD, POINT_RADIUS, RENDER_DIMENSION};
use crate::error::BinvizChartError;

/// Layout and styling options of a histogram view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub render_dimension: f64,
    pub compact_threshold: f64,
    pub point_radius: f64,
    /// Width of a margin-of-error rect relative to its bar's thickness
    pub margin_width_fraction: f64,
    pub heat_min_color: [f32; 4],
    pub all_brush_color: [f32; 4],
    pub overlap_brush_color: [f32; 4],
    pub rest_brush_color: [f32; 4],
    pub user_brush_colors: Vec<[f32; 4]>,
    pub bar_target_bins: usize,
    pub heatmap_target_bins: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        let selector = BinRangeSelector::default();
        Self {
            render_dimension: RENDER_DIMENSION,
            compact_threshold: COMPACT_THRESHOLD,
            point_radius: POINT_RADIUS,
            margin_width_fraction: 0.1,
            heat_min_color: [0.93, 0.93, 0.93, 1.0],
            all_brush_color: [0.25, 0.45, 0.7, 1.0],
            overlap_brush_color: [0.35, 0.35, 0.35, 1.0],
            rest_brush_color: [0.72, 0.72, 0.72, 1.0],
            user_brush_colors: vec![
                [0.89, 0.35, 0.2, 1.0],
                [0.2, 0.63, 0.32, 1.0],
                [0.58, 0.4, 0.74, 1.0],
                [0.93, 0.69, 0.13, 1.0],
            ],
            bar_target_bins: selector.bar_target_bins,
            heatmap_target_bins: selector.heatmap_target_bins,
        }
    }
}

impl HistogramConfig {
    /// Parses a config, filling omitted fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, BinvizChartError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn selector(&self) -> BinRangeSelector {
        BinRangeSelector {
            bar_target_bins: self.bar_target_bins,
            heatmap_target_bins: self.heatmap_target_bins,
        }
    }

    /// Explicit brush color, else the default of its role
    pub fn brush_color(&self, brush: &Brush) -> [f32; 4] {
        if let Some(color) = brush.color {
            return color;
        }
        match brush.role {
            BrushRole::All => self.all_brush_color,
            BrushRole::Overlap => self.overlap_brush_color,
            BrushRole::Rest => self.rest_brush_color,
            BrushRole::User => {
                if self.user_brush_colors.is_empty() {
                    self.all_brush_color
                } else {
                    let slot = brush.index.unsigned_abs() as usize % self.user_brush_colors.len();
                    self.user_brush_colors[slot]
                }
            }
        }
    }
}
