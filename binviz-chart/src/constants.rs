// Layout constants for axis labels and margins, in logical units

// Side length of the square primitives are laid out in
pub const RENDER_DIMENSION: f64 = 300.0;

// Panels narrower or shorter than this (device pixels) drop axis labels
pub const COMPACT_THRESHOLD: f64 = 150.0;

// Offset used on every side in compact mode
pub const COMPACT_OFFSET: f64 = 5.0;

// Estimated advance of one label character
pub const LABEL_CHAR_WIDTH: f64 = 6.0;

// Line height of axis labels and titles
pub const LABEL_FONT_HEIGHT: f64 = 12.0;

// Gap between the plot area and tick labels
pub const AXIS_LABEL_PADDING: f64 = 8.0;

pub const TOP_OFFSET: f64 = 10.0;
pub const RIGHT_OFFSET: f64 = 10.0;

// Half side of the square drawn for single point charts
pub const POINT_RADIUS: f64 = 5.0;

// Opacity of bars rescaled by normalization: OPACITY_SCALE * max/range + OPACITY_FLOOR
pub const OPACITY_SCALE: f64 = 0.6;
pub const OPACITY_FLOOR: f64 = 0.4;
