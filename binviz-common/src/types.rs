use serde::{Deserialize, Serialize};

/// Chart axis. `X` is dimension 0, `Y` dimension 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn dim(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Chart layout derived from which axes hold aggregate values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    HeatMap,
    VerticalBar,
    HorizontalBar,
    SinglePoint,
}

impl ChartType {
    pub fn from_axes(x_is_aggregate: bool, y_is_aggregate: bool) -> Self {
        match (x_is_aggregate, y_is_aggregate) {
            (true, true) => ChartType::SinglePoint,
            (true, false) => ChartType::HorizontalBar,
            (false, true) => ChartType::VerticalBar,
            (false, false) => ChartType::HeatMap,
        }
    }

    pub fn is_bar(&self) -> bool {
        matches!(self, ChartType::VerticalBar | ChartType::HorizontalBar)
    }

    /// Axis holding the bar length, if this is a bar chart
    pub fn bar_axis(&self) -> Option<Axis> {
        match self {
            ChartType::VerticalBar => Some(Axis::Y),
            ChartType::HorizontalBar => Some(Axis::X),
            _ => None,
        }
    }

    pub fn is_binned(&self, axis: Axis) -> bool {
        match self {
            ChartType::HeatMap => true,
            ChartType::VerticalBar => axis == Axis::X,
            ChartType::HorizontalBar => axis == Axis::Y,
            ChartType::SinglePoint => false,
        }
    }
}

/// Axis aligned rectangle in logical units, `y` growing downwards
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corners given in any order
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Scales width and height by `factor` keeping the center fixed
    pub fn scale_centered(&self, factor: f64) -> Self {
        let (cx, cy) = self.center();
        let width = self.width * factor;
        let height = self.height * factor;
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}
