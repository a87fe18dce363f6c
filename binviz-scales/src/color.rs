use palette::{IntoColor, Laba, Mix, Srgba};

/// Exponent applied to normalized heatmap values before blending
pub const HEAT_EXPONENT: f64 = 1.0 / 3.0;

/// Blends two RGBA colors in CIE-LAB space. `t = 0` gives `from`, `t = 1`
/// gives `to`.
pub fn interpolate_lab(from: [f32; 4], to: [f32; 4], t: f32) -> [f32; 4] {
    let from: Laba = Srgba::from_components((from[0], from[1], from[2], from[3])).into_color();
    let to: Laba = Srgba::from_components((to[0], to[1], to[2], to[3])).into_color();
    let mixed: Srgba = from.mix(to, t.clamp(0.0, 1.0)).into_color();
    let (r, g, b, a) = mixed.into_components();
    [r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0), a.clamp(0.0, 1.0)]
}

/// Heatmap cell color for a value already normalized to `[0, 1]`
pub fn heat_color(min_color: [f32; 4], base_color: [f32; 4], normalized: f64) -> [f32; 4] {
    let normalized = if normalized.is_finite() {
        normalized.clamp(0.0, 1.0)
    } else {
        0.0
    };
    interpolate_lab(min_color, base_color, normalized.powf(HEAT_EXPONENT) as f32)
}
