use eframe::egui::Color32;
use palette::{FromColor, Hsl, IntoColor, Lab, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging map: value in [vmin, vmax] → RGB
// ---------------------------------------------------------------------------

const COOL: (f32, f32, f32) = (0.230, 0.299, 0.754);
const NEUTRAL: (f32, f32, f32) = (0.865, 0.865, 0.865);
const WARM: (f32, f32, f32) = (0.706, 0.016, 0.150);

/// Blue → grey → red, interpolated in Lab space. `t` is clamped to [0, 1];
/// NaN maps to the neutral midpoint.
pub fn coolwarm(t: f64) -> [u8; 3] {
    let t = (if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) }) as f32;
    let lab = |(r, g, b): (f32, f32, f32)| -> Lab {
        Lab::from_color(Srgb::new(r, g, b).into_linear())
    };

    let mixed = if t < 0.5 {
        lab(COOL).mix(lab(NEUTRAL), t * 2.0)
    } else {
        lab(NEUTRAL).mix(lab(WARM), (t - 0.5) * 2.0)
    };
    let linear: LinSrgb = mixed.into_color();
    let rgb: Srgb = Srgb::from_linear(linear);
    [
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

/// Relative luminance test used to pick a readable annotation colour.
pub fn is_dark([r, g, b]: [u8; 3]) -> bool {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32 <= 128.0
}
