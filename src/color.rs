use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::analysis::calculator::RiskBand;
use crate::analysis::segment::RiskSegment;

fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_color((i as f32 / n as f32) * 360.0 + 200.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Churn colour ramp: green (no churn) → yellow → red (all churn)
// ---------------------------------------------------------------------------

/// Colour for a churn rate in [0, 1]; out-of-range rates are clamped.
pub fn churn_rate_color(rate: f64) -> Color32 {
    let t = (if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) }) as f32;
    hsl_color(120.0 * (1.0 - t), 0.7, 0.45)
}

pub fn segment_color(segment: RiskSegment) -> Color32 {
    match segment {
        RiskSegment::High => churn_rate_color(1.0),
        RiskSegment::Medium => churn_rate_color(0.5),
        RiskSegment::Low => churn_rate_color(0.0),
    }
}

pub fn band_color(band: RiskBand) -> Color32 {
    match band {
        RiskBand::AboveAverage => segment_color(RiskSegment::High),
        RiskBand::Average => segment_color(RiskSegment::Medium),
        RiskBand::BelowAverage => segment_color(RiskSegment::Low),
    }
}
