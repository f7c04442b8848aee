use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use tidy_panda::ColumnKind;

/// Hue step between consecutive series; keeps neighbours far apart on the wheel.
const GOLDEN_ANGLE: f32 = 137.507_77;

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Chart series colours
// ---------------------------------------------------------------------------

/// `n` distinct bar colours, starting from a blue.
pub fn series_colors(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (210.0 + i as f32 * GOLDEN_ANGLE) % 360.0;
            hsl_to_color32(hue, 0.70, 0.55)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Column kind badges in preview headers
// ---------------------------------------------------------------------------

pub fn kind_color(kind: ColumnKind) -> Color32 {
    match kind {
        ColumnKind::Integer => hsl_to_color32(210.0, 0.60, 0.60),
        ColumnKind::Float => hsl_to_color32(180.0, 0.55, 0.50),
        ColumnKind::Bool => hsl_to_color32(280.0, 0.45, 0.65),
        ColumnKind::Text => hsl_to_color32(35.0, 0.70, 0.55),
        ColumnKind::DateTime => hsl_to_color32(120.0, 0.40, 0.50),
        ColumnKind::Empty | ColumnKind::Mixed => Color32::GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_colors_are_distinct() {
        let colors = series_colors(2);
        assert_eq!(colors.len(), 2);
        assert_ne!(colors[0], colors[1]);
        assert!(series_colors(0).is_empty());
    }
}
