use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

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
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Heatmap scales
// ---------------------------------------------------------------------------

/// Sequential purple scale for shares in `[0, 1]`; darker is larger.
pub fn share_color(share: f64) -> Color32 {
    if share.is_nan() {
        return Color32::GRAY;
    }
    let t = share.clamp(0.0, 1.0) as f32;
    hsl_to_color32(Hsl::new(270.0_f32, 0.55, 0.95 - 0.6 * t))
}

/// Diverging scale for correlations in `[-1, 1]`: blue below zero, purple
/// above, white at zero.
pub fn correlation_color(r: f64) -> Color32 {
    if r.is_nan() {
        return Color32::GRAY;
    }
    let t = r.clamp(-1.0, 1.0) as f32;
    let hue: f32 = if t < 0.0 { 210.0 } else { 270.0 };
    hsl_to_color32(Hsl::new(hue, 0.6, 0.95 - 0.55 * t.abs()))
}

/// Dark text on light cells, light text on dark cells.
pub fn label_color(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// Color mapping: cell value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of one column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its distinct values.
    pub fn new<'a>(column: &str, values: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let values: Vec<&CellValue> = values.into_iter().collect();
        let palette = generate_palette(values.len());
        let mapping: BTreeMap<CellValue, Color32> = values
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(4).len(), 4);
    }

    #[test]
    fn test_share_color_darkens() {
        let light = share_color(0.0);
        let dark = share_color(1.0);
        assert!(light.r() > dark.r());
        assert_eq!(label_color(light), Color32::BLACK);
        assert_eq!(share_color(f64::NAN), Color32::GRAY);
    }

    #[test]
    fn test_color_map_lookup() {
        let values = [CellValue::Integer(0), CellValue::Integer(1)];
        let map = ColorMap::new("treatment", &values);
        assert_ne!(map.color_for(&values[0]), map.color_for(&values[1]));
        assert_eq!(map.color_for(&CellValue::Integer(9)), Color32::GRAY);
    }
}
