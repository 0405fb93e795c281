use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: series key → RGBColor
// ---------------------------------------------------------------------------

/// Maps each distinct key (electrode id, statistic name, ...) to a colour.
#[derive(Debug, Clone)]
pub struct ColorMap<K: Ord> {
    mapping: BTreeMap<K, RGBColor>,
    default_color: RGBColor,
}

impl<K: Ord + Clone> ColorMap<K> {
    /// Build a colour map from the given keys. Duplicates share a colour.
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        let unique: BTreeSet<K> = keys.into_iter().collect();
        let palette = generate_palette(unique.len());
        Self {
            mapping: unique.into_iter().zip(palette).collect(),
            default_color: RGBColor(128, 128, 128),
        }
    }

    /// Look up the colour for a key.
    pub fn color_for(&self, key: &K) -> RGBColor {
        self.mapping.get(key).copied().unwrap_or(self.default_color)
    }
}
