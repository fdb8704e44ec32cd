use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Location;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct `#rrggbb` colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Location → colour
// ---------------------------------------------------------------------------

/// Fixed colour per station so a line keeps its colour whatever the filter.
#[derive(Debug, Clone)]
pub struct LocationColors {
    colors: Vec<String>,
}

impl Default for LocationColors {
    fn default() -> Self {
        LocationColors {
            colors: generate_palette(Location::ALL.len()),
        }
    }
}

impl LocationColors {
    pub fn color_for(&self, location: Location) -> &str {
        self.colors
            .get(location.index())
            .map(String::as_str)
            .unwrap_or("#808080")
    }
}
