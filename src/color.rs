use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            let hsl = Hsl::new(hue, 0.65, 0.50);
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
// Color mapping: station → Color32
// ---------------------------------------------------------------------------

/// Assigns each station a distinct colour, used for the filter-panel
/// swatches and the correlation scatter series.
#[derive(Debug, Clone, Default)]
pub struct StationColors {
    mapping: BTreeMap<String, Color32>,
}

impl StationColors {
    /// Build the mapping over a sorted station list.
    pub fn new(stations: &[String]) -> Self {
        let palette = generate_palette(stations.len());
        let mapping = stations
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();
        StationColors { mapping }
    }

    /// Look up the colour for a station.
    pub fn color_for(&self, station: &str) -> Color32 {
        self.mapping.get(station).copied().unwrap_or(Color32::GRAY)
    }
}
