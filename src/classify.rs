//! Choropleth classification: turns a numeric range into evenly spaced color
//! bins and maps region values onto them.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, MapColorConfig},
    source::RegionData,
};

/// Neutral fill used for missing data and the "no colorscheme" sentinel.
pub const MISSING_FILL: &str = "#FFFFFF";

const DARK_BORDER: &str = "#000000";
const LIGHT_BORDER: &str = "#FFFFFF";

/// Relative scale used to widen a zero-width value range. Applied to the
/// magnitude of the upper bound; `f64::EPSILON` is the absolute floor when
/// both bounds are exactly zero. This is the single degenerate-range policy
/// for the whole crate: `widened_range` is the only place a range is ever
/// perturbed, and both dynamic inference and the constructor call it.
const RANGE_EPSILON: f64 = 1e-9;

/// Named continuous color scales, plus the "no colorscheme" sentinel used
/// for boundary-only rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Turbo,
    Warm,
    Cool,
    Cubehelix,
    /// Diverging red-yellow-blue scale, kept under its upstream name.
    Interpolate,
    #[serde(rename = "no colorscheme")]
    NoColorscheme,
}

impl ColorScheme {
    fn gradient(self) -> Option<colorous::Gradient> {
        match self {
            ColorScheme::Viridis => Some(colorous::VIRIDIS),
            ColorScheme::Plasma => Some(colorous::PLASMA),
            ColorScheme::Inferno => Some(colorous::INFERNO),
            ColorScheme::Magma => Some(colorous::MAGMA),
            ColorScheme::Cividis => Some(colorous::CIVIDIS),
            ColorScheme::Turbo => Some(colorous::TURBO),
            ColorScheme::Warm => Some(colorous::WARM),
            ColorScheme::Cool => Some(colorous::COOL),
            ColorScheme::Cubehelix => Some(colorous::CUBEHELIX),
            ColorScheme::Interpolate => Some(colorous::RED_YELLOW_BLUE),
            ColorScheme::NoColorscheme => None,
        }
    }

    /// Contrasting border color for region outlines. This reproduces a fixed
    /// partition of schemes into visually dark and visually light groups; it
    /// is a presentation heuristic, not a luminance computation.
    pub fn border_color(self) -> &'static str {
        match self {
            ColorScheme::Inferno
            | ColorScheme::Magma
            | ColorScheme::Plasma
            | ColorScheme::Viridis
            | ColorScheme::Turbo
            | ColorScheme::Cubehelix
            | ColorScheme::Cividis
            | ColorScheme::Interpolate => LIGHT_BORDER,
            ColorScheme::Warm | ColorScheme::Cool | ColorScheme::NoColorscheme => DARK_BORDER,
        }
    }
}

/// Immutable classification table: `num_bins + 1` thresholds, `num_bins`
/// colors, and a border color. Built once per (color config, data) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapColor {
    thresholds: Vec<f64>,
    colors: Vec<String>,
    border_color: String,
    #[serde(skip)]
    scheme: ColorScheme,
}

impl MapColor {
    /// Builds the bin table from a color configuration. Never fails for
    /// well-typed numeric bounds: a collapsed range is widened by
    /// `widened_range` so the bin width is always positive and finite.
    pub fn new(config: &MapColorConfig) -> Self {
        let bins = config.num_bins.max(1) as usize;
        let scheme = config.color_scheme.unwrap_or(ColorScheme::Viridis);
        let lo = config.min_value.min(config.max_value);
        let hi = config.min_value.max(config.max_value);
        let (lo, hi) = widened_range(lo, hi);
        let bin_size = (hi - lo) / bins as f64;

        let mut thresholds: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * bin_size).collect();
        // The top boundary must equal the range maximum exactly, not the
        // accumulated `lo + bins * bin_size` rounding of it.
        thresholds[bins] = hi;
        let colors = match scheme.gradient() {
            None => vec![MISSING_FILL.to_string(); bins],
            Some(gradient) => (0..bins)
                .map(|i| {
                    // Sample at the bin midpoint so the color represents the
                    // bin's center rather than its edge.
                    let mut t = (i as f64 + 0.5) / bins as f64;
                    if config.color_scheme_inverted {
                        t = 1.0 - t;
                    }
                    let color = gradient.eval_continuous(t);
                    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
                })
                .collect(),
        };

        Self {
            thresholds,
            colors,
            border_color: scheme.border_color().to_string(),
            scheme,
        }
    }

    /// Builds a classifier for a validated configuration and the region data
    /// currently loaded. `geojson-only` maps render boundary-only with the
    /// neutral fill; data-driven maps apply dynamic range inference when the
    /// configuration asks for it.
    pub fn from_config(config: &AppConfig, region_data: &[RegionData]) -> Self {
        match config {
            AppConfig::GeojsonOnly(_) => Self::new(&MapColorConfig {
                min_value: 0.0,
                max_value: 1.0,
                num_bins: 7,
                color_scheme: Some(ColorScheme::NoColorscheme),
                dynamic: false,
                color_scheme_inverted: false,
            }),
            AppConfig::GeojsonDatafile(cfg) => {
                let mut color_config = cfg.map_color_config.clone();
                if color_config.dynamic {
                    let values: Vec<f64> = region_data
                        .iter()
                        .filter_map(RegionData::numeric_value)
                        .collect();
                    if !values.is_empty() {
                        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                        // Widen here as well, so a single-valued dataset never
                        // relies on the constructor fallback alone.
                        (color_config.min_value, color_config.max_value) =
                            widened_range(min, max);
                        debug!(
                            "dynamic range inferred from {} value(s): [{min}, {max}]",
                            values.len()
                        );
                    }
                }
                Self::new(&color_config)
            }
        }
    }

    /// Index of the half-open bin `[thresholds[i], thresholds[i+1])` holding
    /// `value`; the final bin is closed so the maximum lands in it. Values
    /// below the range and non-finite values clamp to bin 0, values above
    /// the range clamp to the last bin.
    pub fn classify(&self, value: f64) -> usize {
        let bins = self.colors.len();
        if !value.is_finite() || value < self.thresholds[0] {
            return 0;
        }
        if value >= self.thresholds[bins] {
            return bins - 1;
        }
        self.thresholds
            .windows(2)
            .position(|bounds| value >= bounds[0] && value < bounds[1])
            .unwrap_or(bins - 1)
    }

    /// Fill color for `value`. Missing (non-finite) values and the
    /// "no colorscheme" sentinel always yield the neutral fill.
    pub fn bin_color(&self, value: f64) -> &str {
        if self.scheme == ColorScheme::NoColorscheme || !value.is_finite() {
            return MISSING_FILL;
        }
        self.colors
            .get(self.classify(value))
            .map_or(MISSING_FILL, String::as_str)
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn border_color(&self) -> &str {
        &self.border_color
    }
}

/// Guarantees `hi > lo` by nudging the upper bound up when the range has
/// collapsed. The nudge is relative (`|hi| * RANGE_EPSILON`) so it stays
/// proportionate at any magnitude, with `f64::EPSILON` as the absolute floor
/// for an all-zero range.
fn widened_range(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        return (lo, hi);
    }
    let nudge = if hi == 0.0 {
        f64::EPSILON
    } else {
        hi.abs() * RANGE_EPSILON
    };
    (lo, hi + nudge)
}
