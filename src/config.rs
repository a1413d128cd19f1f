//! Map configuration model: a tagged union over the accepted configuration
//! shapes, plus the validator that rejects bad configs before any data is
//! touched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    classify::ColorScheme,
    error::{ConfigValidationError, Violation},
};

fn default_num_bins() -> u32 {
    7
}

/// Color/binning settings for a data-driven map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapColorConfig {
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default = "default_num_bins")]
    pub num_bins: u32,
    #[serde(default)]
    pub color_scheme: Option<ColorScheme>,
    /// When set, min/max are overridden by the loaded region values.
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub color_scheme_inverted: bool,
}

/// Optional title/description block shown alongside a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDescription {
    pub title: String,
    pub description: String,
}

/// Configuration for a boundary-only map with no data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeojsonOnlyConfig {
    pub geojson_file_name: String,
    pub id_column_geojson: String,
    #[serde(default)]
    pub legend_title: Option<String>,
}

/// Configuration for a data-driven map joining a boundary file to a tabular
/// data file on a shared region identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeojsonDatafileConfig {
    pub geojson_file_name: String,
    pub data_file_name: String,
    pub id_column_geojson: String,
    pub id_column_data_file: String,
    pub category_columns: Vec<String>,
    pub value_column: String,
    #[serde(default)]
    pub legend_title: Option<String>,
    pub map_color_config: MapColorConfig,
    /// Initially selected value per category column, keyed by column name.
    #[serde(default)]
    pub initial_filtering: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub map_description: Option<MapDescription>,
}

/// The accepted map configuration shapes. Exactly one variant is active,
/// selected by the `kind` discriminant; fields exist iff the discriminant
/// requires them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AppConfig {
    #[serde(rename = "geojson-only")]
    GeojsonOnly(GeojsonOnlyConfig),
    #[serde(rename = "geojson-datafile")]
    GeojsonDatafile(GeojsonDatafileConfig),
}

impl AppConfig {
    /// Validates arbitrary structured input against the configuration union.
    ///
    /// Structural matching (discriminant plus required fields) happens first;
    /// a structural mismatch is terminal. The per-case invariant rules are
    /// then checked in declaration order and every broken rule is reported,
    /// not just the first.
    pub fn validate(input: serde_json::Value) -> Result<Self, ConfigValidationError> {
        let config: AppConfig = serde_json::from_value(input).map_err(|err| {
            ConfigValidationError::new(vec![Violation::new("kind", err.to_string())])
        })?;

        let mut violations = Vec::new();
        if let AppConfig::GeojsonDatafile(cfg) = &config {
            if cfg.category_columns.is_empty() {
                violations.push(Violation::new(
                    "categoryColumns",
                    "must name at least one column",
                ));
            }
            // NaN bounds fail this comparison too, which is intended.
            if !(cfg.map_color_config.min_value <= cfg.map_color_config.max_value) {
                violations.push(Violation::new(
                    "mapColorConfig.minValue",
                    format!(
                        "must not exceed maxValue ({} > {})",
                        cfg.map_color_config.min_value, cfg.map_color_config.max_value
                    ),
                ));
            }
            if cfg.map_color_config.num_bins == 0 {
                violations.push(Violation::new(
                    "mapColorConfig.numBins",
                    "must be a positive integer",
                ));
            }
            if let Some(filtering) = &cfg.initial_filtering {
                for column in filtering.keys() {
                    if !cfg.category_columns.contains(column) {
                        violations.push(Violation::new(
                            format!("initialFiltering.{column}"),
                            "does not name a configured category column",
                        ));
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(config)
        } else {
            Err(ConfigValidationError::new(violations))
        }
    }
}
