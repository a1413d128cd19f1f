use serde_json::json;

use choromap::classify::ColorScheme;
use choromap::config::AppConfig;

fn datafile_input() -> serde_json::Value {
    json!({
        "kind": "geojson-datafile",
        "geojsonFileName": "nl1869.geojson",
        "dataFileName": "mentions_monthly.parquet",
        "idColumnGeojson": "statcode",
        "idColumnDataFile": "cbscode",
        "categoryColumns": ["year", "month", "disease"],
        "valueColumn": "mention_rate",
        "legendTitle": "Mention Rate",
        "mapColorConfig": {
            "minValue": 0.0,
            "maxValue": 1.0,
            "numBins": 5,
            "colorScheme": "magma",
            "dynamic": true,
            "colorSchemeInverted": false
        },
        "initialFiltering": { "year": "1918", "disease": "influenza" },
        "mapDescription": {
            "title": "Disease mentions",
            "description": "Monthly newspaper mention rate per municipality."
        }
    })
}

#[test]
fn full_datafile_config_round_trips_every_field() {
    let config = AppConfig::validate(datafile_input()).expect("valid config");
    let AppConfig::GeojsonDatafile(cfg) = config else {
        panic!("expected geojson-datafile variant");
    };
    assert_eq!(cfg.data_file_name, "mentions_monthly.parquet");
    assert_eq!(cfg.id_column_data_file, "cbscode");
    assert_eq!(cfg.category_columns, vec!["year", "month", "disease"]);
    assert_eq!(cfg.map_color_config.num_bins, 5);
    assert_eq!(cfg.map_color_config.color_scheme, Some(ColorScheme::Magma));
    assert!(cfg.map_color_config.dynamic);
    let filtering = cfg.initial_filtering.expect("initial filtering");
    assert_eq!(filtering["year"], "1918");
    assert_eq!(filtering["disease"], "influenza");
    let description = cfg.map_description.expect("map description");
    assert_eq!(description.title, "Disease mentions");
}

#[test]
fn datafile_fields_are_required_by_the_discriminant() {
    let mut input = datafile_input();
    input.as_object_mut().unwrap().remove("valueColumn");
    assert!(AppConfig::validate(input).is_err());

    // The same field is not required for the boundary-only shape.
    let config = AppConfig::validate(json!({
        "kind": "geojson-only",
        "geojsonFileName": "nederland.geojson",
        "idColumnGeojson": "statcode",
        "legendTitle": "Municipalities"
    }))
    .expect("geojson-only config");
    assert!(matches!(config, AppConfig::GeojsonOnly(_)));
}

#[test]
fn min_value_above_max_value_is_reported_on_min_value() {
    let mut input = datafile_input();
    input["mapColorConfig"]["minValue"] = json!(2.0);
    input["mapColorConfig"]["maxValue"] = json!(1.0);
    let err = AppConfig::validate(input).unwrap_err();
    assert!(
        err.violations
            .iter()
            .any(|v| v.path == "mapColorConfig.minValue")
    );
    assert!(err.to_string().contains("minValue"));
}

#[test]
fn validated_configs_keep_ordered_bounds() {
    let config = AppConfig::validate(datafile_input()).expect("valid config");
    let AppConfig::GeojsonDatafile(cfg) = config else {
        panic!("expected geojson-datafile variant");
    };
    assert!(cfg.map_color_config.min_value <= cfg.map_color_config.max_value);
}
