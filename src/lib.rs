pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod source;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    classify::MapColor,
    cli::{BinsArgs, Cli, Commands, PlanArgs, ValidateArgs},
    config::AppConfig,
    source::RegionData,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("choromap", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => handle_validate(&args),
        Commands::Plan(args) => handle_plan(&args),
        Commands::Bins(args) => handle_bins(&args),
    }
}

fn load_config(path: &std::path::Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading configuration from {path:?}"))?;
    let input: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing configuration JSON in {path:?}"))?;
    let config = AppConfig::validate(input)?;
    Ok(config)
}

fn handle_validate(args: &ValidateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    match &config {
        AppConfig::GeojsonOnly(cfg) => {
            info!("Valid geojson-only configuration");
            println!("kind: geojson-only");
            println!("geojson: {}", cfg.geojson_file_name);
            println!("region id column: {}", cfg.id_column_geojson);
        }
        AppConfig::GeojsonDatafile(cfg) => {
            info!("Valid geojson-datafile configuration");
            println!("kind: geojson-datafile");
            println!("geojson: {}", cfg.geojson_file_name);
            println!("data file: {}", cfg.data_file_name);
            println!("category columns: {}", cfg.category_columns.join(", "));
            println!("value column: {}", cfg.value_column);
            println!(
                "bins: {} over [{}, {}]{}",
                cfg.map_color_config.num_bins,
                cfg.map_color_config.min_value,
                cfg.map_color_config.max_value,
                if cfg.map_color_config.dynamic {
                    " (dynamic)"
                } else {
                    ""
                }
            );
        }
    }
    Ok(())
}

fn handle_plan(args: &PlanArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let AppConfig::GeojsonDatafile(cfg) = config else {
        bail!("A geojson-only configuration has no data file to query");
    };
    let variant = source::select_variant(&cfg.data_file_name)?;

    let mut selection: Vec<(String, String)> = Vec::new();
    if let Some(filtering) = &cfg.initial_filtering {
        for (column, value) in filtering {
            selection.push((column.clone(), value.clone()));
        }
    }
    for entry in &args.select {
        let Some((column, value)) = entry.split_once('=') else {
            bail!("Selection entry '{entry}' is not of the form column=value");
        };
        selection.retain(|(existing, _)| existing != column);
        selection.push((column.to_string(), value.to_string()));
    }

    for column in &cfg.category_columns {
        println!(
            "{}",
            query::distinct_query(column, variant.read_function(), variant.handle())
        );
    }
    println!(
        "{}",
        query::filtered_row_query(
            &selection,
            &cfg.id_column_data_file,
            &cfg.value_column,
            variant.read_function(),
            variant.handle(),
        )
    );
    Ok(())
}

fn handle_bins(args: &BinsArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let region_data: Vec<RegionData> = args
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| RegionData {
            region_id: index.to_string(),
            value: serde_json::json!(value),
        })
        .collect();
    let map_color = MapColor::from_config(&config, &region_data);
    println!(
        "{}",
        serde_json::to_string_pretty(&map_color).context("Rendering bin table as JSON")?
    );
    Ok(())
}
