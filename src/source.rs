//! Polymorphic data sources: one variant per supported tabular file format,
//! all funneling through the same query shapes. A factory selects the
//! variant from the file extension and registers the dataset with the query
//! engine before handing the source back.

use std::collections::BTreeMap;

use anyhow::anyhow;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    engine::{QueryEngine, Row},
    error::SourceError,
    query,
};

/// Distinct values observed per category column over the whole dataset,
/// keyed by column name. Value order within a column carries no meaning.
pub type FilterCategorySet = BTreeMap<String, Vec<String>>;

/// One row of region-level data for the current filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionData {
    pub region_id: String,
    /// Raw value as returned by the engine; parsed to a float only at
    /// classification time.
    pub value: serde_json::Value,
}

impl RegionData {
    /// The value parsed as a finite float, or `None` when the region's value
    /// is missing or non-numeric.
    pub fn numeric_value(&self) -> Option<f64> {
        let parsed = match &self.value {
            serde_json::Value::Number(number) => number.as_f64(),
            serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite())
    }
}

/// Uniform query surface over one loaded tabular file. Variants differ only
/// in the read function the engine exposes for their format and in their
/// handle policy; the operations themselves are shared.
pub trait DataSource: std::fmt::Debug {
    /// Engine-side read function for this format, e.g. `read_csv`.
    fn read_function(&self) -> &str;

    /// Handle the dataset is registered under.
    fn handle(&self) -> &str;

    /// Registers the dataset bytes with the engine. Invoked exactly once by
    /// the factory; a source is never returned uninitialized.
    fn initialize(&self, engine: &mut dyn QueryEngine, bytes: &[u8]) -> Result<(), SourceError> {
        debug!(
            "registering {} byte(s) under handle '{}'",
            bytes.len(),
            self.handle()
        );
        engine
            .register_dataset(self.handle(), bytes)
            .map_err(|source| SourceError::Registration {
                handle: self.handle().to_string(),
                source,
            })
    }

    /// Collects the distinct values of each category column, one query per
    /// column, sequentially in the given order. A failure on any column
    /// aborts the whole call; no partial category set is returned. The
    /// source itself stays usable for a retry.
    fn extract_filter_categories(
        &self,
        engine: &mut dyn QueryEngine,
        category_columns: &[String],
    ) -> Result<FilterCategorySet, SourceError> {
        let mut categories = FilterCategorySet::new();
        for column in category_columns {
            let sql = query::distinct_query(column, self.read_function(), self.handle());
            debug!("distinct query for '{column}': {sql}");
            let rows = engine
                .execute_query(&sql)
                .map_err(|source| query_error(format!("distinct values of column '{column}'"), source))?;
            let values = rows
                .iter()
                .map(|row| {
                    row.get(column.as_str()).map(stringify_cell).ok_or_else(|| {
                        query_error(
                            format!("distinct values of column '{column}'"),
                            anyhow!("result row is missing column '{column}'"),
                        )
                    })
                })
                .collect::<Result<Vec<String>, SourceError>>()?;
            categories.insert(column.clone(), values);
        }
        Ok(categories)
    }

    /// Returns one row per region matching the equality conjunction over
    /// `selection`. An empty result is not an error.
    fn get_region_data(
        &self,
        engine: &mut dyn QueryEngine,
        selection: &[(String, String)],
        id_column: &str,
        value_column: &str,
    ) -> Result<Vec<RegionData>, SourceError> {
        let sql = query::filtered_row_query(
            selection,
            id_column,
            value_column,
            self.read_function(),
            self.handle(),
        );
        debug!("region data query: {sql}");
        let rows = engine
            .execute_query(&sql)
            .map_err(|source| query_error("region data retrieval".to_string(), source))?;
        rows.into_iter().map(region_from_row).collect()
    }

    /// The dataset's column names as reported by the engine. Used to drive
    /// filter-builder UIs for formats without a predeclared schema.
    fn column_names(&self, engine: &mut dyn QueryEngine) -> Result<Vec<String>, SourceError> {
        let sql = query::column_names_query(self.read_function(), self.handle());
        let rows = engine
            .execute_query(&sql)
            .map_err(|source| query_error("column name discovery".to_string(), source))?;
        rows.iter()
            .map(|row| {
                row.get("column_name").map(stringify_cell).ok_or_else(|| {
                    query_error(
                        "column name discovery".to_string(),
                        anyhow!("describe row is missing 'column_name'"),
                    )
                })
            })
            .collect()
    }
}

fn query_error(operation: String, source: anyhow::Error) -> SourceError {
    SourceError::Query { operation, source }
}

fn region_from_row(row: Row) -> Result<RegionData, SourceError> {
    let region_id = row.get("regionId").map(stringify_cell).ok_or_else(|| {
        query_error(
            "region data retrieval".to_string(),
            anyhow!("result row is missing 'regionId'"),
        )
    })?;
    let value = row.get("value").cloned().unwrap_or(serde_json::Value::Null);
    Ok(RegionData { region_id, value })
}

/// Renders an engine cell the way the filter UI expects it: strings as-is,
/// integral floats without a trailing fraction.
fn stringify_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                integer.to_string()
            } else {
                let float = number.as_f64().unwrap_or_default();
                if float.is_finite() && float.fract() == 0.0 {
                    (float as i64).to_string()
                } else {
                    float.to_string()
                }
            }
        }
        serde_json::Value::Bool(flag) => flag.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Source over a delimited text file. A single delimited dataset is active
/// at a time, so a fixed handle is sufficient.
#[derive(Debug)]
pub struct DelimitedTextSource {
    handle: String,
}

impl DelimitedTextSource {
    pub fn new() -> Self {
        Self {
            handle: "dataset.csv".to_string(),
        }
    }
}

impl Default for DelimitedTextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for DelimitedTextSource {
    fn read_function(&self) -> &str {
        "read_csv"
    }

    fn handle(&self) -> &str {
        &self.handle
    }
}

/// Source over a columnar file. The handle is unique per load so a previous
/// registration of the same logical dataset can never collide.
#[derive(Debug)]
pub struct ColumnarSource {
    handle: String,
}

impl ColumnarSource {
    pub fn new() -> Self {
        Self {
            handle: format!("dataset-{}.parquet", Uuid::new_v4()),
        }
    }
}

impl Default for ColumnarSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for ColumnarSource {
    fn read_function(&self) -> &str {
        "read_parquet"
    }

    fn handle(&self) -> &str {
        &self.handle
    }
}

/// Selects a source variant from the file name's extension, registers the
/// dataset bytes, and returns the initialized source. Unrecognized
/// extensions fail with `UnsupportedFormat` naming the extension.
pub fn create_source(
    file_name: &str,
    bytes: &[u8],
    engine: &mut dyn QueryEngine,
) -> Result<Box<dyn DataSource>, SourceError> {
    let source = select_variant(file_name)?;
    info!(
        "loading '{file_name}' via {} as '{}'",
        source.read_function(),
        source.handle()
    );
    source.initialize(engine, bytes)?;
    Ok(source)
}

/// Extension sniffing only; the single place to extend when adding formats.
pub fn select_variant(file_name: &str) -> Result<Box<dyn DataSource>, SourceError> {
    let extension = file_name
        .rsplit_once('.')
        .map_or(file_name, |(_, ext)| ext)
        .to_ascii_lowercase();
    match extension.as_str() {
        "csv" => Ok(Box::new(DelimitedTextSource::new())),
        "parquet" => Ok(Box::new(ColumnarSource::new())),
        _ => Err(SourceError::UnsupportedFormat { extension }),
    }
}
