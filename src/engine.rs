use anyhow::Result;

/// One result row from the query engine, keyed by output column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Contract of the analytical engine this crate builds queries for.
///
/// The engine owns dataset registration and query execution; this crate only
/// constructs query strings and interprets the returned rows. Implementations
/// are expected to execute queries one at a time per registered dataset;
/// callers of this crate never issue overlapping queries themselves.
pub trait QueryEngine {
    /// Executes a query and returns its rows. Errors propagate unchanged to
    /// the caller, wrapped in the source-level taxonomy.
    fn execute_query(&mut self, query: &str) -> Result<Vec<Row>>;

    /// Registers raw dataset bytes under `handle` so queries can reference
    /// the dataset through a read function, e.g. `read_csv('handle')`.
    fn register_dataset(&mut self, handle: &str, bytes: &[u8]) -> Result<()>;

    /// Releases the connection and every registered dataset.
    fn close_connection(&mut self) -> Result<()>;
}
