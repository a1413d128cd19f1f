//! Pure query-string builders shared by every data source variant.
//!
//! The builders are parameterized by a read-function name and a dataset
//! handle, so the same shapes serve delimited and columnar sources alike.
//! Identifiers (column names, handles) originate from validated
//! configuration or schema introspection and are interpolated directly;
//! filter values are user-selected from a previously extracted finite set
//! and are quoted as string literals with embedded quotes doubled. The `==`
//! comparator is deliberate: the target engine's dialect accepts it and the
//! upstream query shapes use it.

use itertools::Itertools;

/// Query returning the distinct values of `column`, cast to text and aliased
/// back to the column name.
pub fn distinct_query(column: &str, read_function: &str, handle: &str) -> String {
    format!(
        "SELECT DISTINCT CAST({column} AS VARCHAR) AS {column} \
         FROM {read_function}('{handle}')"
    )
}

/// Query returning one `(regionId, value)` row per region matching the
/// equality conjunction over `selection`. An empty selection matches every
/// row, so the WHERE clause is omitted entirely.
pub fn filtered_row_query(
    selection: &[(String, String)],
    id_column: &str,
    value_column: &str,
    read_function: &str,
    handle: &str,
) -> String {
    let base = format!(
        "SELECT {id_column} AS regionId, CAST({value_column} AS DOUBLE) AS value \
         FROM {read_function}('{handle}')"
    );
    if selection.is_empty() {
        return base;
    }
    let filter_clause = selection
        .iter()
        .map(|(column, value)| format!("{column} == '{}'", escape_literal(value)))
        .join(" AND ");
    format!("{base} WHERE {filter_clause}")
}

/// Query describing the dataset's output columns; each result row carries a
/// `column_name` field.
pub fn column_names_query(read_function: &str, handle: &str) -> String {
    format!("DESCRIBE SELECT * FROM {read_function}('{handle}')")
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_query_casts_and_aliases_the_column() {
        let query = distinct_query("disease", "read_parquet", "dataset.parquet");
        assert_eq!(
            query,
            "SELECT DISTINCT CAST(disease AS VARCHAR) AS disease \
             FROM read_parquet('dataset.parquet')"
        );
    }

    #[test]
    fn filtered_row_query_joins_selection_with_and() {
        let selection = vec![
            ("year".to_string(), "1918".to_string()),
            ("disease".to_string(), "influenza".to_string()),
        ];
        let query = filtered_row_query(
            &selection,
            "cbscode",
            "mention_rate",
            "read_parquet",
            "dataset.parquet",
        );
        assert!(query.contains("cbscode AS regionId"));
        assert!(query.contains("CAST(mention_rate AS DOUBLE) AS value"));
        assert!(query.contains("WHERE year == '1918' AND disease == 'influenza'"));
    }

    #[test]
    fn filtered_row_query_omits_where_for_empty_selection() {
        let query = filtered_row_query(&[], "code", "rate", "read_csv", "dataset.csv");
        assert!(!query.contains("WHERE"));
        assert!(query.ends_with("FROM read_csv('dataset.csv')"));
    }

    #[test]
    fn filter_values_double_embedded_quotes() {
        let selection = vec![("region".to_string(), "'s-Hertogenbosch".to_string())];
        let query = filtered_row_query(&selection, "code", "rate", "read_csv", "dataset.csv");
        assert!(query.contains("region == '''s-Hertogenbosch'"));
    }

    #[test]
    fn column_names_query_describes_the_dataset() {
        let query = column_names_query("read_csv", "dataset.csv");
        assert_eq!(query, "DESCRIBE SELECT * FROM read_csv('dataset.csv')");
    }
}
