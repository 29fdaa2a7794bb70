use std::collections::HashMap;
use std::sync::Arc;

use super::row::{CustomDbRow, build_column_index};
use crate::types::RowValues;

/// A result set from a database query
///
/// This struct represents the result of a database query,
/// containing the rows returned by the query and metadata.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// The number of rows returned
    pub rows_affected: usize,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
            column_index: None,
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Some(Arc::new(build_column_index(&column_names)));
        self.column_names = Some(column_names);
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row to the result set. Rows added before column names are set are dropped.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let (Some(column_names), Some(index)) = (&self.column_names, &self.column_index) {
            self.results.push(CustomDbRow {
                column_names: Arc::clone(column_names),
                rows: row_values,
                column_index_cache: Arc::clone(index),
            });
            self.rows_affected += 1;
        }
    }

    /// Add a prebuilt row to the result set
    pub fn add_row(&mut self, row: CustomDbRow) {
        if self.column_names.is_none() {
            self.column_names = Some(Arc::clone(&row.column_names));
            self.column_index = Some(Arc::clone(&row.column_index_cache));
        }

        self.results.push(row);
        self.rows_affected += 1;
    }

    /// Consume the set, keeping only the first row.
    #[must_use]
    pub fn into_first(self) -> Option<CustomDbRow> {
        self.results.into_iter().next()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_lookup() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["id".into(), "name".into()]));
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Text("alice".into())]);
        rs.add_row_values(vec![RowValues::Int(2), RowValues::Text("bob".into())]);

        assert_eq!(rs.rows_affected, 2);
        assert_eq!(rs.results[1].get("name"), Some(&RowValues::Text("bob".into())));
        assert!(rs.results[0].get("missing").is_none());
        assert!(rs.results[0].try_get("missing").is_err());
    }

    #[test]
    fn values_without_columns_are_ignored() {
        let mut rs = ResultSet::default();
        rs.add_row_values(vec![RowValues::Int(1)]);
        assert!(rs.is_empty());
        assert!(rs.into_first().is_none());
    }
}
