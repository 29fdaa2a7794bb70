use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio_postgres::types::Type;

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `SqlHelperDbError` if the column cannot be retrieved.
pub fn postgres_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<RowValues, SqlHelperDbError> {
    let type_info = row.columns()[idx].type_().clone();

    let value = match type_info {
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)?
            .map_or(RowValues::Null, RowValues::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)?
            .map_or(RowValues::Null, RowValues::Float),
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)?
            .map_or(RowValues::Null, RowValues::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map_or(RowValues::Null, RowValues::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Timestamp(v.naive_utc())),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<Value>>(idx)?
            .map_or(RowValues::Null, RowValues::JSON),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(idx)?
            .map_or(RowValues::Null, RowValues::Blob),
        // text-like and anything else we read as a string
        _ => row
            .try_get::<_, Option<String>>(idx)?
            .map_or(RowValues::Null, RowValues::Text),
    };
    Ok(value)
}

/// Build a result set from raw Postgres rows, taking column names from `columns`.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set_from_rows(
    columns: &[tokio_postgres::Column],
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, SqlHelperDbError> {
    let column_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
