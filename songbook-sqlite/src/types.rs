//! Conversions between bound filter values and SQLite values.

use rusqlite::types::Value;

use songbook_query::FilterValue;

/// Convert a [`FilterValue`] to a SQLite value.
pub fn filter_value_to_sqlite(value: &FilterValue) -> Value {
    match value {
        FilterValue::Null => Value::Null,
        FilterValue::Int(i) => Value::Integer(*i),
        FilterValue::String(s) => Value::Text(s.clone()),
    }
}

/// Convert a parameter list in placeholder order.
pub fn to_params(values: &[FilterValue]) -> Vec<Value> {
    values.iter().map(filter_value_to_sqlite).collect()
}
