//! SQL text and parameter construction for the storage primitives.

use rowmap_types::{FieldValue, RowValues};
use rusqlite::types::{Value, ValueRef};

/// Quotes an identifier for use in SQL text.
///
/// The name is wrapped in double quotes and any embedded double quote is
/// doubled, so arbitrary table and column names are safe to splice.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn to_sql(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(i) => Value::Integer(*i),
        FieldValue::Real(r) => Value::Real(*r),
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Blob(b) => Value::Blob(b.clone()),
    }
}

/// Returns `None` for SQL `NULL`.
pub(crate) fn from_sql(value: ValueRef<'_>) -> Option<FieldValue> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(FieldValue::Integer(i)),
        ValueRef::Real(r) => Some(FieldValue::Real(r)),
        ValueRef::Text(t) => Some(FieldValue::Text(String::from_utf8_lossy(t).into_owned())),
        ValueRef::Blob(b) => Some(FieldValue::Blob(b.to_vec())),
    }
}

pub(crate) fn probe_statement(table: &str) -> String {
    format!("SELECT * FROM {} LIMIT 0", quote_ident(table))
}

pub(crate) fn insert_statement(table: &str, values: &RowValues) -> (String, Vec<Value>) {
    if values.is_empty() {
        return (
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table)),
            Vec::new(),
        );
    }

    let columns: Vec<String> = values.keys().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    );

    (sql, values.values().map(to_sql).collect())
}

/// Builds `UPDATE .. SET .. [WHERE ..]`. The caller guarantees `set` is
/// non-empty; an empty `criteria` produces no `WHERE` clause.
pub(crate) fn update_statement(
    table: &str,
    set: &RowValues,
    criteria: &RowValues,
) -> (String, Vec<Value>) {
    let mut params = Vec::with_capacity(set.len() + criteria.len());
    let mut idx = 1usize;

    let mut set_parts = Vec::with_capacity(set.len());
    for (column, value) in set {
        set_parts.push(format!("{} = ?{}", quote_ident(column), idx));
        params.push(to_sql(value));
        idx += 1;
    }

    let mut sql = format!("UPDATE {} SET {}", quote_ident(table), set_parts.join(", "));

    if !criteria.is_empty() {
        let mut clauses = Vec::with_capacity(criteria.len());
        for (column, value) in criteria {
            clauses.push(format!("{} = ?{}", quote_ident(column), idx));
            params.push(to_sql(value));
            idx += 1;
        }
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    (sql, params)
}
