//! Shared value types for the rowmap workspace.
//!
//! This crate defines the vocabulary every other rowmap crate speaks when
//! moving data between entity fields and table rows:
//!
//! - [`FieldValue`]: a single non-null column value.
//! - [`RowValues`]: an ordered column name to value mapping, produced fresh
//!   for every insert or update and returned for every queried row.
//! - [`ToFieldValue`] / [`FromFieldValue`]: conversions between Rust field
//!   types and stored values.
//!
//! There is deliberately no null variant. A field whose value is absent
//! yields `None` from [`ToFieldValue::to_field_value`], and the column is
//! left out of the row mapping entirely.

mod convert;
mod error;
mod value;

pub use convert::{FromFieldValue, ToFieldValue};
pub use error::ValueError;
pub use value::{FieldValue, RowValues};
