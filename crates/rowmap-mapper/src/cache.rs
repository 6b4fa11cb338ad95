//! Column to field association for one mapped table.

use rowmap_db::Database;

use crate::entity::EntityDescriptor;
use crate::error::MapperError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedColumn {
    column: String,
    field: usize,
    field_name: &'static str,
}

/// The resolved association between a table's columns and an entity's
/// fields.
///
/// Built once when a mapper is constructed and never modified afterwards.
/// Entries keep the table's column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCache {
    entries: Vec<CachedColumn>,
}

impl ColumnCache {
    /// Probes `table` for its columns and matches them against the
    /// descriptor's fields.
    ///
    /// # Errors
    ///
    /// Returns `MapperError::SchemaProbe` if the table cannot be probed.
    pub(crate) fn build<T>(
        db: &Database,
        table: &str,
        descriptor: &EntityDescriptor<T>,
    ) -> Result<Self, MapperError> {
        let columns = db
            .column_names(table)
            .map_err(|source| MapperError::SchemaProbe {
                table: table.to_string(),
                source,
            })?;

        let cache = Self::match_columns(&columns, descriptor);
        tracing::debug!(
            table,
            columns = columns.len(),
            mapped = cache.len(),
            "built column cache"
        );
        Ok(cache)
    }

    /// Associates each column with the first field, in declaration order,
    /// whose logical name equals it exactly. Columns without a match are
    /// left out.
    pub(crate) fn match_columns<T>(columns: &[String], descriptor: &EntityDescriptor<T>) -> Self {
        let mut entries = Vec::with_capacity(columns.len());

        for column in columns {
            let found = descriptor
                .fields()
                .iter()
                .position(|field| field.logical_name() == column.as_str());

            match found {
                Some(field) => entries.push(CachedColumn {
                    column: column.clone(),
                    field,
                    field_name: descriptor.fields()[field].name(),
                }),
                None => tracing::debug!(
                    column = column.as_str(),
                    entity = descriptor.type_name(),
                    "column has no matching field, skipping"
                ),
            }
        }

        Self { entries }
    }

    /// Number of mapped columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no column was mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `column` is mapped to a field.
    pub fn contains(&self, column: &str) -> bool {
        self.field_index(column).is_some()
    }

    /// Index into the descriptor's fields for `column`.
    pub fn field_index(&self, column: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.field)
    }

    /// `(column, declared field name)` pairs in table column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'static str)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.column.as_str(), e.field_name))
    }

    pub(crate) fn fields(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|e| (e.column.as_str(), e.field))
    }
}
