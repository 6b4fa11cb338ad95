//! Error types for entity mappers.

use rowmap_db::DbError;
use rowmap_types::ValueError;

/// Errors that can occur while building or using a mapper.
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// The database handle was closed when initialization started.
    #[error("database handle is not open")]
    HandleNotOpen,

    /// The create-table statement failed.
    #[error("failed to create table '{table}': {source}")]
    SchemaCreate {
        /// The resolved table name.
        table: String,
        /// The underlying database error.
        source: DbError,
    },

    /// The zero-row column probe failed, usually because the table is
    /// missing.
    #[error("failed to probe columns of table '{table}': {source}")]
    SchemaProbe {
        /// The resolved table name.
        table: String,
        /// The underlying database error.
        source: DbError,
    },

    /// A field value could not be converted.
    #[error("field '{field}' could not be accessed: {source}")]
    FieldAccess {
        /// The declared field name.
        field: &'static str,
        /// The conversion failure.
        source: ValueError,
    },

    /// The insert or update primitive failed.
    #[error("write to table '{table}' failed: {source}")]
    StorageWrite {
        /// The resolved table name.
        table: String,
        /// The underlying database error.
        source: DbError,
    },

    /// An update had no non-null mapped field to set.
    #[error("update of table '{0}' has no values to set")]
    NothingToUpdate(String),

    /// An update had no non-null mapped field to match on.
    #[error("update of table '{0}' has no match criteria")]
    MissingCriteria(String),

    /// The factory could not produce a ready mapper.
    #[error("failed to construct mapper {mapper}: {source}")]
    Construction {
        /// The mapper's type name.
        mapper: &'static str,
        /// Why initialization failed.
        source: Box<MapperError>,
    },
}
