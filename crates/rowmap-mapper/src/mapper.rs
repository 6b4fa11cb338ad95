//! A ready entity mapper.

use std::sync::Arc;

use rowmap_db::Database;
use rowmap_types::RowValues;

use crate::cache::ColumnCache;
use crate::entity::{Entity, EntityDescriptor, TableSchema};
use crate::error::MapperError;

/// Maps entities of `S::Entity` onto rows of one table.
///
/// A `Mapper` only exists fully initialized: [`Mapper::new`] resolves the
/// table name, creates the table, and builds the column cache, or fails.
/// All three are fixed for the mapper's lifetime.
pub struct Mapper<S: TableSchema> {
    schema: S,
    db: Arc<Database>,
    table: String,
    descriptor: EntityDescriptor<S::Entity>,
    cache: ColumnCache,
}

impl<S: TableSchema> Mapper<S> {
    /// Initializes a mapper for `schema` against `db`.
    ///
    /// # Errors
    ///
    /// - `MapperError::HandleNotOpen` if `db` is closed; nothing is
    ///   executed.
    /// - `MapperError::SchemaCreate` if the create-table statement fails.
    /// - `MapperError::SchemaProbe` if the table's columns cannot be read.
    pub fn new(schema: S, db: Arc<Database>) -> Result<Self, MapperError> {
        if !db.is_open() {
            return Err(MapperError::HandleNotOpen);
        }

        let descriptor = S::Entity::descriptor();
        let table = descriptor.table_name().to_string();

        let create = schema.create_table(&table);
        if !create.trim().is_empty() {
            db.execute(&create)
                .map_err(|source| MapperError::SchemaCreate {
                    table: table.clone(),
                    source,
                })?;
            tracing::info!(table = %table, "ensured table exists");
        }

        let cache = ColumnCache::build(&db, &table, &descriptor)?;
        if cache.is_empty() {
            tracing::warn!(
                table = %table,
                entity = descriptor.type_name(),
                "no table column matches any entity field"
            );
        }

        Ok(Self {
            schema,
            db,
            table,
            descriptor,
            cache,
        })
    }

    /// The resolved table name.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The column to field association.
    pub fn cache(&self) -> &ColumnCache {
        &self.cache
    }

    /// The entity's descriptor.
    pub fn descriptor(&self) -> &EntityDescriptor<S::Entity> {
        &self.descriptor
    }

    /// The shared database handle.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// The schema this mapper was built from.
    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Marshals `entity` into a column/value mapping.
    ///
    /// Only mapped columns appear. Null fields are omitted, never stored
    /// as an explicit null. A field whose accessor fails is skipped for
    /// this call and logged.
    pub fn row_values(&self, entity: &S::Entity) -> RowValues {
        let mut values = RowValues::new();
        let fields = self.descriptor.fields();

        for (column, idx) in self.cache.fields() {
            let field = &fields[idx];
            match field.read(entity) {
                Ok(Some(value)) => {
                    values.insert(column.to_string(), value);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    table = %self.table,
                    field = field.name(),
                    error = %e,
                    "skipping unreadable field"
                ),
            }
        }

        values
    }

    /// Like [`Mapper::row_values`], but an accessor failure aborts with
    /// `MapperError::FieldAccess` instead of dropping the column.
    fn strict_row_values(&self, entity: &S::Entity) -> Result<RowValues, MapperError> {
        let mut values = RowValues::new();
        let fields = self.descriptor.fields();

        for (column, idx) in self.cache.fields() {
            let field = &fields[idx];
            let value = field
                .read(entity)
                .map_err(|source| MapperError::FieldAccess {
                    field: field.name(),
                    source,
                })?;
            if let Some(value) = value {
                values.insert(column.to_string(), value);
            }
        }

        Ok(values)
    }

    /// Inserts `entity` and returns the new row id.
    ///
    /// # Errors
    ///
    /// Returns `MapperError::StorageWrite` if the insert fails, e.g. on a
    /// constraint violation.
    pub fn insert(&self, entity: &S::Entity) -> Result<i64, MapperError> {
        let values = self.row_values(entity);
        let id = self
            .db
            .insert(&self.table, &values)
            .map_err(|source| self.write_error(source))?;
        tracing::debug!(table = %self.table, row_id = id, columns = values.len(), "inserted row");
        Ok(id)
    }

    /// Updates the rows matching `criteria` with the values of `entity` and
    /// returns the number of rows changed.
    ///
    /// Every non-null mapped field of `entity` is assigned; every non-null
    /// mapped field of `criteria` must match. An unreadable field of
    /// `entity` is left unassigned, but an unreadable field of `criteria`
    /// refuses the update rather than widening the match.
    ///
    /// # Errors
    ///
    /// - `MapperError::FieldAccess` if a field of `criteria` cannot be read.
    /// - `MapperError::NothingToUpdate` if `entity` has no non-null mapped
    ///   field.
    /// - `MapperError::MissingCriteria` if `criteria` has none, so an update
    ///   never silently applies to the whole table.
    /// - `MapperError::StorageWrite` if the update fails.
    pub fn update(
        &self,
        entity: &S::Entity,
        criteria: &S::Entity,
    ) -> Result<usize, MapperError> {
        let set = self.row_values(entity);
        if set.is_empty() {
            return Err(MapperError::NothingToUpdate(self.table.clone()));
        }
        let filter = self.strict_row_values(criteria)?;
        if filter.is_empty() {
            return Err(MapperError::MissingCriteria(self.table.clone()));
        }

        let changed = self
            .db
            .update(&self.table, &set, &filter)
            .map_err(|source| self.write_error(source))?;
        tracing::debug!(table = %self.table, changed, "updated rows");
        Ok(changed)
    }

    /// Writes every mapped column of `row` into `entity` and returns how
    /// many fields were set.
    ///
    /// A mapped column absent from `row` is null: it clears an `Option`
    /// field to `None` and leaves any other field untouched. Fields
    /// declared without a setter are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MapperError::FieldAccess` if a value cannot be converted to
    /// its field's type. Fields before the failing one keep their new value.
    pub fn apply_row(&self, entity: &mut S::Entity, row: &RowValues) -> Result<usize, MapperError> {
        let fields = self.descriptor.fields();
        let mut written = 0;

        for (column, idx) in self.cache.fields() {
            let field = &fields[idx];
            let wrote = field
                .write(entity, row.get(column).cloned())
                .map_err(|source| MapperError::FieldAccess {
                    field: field.name(),
                    source,
                })?;
            if wrote {
                written += 1;
            }
        }

        Ok(written)
    }

    fn write_error(&self, source: rowmap_db::DbError) -> MapperError {
        MapperError::StorageWrite {
            table: self.table.clone(),
            source,
        }
    }
}

impl<S: TableSchema> std::fmt::Debug for Mapper<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("table", &self.table)
            .field("descriptor", &self.descriptor)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
