//! The mapper provider.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rowmap_db::{Database, DbError, DbRuntimeSettings};

use crate::entity::TableSchema;
use crate::error::MapperError;
use crate::mapper::Mapper;

type Registry = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Owns the process's database handle and hands out ready mappers.
///
/// Each mapper type is built at most once per factory. Construction and
/// initialization run under one lock, so concurrent callers never execute
/// a schema statement twice. Failed constructions are not remembered, and
/// a later call tries again.
pub struct MapperFactory {
    db: Arc<Database>,
    mappers: Mutex<Registry>,
}

impl MapperFactory {
    /// Wraps an already open handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            mappers: Mutex::new(HashMap::new()),
        }
    }

    /// Opens the database at `path` and wraps it.
    ///
    /// # Errors
    ///
    /// See [`Database::open`].
    pub fn open(path: &str, settings: DbRuntimeSettings) -> Result<Self, DbError> {
        Ok(Self::new(Arc::new(Database::open(path, settings)?)))
    }

    /// The shared handle.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Returns the ready mapper for `S`, building it on first request.
    ///
    /// # Errors
    ///
    /// Returns `MapperError::Construction` wrapping the initialization
    /// failure. No mapper is registered in that case.
    pub fn get_mapper<S>(&self) -> Result<Arc<Mapper<S>>, MapperError>
    where
        S: TableSchema + Default,
    {
        let mut mappers = self.mappers.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = mappers.get(&TypeId::of::<S>()) {
            if let Ok(mapper) = Arc::clone(existing).downcast::<Mapper<S>>() {
                return Ok(mapper);
            }
        }

        let mapper = Mapper::new(S::default(), Arc::clone(&self.db)).map_err(|e| {
            MapperError::Construction {
                mapper: type_name::<S>(),
                source: Box::new(e),
            }
        })?;
        let mapper = Arc::new(mapper);

        tracing::info!(
            mapper = type_name::<S>(),
            table = mapper.table_name(),
            columns = mapper.cache().len(),
            "mapper ready"
        );

        mappers.insert(TypeId::of::<S>(), mapper.clone());
        Ok(mapper)
    }

    /// Number of mappers built so far.
    pub fn len(&self) -> usize {
        self.mappers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no mapper has been built yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MapperFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperFactory")
            .field("db", &self.db)
            .field("mappers", &self.len())
            .finish()
    }
}
