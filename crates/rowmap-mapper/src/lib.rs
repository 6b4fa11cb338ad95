//! Entity-to-table mapping for the rowmap workspace.
//!
//! An entity type describes itself once, statically, through an
//! [`EntityDescriptor`]: an optional table name and an ordered list of
//! fields, each with an optional column override, an accessor, and an
//! optional mutator. A [`TableSchema`] supplies the create-table statement
//! for the entity's table. From those two pieces a [`Mapper`] is built:
//!
//! 1. the table name is resolved (override, else the entity's type name),
//! 2. the create-table statement is executed,
//! 3. the live table is probed for its columns and each column is matched
//!    to the first field whose logical name equals it ([`ColumnCache`]).
//!
//! The mapper then marshals entities into row-value mappings for inserts
//! and updates, and writes queried rows back into entities.
//!
//! [`MapperFactory`] owns the single shared [`rowmap_db::Database`] and
//! hands out ready mappers, building each one at most once.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rowmap_mapper::{Entity, EntityDescriptor, Field, MapperFactory, TableSchema};
//!
//! struct User {
//!     name: String,
//!     age: Option<i32>,
//! }
//!
//! impl Entity for User {
//!     fn descriptor() -> EntityDescriptor<Self> {
//!         EntityDescriptor::new()
//!             .table("user")
//!             .field(Field::new("name", |u: &User| u.name.clone()))
//!             .field(Field::new("age", |u: &User| u.age))
//!     }
//! }
//!
//! #[derive(Default)]
//! struct UserTable;
//!
//! impl TableSchema for UserTable {
//!     type Entity = User;
//!
//!     fn create_table(&self, table: &str) -> String {
//!         format!("CREATE TABLE IF NOT EXISTS {table} (id INTEGER PRIMARY KEY, name TEXT, age TEXT)")
//!     }
//! }
//!
//! let factory = MapperFactory::open("app.db", Default::default())?;
//! let users = factory.get_mapper::<UserTable>()?;
//! let id = users.insert(&User { name: "Alice".into(), age: None })?;
//! ```

mod cache;
mod entity;
mod error;
mod factory;
mod mapper;

pub use cache::ColumnCache;
pub use entity::{Entity, EntityDescriptor, Field, TableSchema};
pub use error::MapperError;
pub use factory::MapperFactory;
pub use mapper::Mapper;
