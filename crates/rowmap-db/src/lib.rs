//! Database handle for the rowmap workspace.
//!
//! Owns exactly one SQLite connection per [`Database`] and exposes the
//! storage primitives the entity mappers consume: batch execution, the
//! zero-row schema probe, row queries, inserts and updates against a named
//! table with a column/value mapping.
//!
//! # Design decisions
//!
//! - **One connection, many borrowers**: a process opens a single
//!   `Database`, wraps it in an `Arc`, and hands it to every mapper. The
//!   connection sits behind a mutex so each primitive runs to completion
//!   before the next one starts.
//! - **WAL mode**: the handle asks for WAL journaling on open so external
//!   readers are not blocked by the single writer.
//! - **Bound parameters only**: identifiers are quoted, values are always
//!   bound; nothing from a row mapping is ever interpolated into SQL text.

mod handle;
mod sql;

pub use handle::{Database, DbError, DbRuntimeSettings};
pub use sql::quote_ident;
