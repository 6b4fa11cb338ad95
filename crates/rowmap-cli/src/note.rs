//! The `Note` entity stored by the command line tool.

use rowmap_mapper::{Entity, EntityDescriptor, Field, TableSchema};

/// A short titled note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub title: String,
    pub body: Option<String>,
}

impl Entity for Note {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::new()
            .table("notes")
            .field(
                Field::new("title", |n: &Note| n.title.clone())
                    .setter(|n: &mut Note, v: String| n.title = v),
            )
            .field(
                Field::new("body", |n: &Note| n.body.clone())
                    .column("content")
                    .setter(|n: &mut Note, v: Option<String>| n.body = v),
            )
    }
}

/// Schema for the `notes` table.
#[derive(Debug, Default)]
pub struct NotesTable;

impl TableSchema for NotesTable {
    type Entity = Note;

    fn create_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
            rowmap_db::quote_ident(table)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowmap_db::Database;
    use rowmap_mapper::MapperFactory;
    use std::sync::Arc;

    #[test]
    fn body_is_stored_under_content() {
        let db = Arc::new(Database::open_in_memory().expect("should open in-memory db"));
        let factory = MapperFactory::new(db.clone());
        let notes = factory.get_mapper::<NotesTable>().expect("should build mapper");

        let columns: Vec<&str> = notes.cache().iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["title", "content"]);

        let note = Note {
            title: "groceries".to_string(),
            body: Some("eggs".to_string()),
        };
        let id = notes.insert(&note).expect("should insert");

        let rows = db
            .query("SELECT * FROM notes WHERE id = ?1", &[id.into()])
            .expect("should query");
        let mut read = Note::default();
        notes.apply_row(&mut read, &rows[0]).expect("should convert");
        assert_eq!(read, note);
        assert!(rows[0].contains_key("created_at"));
    }
}
