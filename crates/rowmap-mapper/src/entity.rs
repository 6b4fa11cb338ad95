//! Static entity metadata.
//!
//! Each entity type lists its fields explicitly, in a fixed order, instead
//! of having them discovered at runtime. Field order is the order columns
//! are matched against, so it is part of the descriptor's contract.

use std::fmt;

use rowmap_types::{FieldValue, FromFieldValue, ToFieldValue, ValueError};

type Getter<T> = Box<dyn Fn(&T) -> Result<Option<FieldValue>, ValueError> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Option<FieldValue>) -> Result<bool, ValueError> + Send + Sync>;

/// One mapped field of entity type `T`.
pub struct Field<T> {
    name: &'static str,
    column: Option<&'static str>,
    get: Getter<T>,
    set: Option<Setter<T>>,
}

impl<T: 'static> Field<T> {
    /// Declares a field read by `get`.
    ///
    /// Returning `None` (e.g. from an `Option` field) marks the field null
    /// for that entity.
    pub fn new<V, G>(name: &'static str, get: G) -> Self
    where
        V: ToFieldValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            name,
            column: None,
            get: Box::new(move |entity: &T| Ok(get(entity).to_field_value())),
            set: None,
        }
    }

    /// Declares a field whose accessor can fail.
    ///
    /// A failure skips the field for that one marshalling call.
    pub fn try_new<G>(name: &'static str, get: G) -> Self
    where
        G: Fn(&T) -> Result<Option<FieldValue>, ValueError> + Send + Sync + 'static,
    {
        Self {
            name,
            column: None,
            get: Box::new(get),
            set: None,
        }
    }

    /// Maps the field to `column` instead of its declared name.
    pub fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    /// Attaches a mutator used when writing rows back into entities.
    ///
    /// A null column is written as `None` when `V` is an `Option`; other
    /// field types keep their current value.
    pub fn setter<V, S>(mut self, set: S) -> Self
    where
        V: FromFieldValue + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.set = Some(Box::new(
            move |entity: &mut T, value: Option<FieldValue>| -> Result<bool, ValueError> {
                let converted = match value {
                    Some(value) => V::from_field_value(value)?,
                    None => match V::from_null() {
                        Some(null) => null,
                        None => return Ok(false),
                    },
                };
                set(entity, converted);
                Ok(true)
            },
        ));
        self
    }
}

impl<T> Field<T> {
    /// The field's declared name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name matched against table columns: the override if given,
    /// otherwise the declared name.
    pub fn logical_name(&self) -> &'static str {
        self.column.unwrap_or(self.name)
    }

    /// Whether [`Field::setter`] was supplied.
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    pub(crate) fn read(&self, entity: &T) -> Result<Option<FieldValue>, ValueError> {
        (self.get)(entity)
    }

    /// Writes `value` into `entity`; `None` is a null column.
    ///
    /// Returns `Ok(false)` when nothing was written: the field has no
    /// mutator, or the value is null and the field type has no null form.
    pub(crate) fn write(
        &self,
        entity: &mut T,
        value: Option<FieldValue>,
    ) -> Result<bool, ValueError> {
        match &self.set {
            Some(set) => set(entity, value),
            None => Ok(false),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Table and field metadata for entity type `T`.
pub struct EntityDescriptor<T> {
    type_name: &'static str,
    table: Option<&'static str>,
    fields: Vec<Field<T>>,
}

impl<T> EntityDescriptor<T> {
    /// Starts an empty descriptor named after `T`.
    pub fn new() -> Self {
        Self {
            type_name: short_type_name::<T>(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// Sets an explicit table name.
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    /// Appends a field. Declaration order is matching order.
    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// The entity's short type name, e.g. `User` for `my_app::model::User`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The explicit table name, or the type name when none was given.
    pub fn table_name(&self) -> &'static str {
        self.table.unwrap_or(self.type_name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }
}

impl<T> Default for EntityDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EntityDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("fields", &self.fields)
            .finish()
    }
}

/// An application type stored as rows of one table.
pub trait Entity: Sized + 'static {
    /// Builds this type's metadata. Called once per mapper.
    fn descriptor() -> EntityDescriptor<Self>;
}

/// Supplies the schema for an entity's table.
///
/// Implementors are the per-entity mapper definitions handed to
/// [`crate::MapperFactory::get_mapper`].
pub trait TableSchema: Send + Sync + 'static {
    /// The entity stored in the table.
    type Entity: Entity;

    /// Returns the statement that creates `table`, or an empty string to
    /// skip schema creation.
    ///
    /// The statement runs on every mapper initialization, so it should be
    /// idempotent (`CREATE TABLE IF NOT EXISTS`).
    fn create_table(&self, table: &str) -> String;
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        label: Option<String>,
    }

    mod nested {
        #[allow(dead_code)]
        pub struct Wrapper<T>(pub T);
    }

    #[test]
    fn type_name_drops_module_path_and_generics() {
        assert_eq!(short_type_name::<Sample>(), "Sample");
        assert_eq!(short_type_name::<nested::Wrapper<Sample>>(), "Wrapper");
    }

    #[test]
    fn table_name_falls_back_to_type_name() {
        let descriptor = EntityDescriptor::<Sample>::new();
        assert_eq!(descriptor.table_name(), "Sample");
        assert_eq!(descriptor.table("samples").table_name(), "samples");
    }

    #[test]
    fn override_wins_over_declared_name() {
        let field = Field::new("name", |s: &Sample| s.label.clone()).column("nm");
        assert_eq!(field.name(), "name");
        assert_eq!(field.logical_name(), "nm");
    }

    #[test]
    fn setter_converts_and_reports_missing_mutator() {
        let readonly = Field::new("label", |s: &Sample| s.label.clone());
        let writable = readonly.setter(|s: &mut Sample, v: Option<String>| s.label = v);
        let mut sample = Sample { label: None };

        let wrote = writable
            .write(&mut sample, Some(FieldValue::from("x")))
            .expect("text converts to String");
        assert!(wrote);
        assert_eq!(sample.label.as_deref(), Some("x"));

        let plain = Field::new("label", |s: &Sample| s.label.clone());
        let wrote = plain
            .write(&mut sample, Some(FieldValue::from("y")))
            .expect("no mutator is not an error");
        assert!(!wrote);
        assert_eq!(sample.label.as_deref(), Some("x"));
    }

    #[test]
    fn null_clears_optional_fields_only() {
        struct Pair {
            label: Option<String>,
            count: i64,
        }

        let label = Field::new("label", |p: &Pair| p.label.clone())
            .setter(|p: &mut Pair, v: Option<String>| p.label = v);
        let count = Field::new("count", |p: &Pair| p.count)
            .setter(|p: &mut Pair, v: i64| p.count = v);
        let mut pair = Pair {
            label: Some("old".to_string()),
            count: 4,
        };

        assert!(label.write(&mut pair, None).expect("null is valid"));
        assert_eq!(pair.label, None);

        assert!(!count.write(&mut pair, None).expect("null is skipped"));
        assert_eq!(pair.count, 4);
    }
}
