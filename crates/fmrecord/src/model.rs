//! Model instances bound from decoded records

mod export;
mod resolve;
mod schema;

pub use export::{Assignment, Destination, DestinationMeta, ToManyAction};
pub use resolve::{Resolve, SELF_PATH};
pub use schema::{Cardinality, ModelSchema, Relation, SchemaBuilder};

use indexmap::IndexMap;
use std::any::type_name;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::value::{FromValue, Record, Value};

/// An instance of a [`ModelSchema`] owning its own copy of every field
#[derive(Clone, Debug)]
pub struct Model {
    schema: Arc<ModelSchema>,
    fields: IndexMap<String, Field>,
}

impl Model {
    /// Every field at its default
    pub fn new(schema: &Arc<ModelSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            fields: schema.fields().clone(),
        }
    }

    /// Assign every field from its wire path in `source`
    pub fn bind<R: Resolve + ?Sized>(schema: &Arc<ModelSchema>, source: &R) -> Result<Self> {
        let mut model = Self::new(schema);
        for field in model.fields.values_mut() {
            let raw = source.resolve(field.wire_path())?;
            field.set(raw)?;
        }
        Ok(model)
    }

    /// Assign only the given fields, leaving the rest at their defaults
    pub fn with_values<I, K, V>(schema: &Arc<ModelSchema>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut model = Self::new(schema);
        for (name, value) in values {
            model.set(name.as_ref(), value)?;
        }
        Ok(model)
    }

    fn unknown(&self, name: &str) -> Error {
        Error::UnknownField {
            model: self.schema.name().to_string(),
            field: name.to_string(),
        }
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(Field::value)
    }

    /// Typed read of a field value
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let field = self.fields.get(name).ok_or_else(|| self.unknown(name))?;
        T::from_value(field.value()).ok_or_else(|| {
            field.invalid(
                field.value(),
                format!("cannot be read as {}", type_name::<T>()),
            )
        })
    }

    /// Coerce and assign one field
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        match self.fields.get_mut(name) {
            Some(field) => field.set(value),
            None => Err(self.unknown(name)),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    /// Value of the primary-key field, if the schema has one
    pub fn pk(&self) -> Option<&Value> {
        self.schema.pk_name().and_then(|name| self.get(name))
    }

    /// Plain nested mapping of field name to value; related models become
    /// records
    pub fn to_dict(&self) -> Record {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.to_plain()))
            .collect()
    }

    /// Field name to wire-side value
    pub fn to_external(&self) -> Record {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.to_external()))
            .collect()
    }

    /// Compare by the schema's ordering attribute
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        if self.schema.name() != other.schema.name() {
            return Err(Error::Incomparable(format!(
                "{} to {}",
                self.schema.name(),
                other.schema.name()
            )));
        }
        let ordering = self
            .schema
            .ordering()
            .ok_or_else(|| Error::schema("You must specify a field to order by"))?;
        let (name, descending) = match ordering.strip_prefix('-') {
            Some(name) => (name, true),
            None => (ordering, false),
        };
        let ours = self.get(name).ok_or_else(|| self.unknown(name))?;
        let theirs = other.get(name).ok_or_else(|| self.unknown(name))?;
        let result = ours
            .partial_cmp(theirs)
            .ok_or_else(|| Error::Incomparable(format!("{ours} to {theirs}")))?;
        Ok(if descending { result.reverse() } else { result })
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, field)| other.fields.get(name) == Some(field))
    }
}

impl PartialOrd for Model {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pk() {
            Some(pk) => write!(f, "<{}: {pk}>", self.schema.name()),
            None => write!(f, "<{}>", self.schema.name()),
        }
    }
}
