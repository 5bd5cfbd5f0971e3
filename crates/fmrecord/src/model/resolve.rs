//! Attribute-path lookup over bindable sources

use super::Model;
use crate::error::{Error, Result};
use crate::value::{Record, Value};

/// Path naming the source itself rather than one of its attributes
pub const SELF_PATH: &str = "+self";

/// A source that model fields can be bound from
pub trait Resolve {
    /// The named attribute, `None` when it does not exist
    fn attribute(&self, name: &str) -> Option<Value>;

    /// The whole source as a value
    fn to_value(&self) -> Value;

    /// Walk a dotted path, yielding null as soon as a segment is missing
    fn resolve(&self, path: &str) -> Result<Value> {
        match path.trim() {
            "" => return Err(Error::schema("You must specify an attribute name")),
            SELF_PATH => return Ok(self.to_value()),
            _ => {}
        }
        let mut segments = path.split('.');
        let Some(mut current) = segments.next().and_then(|first| self.attribute(first)) else {
            return Ok(Value::Null);
        };
        for segment in segments {
            match current.attribute(segment) {
                Some(next) => current = next,
                None => return Ok(Value::Null),
            }
        }
        Ok(current)
    }
}

impl Resolve for Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        match self {
            Self::Record(record) => record.attribute(name),
            Self::Model(model) => model.attribute(name),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Resolve for Record {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }
}

impl Resolve for Model {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}
