//! List, to-one and to-many kinds

use std::sync::Arc;
use tracing::trace;

use super::Field;
use crate::error::Result;
use crate::model::{Model, ModelSchema};
use crate::value::Value;

/// Whether `value` is a model bound to this exact schema instance
fn same_schema(value: &Value, schema: &Arc<ModelSchema>) -> bool {
    value
        .as_model()
        .is_some_and(|model| Arc::ptr_eq(model.schema(), schema))
}

/// Coerce every element through a copy of `base` named after the list field
pub(crate) fn coerce_list(field: &Field, base: &Field, raw: &Value) -> Result<Value> {
    let Value::List(items) = raw else {
        return Err(field.invalid(raw, format!("expected a list, got {}", raw.type_name())));
    };
    let mut element = base.clone();
    element.name.clone_from(&field.name);
    items
        .iter()
        .map(|item| element.clean(item))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

pub(crate) fn render_list(base: &Field, value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.iter().map(|item| base.render(item)).collect()),
        other => base.render(other),
    }
}

/// Bind `schema` against the raw value; validation failures fall back to the
/// field's default, then to null when nullable
pub(crate) fn coerce_model(field: &Field, schema: &Arc<ModelSchema>, raw: &Value) -> Result<Value> {
    if same_schema(raw, schema) {
        return Ok(raw.clone());
    }
    match Model::bind(schema, raw) {
        Ok(model) => Ok(Value::from(model)),
        Err(err) if err.is_validation() => {
            trace!(field = %field.name, error = %err, "model binding fell back");
            if field.default.truthy() {
                Ok(field.default.clone())
            } else if field.null {
                Ok(Value::Null)
            } else {
                Err(err)
            }
        }
        Err(err) => Err(err),
    }
}

pub(crate) fn coerce_model_list(
    field: &Field,
    schema: &Arc<ModelSchema>,
    raw: &Value,
) -> Result<Value> {
    let Value::List(items) = raw else {
        return Err(field.invalid(raw, format!("expected a list, got {}", raw.type_name())));
    };
    items
        .iter()
        .map(|item| {
            if same_schema(item, schema) {
                Ok(item.clone())
            } else {
                Model::bind(schema, item).map(Value::from)
            }
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

/// The wire-side mapping of a bound model, or the null marker
pub(crate) fn render_model(field: &Field, value: &Value) -> Value {
    match value {
        Value::Model(model) => Value::Record(model.to_external()),
        _ => Value::Text(field.null_marker.clone()),
    }
}

pub(crate) fn render_model_list(value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(
            items
                .iter()
                .filter_map(Value::as_model)
                .map(|model| Value::Record(model.to_external()))
                .collect(),
        ),
        _ => Value::List(Vec::new()),
    }
}
