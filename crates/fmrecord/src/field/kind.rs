//! The closed set of field kinds and their per-kind coercion

use std::sync::Arc;

use super::boolean::BooleanSpec;
use super::composite::{
    coerce_list, coerce_model, coerce_model_list, render_list, render_model, render_model_list,
};
use super::file::{storage_url, FileSource, UploadSource};
use super::number::{coerce_decimal, coerce_float, coerce_integer, DecimalFlavor};
use super::temporal::{coerce_date, coerce_datetime, TemporalSpec};
use super::text::{coerce_bytes, coerce_slug, coerce_text, SlugSpec, TextFlavor};
use super::Field;
use crate::datetime::{format_date, format_datetime, format_offset_datetime};
use crate::error::Result;
use crate::model::ModelSchema;
use crate::value::Value;

#[derive(Clone, Debug)]
pub enum FieldKind {
    Text(TextFlavor),
    Slug(SlugSpec),
    Bytes,
    Integer,
    PositiveInteger,
    Float,
    Decimal {
        places: Option<u32>,
        flavor: DecimalFlavor,
    },
    Boolean(BooleanSpec),
    DateTime(TemporalSpec),
    Date(TemporalSpec),
    /// Each element coerced through the boxed template
    List(Box<Field>),
    /// To-one reference
    Model(Arc<ModelSchema>),
    /// To-many reference
    ModelList(Arc<ModelSchema>),
    File(FileSource),
    Image(FileSource),
    UploadedFile(UploadSource),
}

impl FieldKind {
    /// Stable snake_case name used in validation errors
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text(flavor) => flavor.label(),
            Self::Slug(_) => "slug",
            Self::Bytes => "bytes",
            Self::Integer => "integer",
            Self::PositiveInteger => "positive_integer",
            Self::Float => "float",
            Self::Decimal { flavor, .. } => match flavor {
                DecimalFlavor::Plain => "decimal",
                DecimalFlavor::Percentage => "percentage",
                DecimalFlavor::Currency => "currency",
            },
            Self::Boolean(spec) => {
                if spec.null_literal {
                    "null_boolean"
                } else {
                    "boolean"
                }
            }
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::List(_) => "list",
            Self::Model(_) => "model",
            Self::ModelList(_) => "model_list",
            Self::File(_) => "file",
            Self::Image(_) => "image",
            Self::UploadedFile(_) => "uploaded_file",
        }
    }

    pub const fn is_relation(&self) -> bool {
        matches!(self, Self::Model(_) | Self::ModelList(_))
    }

    /// The referenced schema of a to-one or to-many kind
    pub fn target(&self) -> Option<&Arc<ModelSchema>> {
        match self {
            Self::Model(schema) | Self::ModelList(schema) => Some(schema),
            _ => None,
        }
    }

    /// Kind-specific coercion of a non-null raw value
    pub(crate) fn coerce(&self, field: &Field, raw: &Value) -> Result<Value> {
        let simple = match self {
            Self::Text(_) => Ok(coerce_text(raw)),
            Self::Slug(spec) => Ok(coerce_slug(spec, raw)),
            Self::Bytes => Ok(coerce_bytes(raw)),
            Self::Integer | Self::PositiveInteger => coerce_integer(raw),
            Self::Float => coerce_float(raw),
            Self::Decimal { places, flavor } => coerce_decimal(raw, *places, *flavor),
            Self::Boolean(spec) => spec.coerce(raw),
            Self::DateTime(spec) => coerce_datetime(spec, &field.config, raw),
            Self::Date(spec) => coerce_date(spec, &field.config, raw),
            Self::File(source) => source.load(raw, false),
            Self::Image(source) => source.load(raw, true),
            Self::UploadedFile(source) => source.open(raw),
            Self::List(base) => return coerce_list(field, base, raw),
            Self::Model(schema) => return coerce_model(field, schema, raw),
            Self::ModelList(schema) => return coerce_model_list(field, schema, raw),
        };
        simple.map_err(|reason| field.invalid(raw, reason))
    }

    /// Wire-side form of a non-null typed value
    pub(crate) fn render(&self, field: &Field, value: &Value) -> Value {
        match (self, value) {
            (Self::Boolean(spec), _) => spec.render(value),
            (Self::DateTime(_) | Self::Date(_), Value::DateTimeTz(dt)) => {
                Value::Text(format_offset_datetime(*dt))
            }
            (Self::DateTime(_) | Self::Date(_), Value::DateTime(dt)) => {
                Value::Text(format_datetime(*dt))
            }
            (Self::DateTime(_) | Self::Date(_), Value::Date(date)) => {
                Value::Text(format_date(*date))
            }
            (Self::Bytes, Value::Bytes(bytes)) => {
                Value::Text(String::from_utf8_lossy(bytes).into_owned())
            }
            (Self::List(base), _) => render_list(base, value),
            (Self::Model(_), _) => render_model(field, value),
            (Self::ModelList(_), _) => render_model_list(value),
            (Self::File(source) | Self::Image(source), _) => {
                storage_url(source.storage.as_ref(), value)
                    .map_or_else(|| Value::Text(field.null_marker.clone()), Value::Text)
            }
            (Self::UploadedFile(source), _) => storage_url(source.storage.as_ref(), value)
                .map_or_else(|| Value::Text(field.null_marker.clone()), Value::Text),
            _ => Value::Text(value.to_text()),
        }
    }
}
