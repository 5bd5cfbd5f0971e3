//! Typed field descriptors
//!
//! A [`Field`] owns a kind, the null/default rules, optional bounds and an
//! ordered list of validators. Every assignment runs the same pipeline:
//!
//! 1. raw values equal to a null-equivalent become null
//! 2. a null on a non-nullable field with a default yields the default
//! 3. a null on a nullable field yields null; any other null is rejected
//! 4. kind-specific coercion
//! 5. `min`/`max` bounds
//! 6. validators in order, first failure wins

mod boolean;
mod composite;
mod file;
mod kind;
mod number;
mod temporal;
mod text;
mod validator;

pub use boolean::BooleanSpec;
pub use file::{
    extension_for, redacted, resolve_url, Fetch, FileSource, Storage, StoredFile, UploadSource,
    DEFAULT_RETRIES,
};
pub use kind::FieldKind;
pub use number::DecimalFlavor;
pub use temporal::TemporalSpec;
pub use text::{slugify, SlugSpec, Slugify, TextFlavor};
pub use url::Url;
pub use validator::Validator;

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use time::Time;
use tracing::trace;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::ModelSchema;
use crate::value::Value;

/// A field declaration and, inside a model instance, its current value
#[derive(Clone, Debug)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) wire_name: Option<String>,
    pub(crate) kind: FieldKind,
    pub(crate) null: bool,
    pub(crate) default: Value,
    pub(crate) min: Option<Value>,
    pub(crate) max: Option<Value>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) null_values: Vec<Value>,
    pub(crate) null_marker: String,
    pub(crate) config: Config,
    value: Value,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            name: String::new(),
            wire_name: None,
            kind,
            null: false,
            default: Value::Null,
            min: None,
            max: None,
            validators: Vec::new(),
            null_values: vec![Value::Null, Value::Text(String::new())],
            null_marker: String::new(),
            config: Config::default(),
            value: Value::Null,
        }
    }

    fn validated_text(flavor: TextFlavor) -> Self {
        let mut field = Self::new(FieldKind::Text(flavor));
        field.validators.extend(flavor.validator());
        field
    }

    fn decimal_kind(places: Option<u32>, flavor: DecimalFlavor) -> Self {
        Self::new(FieldKind::Decimal { places, flavor })
    }

    pub fn text() -> Self {
        Self::new(FieldKind::Text(TextFlavor::Plain))
    }

    /// Alias for [`Field::text`]
    pub fn char() -> Self {
        Self::text()
    }

    /// Alias for [`Field::text`]
    pub fn unicode() -> Self {
        Self::text()
    }

    pub fn bytes() -> Self {
        Self::new(FieldKind::Bytes)
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    pub fn positive_integer() -> Self {
        let mut field = Self::new(FieldKind::PositiveInteger);
        field.min = Some(Value::Int(0));
        field
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    pub fn decimal() -> Self {
        Self::decimal_kind(None, DecimalFlavor::Plain)
    }

    /// Decimal bounded to `0..=100`, displayed with a trailing `%`
    pub fn percentage() -> Self {
        let mut field = Self::decimal_kind(None, DecimalFlavor::Percentage);
        field.min = Some(Value::Decimal(Decimal::ZERO));
        field.max = Some(Value::Decimal(Decimal::ONE_HUNDRED));
        field
    }

    /// Two-place decimal with a `0.00` minimum; a leading currency symbol
    /// or code is stripped from text input
    pub fn currency() -> Self {
        let mut field = Self::decimal_kind(Some(2), DecimalFlavor::Currency);
        field.min = Some(Value::Decimal(Decimal::new(0, 2)));
        field
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean(BooleanSpec::default()))
    }

    /// Nullable boolean that also treats the text `"None"` as null
    pub fn null_boolean() -> Self {
        let mut field = Self::new(FieldKind::Boolean(BooleanSpec {
            map: Vec::new(),
            null_literal: true,
        }));
        field.null = true;
        field
    }

    pub fn datetime() -> Self {
        Self::new(FieldKind::DateTime(TemporalSpec::default()))
    }

    pub fn date() -> Self {
        Self::new(FieldKind::Date(TemporalSpec::default()))
    }

    /// A list coercing each element through `base`
    pub fn list(base: Option<Self>) -> Result<Self> {
        let base = base.ok_or_else(|| Error::schema("list fields require a base field"))?;
        Ok(Self::new(FieldKind::List(Box::new(base))))
    }

    /// A to-one reference to `schema`
    pub fn model(schema: Option<Arc<ModelSchema>>) -> Result<Self> {
        let schema = schema.ok_or_else(|| Error::schema("model fields require a model schema"))?;
        Ok(Self::new(FieldKind::Model(schema)))
    }

    /// A to-many reference to `schema`
    pub fn model_list(schema: Option<Arc<ModelSchema>>) -> Result<Self> {
        let schema =
            schema.ok_or_else(|| Error::schema("model list fields require a model schema"))?;
        Ok(Self::new(FieldKind::ModelList(schema)))
    }

    pub fn email() -> Self {
        Self::validated_text(TextFlavor::Email)
    }

    pub fn url() -> Self {
        Self::validated_text(TextFlavor::Url)
    }

    /// IPv4 or IPv6 address
    pub fn ip_address() -> Self {
        Self::validated_text(TextFlavor::IpAddress)
    }

    pub fn ipv4_address() -> Self {
        Self::validated_text(TextFlavor::Ipv4)
    }

    pub fn ipv6_address() -> Self {
        Self::validated_text(TextFlavor::Ipv6)
    }

    pub fn comma_separated_integer() -> Self {
        Self::validated_text(TextFlavor::CommaSeparatedInteger)
    }

    pub fn gtin() -> Self {
        Self::validated_text(TextFlavor::Gtin)
    }

    pub fn slug() -> Self {
        let mut field = Self::new(FieldKind::Slug(SlugSpec::default()));
        field.validators.push(Validator::slug());
        field
    }

    pub fn file(source: FileSource) -> Self {
        Self::new(FieldKind::File(source))
    }

    /// A file field that only accepts `image/*` content
    pub fn image(source: FileSource) -> Self {
        Self::new(FieldKind::Image(source))
    }

    /// A path to a file already present in `storage`
    pub fn uploaded_file(storage: Arc<dyn Storage>) -> Self {
        Self::new(FieldKind::UploadedFile(UploadSource { storage }))
    }

    /// External reference; dotted paths walk nested values and `+self`
    /// names the source itself
    #[must_use]
    pub fn wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    #[must_use]
    pub fn null(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    /// Default used for null input; also the initial value
    #[must_use]
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self.value = self.default.clone();
        self
    }

    #[must_use]
    pub fn min(mut self, min: impl Into<Value>) -> Self {
        self.min = Some(min.into());
        self
    }

    #[must_use]
    pub fn max(mut self, max: impl Into<Value>) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Append a validator after the built-in ones
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Replace all validators, built-in ones included
    #[must_use]
    pub fn validators(mut self, validators: Vec<Validator>) -> Self {
        self.validators = validators;
        self
    }

    #[must_use]
    pub fn null_values(mut self, null_values: Vec<Value>) -> Self {
        self.null_values = null_values;
        self
    }

    /// Text exported in place of a null value
    #[must_use]
    pub fn null_marker(mut self, marker: impl Into<String>) -> Self {
        self.null_marker = marker.into();
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.apply_config(&config);
        self
    }

    pub(crate) fn apply_config(&mut self, config: &Config) {
        self.config = config.clone();
        if let FieldKind::List(base) = &mut self.kind {
            base.apply_config(config);
        }
    }

    fn temporal_mut(&mut self) -> Option<&mut TemporalSpec> {
        match &mut self.kind {
            FieldKind::DateTime(spec) | FieldKind::Date(spec) => Some(spec),
            _ => None,
        }
    }

    fn file_source_mut(&mut self) -> Option<&mut FileSource> {
        match &mut self.kind {
            FieldKind::File(source) | FieldKind::Image(source) => Some(source),
            _ => None,
        }
    }

    /// strptime-style pattern for text input (datetime and date kinds)
    #[must_use]
    pub fn strptime(mut self, pattern: impl Into<String>) -> Self {
        if let Some(spec) = self.temporal_mut() {
            spec.strptime = Some(pattern.into());
        }
        self
    }

    /// Time of day attached to plain dates (datetime and date kinds)
    #[must_use]
    pub fn combine_time(mut self, time: Time) -> Self {
        if let Some(spec) = self.temporal_mut() {
            spec.combine_time = time;
        }
        self
    }

    /// Quantize decimal kinds to `places` places
    #[must_use]
    pub fn decimal_places(mut self, places: u32) -> Self {
        if let FieldKind::Decimal { places: slot, .. } = &mut self.kind {
            *slot = Some(places);
        }
        self
    }

    /// Explicit raw-to-boolean mapping (boolean kinds)
    #[must_use]
    pub fn map<I, V>(mut self, map: I) -> Self
    where
        I: IntoIterator<Item = (V, bool)>,
        V: Into<Value>,
    {
        if let FieldKind::Boolean(spec) = &mut self.kind {
            spec.map = map.into_iter().map(|(raw, b)| (raw.into(), b)).collect();
        }
        self
    }

    /// Replace the slug function (slug kind)
    #[must_use]
    pub fn slugify(mut self, slugify: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        if let FieldKind::Slug(spec) = &mut self.kind {
            spec.slugify = Arc::new(slugify);
        }
        self
    }

    /// Whether input is slugified before validation (slug kind)
    #[must_use]
    pub fn auto_slug(mut self, auto: bool) -> Self {
        if let FieldKind::Slug(spec) = &mut self.kind {
            spec.auto = auto;
        }
        self
    }

    /// URL relative file references are joined against (file and image kinds)
    ///
    /// An empty string clears the base.
    pub fn base_url(mut self, base_url: &str) -> Result<Self> {
        if let Some(source) = self.file_source_mut() {
            source.base_url = match base_url.trim() {
                "" => None,
                text => Some(Url::parse(text).map_err(|err| {
                    Error::schema(format!("invalid base url \"{base_url}\": {err}"))
                })?),
            };
        }
        Ok(self)
    }

    /// Fetch attempts before giving up (file and image kinds)
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        if let Some(source) = self.file_source_mut() {
            source.retries = retries;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The external reference, falling back to the declared name
    pub fn wire_path(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.null
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        if self.wire_name.is_none() {
            self.wire_name = Some(name.to_string());
        }
    }

    pub(crate) fn invalid(&self, raw: &Value, reason: impl Into<String>) -> Error {
        Error::FieldValidation {
            field: self.name.clone(),
            kind: self.kind.label(),
            value: raw.to_text(),
            reason: reason.into(),
        }
    }

    fn is_null_equivalent(&self, raw: &Value) -> bool {
        raw.is_null() || self.null_values.iter().any(|null| null == raw)
    }

    fn check_bound(&self, raw: &Value, value: &Value, bound: &Value, rejected: Ordering) -> Result<()> {
        match value.partial_cmp(bound) {
            Some(ordering) if ordering != rejected => Ok(()),
            Some(_) => {
                let relation = if rejected == Ordering::Less {
                    "greater"
                } else {
                    "less"
                };
                Err(self.invalid(
                    raw,
                    format!("{} must be {relation} than or equal to {bound}.", self.name),
                ))
            }
            None => Err(self.invalid(raw, format!("cannot compare {value} with {bound}"))),
        }
    }

    /// Run the full assignment pipeline without storing the result
    pub fn clean(&self, raw: &Value) -> Result<Value> {
        if self.is_null_equivalent(raw) {
            if !self.null && !self.default.is_null() {
                return Ok(self.default.clone());
            }
            if self.null {
                return Ok(Value::Null);
            }
            return Err(self.invalid(raw, format!("{} cannot be null", self.name)));
        }

        let value = self.kind.coerce(self, raw)?;
        if value.is_null() {
            return Ok(value);
        }
        if let Some(min) = &self.min {
            self.check_bound(raw, &value, min, Ordering::Less)?;
        }
        if let Some(max) = &self.max {
            self.check_bound(raw, &value, max, Ordering::Greater)?;
        }
        for validator in &self.validators {
            validator
                .check(&value)
                .map_err(|reason| self.invalid(raw, reason))?;
        }
        Ok(value)
    }

    /// Coerce and store `raw`; on failure the previous value is kept
    pub fn set(&mut self, raw: impl Into<Value>) -> Result<()> {
        let raw = raw.into();
        let value = self.clean(&raw)?;
        trace!(field = %self.name, kind = self.kind.label(), %value, "assigned");
        self.value = value;
        Ok(())
    }

    /// Wire-side form of `value`, the null marker for null
    pub fn render(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Text(self.null_marker.clone());
        }
        self.kind.render(self, value)
    }

    /// Wire-side form of the current value
    pub fn to_external(&self) -> Value {
        self.render(&self.value)
    }

    /// Plain nested form of the current value, models flattened to records
    pub fn to_plain(&self) -> Value {
        match &self.value {
            Value::Model(model) => Value::Record(model.to_dict()),
            Value::List(items) if self.kind.is_relation() => Value::List(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Model(model) => Value::Record(model.to_dict()),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldKind::Decimal {
                flavor: DecimalFlavor::Percentage,
                ..
            } => write!(f, "{}%", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}
