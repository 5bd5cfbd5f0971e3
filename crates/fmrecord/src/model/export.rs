//! Export of bound models into a persistence destination

use tracing::debug;

use super::Model;
use crate::error::{Error, Result};
use crate::field::{Field, FieldKind};
use crate::value::Value;

/// What happens to existing to-many children before new ones are attached
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToManyAction {
    #[default]
    Clear,
    Append,
}

impl From<&str> for ToManyAction {
    /// `"clear"` clears, any other policy appends
    fn from(action: &str) -> Self {
        if action == "clear" {
            Self::Clear
        } else {
            Self::Append
        }
    }
}

/// Where a schema's instances are exported to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationMeta {
    /// Destination model name
    pub model: String,
    /// Primary-key attribute on the destination side
    pub pk_name: String,
    /// `(schema field, destination field)` pairs; every field by its own name when unset
    pub field_map: Option<Vec<(String, String)>>,
    pub to_many: ToManyAction,
}

impl DestinationMeta {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            pk_name: "pk".to_string(),
            field_map: None,
            to_many: ToManyAction::default(),
        }
    }

    #[must_use]
    pub fn pk_name(mut self, pk_name: impl Into<String>) -> Self {
        self.pk_name = pk_name.into();
        self
    }

    #[must_use]
    pub fn field_map<I, A, B>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.field_map = Some(
            pairs
                .into_iter()
                .map(|(field, target)| (field.into(), target.into()))
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn to_many(mut self, action: impl Into<ToManyAction>) -> Self {
        self.to_many = action.into();
        self
    }
}

/// A value assigned to a destination field
#[derive(Clone, Debug)]
pub enum Assignment<H> {
    Value(Value),
    /// Handle of an exported to-one relation, `None` when nothing was exported
    Related(Option<H>),
}

/// Persistence adapter that exported models are written through
pub trait Destination {
    type Handle: Clone;

    /// Existing object keyed by `pk`, or a new unsaved one
    fn lookup_or_create(&mut self, model: &str, pk_name: &str, pk: &Value) -> Result<Self::Handle>;

    fn assign(
        &mut self,
        handle: &Self::Handle,
        field: &str,
        value: Assignment<Self::Handle>,
    ) -> Result<()>;

    fn save(&mut self, handle: &Self::Handle) -> Result<()>;

    /// Remove every existing child of a to-many relation
    fn clear_related(&mut self, handle: &Self::Handle, field: &str) -> Result<()>;

    fn attach_related(
        &mut self,
        handle: &Self::Handle,
        field: &str,
        children: Vec<Self::Handle>,
    ) -> Result<()>;
}

impl Model {
    /// Export into `destination`, returning the handle of the saved object,
    /// or `None` for abstract schemas and schemas without a destination
    pub fn export_to<D: Destination + ?Sized>(&self, destination: &mut D) -> Result<Option<D::Handle>> {
        self.export(destination, true)
    }

    fn export<D: Destination + ?Sized>(&self, dest: &mut D, save: bool) -> Result<Option<D::Handle>> {
        let schema = self.schema();
        if schema.is_abstract() {
            return Ok(None);
        }
        let Some(meta) = schema.destination() else {
            return Ok(None);
        };

        let pk = self.pk().cloned().unwrap_or_default();
        let handle = dest.lookup_or_create(&meta.model, &meta.pk_name, &pk)?;

        let pairs: Vec<(&str, &str)> = match &meta.field_map {
            Some(map) => map.iter().map(|(f, t)| (f.as_str(), t.as_str())).collect(),
            None => self.fields().keys().map(|f| (f.as_str(), f.as_str())).collect(),
        };
        let mut to_one: Vec<(&str, &Field)> = Vec::new();
        let mut to_many: Vec<(&str, &Field)> = Vec::new();
        for (name, target) in pairs {
            let field = self.field(name).ok_or_else(|| Error::UnknownField {
                model: schema.name().to_string(),
                field: name.to_string(),
            })?;
            match field.kind() {
                FieldKind::ModelList(_) => to_many.push((target, field)),
                FieldKind::Model(_) => to_one.push((target, field)),
                _ => dest.assign(&handle, target, Assignment::Value(field.value().clone()))?,
            }
        }

        for (target, field) in to_one {
            let related = match field.value() {
                Value::Model(model) => model.export(dest, true)?,
                _ => None,
            };
            dest.assign(&handle, target, Assignment::Related(related))?;
        }
        if save {
            dest.save(&handle)?;
        }

        for (target, field) in to_many {
            let mut children = Vec::new();
            for child in field.value().as_list().unwrap_or_default() {
                if let Some(model) = child.as_model() {
                    children.extend(model.export(dest, false)?);
                }
            }
            if meta.to_many == ToManyAction::Clear {
                dest.clear_related(&handle, target)?;
            }
            for child in &children {
                dest.save(child)?;
            }
            debug!(model = %meta.model, field = target, children = children.len(), "attaching related");
            dest.attach_related(&handle, target, children)?;
        }
        Ok(Some(handle))
    }
}
