//! Schema declaration and validation

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

use super::export::DestinationMeta;
use super::resolve::SELF_PATH;
use super::Model;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::field::{Field, FieldKind};
use crate::resultset::DecodedResultSet;

/// Cardinality of a relation between schemas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// A to-one or to-many reference declared on a schema
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub field: String,
    pub target: String,
    pub cardinality: Cardinality,
}

/// Named, ordered field templates plus model metadata
///
/// Built once through [`ModelSchema::builder`] and shared behind an `Arc`;
/// every [`Model`] clones the templates into its own fields.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    fields: IndexMap<String, Field>,
    pk_name: Option<String>,
    ordering: Option<String>,
    is_abstract: bool,
    destination: Option<DestinationMeta>,
}

impl ModelSchema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            pk_name: None,
            ordering: None,
            is_abstract: false,
            destination: None,
            config: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn pk_name(&self) -> Option<&str> {
        self.pk_name.as_deref()
    }

    /// Ordering attribute, a leading `-` meaning descending
    pub fn ordering(&self) -> Option<&str> {
        self.ordering.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn destination(&self) -> Option<&DestinationMeta> {
        self.destination.as_ref()
    }

    /// To-one and to-many references in declaration order
    pub fn relations(&self) -> Vec<Relation> {
        self.fields
            .iter()
            .filter_map(|(name, field)| {
                let (target, cardinality) = match field.kind() {
                    FieldKind::Model(target) => (target, Cardinality::ToOne),
                    FieldKind::ModelList(target) => (target, Cardinality::ToMany),
                    _ => return None,
                };
                Some(Relation {
                    field: name.clone(),
                    target: target.name().to_string(),
                    cardinality,
                })
            })
            .collect()
    }

    /// Map a `__`-separated attribute path such as `product__orders__sku`
    /// to the `::`-joined wire path used in queries
    ///
    /// Each segment must name a field of the schema reached so far; only
    /// relation fields may be followed by further segments. Dots in wire
    /// names become `::`, while `+self` and to-one segments contribute
    /// nothing.
    pub fn resolve_wire_path(&self, path: &str) -> Result<String> {
        let unresolved = || Error::schema(format!("could not resolve field: {path}"));
        let mut wire = Vec::new();
        let mut schema = self;
        let mut previous: Option<&Field> = None;
        for part in path.split("__") {
            if let Some(field) = previous {
                schema = field
                    .kind()
                    .target()
                    .map(Arc::as_ref)
                    .ok_or_else(unresolved)?;
            }
            let field = schema.fields.get(part).ok_or_else(unresolved)?;
            let segment = field.wire_path().replace('.', "::");
            if segment != SELF_PATH && !matches!(field.kind(), FieldKind::Model(_)) {
                wire.push(segment);
            }
            previous = Some(field);
        }
        Ok(wire.join("::"))
    }

    /// Bind every decoded record in order
    pub fn bind_all(self: &Arc<Self>, resultset: &DecodedResultSet) -> Result<Vec<Model>> {
        let models = resultset
            .iter()
            .map(|record| Model::bind(self, record))
            .collect::<Result<Vec<_>>>()?;
        debug!(schema = %self.name, count = models.len(), "bound records");
        Ok(models)
    }
}

/// Builder returned by [`ModelSchema::builder`]
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<(String, Field)>,
    pk_name: Option<String>,
    ordering: Option<String>,
    is_abstract: bool,
    destination: Option<DestinationMeta>,
    config: Option<Config>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    /// Primary-key attribute; defaults to `id`, then `pk`, when declared
    #[must_use]
    pub fn pk(mut self, name: impl Into<String>) -> Self {
        self.pk_name = Some(name.into());
        self
    }

    /// Ordering attribute; defaults to `id` when declared
    #[must_use]
    pub fn ordering(mut self, name: impl Into<String>) -> Self {
        self.ordering = Some(name.into());
        self
    }

    #[must_use]
    pub fn abstract_model(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn destination(mut self, destination: DestinationMeta) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Config pushed into every field template
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Arc<ModelSchema>> {
        if self.name.trim().is_empty() {
            return Err(Error::schema("model schema name must not be empty"));
        }

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, mut field) in self.fields {
            if fields.contains_key(&name) {
                return Err(Error::schema(format!(
                    "duplicate field {name} in {}",
                    self.name
                )));
            }
            field.set_name(&name);
            if let Some(config) = &self.config {
                field.apply_config(config);
            }
            fields.insert(name, field);
        }

        let declared = |name: &str| fields.contains_key(name);
        let pk_name = match self.pk_name {
            Some(pk) if !declared(pk.as_str()) => {
                return Err(Error::schema(format!(
                    "primary key {pk} is not a field of {}",
                    self.name
                )))
            }
            Some(pk) => Some(pk),
            None => ["id", "pk"]
                .into_iter()
                .find(|&name| declared(name))
                .map(str::to_string),
        };
        let ordering = match self.ordering {
            Some(ordering) if !declared(ordering.trim_start_matches('-')) => {
                return Err(Error::schema(format!(
                    "ordering {ordering} is not a field of {}",
                    self.name
                )))
            }
            Some(ordering) => Some(ordering),
            None => declared("id").then(|| "id".to_string()),
        };
        if let Some(map) = self.destination.as_ref().and_then(|d| d.field_map.as_ref()) {
            if let Some((missing, _)) = map.iter().find(|(name, _)| !declared(name.as_str())) {
                return Err(Error::schema(format!(
                    "field map names {missing}, which is not a field of {}",
                    self.name
                )));
            }
        }

        Ok(Arc::new(ModelSchema {
            name: self.name,
            fields,
            pk_name,
            ordering,
            is_abstract: self.is_abstract,
            destination: self.destination,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beans() -> Result<Arc<ModelSchema>> {
        ModelSchema::builder("Bean")
            .field("id", Field::integer())
            .field("sku", Field::text().wire_name("Beans.Sku"))
            .build()
    }

    #[test]
    fn test_build_defaults() -> Result<()> {
        let schema = ModelSchema::builder("Item")
            .field("pk", Field::integer())
            .field("name", Field::text())
            .build()?;
        assert_eq!(schema.pk_name(), Some("pk"));
        assert_eq!(schema.ordering(), None);
        assert_eq!(schema.field("name").map(Field::wire_path), Some("name"));
        assert_eq!(schema.field("name").map(Field::name), Some("name"));

        let with_id = beans()?;
        assert_eq!(with_id.pk_name(), Some("id"));
        assert_eq!(with_id.ordering(), Some("id"));
        Ok(())
    }

    #[test]
    fn test_build_errors() {
        assert!(ModelSchema::builder(" ").build().is_err());
        assert!(ModelSchema::builder("A")
            .field("x", Field::text())
            .field("x", Field::integer())
            .build()
            .is_err());
        assert!(ModelSchema::builder("A")
            .field("x", Field::text())
            .pk("y")
            .build()
            .is_err());
        assert!(ModelSchema::builder("A")
            .field("x", Field::text())
            .ordering("-y")
            .build()
            .is_err());
        assert!(ModelSchema::builder("A")
            .field("x", Field::text())
            .ordering("-x")
            .build()
            .is_ok());
    }

    #[test]
    fn test_resolve_wire_path() -> Result<()> {
        let bean = beans()?;
        let owner = ModelSchema::builder("Owner")
            .field("name", Field::text().wire_name("Owner.Name"))
            .build()?;
        let product = ModelSchema::builder("Product")
            .field("id", Field::integer().wire_name("ProductID"))
            .field("beans", Field::model_list(Some(bean))?.wire_name("Beans"))
            .field("owner", Field::model(Some(owner))?.wire_name("+self"))
            .field("whole", Field::text().wire_name("+self"))
            .build()?;

        assert_eq!(product.resolve_wire_path("id")?, "ProductID");
        assert_eq!(product.resolve_wire_path("beans__sku")?, "Beans::Beans::Sku");
        assert_eq!(product.resolve_wire_path("owner__name")?, "Owner::Name");
        assert_eq!(product.resolve_wire_path("whole")?, "");
        assert!(product.resolve_wire_path("nope").is_err());
        assert!(product.resolve_wire_path("id__sku").is_err());
        assert!(product.resolve_wire_path("beans__nope").is_err());
        Ok(())
    }

    #[test]
    fn test_relations() -> Result<()> {
        let bean = beans()?;
        let product = ModelSchema::builder("Product")
            .field("favourite", Field::model(Some(Arc::clone(&bean)))?)
            .field("beans", Field::model_list(Some(bean))?)
            .build()?;
        assert_eq!(
            product.relations(),
            vec![
                Relation {
                    field: "favourite".to_string(),
                    target: "Bean".to_string(),
                    cardinality: Cardinality::ToOne,
                },
                Relation {
                    field: "beans".to_string(),
                    target: "Bean".to_string(),
                    cardinality: Cardinality::ToMany,
                },
            ]
        );
        Ok(())
    }
}
