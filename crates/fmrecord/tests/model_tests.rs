use fmrecord::model::Cardinality;
use fmrecord::{
    decode, Assignment, Config, Destination, DestinationMeta, Error, Field, FixedZone, Model,
    ModelSchema, Record, Resolve, ToManyAction, Value,
};
use rust_decimal::Decimal;
use std::fs;
use std::sync::Arc;
use time::macros::{datetime, offset};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn related_fixture() -> Result<Vec<u8>, std::io::Error> {
    fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/related.xml"))
}

fn order_schema() -> fmrecord::Result<Arc<ModelSchema>> {
    ModelSchema::builder("Order")
        .field("id", Field::integer().wire_name("RECORDID"))
        .field("sku", Field::text().wire_name("Sku"))
        .field("quantity", Field::positive_integer().wire_name("Quantity"))
        .destination(DestinationMeta::new("shop.Order"))
        .build()
}

fn maker_schema() -> fmrecord::Result<Arc<ModelSchema>> {
    ModelSchema::builder("Maker")
        .field("name", Field::text().wire_name("Name"))
        .field("city", Field::text().wire_name("Address.City"))
        .pk("name")
        .destination(DestinationMeta::new("shop.Maker").pk_name("name"))
        .build()
}

fn product_schema(to_many: &str) -> fmrecord::Result<Arc<ModelSchema>> {
    ModelSchema::builder("Product")
        .field("id", Field::integer().wire_name("ProductID"))
        .field("name", Field::text().wire_name("Name"))
        .field("price", Field::currency().wire_name("Price"))
        .field("launched", Field::datetime().null(true).wire_name("Launched"))
        .field("maker", Field::model(Some(maker_schema()?))?.wire_name("Maker"))
        .field(
            "orders",
            Field::model_list(Some(order_schema()?))?
                .wire_name("Orders")
                .default(Vec::<Value>::new()),
        )
        .config(Config::new().with_zone(FixedZone::new("GMT", offset!(+0))))
        .destination(DestinationMeta::new("shop.Product").to_many(to_many))
        .build()
}

#[test]
fn test_bind_related_fixture() -> TestResult {
    let schema = product_schema("clear")?;
    let products = schema.bind_all(&decode(&related_fixture()?)?)?;
    assert_eq!(products.len(), 2);

    let teapot = &products[0];
    assert_eq!(teapot.get_as::<i64>("id")?, 1);
    assert_eq!(teapot.get_as::<Decimal>("price")?, Decimal::new(1999, 2));
    assert_eq!(
        teapot.get("launched"),
        Some(&Value::DateTimeTz(datetime!(2014-03-14 09:30 UTC)))
    );
    let maker = teapot.get_as::<Model>("maker")?;
    assert_eq!(maker.get_as::<String>("city")?, "Stoke");
    assert_eq!(maker.to_string(), "<Maker: Potter & Sons>");

    let orders = teapot.get_as::<Vec<Value>>("orders")?;
    assert_eq!(orders.len(), 2);
    let skus: Vec<_> = orders
        .iter()
        .filter_map(Value::as_model)
        .filter_map(|order| order.get_as::<String>("sku").ok())
        .collect();
    assert_eq!(skus, ["TP-1", "TP-2"]);

    let cup = &products[1];
    assert_eq!(cup.get("launched"), Some(&Value::Null));
    assert_eq!(cup.get("orders"), Some(&Value::List(Vec::new())));
    assert_eq!(cup.get_as::<Decimal>("price")?.to_string(), "4.50");
    Ok(())
}

#[test]
fn test_to_dict_and_external() -> TestResult {
    let schema = product_schema("clear")?;
    let products = schema.bind_all(&decode(&related_fixture()?)?)?;
    let dict = products[0].to_dict();
    let maker = dict.get("maker").and_then(Value::as_record).ok_or("maker")?;
    assert_eq!(maker.get("name"), Some(&Value::from("Potter & Sons")));
    let orders = dict.get("orders").and_then(Value::as_list).ok_or("orders")?;
    assert!(orders.iter().all(|order| order.as_record().is_some()));

    let external = products[0].to_external();
    assert_eq!(external.get("price"), Some(&Value::from("19.99")));
    assert_eq!(
        external.get("launched"),
        Some(&Value::from("2014-03-14T09:30:00+00:00"))
    );
    let wire_orders = external.get("orders").and_then(Value::as_list).ok_or("orders")?;
    let first = wire_orders.first().and_then(Value::as_record).ok_or("order")?;
    assert_eq!(first.get("quantity"), Some(&Value::from("2")));
    Ok(())
}

#[test]
fn test_model_field_fallback() -> TestResult {
    let strict = ModelSchema::builder("Strict")
        .field("code", Field::integer().wire_name("Code"))
        .build()?;
    let mut bad = Record::new();
    bad.insert("Code", "not a number");
    let mut source = Record::new();
    source.insert("Inner", bad);

    let nullable = ModelSchema::builder("Outer")
        .field("inner", Field::model(Some(Arc::clone(&strict)))?.null(true).wire_name("Inner"))
        .build()?;
    assert_eq!(Model::bind(&nullable, &source)?.get("inner"), Some(&Value::Null));

    let fallback = Model::with_values(&strict, [("code", 7)])?;
    let defaulted = ModelSchema::builder("Outer")
        .field(
            "inner",
            Field::model(Some(Arc::clone(&strict)))?
                .default(fallback.clone())
                .wire_name("Inner"),
        )
        .build()?;
    let bound = Model::bind(&defaulted, &source)?;
    assert_eq!(bound.get("inner"), Some(&Value::from(fallback)));

    let required = ModelSchema::builder("Outer")
        .field("inner", Field::model(Some(strict))?.wire_name("Inner"))
        .build()?;
    let err = Model::bind(&required, &source).err();
    assert_eq!(err.as_ref().and_then(Error::field_name), Some("code"));
    Ok(())
}

#[test]
fn test_self_path_binds_whole_source() -> TestResult {
    let address = ModelSchema::builder("Address")
        .field("city", Field::text().wire_name("City"))
        .build()?;
    let person = ModelSchema::builder("Person")
        .field("name", Field::text().wire_name("Name"))
        .field("address", Field::model(Some(address))?.wire_name("+self"))
        .build()?;
    let mut record = Record::new();
    record.insert("Name", "Ada");
    record.insert("City", "London");
    let model = Model::bind(&person, &record)?;
    let address = model.get_as::<Model>("address")?;
    assert_eq!(address.get("city"), Some(&Value::from("London")));
    assert_eq!(model.resolve("address.city")?, Value::from("London"));
    Ok(())
}

#[test]
fn test_model_list_keeps_instances() -> TestResult {
    let orders = order_schema()?;
    let existing = Model::with_values(&orders, [("id", Value::Int(1)), ("sku", Value::from("A"))])?;
    let mut raw = Record::new();
    raw.insert("RECORDID", 2);
    raw.insert("Sku", "B");
    raw.insert("Quantity", "3");

    let mut field = Field::model_list(Some(orders))?;
    field.set(vec![Value::from(existing.clone()), Value::Record(raw)])?;
    let bound = field.value().as_list().unwrap_or_default();
    assert_eq!(bound.first(), Some(&Value::from(existing)));
    let second = bound.get(1).and_then(Value::as_model).ok_or("second order")?;
    assert_eq!(second.get("quantity"), Some(&Value::Int(3)));
    Ok(())
}

#[test]
fn test_wire_paths_and_relations() -> TestResult {
    let schema = product_schema("clear")?;
    assert_eq!(schema.resolve_wire_path("orders__sku")?, "Orders::Sku");
    assert_eq!(schema.resolve_wire_path("maker__city")?, "Address::City");
    assert_eq!(schema.resolve_wire_path("price")?, "Price");
    assert!(schema.resolve_wire_path("price__amount").is_err());

    let relations = schema.relations();
    assert_eq!(relations.len(), 2);
    assert_eq!(relations[0].target, "Maker");
    assert_eq!(relations[0].cardinality, Cardinality::ToOne);
    assert_eq!(relations[1].cardinality, Cardinality::ToMany);
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Call {
    Lookup(String, Value),
    Assign(usize, String, String),
    Save(usize),
    Clear(usize, String),
    Attach(usize, String, Vec<usize>),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    next: usize,
}

impl Destination for Recorder {
    type Handle = usize;

    fn lookup_or_create(&mut self, model: &str, _pk_name: &str, pk: &Value) -> fmrecord::Result<usize> {
        self.calls.push(Call::Lookup(model.to_string(), pk.clone()));
        self.next += 1;
        Ok(self.next)
    }

    fn assign(&mut self, handle: &usize, field: &str, value: Assignment<usize>) -> fmrecord::Result<()> {
        let shown = match value {
            Assignment::Value(value) => value.to_text(),
            Assignment::Related(Some(related)) => format!("#{related}"),
            Assignment::Related(None) => "#none".to_string(),
        };
        self.calls.push(Call::Assign(*handle, field.to_string(), shown));
        Ok(())
    }

    fn save(&mut self, handle: &usize) -> fmrecord::Result<()> {
        self.calls.push(Call::Save(*handle));
        Ok(())
    }

    fn clear_related(&mut self, handle: &usize, field: &str) -> fmrecord::Result<()> {
        self.calls.push(Call::Clear(*handle, field.to_string()));
        Ok(())
    }

    fn attach_related(
        &mut self,
        handle: &usize,
        field: &str,
        children: Vec<usize>,
    ) -> fmrecord::Result<()> {
        self.calls.push(Call::Attach(*handle, field.to_string(), children));
        Ok(())
    }
}

#[test]
fn test_export_order() -> TestResult {
    let schema = product_schema("clear")?;
    let products = schema.bind_all(&decode(&related_fixture()?)?)?;
    let mut recorder = Recorder::default();
    let handle = products[0].export_to(&mut recorder)?;
    assert_eq!(handle, Some(1));

    let position = |wanted: &Call| recorder.calls.iter().position(|call| call == wanted);
    let maker_saved = position(&Call::Save(2)).ok_or("maker saved")?;
    let maker_assigned =
        position(&Call::Assign(1, "maker".to_string(), "#2".to_string())).ok_or("maker assigned")?;
    let product_saved = position(&Call::Save(1)).ok_or("product saved")?;
    let cleared = position(&Call::Clear(1, "orders".to_string())).ok_or("orders cleared")?;
    let attached = position(&Call::Attach(1, "orders".to_string(), vec![3, 4])).ok_or("attached")?;
    assert!(maker_saved < maker_assigned);
    assert!(maker_assigned < product_saved);
    assert!(product_saved < cleared);
    assert!(cleared < attached);
    assert_eq!(
        recorder.calls.first(),
        Some(&Call::Lookup("shop.Product".to_string(), Value::Int(1)))
    );
    assert!(recorder.calls.contains(&Call::Save(3)));
    assert!(recorder.calls.contains(&Call::Save(4)));
    Ok(())
}

#[test]
fn test_export_append_and_abstract() -> TestResult {
    let schema = product_schema("add")?;
    assert_eq!(schema.destination().map(|d| d.to_many), Some(ToManyAction::Append));
    let products = schema.bind_all(&decode(&related_fixture()?)?)?;
    let mut recorder = Recorder::default();
    products[0].export_to(&mut recorder)?;
    assert!(!recorder
        .calls
        .iter()
        .any(|call| matches!(call, Call::Clear(..))));

    let base = ModelSchema::builder("Base")
        .field("id", Field::integer())
        .abstract_model()
        .destination(DestinationMeta::new("shop.Base"))
        .build()?;
    let mut untouched = Recorder::default();
    assert_eq!(Model::new(&base).export_to(&mut untouched)?, None);
    assert!(untouched.calls.is_empty());
    Ok(())
}

#[test]
fn test_field_map_export() -> TestResult {
    let schema = ModelSchema::builder("Tag")
        .field("id", Field::integer())
        .field("label", Field::text())
        .destination(DestinationMeta::new("shop.Tag").field_map([("label", "title")]))
        .build()?;
    let tag = Model::with_values(&schema, [("id", Value::Int(5)), ("label", Value::from("new"))])?;
    let mut recorder = Recorder::default();
    tag.export_to(&mut recorder)?;
    assert_eq!(
        recorder.calls,
        vec![
            Call::Lookup("shop.Tag".to_string(), Value::Int(5)),
            Call::Assign(1, "title".to_string(), "new".to_string()),
            Call::Save(1),
        ]
    );

    let broken = ModelSchema::builder("Tag")
        .field("id", Field::integer())
        .destination(DestinationMeta::new("shop.Tag").field_map([("colour", "colour")]))
        .build();
    assert!(matches!(broken, Err(Error::Schema(_))));
    Ok(())
}

#[test]
fn test_same_named_schema_is_rebound() -> TestResult {
    let tag = ModelSchema::builder("Tag").field("label", Field::text()).build()?;
    let other_tag = ModelSchema::builder("Tag")
        .field("label", Field::text().wire_name("Label"))
        .field("weight", Field::integer().wire_name("Weight"))
        .build()?;
    let mut raw = Record::new();
    raw.insert("Label", "blue");
    raw.insert("Weight", 3i64);
    let foreign = Value::from(Model::bind(&other_tag, &raw)?);

    let mut single = Field::model(Some(Arc::clone(&tag)))?;
    single.set(foreign.clone())?;
    let bound = single.value().as_model().ok_or("expected a model")?;
    assert!(Arc::ptr_eq(bound.schema(), &tag));
    assert_eq!(bound.get("label"), Some(&Value::from("blue")));
    assert_eq!(bound.get("weight"), None);

    let own = Value::from(Model::with_values(&tag, [("label", Value::from("red"))])?);
    let mut many = Field::model_list(Some(Arc::clone(&tag)))?;
    many.set(vec![own, foreign])?;
    let Value::List(items) = many.value() else {
        return Err("expected a list".into());
    };
    for item in items {
        let model = item.as_model().ok_or("expected a model")?;
        assert!(Arc::ptr_eq(model.schema(), &tag));
        assert_eq!(model.fields().len(), 1);
    }
    Ok(())
}
