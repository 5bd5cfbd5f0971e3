use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use fmrecord::{decode, Field, ModelSchema, Value};

const ART: &[u8] = include_bytes!("../tests/fixtures/art.xml");
const RELATED: &[u8] = include_bytes!("../tests/fixtures/related.xml");

fn painting_schema() -> fmrecord::Result<Arc<ModelSchema>> {
    ModelSchema::builder("Painting")
        .field("id", Field::integer().wire_name("RECORDID"))
        .field("title", Field::text().wire_name("Title"))
        .field("artist", Field::text().wire_name("Artist"))
        .field("style", Field::text().null(true).wire_name("Style"))
        .field("length", Field::positive_integer().wire_name("length"))
        .build()
}

fn product_schema() -> fmrecord::Result<Arc<ModelSchema>> {
    let order = ModelSchema::builder("Order")
        .field("id", Field::integer().wire_name("RECORDID"))
        .field("sku", Field::text().wire_name("Sku"))
        .field("quantity", Field::integer().wire_name("Quantity"))
        .build()?;
    ModelSchema::builder("Product")
        .field("id", Field::integer().wire_name("ProductID"))
        .field("price", Field::currency().wire_name("Price"))
        .field("launched", Field::datetime().null(true).wire_name("Launched"))
        .field("maker", Field::text().wire_name("Maker.Name"))
        .field(
            "orders",
            Field::model_list(Some(order))?
                .wire_name("Orders")
                .default(Vec::<Value>::new()),
        )
        .build()
}

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode_art", |b| b.iter(|| decode(black_box(ART))));
    c.bench_function("decode_related", |b| b.iter(|| decode(black_box(RELATED))));
}

fn bench_bind(c: &mut Criterion) {
    let (Ok(paintings), Ok(products)) = (painting_schema(), product_schema()) else {
        return;
    };
    let (Ok(art), Ok(related)) = (decode(ART), decode(RELATED)) else {
        return;
    };

    c.bench_function("bind_art", |b| {
        b.iter(|| paintings.bind_all(black_box(&art)))
    });
    c.bench_function("bind_related", |b| {
        b.iter(|| products.bind_all(black_box(&related)))
    });
}

criterion_group!(benches, bench_decode, bench_bind);
criterion_main!(benches);
