use fmrecord::{decode, decode_with_config, xml, Error, Record, Value, XmlErrorKind};
use std::fs;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn fixture(name: &str) -> Result<Vec<u8>, std::io::Error> {
    fs::read(format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR")))
}

fn text(record: &Record, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

#[test]
fn test_art_fixture() -> TestResult {
    let decoded = decode(&fixture("art.xml")?)?;
    assert_eq!(decoded.error_code, 0);
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded.field_names, ["Title", "Artist", "Style", "length"]);
    assert_eq!(
        decoded.database.get("timestamp-format").map(String::as_str),
        Some("MM/dd/yyyy HH:mm:ss")
    );
    assert_eq!(decoded.database.len(), 7);
    assert_eq!(
        decoded.product.get("name").map(String::as_str),
        Some("FileMaker Web Publishing Engine")
    );
    let length = decoded.field_metadata.get("length").ok_or("missing metadata")?;
    assert_eq!(length.get("type").map(String::as_str), Some("calculation"));
    assert_eq!(length.len(), 10);

    let record = decoded.get(0).ok_or("missing record")?;
    assert_eq!(text(record, "Title").as_deref(), Some("Spring in Giverny 3"));
    assert_eq!(text(record, "Artist").as_deref(), Some("Claude Monet"));
    assert_eq!(text(record, "Style").as_deref(), Some(""));
    assert_eq!(text(record, "length").as_deref(), Some("19"));
    assert_eq!(record.record_id(), Some(14));
    assert_eq!(record.mod_id(), Some(6));
    assert_eq!(record.len(), 6);
    Ok(())
}

#[test]
fn test_related_fixture() -> TestResult {
    let decoded = decode(&fixture("related.xml")?)?;
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.field_names.len(), 6);

    let first = &decoded.records[0];
    let maker = first.get("Maker").and_then(Value::as_record).ok_or("missing maker")?;
    assert_eq!(text(maker, "Name").as_deref(), Some("Potter & Sons"));
    let city = maker
        .get("Address")
        .and_then(Value::as_record)
        .and_then(|address| text(address, "City"));
    assert_eq!(city.as_deref(), Some("Stoke"));

    let orders = first.get("Orders").and_then(Value::as_list).ok_or("missing orders")?;
    assert_eq!(orders.len(), 2);
    let second = orders.get(1).and_then(Value::as_record).ok_or("missing order")?;
    assert_eq!(text(second, "Sku").as_deref(), Some("TP-2"));
    assert_eq!(text(second, "Quantity").as_deref(), Some("5"));
    assert!(!second.contains_key("Note"));
    assert_eq!(second.record_id(), Some(502));

    let cup = &decoded.records[1];
    assert!(!cup.contains_key("Orders"));
    assert_eq!(text(cup, "Launched").as_deref(), Some(""));
    Ok(())
}

#[test]
fn test_namespaced_fixture() -> TestResult {
    let decoded = decode(&fixture("namespaced.xml")?)?;
    assert_eq!(decoded.field_names, ["Title"]);
    let record = decoded.get(0).ok_or("missing record")?;
    assert_eq!(text(record, "Title").as_deref(), Some("Water <Lilies>"));
    assert_eq!(record.record_id(), Some(7));
    Ok(())
}

#[test]
fn test_byte_order_mark_fixture() -> TestResult {
    let bytes = fixture("bom.xml")?;
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let decoded = decode(&bytes)?;
    let record = decoded.get(0).ok_or("missing record")?;
    assert_eq!(text(record, "Title").as_deref(), Some("Water <Lilies>"));

    let inline = "\u{FEFF}<?xml version=\"1.0\"?><fmresultset><error code=\"0\"/><resultset/></fmresultset>";
    assert!(decode(inline.as_bytes())?.is_empty());
    Ok(())
}

#[test]
fn test_status_fixtures() -> TestResult {
    let not_found = decode(&fixture("not_found.xml")?)?;
    assert!(not_found.is_empty());
    assert_eq!(not_found.error_code, 401);

    let error = decode(&fixture("error.xml")?);
    assert_eq!(error, Err(Error::Server { code: 500 }));
    Ok(())
}

#[test]
fn test_broken_fixture() -> TestResult {
    match decode(&fixture("broken.xml")?) {
        Err(Error::XmlParse { kind, span, .. }) => {
            assert!(matches!(kind, XmlErrorKind::MismatchedTag { .. }));
            assert_eq!(span.start.line, 6);
        }
        other => return Err(format!("expected an xml error, got {other:?}").into()),
    }
    Ok(())
}

#[test]
fn test_reader_limits() -> TestResult {
    let art = fixture("art.xml")?;
    let shallow = decode_with_config(&art, xml::Config::new(2, 0));
    assert!(matches!(
        shallow,
        Err(Error::XmlParse {
            kind: XmlErrorKind::MaxDepthExceeded { max: 2 },
            ..
        })
    ));
    let small = decode_with_config(&art, xml::Config::new(0, 64));
    assert!(matches!(
        small,
        Err(Error::XmlParse {
            kind: XmlErrorKind::MaxSizeExceeded { max: 64 },
            ..
        })
    ));
    assert!(decode_with_config(&art, xml::Config::unlimited()).is_ok());
    Ok(())
}

#[test]
fn test_scalar_and_relation_record() -> TestResult {
    let xml = br#"<fmresultset>
        <ERRORCODE>0</ERRORCODE>
        <resultset>
          <record record-id="1" mod-id="2">
            <field name="Name"><data>Vase</data></field>
            <field name="Colour"><data>Blue</data></field>
            <relatedset table="Parts" count="1">
              <record record-id="10" mod-id="0">
                <field name="Parts::Label"><data>Lid</data></field>
              </record>
            </relatedset>
          </record>
        </resultset>
      </fmresultset>"#;
    let decoded = decode(xml)?;
    let record = decoded.get(0).ok_or("missing record")?;
    assert_eq!(text(record, "Name").as_deref(), Some("Vase"));
    assert_eq!(text(record, "Colour").as_deref(), Some("Blue"));
    let parts = record.get("Parts").and_then(Value::as_list).ok_or("missing parts")?;
    assert_eq!(parts.len(), 1);
    assert_eq!(record.record_id(), Some(1));
    assert_eq!(record.mod_id(), Some(2));
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_serialize_records() -> TestResult {
    let decoded = decode(&fixture("art.xml")?)?;
    let json = serde_json::to_value(&decoded.records)?;
    assert_eq!(json[0]["Title"], "Spring in Giverny 3");
    assert_eq!(json[0]["RECORDID"], 14);
    let meta = serde_json::to_value(&decoded)?;
    assert_eq!(meta["database"]["layout"], "web3");
    Ok(())
}
