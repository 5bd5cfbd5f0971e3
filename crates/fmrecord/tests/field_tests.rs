use fmrecord::field::{Fetch, FileSource, Storage, StoredFile, Url};
use fmrecord::{Config, Error, Field, FixedZone, Validator, Value};
use std::sync::Arc;
use time::macros::{date, datetime, offset, time};

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct StaticFetch(&'static str);

impl Fetch for StaticFetch {
    fn fetch(&self, url: &Url) -> Option<(Vec<u8>, String)> {
        (url.host_str() == Some("fm.example.com")).then(|| (b"hello".to_vec(), self.0.to_string()))
    }
}

struct MediaStorage;

impl Storage for MediaStorage {
    fn url(&self, name: &str) -> String {
        format!("https://cdn.example.com/media/{name}")
    }

    fn open(&self, path: &str) -> fmrecord::Result<StoredFile> {
        match path {
            "uploads/report.pdf" => Ok(StoredFile {
                name: path.to_string(),
                content_type: Some("application/pdf".to_string()),
                content: b"%PDF".to_vec(),
            }),
            _ => Err(Error::File(format!("{path} does not exist"))),
        }
    }
}

fn source(mime: &'static str) -> FileSource {
    FileSource::new(Arc::new(StaticFetch(mime)), Arc::new(MediaStorage))
}

#[test]
fn test_datetime_in_zone() -> TestResult {
    let berlin = Config::new().with_zone(FixedZone::new("CET", offset!(+1)));
    let mut field = Field::datetime().with_config(berlin.clone());
    field.set("2014-03-14 09:30:00")?;
    assert_eq!(field.value(), &Value::DateTimeTz(datetime!(2014-03-14 08:30 UTC)));
    assert_eq!(field.to_external(), Value::from("2014-03-14T08:30:00+00:00"));

    let mut naive = Field::datetime().with_config(berlin.with_use_tz(false));
    naive.set("03/14/2014 09:30:00")?;
    assert_eq!(naive.value(), &Value::DateTime(datetime!(2014-03-14 09:30)));
    assert_eq!(naive.to_external(), Value::from("2014-03-14T09:30:00"));
    assert_eq!(naive.to_string(), "2014-03-14T09:30:00");
    Ok(())
}

#[test]
fn test_datetime_compact_and_rejections() -> TestResult {
    let naive = Config::new().with_use_tz(false);
    let mut field = Field::datetime().with_config(naive.clone());
    field.set("20140314093000")?;
    assert_eq!(field.value(), &Value::DateTime(datetime!(2014-03-14 09:30)));
    assert!(field.set("not a date").is_err());
    assert!(field.set("   ").is_err());

    let mut combined = Field::datetime().combine_time(time!(12:00)).with_config(naive);
    combined.set(Value::Date(date!(2014 - 03 - 14)))?;
    assert_eq!(combined.value(), &Value::DateTime(datetime!(2014-03-14 12:00)));
    Ok(())
}

#[test]
fn test_datetime_offset_out_of_range() {
    let field = Field::datetime();
    for raw in ["Jan 5 2024 10:00 +1:999999999", "Jan 5 2024 10:00 +1:75"] {
        assert!(matches!(
            field.clean(&Value::from(raw)),
            Err(Error::FieldValidation { .. })
        ));
    }
}

#[test]
fn test_date_field() -> TestResult {
    let mut field = Field::date();
    field.set("March 14th, 2014")?;
    assert_eq!(field.value(), &Value::Date(date!(2014 - 03 - 14)));
    assert_eq!(field.to_external(), Value::from("2014-03-14"));

    let mut strict = Field::date().strptime("%d/%m/%Y");
    strict.set("14/03/2014")?;
    assert_eq!(strict.value(), &Value::Date(date!(2014 - 03 - 14)));
    assert!(strict.set("2014-03-14").is_err());
    Ok(())
}

#[test]
fn test_null_datetime_display() {
    let field = Field::datetime().null(true);
    assert_eq!(field.to_string(), "None");
    assert_eq!(field.to_external(), Value::from(""));
}

#[test]
fn test_image_field() -> TestResult {
    let mut field = Field::image(source("image/jpeg")).base_url("https://user:pw@fm.example.com")?;
    field.set("/fmi/xml/cnt/data.jpg?-db=art")?;
    let Value::File(file) = field.value() else {
        return Err("expected a stored file".into());
    };
    assert_eq!(file.name, "5d41402abc4b2a76b971.jpg");
    assert_eq!(
        field.to_external(),
        Value::from("https://cdn.example.com/media/5d41402abc4b2a76b971.jpg")
    );

    let mut pdf = Field::image(source("application/pdf")).base_url("https://fm.example.com")?;
    assert!(pdf.set("/doc.pdf").is_err());

    let mut relative = Field::file(source("text/plain")).base_url("https://fm.example.com/fmi/xml/")?;
    relative.set("cnt/notes.txt?-db=art&-lay=web")?;
    assert!(matches!(relative.value(), Value::File(file) if file.name.ends_with(".txt")));
    let mut absolute = Field::file(source("text/plain")).base_url("https://cdn.example.com")?;
    absolute.set("http://fm.example.com/notes.txt")?;
    assert!(matches!(absolute.value(), Value::File(_)));

    let invalid = Field::file(source("text/plain")).base_url("https://[broken");
    assert!(matches!(invalid, Err(Error::Schema(_))));
    assert!(Field::text().base_url("not a url").is_ok());

    let mut unreachable = Field::file(source("text/plain")).retries(2);
    assert!(unreachable.set("https://elsewhere.example.com/a.txt").is_err());
    Ok(())
}

#[test]
fn test_uploaded_file_field() -> TestResult {
    let mut field = Field::uploaded_file(Arc::new(MediaStorage));
    field.set("  /./uploads/report.pdf")?;
    assert_eq!(
        field.to_external(),
        Value::from("https://cdn.example.com/media/uploads/report.pdf")
    );
    assert!(field.set("missing.pdf").is_err());
    Ok(())
}

#[test]
fn test_text_kinds() -> TestResult {
    let mut email = Field::email();
    email.set("ada@example.com")?;
    assert!(email.set("ada at example").is_err());

    let mut ip = Field::ip_address();
    ip.set("::1")?;
    assert!(ip.set("999.0.0.1").is_err());

    let mut ints = Field::comma_separated_integer();
    ints.set("1,2,3")?;
    assert!(ints.set("1, 2").is_err());

    let mut text = Field::char();
    text.set(42)?;
    assert_eq!(text.value(), &Value::from("42"));
    Ok(())
}

#[test]
fn test_custom_validators_run_in_order() -> TestResult {
    let short = Validator::new("short", |value| {
        if value.to_text().len() <= 3 {
            Ok(())
        } else {
            Err("too long".to_string())
        }
    });
    let upper = Validator::regex("upper", "^[A-Z]+$", "not upper case")?;
    let field = Field::text().validator(short).validator(upper);
    let reason = |raw: &str| match field.clean(&Value::from(raw)) {
        Err(Error::FieldValidation { reason, .. }) => Some(reason),
        _ => None,
    };
    assert_eq!(reason("ABCD").as_deref(), Some("too long"));
    assert_eq!(reason("abcd").as_deref(), Some("too long"));
    assert_eq!(reason("ab").as_deref(), Some("not upper case"));
    assert_eq!(reason("AB"), None);
    Ok(())
}

#[test]
fn test_list_of_dates() -> TestResult {
    let mut field = Field::list(Some(Field::date()))?;
    field.set(vec![Value::from("2014-01-01"), Value::from("2014-02-01")])?;
    assert_eq!(
        field.to_external(),
        Value::List(vec![Value::from("2014-01-01"), Value::from("2014-02-01")])
    );
    Ok(())
}

#[test]
fn test_boolean_numbers_and_default() -> TestResult {
    let mut field = Field::boolean().default(false);
    field.set("")?;
    assert_eq!(field.value(), &Value::Bool(false));
    field.set(2)?;
    assert_eq!(field.value(), &Value::Bool(true));
    field.set("T")?;
    assert_eq!(field.to_external(), Value::from("true"));
    Ok(())
}
