//! fmresultset decoding
//!
//! Turns a parsed document into server metadata and flat, ordered records.
//! Field names of the form `alias::rest` nest under `alias`, recursively, and
//! every `relatedset` becomes a list of child records under its table name.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::value::{Record, Value, MOD_ID, RECORD_ID};
use crate::xml::{self, Node};

/// Server status meaning "no matching records"; decodes to an empty result set
pub const NO_RECORDS_FOUND: i64 = 401;

/// Status reported when the document carries no usable error code or record ids
pub const STATUS_UNDETERMINED: i64 = 954;

/// Separator between a relation alias and the related field name
pub const RELATION_SEPARATOR: &str = "::";

/// Metadata and records of one server response
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedResultSet {
    pub error_code: i64,
    pub product: IndexMap<String, String>,
    pub database: IndexMap<String, String>,
    /// Field name to its `field-definition` attributes, in document order
    pub field_metadata: IndexMap<String, IndexMap<String, String>>,
    pub field_names: Vec<String>,
    pub records: Vec<Record>,
}

impl DecodedResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DecodedResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for DecodedResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Decode a complete fmresultset document
pub fn decode(document: &[u8]) -> Result<DecodedResultSet> {
    decode_with_config(document, xml::Config::default())
}

pub fn decode_str(document: &str) -> Result<DecodedResultSet> {
    decode(document.as_bytes())
}

/// Decode with custom reader limits
#[instrument(level = "debug", skip(document), fields(bytes = document.len()))]
pub fn decode_with_config(document: &[u8], config: xml::Config) -> Result<DecodedResultSet> {
    let root = xml::parse_tree_with_config(document, config)?;
    let error_code = error_code(&root).ok_or(Error::server(STATUS_UNDETERMINED))?;
    debug!(error_code, "decoded status");

    if error_code == NO_RECORDS_FOUND {
        return Ok(DecodedResultSet {
            error_code,
            ..DecodedResultSet::default()
        });
    }
    if error_code != 0 {
        return Err(Error::server(error_code));
    }

    let attributes = |name: &str| {
        root.element(name)
            .map(|node| node.attributes.clone())
            .unwrap_or_default()
    };
    let mut resultset = DecodedResultSet {
        error_code,
        product: attributes("product"),
        database: root
            .element("datasource")
            .or_else(|| root.element("database"))
            .map(|node| node.attributes.clone())
            .unwrap_or_default(),
        ..DecodedResultSet::default()
    };

    if let Some(metadata) = root.element("metadata") {
        for definition in metadata.elements("field-definition") {
            let name = definition.attr("name").unwrap_or_default().to_string();
            resultset.field_names.push(name.clone());
            resultset
                .field_metadata
                .insert(name, definition.attributes.clone());
        }
    }

    if let Some(records) = root.element("resultset") {
        for node in records.elements("record") {
            resultset.records.push(decode_record(node)?);
        }
    }
    debug!(
        records = resultset.records.len(),
        fields = resultset.field_names.len(),
        "decoded result set"
    );
    Ok(resultset)
}

/// `ERRORCODE` text, else the `code` attribute of an `error` element
fn error_code(root: &Node) -> Option<i64> {
    match root.element("ERRORCODE") {
        Some(node) => node.data().parse().ok(),
        None => root.element("error")?.attr("code")?.trim().parse().ok(),
    }
}

fn synthetic_id(node: &Node, attr: &str) -> Result<i64> {
    node.attr(attr)
        .and_then(|id| id.trim().parse().ok())
        .ok_or(Error::server(STATUS_UNDETERMINED))
}

/// Insert `value` under `name`, nesting one record per `::`-separated alias
fn insert_nested(record: &mut Record, name: &str, value: Value) {
    match name.split_once(RELATION_SEPARATOR) {
        Some((alias, rest)) => {
            record.with_nested(alias, |nested| insert_nested(nested, rest, value));
        }
        None => {
            record.insert(name, value);
        }
    }
}

fn field_data(field: &Node) -> Option<Value> {
    field
        .element("data")
        .map(|data| Value::Text(data.data().to_string()))
}

fn with_ids(mut record: Record, node: &Node) -> Result<Record> {
    record.insert(RECORD_ID, synthetic_id(node, "record-id")?);
    record.insert(MOD_ID, synthetic_id(node, "mod-id")?);
    Ok(record)
}

fn decode_record(node: &Node) -> Result<Record> {
    let mut record = Record::new();
    for field in node.elements("field") {
        let Some(name) = field.attr("name") else {
            continue;
        };
        insert_nested(&mut record, name, field_data(field).unwrap_or_default());
    }
    let mut record = with_ids(record, node)?;

    for related in node.elements("relatedset") {
        let table = related.attr("table").unwrap_or_default();
        let count: i64 = related
            .attr("count")
            .and_then(|count| count.trim().parse().ok())
            .unwrap_or(0);
        if count > 0 {
            record.reset_list(table);
        }
        for child in related.elements("record") {
            let child = decode_related(child, table)?;
            record.push_to_list(table, child);
        }
    }
    Ok(record)
}

/// A relatedset record: the `table::` prefix is stripped and fields without
/// data are left out
fn decode_related(node: &Node, table: &str) -> Result<Record> {
    let prefix = format!("{table}{RELATION_SEPARATOR}");
    let mut record = Record::new();
    for field in node.elements("field") {
        let Some(name) = field.attr("name") else {
            continue;
        };
        let Some(value) = field_data(field) else {
            continue;
        };
        let name = name.strip_prefix(prefix.as_str()).unwrap_or(name);
        insert_nested(&mut record, name, value);
    }
    with_ids(record, node)
}
