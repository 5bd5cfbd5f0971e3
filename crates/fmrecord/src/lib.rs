//! fmrecord - fmresultset XML decoding and typed model binding
//!
//! # Quick Start
//!
//! ```
//! use fmrecord::{decode_str, Field, Model, ModelSchema};
//! # fn main() -> Result<(), fmrecord::Error> {
//! let xml = r#"<fmresultset xmlns="http://www.filemaker.com/xml/fmresultset">
//!   <error code="0"/>
//!   <resultset count="1">
//!     <record record-id="12" mod-id="3">
//!       <field name="Title"><data>Sunflowers</data></field>
//!       <field name="Artist::Name"><data>Vincent</data></field>
//!     </record>
//!   </resultset>
//! </fmresultset>"#;
//!
//! let schema = ModelSchema::builder("Painting")
//!     .field("id", Field::integer().wire_name("RECORDID"))
//!     .field("title", Field::text().wire_name("Title"))
//!     .field("artist", Field::text().wire_name("Artist.Name"))
//!     .build()?;
//!
//! let paintings = schema.bind_all(&decode_str(xml)?)?;
//! let first = paintings.first().map(|p| p.get_as::<String>("artist"));
//! assert_eq!(first, Some(Ok("Vincent".to_string())));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Pos, Result, Span, XmlErrorKind};

pub mod lexer;

pub mod xml;
pub use xml::{Node, TreeBuilder};

pub mod value;
pub use value::{FromValue, Record, Value, MOD_ID, RECORD_ID};

pub mod config;
pub use config::{Config, FixedZone, TimeZone};

pub mod datetime;

pub mod resultset;
pub use resultset::{
    decode, decode_str, decode_with_config, DecodedResultSet, NO_RECORDS_FOUND,
    STATUS_UNDETERMINED,
};

pub mod field;
pub use field::{Field, FieldKind, Validator};

pub mod model;
pub use model::{
    Assignment, Destination, DestinationMeta, Model, ModelSchema, Resolve, SchemaBuilder,
    ToManyAction,
};
