//! Streaming XML reader and generic node tree

pub mod event;
pub mod reader;
pub mod tree;

pub use event::Event;
pub use reader::{Config, Reader};
pub use tree::{Node, TreeBuilder};

use crate::error::Result;

/// Namespace of fmresultset documents
pub const FMRESULTSET_NS: &str = "http://www.filemaker.com/xml/fmresultset";

/// Parse a complete document into its root node
pub fn parse_tree(input: &[u8]) -> Result<Node> {
    parse_tree_with_config(input, Config::default())
}

/// Parse a complete document into its root node with custom limits
pub fn parse_tree_with_config(input: &[u8], config: Config) -> Result<Node> {
    let mut reader = Reader::with_config(input, config);
    let mut builder = TreeBuilder::new();
    while let Some(event) = reader.next_event()? {
        builder.feed(event, reader.position())?;
    }
    builder.finish(reader.position())
}
