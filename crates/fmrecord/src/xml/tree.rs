//! Generic node tree built from reader events

use indexmap::IndexMap;

use crate::error::{Error, Pos, Result, Span, XmlErrorKind};
use crate::xml::event::Event;
use crate::xml::FMRESULTSET_NS;

/// One XML element with its attributes, accumulated text and children
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    /// Character data in encounter order, untrimmed
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trimmed character data
    pub fn data(&self) -> &str {
        self.text.trim()
    }

    /// First child named `name`, or the first child at all when `name` is empty
    pub fn element(&self, name: &str) -> Option<&Node> {
        if name.is_empty() {
            return self.children.first();
        }
        self.children.iter().find(|child| child.name == name)
    }

    /// All children named `name`, or every child when `name` is empty
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children
            .iter()
            .filter(move |child| name.is_empty() || child.name == name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Consumes reader events into a [`Node`] tree
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Node>,
    /// Prefixes bound to the fmresultset namespace, one scope per open element
    scopes: Vec<Vec<String>>,
    root: Option<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, event: Event, pos: Pos) -> Result<()> {
        match event {
            Event::Start { name, attributes } => self.on_start(&name, attributes),
            Event::End { name } => self.on_end(&name, pos)?,
            Event::Text(text) => self.on_character_data(&text),
            Event::Comment(_) => {}
        }
        Ok(())
    }

    pub fn on_start(&mut self, name: &str, attributes: IndexMap<String, String>) {
        let bound: Vec<String> = attributes
            .iter()
            .filter(|(_, uri)| uri.as_str() == FMRESULTSET_NS)
            .filter_map(|(key, _)| key.strip_prefix("xmlns:").map(str::to_owned))
            .collect();
        self.scopes.push(bound);

        let local = self.strip_namespace(name).to_owned();
        self.stack.push(Node {
            name: local,
            attributes,
            text: String::new(),
            children: Vec::new(),
        });
    }

    pub fn on_end(&mut self, name: &str, pos: Pos) -> Result<()> {
        let local = self.strip_namespace(name).to_owned();
        self.scopes.pop();
        let Some(node) = self.stack.pop() else {
            return Err(Error::xml(
                XmlErrorKind::UnexpectedClosingTag { name: local },
                pos,
            ));
        };
        if node.name != local {
            return Err(Error::xml(
                XmlErrorKind::MismatchedTag {
                    expected: node.name,
                    found: local,
                },
                pos,
            ));
        }

        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                if self.root.is_some() {
                    return Err(Error::xml(XmlErrorKind::TrailingContent, pos));
                }
                self.root = Some(node);
            }
        }
        Ok(())
    }

    pub fn on_character_data(&mut self, text: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.text.push_str(text);
        }
    }

    /// Return the completed root element
    pub fn finish(self, pos: Pos) -> Result<Node> {
        if let Some(open) = self.stack.last() {
            return Err(Error::xml_with_message(
                XmlErrorKind::UnexpectedEof,
                Span::at(pos),
                format!("unterminated element <{}>", open.name),
            ));
        }
        self.root
            .ok_or_else(|| Error::xml(XmlErrorKind::NoRootElement, pos))
    }

    fn strip_namespace<'n>(&self, name: &'n str) -> &'n str {
        if let Some(rest) = name.strip_prefix('{') {
            return match rest.split_once('}') {
                Some((ns, local)) if ns == FMRESULTSET_NS => local,
                _ => name,
            };
        }
        match name.split_once(':') {
            Some((prefix, local))
                if self
                    .scopes
                    .iter()
                    .rev()
                    .any(|scope| scope.iter().any(|p| p == prefix)) =>
            {
                local
            }
            _ => name,
        }
    }
}
