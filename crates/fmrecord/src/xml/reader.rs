//! Streaming XML reader
//!
//! Produces [`Event`]s in document order without building a tree. Balance
//! is checked as tags close, so a malformed document fails at the first
//! offending tag.

use indexmap::IndexMap;

use crate::error::{Error, Pos, Result, Span, XmlErrorKind};
use crate::lexer::Cursor;
use crate::xml::event::Event;

/// Byte order mark some servers prepend to UTF-8 output
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Configuration for the XML reader
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 64 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// Streaming XML reader with depth and size limits
#[derive(Debug)]
pub struct Reader<'a> {
    cursor: Cursor<'a>,
    config: Config,
    input_len: usize,
    /// Names of currently open elements, innermost last
    open: Vec<String>,
    /// End event owed for a self-closing tag
    pending_end: Option<String>,
    seen_root: bool,
    size_checked: bool,
}

impl<'a> Reader<'a> {
    /// Create a new reader with default configuration
    pub const fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config {
            max_depth: 128,
            max_size: 64 * 1024 * 1024,
        })
    }

    /// Create a new reader with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            input_len: input.len(),
            open: Vec::new(),
            pending_end: None,
            seen_root: false,
            size_checked: false,
        }
    }

    /// Current position in the input
    pub const fn position(&self) -> Pos {
        self.cursor.position()
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Get the next event, or `None` once the root element has closed and
    /// only trailing whitespace, comments or processing instructions remain
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if !self.size_checked {
            self.size_checked = true;
            if self.config.max_size > 0 && self.input_len > self.config.max_size {
                return Err(self.error(XmlErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                }));
            }
            if self.cursor.starts_with(UTF8_BOM) {
                self.cursor.advance_by(UTF8_BOM.len());
            }
        }

        if let Some(name) = self.pending_end.take() {
            self.open.pop();
            return Ok(Some(Event::End { name }));
        }

        loop {
            if self.open.is_empty() {
                self.cursor.skip_whitespace();
                if self.cursor.is_eof() {
                    if self.seen_root {
                        return Ok(None);
                    }
                    return Err(self.error(XmlErrorKind::NoRootElement));
                }
                if self.cursor.current() != Some(b'<') {
                    let kind = if self.seen_root {
                        XmlErrorKind::TrailingContent
                    } else {
                        XmlErrorKind::InvalidToken
                    };
                    return Err(self.error(kind));
                }
            } else if self.cursor.is_eof() {
                let name = self.open.last().cloned().unwrap_or_default();
                return Err(self.error_with(
                    XmlErrorKind::UnexpectedEof,
                    format!("unterminated element <{name}>"),
                ));
            }

            if self.cursor.current() != Some(b'<') {
                let text = self.parse_text()?;
                return Ok(Some(Event::Text(text)));
            }

            match self.cursor.peek(1) {
                Some(b'?') => {
                    self.cursor.advance_by(2);
                    self.skip_until(b"?>")?;
                }
                Some(b'!') => {
                    if self.cursor.starts_with(b"<!--") {
                        self.cursor.advance_by(4);
                        let body = self.take_until(b"-->")?;
                        return Ok(Some(Event::Comment(body)));
                    }
                    if self.cursor.starts_with(b"<![CDATA[") {
                        if self.open.is_empty() {
                            return Err(self.error(XmlErrorKind::InvalidToken));
                        }
                        self.cursor.advance_by(9);
                        let body = self.take_until(b"]]>")?;
                        return Ok(Some(Event::Text(body)));
                    }
                    self.skip_declaration()?;
                }
                Some(b'/') => return self.parse_end_tag().map(Some),
                _ => return self.parse_start_tag().map(Some),
            }
        }
    }

    fn parse_start_tag(&mut self) -> Result<Event> {
        if self.seen_root && self.open.is_empty() {
            return Err(self.error(XmlErrorKind::TrailingContent));
        }
        self.cursor.advance();

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;
        let self_closing = self.cursor.consume(b'/');
        self.expect_byte(b'>')?;

        let max = self.config.max_depth;
        if max > 0 && self.open.len() >= usize::from(max) {
            return Err(self.error(XmlErrorKind::MaxDepthExceeded { max }));
        }

        self.seen_root = true;
        self.open.push(name.clone());
        if self_closing {
            self.pending_end = Some(name.clone());
        }
        Ok(Event::Start { name, attributes })
    }

    fn parse_end_tag(&mut self) -> Result<Event> {
        let start = self.cursor.position();
        self.cursor.advance_by(2);
        let name = self.parse_name()?;
        self.cursor.skip_whitespace();
        self.expect_byte(b'>')?;

        match self.open.last() {
            None => Err(Error::xml(
                XmlErrorKind::UnexpectedClosingTag { name },
                start,
            )),
            Some(open) if *open != name => Err(Error::xml(
                XmlErrorKind::MismatchedTag {
                    expected: open.clone(),
                    found: name,
                },
                start,
            )),
            Some(_) => {
                self.open.pop();
                Ok(Event::End { name })
            }
        }
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) => {}
                None => return Err(self.error(XmlErrorKind::UnexpectedEof)),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error(XmlErrorKind::DuplicateAttribute { name }));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(self.error_with(
                    XmlErrorKind::InvalidToken,
                    "expected quoted attribute value",
                ))
            }
        };
        self.cursor.advance();

        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_str(raw, start_pos)?;
                return decode_entities(text, start_pos);
            }
            if b == b'<' {
                return Err(self.error(XmlErrorKind::InvalidToken));
            }
            self.cursor.advance();
        }

        Err(self.error_with(
            XmlErrorKind::UnexpectedEof,
            "unterminated attribute value",
        ))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_str(raw, start_pos)?;
        decode_entities(text, start_pos)
    }

    fn parse_name(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => return Err(Error::xml(XmlErrorKind::InvalidName, start_pos)),
            None => return Err(Error::xml(XmlErrorKind::UnexpectedEof, start_pos)),
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        bytes_to_str(raw, start_pos).map(str::to_owned)
    }

    fn skip_declaration(&mut self) -> Result<()> {
        // cursor at "<!"; DOCTYPE internal subsets may contain '>' inside brackets
        self.cursor.advance_by(2);
        let mut brackets = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => brackets += 1,
                b']' => brackets = brackets.saturating_sub(1),
                b'>' if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_with(XmlErrorKind::UnexpectedEof, "unterminated declaration"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        self.take_until(pattern).map(|_| ())
    }

    fn take_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return bytes_to_str(raw, start_pos).map(str::to_owned);
            }
            self.cursor.advance();
        }
        Err(self.error_with(XmlErrorKind::UnexpectedEof, "unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(self.error(XmlErrorKind::UnexpectedEof))
        } else {
            Err(self.error_with(
                XmlErrorKind::InvalidToken,
                format!("expected '{}'", char::from(expected)),
            ))
        }
    }

    fn error(&self, kind: XmlErrorKind) -> Error {
        Error::xml(kind, self.cursor.position())
    }

    fn error_with(&self, kind: XmlErrorKind, message: impl Into<String>) -> Error {
        Error::xml_with_message(kind, Span::at(self.cursor.position()), message)
    }
}

fn bytes_to_str(bytes: &[u8], pos: Pos) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| Error::xml(XmlErrorKind::InvalidUtf8, pos))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_owned());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (head, tail) = rest.split_at(amp);
        result.push_str(head);

        let Some(semi) = tail.find(';') else {
            return Err(Error::xml(XmlErrorKind::InvalidEntity, pos));
        };
        let entity = tail.get(1..semi).unwrap_or_default();
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::xml_with_message(
                    XmlErrorKind::InvalidEntity,
                    Span::at(pos),
                    format!("invalid xml entity: &{entity};"),
                ))
            }
        }
        rest = tail.get(semi + 1..).unwrap_or_default();
    }
    result.push_str(rest);

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
