//! XML streaming reader events

use indexmap::IndexMap;

/// Events emitted by the streaming XML reader, in document order
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Opening tag (self-closing tags are followed by a matching `End`)
    Start {
        name: String,
        attributes: IndexMap<String, String>,
    },
    /// Closing tag
    End { name: String },
    /// Character data with entities decoded; CDATA sections are delivered here too
    Text(String),
    /// Comment body
    Comment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_equality() {
        assert_eq!(
            Event::End {
                name: "record".to_string()
            },
            Event::End {
                name: "record".to_string()
            }
        );
        assert_ne!(
            Event::Text("a".to_string()),
            Event::Comment("a".to_string())
        );
    }
}
