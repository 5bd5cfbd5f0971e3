//! Boolean coercion with optional explicit remapping

use crate::value::Value;

const TRUE_WORDS: [&str; 5] = ["y", "yes", "true", "t", "1"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BooleanSpec {
    /// Raw values mapped directly to a boolean, checked after the null literal
    pub map: Vec<(Value, bool)>,
    /// Treat the literal text `"None"` as null
    pub null_literal: bool,
}

impl BooleanSpec {
    pub(crate) fn coerce(&self, raw: &Value) -> Result<Value, String> {
        if self.null_literal && raw.as_str() == Some("None") {
            return Ok(Value::Null);
        }
        if let Some((_, mapped)) = self.map.iter().find(|(key, _)| key == raw) {
            return Ok(Value::Bool(*mapped));
        }
        let value = match raw {
            Value::Bool(b) => *b,
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => raw != &Value::Int(0),
            Value::Text(s) => TRUE_WORDS.contains(&s.trim().to_lowercase().as_str()),
            other => other.truthy(),
        };
        Ok(Value::Bool(value))
    }

    /// The mapped raw value for `value`, or lowercase `true`/`false`
    pub(crate) fn render(&self, value: &Value) -> Value {
        if let Some((key, _)) = self
            .map
            .iter()
            .rev()
            .find(|(_, mapped)| Some(*mapped) == value.as_bool())
        {
            return key.clone();
        }
        Value::Text(value.to_text().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_words() {
        let spec = BooleanSpec::default();
        for word in ["y", "YES", " true ", "T", "1"] {
            assert_eq!(spec.coerce(&Value::from(word)), Ok(Value::Bool(true)), "{word}");
        }
        for word in ["n", "no", "false", "0", "maybe"] {
            assert_eq!(spec.coerce(&Value::from(word)), Ok(Value::Bool(false)), "{word}");
        }
    }

    #[test]
    fn test_numbers_and_truthiness() {
        let spec = BooleanSpec::default();
        assert_eq!(spec.coerce(&Value::Int(0)), Ok(Value::Bool(false)));
        assert_eq!(spec.coerce(&Value::Float(0.5)), Ok(Value::Bool(true)));
        assert_eq!(spec.coerce(&Value::List(Vec::new())), Ok(Value::Bool(false)));
        assert_eq!(spec.coerce(&Value::List(vec![Value::Null])), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_map_and_reverse_map() {
        let spec = BooleanSpec {
            map: vec![(Value::from("Ja"), true), (Value::from("Nein"), false)],
            null_literal: false,
        };
        assert_eq!(spec.coerce(&Value::from("Ja")), Ok(Value::Bool(true)));
        assert_eq!(spec.coerce(&Value::from("Nein")), Ok(Value::Bool(false)));
        assert_eq!(spec.render(&Value::Bool(true)), Value::from("Ja"));
        assert_eq!(BooleanSpec::default().render(&Value::Bool(false)), Value::from("false"));
    }

    #[test]
    fn test_null_literal() {
        let spec = BooleanSpec {
            null_literal: true,
            ..BooleanSpec::default()
        };
        assert_eq!(spec.coerce(&Value::from("None")), Ok(Value::Null));
        assert_eq!(spec.coerce(&Value::from("yes")), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_null_literal_wins_over_map() {
        let spec = BooleanSpec {
            map: vec![(Value::from("None"), false), (Value::from("Some"), true)],
            null_literal: true,
        };
        assert_eq!(spec.coerce(&Value::from("None")), Ok(Value::Null));
        assert_eq!(spec.coerce(&Value::from("Some")), Ok(Value::Bool(true)));

        let plain = BooleanSpec {
            null_literal: false,
            ..spec
        };
        assert_eq!(plain.coerce(&Value::from("None")), Ok(Value::Bool(false)));
    }
}
