//! Integer, float and decimal coercion

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::value::Value;

/// Decimal variants sharing the same coercion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecimalFlavor {
    Plain,
    /// Bounded to 0..=100, displayed with a trailing `%`
    Percentage,
    /// Two places, leading currency symbol stripped, minimum 0.00
    Currency,
}

// Leading currency symbols and codes, longest alternatives first where they overlap
static CURRENCY_PREFIX: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:¤|؋|฿|B/\.|Bs\.F\.|Bs\.|GH¢|¢|Ch\.|₡|ден|دج|\.د\.ب|د\.ع|د\.ك|ل\.د|дин|د\.ت|د\.م\.|د\.إ|",
        r"[a-zA-Z]{1,3}\$|\$[a-zA-Z]{1,3}|\$|元|圓|₫|€|ƒ|Afl\.|NAƒ|FCFA|₣|G₣|S₣|Fr\.|₲|₴|₭|Kčs|Kč|Íkr|",
        r"K\.D\.|ლ|m\.|₥|₦|Nu\.|₱|[a-zA-Z]{1,2}[£₤]|£|₤|ج\.م\.|Pt\.|ريال|ر\.ع\.|ر\.ق|ر\.س|ریال|៛|₹|₨|₪|",
        r"KSh|Sh\.So\.|S/\.|лв|сом|৳|₸|₮|VT|₩|¥|円|圆|zł|₳|₢|₰|₯|₠|ℳ|₧|ℛℳ|₷|₶|D|[a-zA-Z]{1,4})"
    ))
});

fn invalid_literal(kind: &str, raw: &Value) -> String {
    format!("invalid literal for {kind}: \"{raw}\"")
}

/// Whole numbers; floats and decimals truncate toward zero
pub(crate) fn coerce_integer(raw: &Value) -> Result<Value, String> {
    let value = match raw {
        Value::Int(n) => *n,
        Value::Bool(b) => i64::from(*b),
        Value::Float(n) if n.is_finite() => n
            .trunc()
            .to_i64()
            .ok_or_else(|| "integer out of range".to_string())?,
        Value::Decimal(d) => d
            .trunc()
            .to_i64()
            .ok_or_else(|| "integer out of range".to_string())?,
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid_literal("integer", raw))?,
        other => return Err(format!("cannot convert {} to integer", other.type_name())),
    };
    Ok(Value::Int(value))
}

pub(crate) fn coerce_float(raw: &Value) -> Result<Value, String> {
    let value = match raw {
        Value::Float(n) => *n,
        Value::Int(_) | Value::Decimal(_) => raw
            .as_f64()
            .ok_or_else(|| "float out of range".to_string())?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid_literal("float", raw))?,
        other => return Err(format!("cannot convert {} to float", other.type_name())),
    };
    Ok(Value::Float(value))
}

fn parse_decimal(text: &str) -> Result<Decimal, String> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| format!("invalid literal for decimal: \"{text}\""))
}

/// Round half-even to `places` and pad the scale to exactly that many places
pub(crate) fn quantize(value: Decimal, places: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(places);
    rounded
}

pub(crate) fn coerce_decimal(
    raw: &Value,
    places: Option<u32>,
    flavor: DecimalFlavor,
) -> Result<Value, String> {
    let value = match raw {
        Value::Decimal(d) => *d,
        Value::Int(n) => Decimal::from(*n),
        Value::Float(n) if n.is_finite() => parse_decimal(&raw.to_text())
            .or_else(|_| Decimal::try_from(*n).map_err(|err| err.to_string()))?,
        Value::Text(s) if flavor == DecimalFlavor::Currency => {
            parse_decimal(&strip_currency(s))?
        }
        Value::Text(s) => parse_decimal(s)?,
        other => return Err(format!("cannot convert {} to decimal", other.type_name())),
    };
    Ok(Value::Decimal(match places {
        Some(places) => quantize(value, places),
        None => value,
    }))
}

/// Strip one leading currency symbol or code
pub(crate) fn strip_currency(text: &str) -> String {
    let text = text.trim();
    match CURRENCY_PREFIX.as_ref() {
        Ok(re) => re.replace(text, "").trim().to_string(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Value {
        Decimal::from_str(text).map_or(Value::Null, Value::Decimal)
    }

    #[test]
    fn test_integer() {
        assert_eq!(coerce_integer(&Value::from(" 42 ")), Ok(Value::Int(42)));
        assert_eq!(coerce_integer(&Value::from(-7.9)), Ok(Value::Int(-7)));
        assert_eq!(coerce_integer(&dec("3.99")), Ok(Value::Int(3)));
        assert_eq!(coerce_integer(&Value::Bool(true)), Ok(Value::Int(1)));
        assert!(coerce_integer(&Value::from("4.5")).is_err());
        assert!(coerce_integer(&Value::from("abc")).is_err());
        assert!(coerce_integer(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(coerce_float(&Value::from("1.5")), Ok(Value::Float(1.5)));
        assert_eq!(coerce_float(&Value::Int(2)), Ok(Value::Float(2.0)));
        assert!(coerce_float(&Value::from("x")).is_err());
    }

    #[test]
    fn test_decimal_quantize_half_even() {
        let coerce = |text: &str| coerce_decimal(&Value::from(text), Some(2), DecimalFlavor::Plain);
        assert_eq!(coerce("1.005"), Ok(dec("1.00")));
        assert_eq!(coerce("1.015"), Ok(dec("1.02")));
        assert_eq!(coerce("7").map(|v| v.to_text()), Ok("7.00".to_string()));
        assert_eq!(
            coerce_decimal(&Value::from("1e3"), None, DecimalFlavor::Plain).map(|v| v.to_text()),
            Ok("1000".to_string())
        );
        assert_eq!(
            coerce_decimal(&Value::Float(1.1), None, DecimalFlavor::Plain).map(|v| v.to_text()),
            Ok("1.1".to_string())
        );
    }

    #[test]
    fn test_strip_currency() {
        assert_eq!(strip_currency("$19.99"), "19.99");
        assert_eq!(strip_currency("  €5"), "5");
        assert_eq!(strip_currency("US$ 3.50"), "3.50");
        assert_eq!(strip_currency("GBP 12"), "12");
        assert_eq!(strip_currency("£1,000"), "1,000");
        assert_eq!(strip_currency("-1"), "-1");
    }

    #[test]
    fn test_currency_decimal() {
        assert_eq!(
            coerce_decimal(&Value::from("$19.99"), Some(2), DecimalFlavor::Currency),
            Ok(dec("19.99"))
        );
        assert!(coerce_decimal(&Value::from("$abc"), Some(2), DecimalFlavor::Currency).is_err());
    }
}
