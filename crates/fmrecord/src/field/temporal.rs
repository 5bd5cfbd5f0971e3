//! DateTime and Date coercion

use rust_decimal::prelude::ToPrimitive;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::config::Config;
use crate::datetime::{parse_flexible, strptime, ParseError, Parsed, COMPACT_PATTERN};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemporalSpec {
    /// Pattern used for text input instead of the flexible parser
    pub strptime: Option<String>,
    /// Time of day attached to plain dates
    pub combine_time: Time,
}

impl Default for TemporalSpec {
    fn default() -> Self {
        Self {
            strptime: None,
            combine_time: Time::MIDNIGHT,
        }
    }
}

fn from_epoch(seconds: f64, config: &Config) -> Result<Parsed, String> {
    let out_of_range = || "timestamp out of range".to_string();
    let offset = Duration::checked_seconds_f64(seconds).ok_or_else(out_of_range)?;
    let instant = OffsetDateTime::UNIX_EPOCH
        .checked_add(offset)
        .ok_or_else(out_of_range)?;
    Ok(Parsed::Naive(config.to_local(instant)))
}

fn from_components(items: &[Value]) -> Result<Parsed, String> {
    if !(3..=7).contains(&items.len()) {
        return Err(format!("expected 3 to 7 date components, got {}", items.len()));
    }
    let mut parts = [0i64; 7];
    for (slot, item) in parts.iter_mut().zip(items) {
        *slot = item
            .as_i64()
            .ok_or_else(|| format!("date component \"{item}\" is not an integer"))?;
    }
    let [year, month, day, hour, minute, second, micro] = parts;
    let text = format!(
        "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micro:06}"
    );
    strptime(&text, "%Y-%m-%d %H:%M:%S.%f")
        .map_err(|_| format!("invalid date components {year}, {month}, {day}"))
}

fn parse_text(spec: &TemporalSpec, text: &str) -> Result<Parsed, String> {
    if let Some(pattern) = &spec.strptime {
        return strptime(text, pattern);
    }
    match parse_flexible(text) {
        Ok(parsed) => Ok(parsed),
        Err(ParseError::Overflow) => {
            strptime(text, COMPACT_PATTERN).map_err(|_| ParseError::Overflow.to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}

pub(crate) fn coerce_datetime(
    spec: &TemporalSpec,
    config: &Config,
    raw: &Value,
) -> Result<Value, String> {
    let mut combined = false;
    let parsed = match raw {
        Value::DateTime(dt) => Parsed::Naive(*dt),
        Value::DateTimeTz(dt) => Parsed::Aware(*dt),
        Value::Date(date) => {
            combined = true;
            Parsed::Naive(PrimitiveDateTime::new(*date, spec.combine_time))
        }
        Value::Text(text) if spec.strptime.is_some() || !text.trim().is_empty() => {
            parse_text(spec, text)?
        }
        Value::List(items) => from_components(items)?,
        Value::Int(_) | Value::Float(_) | Value::Decimal(_) => {
            let seconds = match raw {
                Value::Decimal(d) => d.to_f64(),
                other => other.as_f64(),
            }
            .ok_or_else(|| "timestamp out of range".to_string())?;
            from_epoch(seconds, config)?
        }
        other => {
            return Err(format!(
                "cannot convert {} to datetime",
                other.type_name()
            ))
        }
    };

    Ok(match (config.use_tz, parsed) {
        (true, Parsed::Naive(mut local)) => {
            if combined {
                local += config.zone.dst(local);
            }
            Value::DateTimeTz(config.localize(local).to_offset(UtcOffset::UTC))
        }
        (true, Parsed::Aware(aware)) => Value::DateTimeTz(aware),
        (false, Parsed::Aware(aware)) => Value::DateTime(config.to_local(aware)),
        (false, Parsed::Naive(local)) => Value::DateTime(local),
    })
}

pub(crate) fn coerce_date(spec: &TemporalSpec, config: &Config, raw: &Value) -> Result<Value, String> {
    Ok(match coerce_datetime(spec, config, raw)? {
        Value::DateTimeTz(aware) => Value::Date(config.normalize(aware).date()),
        Value::DateTime(local) => Value::Date(local.date()),
        other => other,
    })
}
