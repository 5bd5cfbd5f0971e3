//! Date and time parsing and ISO-8601 formatting
//!
//! [`parse_flexible`] accepts the loose formats the server and its users
//! produce: ISO and RFC 3339 timestamps, US-style `M/D/Y` dates, compact
//! digit runs and free-form text such as `"Jan 5th, 2024 3:30pm"`.
//! [`strptime`] parses against an explicit `%`-directive pattern.

use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::lexer::Cursor;

/// Pattern tried when the flexible parser overflows
pub const COMPACT_PATTERN: &str = "%Y%m%d%H%M%S";

/// A parsed date and time, with or without a UTC offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parsed {
    Naive(PrimitiveDateTime),
    Aware(OffsetDateTime),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Input is not a recognisable date
    Invalid(String),
    /// A numeric component is too large to be a date part
    Overflow,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(reason) => f.write_str(reason),
            Self::Overflow => f.write_str("date value out of range"),
        }
    }
}

fn invalid(reason: impl Into<String>) -> ParseError {
    ParseError::Invalid(reason.into())
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// Format a naive datetime as `YYYY-MM-DDTHH:MM:SS`, adding `.ffffff` only
/// when the microseconds are nonzero
pub fn format_datetime(datetime: PrimitiveDateTime) -> String {
    let base = datetime
        .format(&format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .unwrap_or_default();
    match datetime.microsecond() {
        0 => base,
        micros => format!("{base}.{micros:06}"),
    }
}

/// Format an aware datetime as [`format_datetime`] followed by `+HH:MM`
pub fn format_offset_datetime(datetime: OffsetDateTime) -> String {
    let naive = PrimitiveDateTime::new(datetime.date(), datetime.time());
    let offset = datetime
        .offset()
        .format(&format_description!(
            "[offset_hour sign:mandatory]:[offset_minute]"
        ))
        .unwrap_or_default();
    format!("{}{offset}", format_datetime(naive))
}

/// Parse a date or datetime in any of the supported loose formats
///
/// Year, month and day must all be present; a bare time is rejected.
pub fn parse_flexible(input: &str) -> Result<Parsed, ParseError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(invalid("empty date string"));
    }

    if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(Parsed::Aware(datetime));
    }
    let offset_datetime = format_description!(
        "[year]-[month]-[day][first [T][ ]][hour]:[minute][optional [:[second][optional [.[subsecond]]]]][offset_hour sign:mandatory][optional [:]][offset_minute]"
    );
    if let Ok(datetime) = OffsetDateTime::parse(value, &offset_datetime) {
        return Ok(Parsed::Aware(datetime));
    }

    let local_datetime = format_description!(
        "[year]-[month]-[day][first [T][ ]][hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    );
    if let Ok(datetime) = PrimitiveDateTime::parse(value, &local_datetime) {
        return Ok(Parsed::Naive(datetime));
    }

    let local_date = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(value, &local_date) {
        return Ok(Parsed::Naive(date.midnight()));
    }

    let us_datetime = format_description!(
        "[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute][optional [:[second]]]"
    );
    if let Ok(datetime) = PrimitiveDateTime::parse(value, &us_datetime) {
        return Ok(Parsed::Naive(datetime));
    }
    let us_date = format_description!("[month padding:none]/[day padding:none]/[year]");
    if let Ok(date) = Date::parse(value, &us_date) {
        return Ok(Parsed::Naive(date.midnight()));
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        return parse_compact(value);
    }

    FreeForm::new(value).parse()
}

fn parse_compact(digits: &str) -> Result<Parsed, ParseError> {
    let part = |range: std::ops::Range<usize>| -> Result<u32, ParseError> {
        digits
            .get(range)
            .unwrap_or_default()
            .parse::<u32>()
            .map_err(|_| invalid("invalid digits"))
    };
    match digits.len() {
        8 | 12 | 14 => {
            let year = i32::try_from(part(0..4)?).map_err(|_| ParseError::Overflow)?;
            let (hour, minute) = if digits.len() >= 12 {
                (part(8..10)?, part(10..12)?)
            } else {
                (0, 0)
            };
            let second = if digits.len() == 14 { part(12..14)? } else { 0 };
            build(year, part(4..6)?, part(6..8)?, hour, minute, second, 0).map(Parsed::Naive)
        }
        len if len > 9 => Err(ParseError::Overflow),
        _ => Err(invalid("missing date components")),
    }
}

fn build(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    micro: u32,
) -> Result<PrimitiveDateTime, ParseError> {
    let month = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| invalid("month must be in 1..12"))?;
    let day = u8::try_from(day).map_err(|_| invalid("day is out of range for month"))?;
    let date = Date::from_calendar_date(year, month, day)
        .map_err(|_| invalid("day is out of range for month"))?;
    let narrow = |v: u32| u8::try_from(v).map_err(|_| invalid("time component out of range"));
    let time = Time::from_hms_micro(narrow(hour)?, narrow(minute)?, narrow(second)?, micro)
        .map_err(|_| invalid("time component out of range"))?;
    Ok(PrimitiveDateTime::new(date, time))
}

fn expand_year(year: u32, digits: usize) -> Result<i32, ParseError> {
    let year = if digits <= 2 {
        if year < 69 {
            year + 2000
        } else {
            year + 1900
        }
    } else {
        year
    };
    i32::try_from(year).map_err(|_| ParseError::Overflow)
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn month_number(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .zip(1u32..)
        .find(|(name, _)| {
            **name == word || (name.starts_with(word) && (word.len() == 3 || word == "sept"))
        })
        .map(|(_, number)| number)
}

fn is_weekday(word: &str) -> bool {
    word.len() >= 3
        && WEEKDAYS
            .iter()
            .any(|name| *name == word || (word.len() == 3 && name.starts_with(word)))
}

/// Token-driven parser for free-form dates
struct FreeForm<'a> {
    cursor: Cursor<'a>,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: u32,
    second: u32,
    micro: u32,
    pm: Option<bool>,
    offset: Option<UtcOffset>,
    /// Lone numbers whose role is decided once all tokens are seen
    loose: Vec<(u32, usize)>,
}

impl<'a> FreeForm<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input.as_bytes()),
            year: None,
            month: None,
            day: None,
            hour: None,
            minute: 0,
            second: 0,
            micro: 0,
            pm: None,
            offset: None,
            loose: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Parsed, ParseError> {
        loop {
            while self
                .cursor
                .current()
                .is_some_and(|b| b.is_ascii_whitespace() || b == b',')
            {
                self.cursor.advance();
            }
            match self.cursor.current() {
                None => break,
                Some(b) if b.is_ascii_digit() => self.number()?,
                Some(b) if b.is_ascii_alphabetic() => self.word()?,
                Some(b'+' | b'-') if self.hour.is_some() => self.offset_token()?,
                Some(b'.' | b'/' | b'-') => self.cursor.advance(),
                Some(_) => return Err(invalid("unexpected character in date string")),
            }
        }
        self.finish()
    }

    fn digits(&mut self) -> Result<(u32, usize), ParseError> {
        let start = self.cursor.pos();
        while self.cursor.current().is_some_and(|b| b.is_ascii_digit()) {
            self.cursor.advance();
        }
        let raw = self.cursor.slice_from(start);
        if raw.len() > 9 {
            return Err(ParseError::Overflow);
        }
        let text = std::str::from_utf8(raw).map_err(|_| invalid("invalid digits"))?;
        let value = text.parse::<u32>().map_err(|_| invalid("expected digits"))?;
        Ok((value, raw.len()))
    }

    fn next_is_digit(&self) -> bool {
        self.cursor.peek(1).is_some_and(|b| b.is_ascii_digit())
    }

    fn number(&mut self) -> Result<(), ParseError> {
        let (first, first_len) = self.digits()?;
        match self.cursor.current() {
            Some(b':') if self.next_is_digit() => self.time(first),
            Some(sep @ (b'-' | b'/' | b'.')) if self.next_is_digit() => {
                self.cursor.advance();
                let second = self.digits()?;
                if self.cursor.current() == Some(sep) && self.next_is_digit() {
                    self.cursor.advance();
                    let third = self.digits()?;
                    self.date_triple((first, first_len), second, third)
                } else {
                    self.set_month(first)?;
                    self.set_day(second.0)
                }
            }
            _ if first_len == 8 && self.year.is_none() => {
                let Parsed::Naive(parsed) = parse_compact(&format!("{first:08}"))? else {
                    return Err(invalid("unexpected offset"));
                };
                self.year = Some(parsed.year());
                self.set_month(u32::from(u8::from(parsed.month())))?;
                self.set_day(u32::from(parsed.day()))
            }
            _ => {
                if self.ordinal_suffix() {
                    return self.set_day(first);
                }
                if first_len == 4 || first > 31 {
                    if self.year.is_some() {
                        return Err(invalid("more than one year in date string"));
                    }
                    self.year = Some(expand_year(first, first_len)?);
                } else {
                    self.loose.push((first, first_len));
                }
                Ok(())
            }
        }
    }

    fn ordinal_suffix(&mut self) -> bool {
        let Some(bytes) = self.cursor.peek_bytes(2) else {
            return false;
        };
        let is_suffix = [b"st", b"nd", b"rd", b"th"]
            .iter()
            .any(|suffix| bytes.eq_ignore_ascii_case(*suffix));
        let standalone = !self.cursor.peek(2).is_some_and(|b| b.is_ascii_alphabetic());
        if is_suffix && standalone {
            self.cursor.advance_by(2);
            return true;
        }
        false
    }

    fn time(&mut self, hour: u32) -> Result<(), ParseError> {
        if self.hour.is_some() {
            return Err(invalid("more than one time in date string"));
        }
        self.hour = Some(hour);
        self.cursor.advance();
        self.minute = self.digits()?.0;
        if self.cursor.current() == Some(b':') && self.next_is_digit() {
            self.cursor.advance();
            self.second = self.digits()?.0;
            if matches!(self.cursor.current(), Some(b'.' | b',')) && self.next_is_digit() {
                self.cursor.advance();
                self.micro = self.fraction();
            }
        }
        Ok(())
    }

    fn fraction(&mut self) -> u32 {
        let mut micro = 0u32;
        let mut places = 0;
        while let Some(b) = self.cursor.current().filter(u8::is_ascii_digit) {
            if places < 6 {
                micro = micro * 10 + u32::from(b - b'0');
                places += 1;
            }
            self.cursor.advance();
        }
        while places < 6 {
            micro *= 10;
            places += 1;
        }
        micro
    }

    fn date_triple(
        &mut self,
        (a, a_len): (u32, usize),
        (b, _): (u32, usize),
        (c, c_len): (u32, usize),
    ) -> Result<(), ParseError> {
        if a_len == 4 || a > 31 {
            self.year = Some(expand_year(a, a_len)?);
            self.set_month(b)?;
            return self.set_day(c);
        }
        self.year = Some(expand_year(c, c_len)?);
        if a > 12 && b <= 12 {
            self.set_month(b)?;
            self.set_day(a)
        } else {
            self.set_month(a)?;
            self.set_day(b)
        }
    }

    fn set_month(&mut self, month: u32) -> Result<(), ParseError> {
        if self.month.replace(month).is_some() {
            return Err(invalid("more than one month in date string"));
        }
        Ok(())
    }

    fn set_day(&mut self, day: u32) -> Result<(), ParseError> {
        if self.day.replace(day).is_some() {
            return Err(invalid("more than one day in date string"));
        }
        Ok(())
    }

    fn word(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.pos();
        while self.cursor.current().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.cursor.advance();
        }
        let word = String::from_utf8_lossy(self.cursor.slice_from(start)).to_ascii_lowercase();

        if let Some(month) = month_number(&word) {
            return self.set_month(month);
        }
        if is_weekday(&word) {
            return Ok(());
        }
        match word.as_str() {
            "am" | "a" | "pm" | "p" => {
                if self.hour.is_none() {
                    let Some((hour, _)) = self.loose.pop() else {
                        return Err(invalid("meridiem without an hour"));
                    };
                    self.hour = Some(hour);
                }
                self.pm = Some(word.starts_with('p'));
                // "a.m." and "p.m."
                if self.cursor.current() == Some(b'.') {
                    self.cursor.advance();
                    if self.cursor.starts_with_ignore_case(b"m.") {
                        self.cursor.advance_by(2);
                    }
                }
                Ok(())
            }
            "utc" | "gmt" | "z" => {
                self.offset = Some(UtcOffset::UTC);
                Ok(())
            }
            "t" | "at" | "on" | "of" | "the" | "and" => Ok(()),
            _ => Err(invalid(format!("unknown token \"{word}\" in date string"))),
        }
    }

    fn offset_token(&mut self) -> Result<(), ParseError> {
        let negative = self.cursor.current() == Some(b'-');
        self.cursor.advance();
        let (first, len) = self.digits()?;
        let (hours, minutes) = match len {
            1 | 2 if self.cursor.current() == Some(b':') => {
                self.cursor.advance();
                match self.digits()? {
                    (minutes, 2) => (first, minutes),
                    _ => return Err(invalid("invalid utc offset")),
                }
            }
            1 | 2 => (first, 0),
            4 => (first / 100, first % 100),
            _ => return Err(invalid("invalid utc offset")),
        };
        if minutes >= 60 {
            return Err(invalid("invalid utc offset"));
        }
        let seconds = hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
            .and_then(|total| i32::try_from(total).ok())
            .ok_or_else(|| invalid("invalid utc offset"))?;
        let seconds = if negative { -seconds } else { seconds };
        self.offset = Some(
            UtcOffset::from_whole_seconds(seconds).map_err(|_| invalid("invalid utc offset"))?,
        );
        Ok(())
    }

    fn finish(mut self) -> Result<Parsed, ParseError> {
        for (value, len) in std::mem::take(&mut self.loose) {
            if self.month.is_some() && self.day.is_none() {
                self.day = Some(value);
            } else if self.month.is_none() && value <= 12 {
                self.month = Some(value);
            } else if self.day.is_none() {
                self.day = Some(value);
            } else if self.year.is_none() {
                self.year = Some(expand_year(value, len)?);
            } else {
                return Err(invalid("too many numbers in date string"));
            }
        }

        let year = self.year.ok_or_else(|| invalid("missing year"))?;
        let month = self.month.ok_or_else(|| invalid("missing month"))?;
        let day = self.day.ok_or_else(|| invalid("missing day"))?;
        let mut hour = self.hour.unwrap_or(0);
        if let Some(pm) = self.pm {
            if hour == 0 || hour > 12 {
                return Err(invalid("hour must be in 1..12 with am/pm"));
            }
            hour = match (pm, hour) {
                (false, 12) => 0,
                (true, h) if h < 12 => h + 12,
                (_, h) => h,
            };
        }

        let naive = build(year, month, day, hour, self.minute, self.second, self.micro)?;
        Ok(match self.offset {
            Some(offset) => Parsed::Aware(naive.assume_offset(offset)),
            None => Parsed::Naive(naive),
        })
    }
}

/// Parse `input` against a strptime-style pattern
///
/// Supported directives: `%Y %y %m %d %j %H %I %M %S %f %p %b %B %h %a %A
/// %z %%`. Whitespace in the pattern matches one or more whitespace
/// characters; other literals match case-insensitively. Fields missing from
/// the pattern default to 1900-01-01 00:00:00.
pub fn strptime(input: &str, pattern: &str) -> Result<Parsed, String> {
    let mut cursor = Cursor::new(input.as_bytes());
    let mut fmt = Cursor::new(pattern.as_bytes());
    let mut state = Strptime::default();
    let mismatch = || format!("time data \"{input}\" does not match format \"{pattern}\"");

    while let Some(b) = fmt.current() {
        fmt.advance();
        if b.is_ascii_whitespace() {
            fmt.skip_whitespace();
            if !cursor.current().is_some_and(|c| c.is_ascii_whitespace()) {
                return Err(mismatch());
            }
            cursor.skip_whitespace();
            continue;
        }
        if b != b'%' {
            match cursor.current() {
                Some(c) if c.eq_ignore_ascii_case(&b) => cursor.advance(),
                _ => return Err(mismatch()),
            }
            continue;
        }

        let Some(directive) = fmt.current() else {
            return Err(format!("stray % in format \"{pattern}\""));
        };
        fmt.advance();
        let ok = match directive {
            b'Y' => take_number(&mut cursor, 4, 4, 0, 9999).map(|v| state.year = v),
            b'y' => take_number(&mut cursor, 2, 2, 0, 99).map(|v| state.year = v + if v < 69 { 2000 } else { 1900 }),
            b'm' => take_number(&mut cursor, 1, 2, 1, 12).map(|v| state.month = v),
            b'd' => take_number(&mut cursor, 1, 2, 1, 31).map(|v| state.day = v),
            b'j' => take_number(&mut cursor, 1, 3, 1, 366).map(|v| state.yday = Some(v)),
            b'H' => take_number(&mut cursor, 1, 2, 0, 23).map(|v| state.hour = v),
            b'I' => take_number(&mut cursor, 1, 2, 1, 12).map(|v| {
                state.hour = v;
                state.twelve_hour = true;
            }),
            b'M' => take_number(&mut cursor, 1, 2, 0, 59).map(|v| state.minute = v),
            b'S' => take_number(&mut cursor, 1, 2, 0, 59).map(|v| state.second = v),
            b'f' => take_fraction(&mut cursor).map(|v| state.micro = v),
            b'p' => take_meridiem(&mut cursor).map(|pm| state.pm = Some(pm)),
            b'b' | b'B' | b'h' => take_name(&mut cursor, &MONTHS).map(|m| state.month = m),
            b'a' | b'A' => take_name(&mut cursor, &WEEKDAYS).map(|_| ()),
            b'z' => take_offset(&mut cursor).map(|o| state.offset = Some(o)),
            b'%' => cursor.consume(b'%').then_some(()),
            other => {
                return Err(format!(
                    "'{}' is a bad directive in format \"{pattern}\"",
                    char::from(other)
                ))
            }
        };
        if ok.is_none() {
            return Err(mismatch());
        }
    }

    if !cursor.is_eof() {
        return Err(format!(
            "unconverted data remains: {}",
            String::from_utf8_lossy(cursor.remaining())
        ));
    }
    state.finish().map_err(|err| err.to_string())
}

#[derive(Debug)]
struct Strptime {
    year: u32,
    month: u32,
    day: u32,
    yday: Option<u32>,
    hour: u32,
    twelve_hour: bool,
    minute: u32,
    second: u32,
    micro: u32,
    pm: Option<bool>,
    offset: Option<UtcOffset>,
}

impl Default for Strptime {
    fn default() -> Self {
        Self {
            year: 1900,
            month: 1,
            day: 1,
            yday: None,
            hour: 0,
            twelve_hour: false,
            minute: 0,
            second: 0,
            micro: 0,
            pm: None,
            offset: None,
        }
    }
}

impl Strptime {
    fn finish(self) -> Result<Parsed, ParseError> {
        let mut hour = self.hour;
        if self.twelve_hour {
            hour = match (self.pm.unwrap_or(false), hour) {
                (false, 12) => 0,
                (true, h) if h < 12 => h + 12,
                (_, h) => h,
            };
        }
        let year = i32::try_from(self.year).map_err(|_| ParseError::Overflow)?;
        let naive = match self.yday {
            Some(yday) => {
                let ordinal = u16::try_from(yday).map_err(|_| invalid("day of year out of range"))?;
                let date = Date::from_ordinal_date(year, ordinal)
                    .map_err(|_| invalid("day of year out of range"))?;
                let base = build(year, 1, 1, hour, self.minute, self.second, self.micro)?;
                PrimitiveDateTime::new(date, base.time())
            }
            None => build(year, self.month, self.day, hour, self.minute, self.second, self.micro)?,
        };
        Ok(match self.offset {
            Some(offset) => Parsed::Aware(naive.assume_offset(offset)),
            None => Parsed::Naive(naive),
        })
    }
}

/// Read between `min` and `max` digits, preferring the longest run whose
/// value lies in `low..=high`
fn take_number(cursor: &mut Cursor<'_>, min: usize, max: usize, low: u32, high: u32) -> Option<u32> {
    let mut available = 0;
    while available < max && cursor.peek(available).is_some_and(|b| b.is_ascii_digit()) {
        available += 1;
    }
    for len in (min..=available).rev() {
        let digits = cursor.peek_bytes(len)?;
        let value = digits
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
        if (low..=high).contains(&value) {
            cursor.advance_by(len);
            return Some(value);
        }
    }
    None
}

fn take_fraction(cursor: &mut Cursor<'_>) -> Option<u32> {
    let mut micro = 0u32;
    let mut len = 0;
    while len < 6 {
        match cursor.current() {
            Some(b) if b.is_ascii_digit() => {
                micro = micro * 10 + u32::from(b - b'0');
                len += 1;
                cursor.advance();
            }
            _ => break,
        }
    }
    if len == 0 {
        return None;
    }
    Some(micro * 10u32.pow(6 - len))
}

fn take_meridiem(cursor: &mut Cursor<'_>) -> Option<bool> {
    if cursor.starts_with_ignore_case(b"am") {
        cursor.advance_by(2);
        Some(false)
    } else if cursor.starts_with_ignore_case(b"pm") {
        cursor.advance_by(2);
        Some(true)
    } else {
        None
    }
}

fn take_name(cursor: &mut Cursor<'_>, names: &[&str]) -> Option<u32> {
    for (name, number) in names.iter().zip(1u32..) {
        if cursor.starts_with_ignore_case(name.as_bytes()) {
            cursor.advance_by(name.len());
            return Some(number);
        }
    }
    for (name, number) in names.iter().zip(1u32..) {
        let abbr = name.get(..3)?;
        if cursor.starts_with_ignore_case(abbr.as_bytes()) {
            cursor.advance_by(3);
            return Some(number);
        }
    }
    None
}

fn take_offset(cursor: &mut Cursor<'_>) -> Option<UtcOffset> {
    if cursor.consume(b'Z') || cursor.consume(b'z') {
        return Some(UtcOffset::UTC);
    }
    let negative = match cursor.current()? {
        b'+' => false,
        b'-' => true,
        _ => return None,
    };
    cursor.advance();
    let hours = take_number(cursor, 2, 2, 0, 23)?;
    cursor.consume(b':');
    let minutes = take_number(cursor, 2, 2, 0, 59)?;
    let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    UtcOffset::from_whole_seconds(if negative { -seconds } else { seconds }).ok()
}
