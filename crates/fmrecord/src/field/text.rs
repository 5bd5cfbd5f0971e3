//! Text, bytes and slug coercion

use std::fmt;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

use super::validator::Validator;
use crate::value::Value;

/// Text kinds that differ only in their built-in validator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFlavor {
    Plain,
    Email,
    Url,
    IpAddress,
    Ipv4,
    Ipv6,
    CommaSeparatedInteger,
    Gtin,
}

impl TextFlavor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Plain => "text",
            Self::Email => "email",
            Self::Url => "url",
            Self::IpAddress => "ip_address",
            Self::Ipv4 => "ipv4_address",
            Self::Ipv6 => "ipv6_address",
            Self::CommaSeparatedInteger => "comma_separated_integer",
            Self::Gtin => "gtin",
        }
    }

    /// Validator installed by the field constructor
    pub(crate) fn validator(self) -> Option<Validator> {
        match self {
            Self::Plain => None,
            Self::Email => Some(Validator::email()),
            Self::Url => Some(Validator::url()),
            Self::IpAddress => Some(Validator::ip()),
            Self::Ipv4 => Some(Validator::ipv4()),
            Self::Ipv6 => Some(Validator::ipv6()),
            Self::CommaSeparatedInteger => Some(Validator::comma_separated_integers()),
            Self::Gtin => Some(Validator::gtin()),
        }
    }
}

pub type Slugify = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone)]
pub struct SlugSpec {
    /// Run `slugify` on input before validation
    pub auto: bool,
    pub slugify: Slugify,
}

impl Default for SlugSpec {
    fn default() -> Self {
        Self {
            auto: true,
            slugify: Arc::new(slugify),
        }
    }
}

impl fmt::Debug for SlugSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlugSpec")
            .field("auto", &self.auto)
            .finish_non_exhaustive()
    }
}

pub(crate) fn coerce_text(raw: &Value) -> Value {
    Value::Text(raw.to_text())
}

pub(crate) fn coerce_bytes(raw: &Value) -> Value {
    match raw {
        Value::Bytes(bytes) => Value::Bytes(bytes.clone()),
        other => Value::Bytes(other.to_text().into_bytes()),
    }
}

pub(crate) fn coerce_slug(spec: &SlugSpec, raw: &Value) -> Value {
    let text = raw.to_text();
    if spec.auto {
        Value::Text((spec.slugify)(&text))
    } else {
        Value::Text(text)
    }
}

fn is_space(ch: char) -> bool {
    ch.is_ascii_whitespace() || ch == '\x0b'
}

/// ASCII slug: NFKD-fold to ASCII, drop anything but alphanumerics,
/// underscores, hyphens and whitespace, trim, lowercase, then collapse runs
/// of hyphens and whitespace into a single hyphen
pub fn slugify(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|&ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || is_space(ch))
        .collect();
    let mut slug = String::with_capacity(folded.len());
    let mut in_run = false;
    for ch in folded.trim_matches(is_space).chars() {
        if ch == '-' || is_space(ch) {
            if !in_run {
                slug.push('-');
            }
            in_run = true;
        } else {
            in_run = false;
            slug.push(ch.to_ascii_lowercase());
        }
    }
    slug
}
