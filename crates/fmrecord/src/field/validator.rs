//! Validators run on coerced field values

use regex::Regex;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use crate::error::{Error, Result};
use crate::value::Value;

type Check = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// A named check on a coerced value; the error string becomes the
/// validation failure reason
#[derive(Clone)]
pub struct Validator {
    name: String,
    check: Check,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish()
    }
}

static EMAIL_RE: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
});

static URL_RE: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?|ftps?)://(?:[^\s:@/]+(?::[^\s:@/]*)?@)?(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}|\[[0-9a-f:.]+\])(?::\d{2,5})?(?:[/?#]\S*)?$",
    )
});

static COMMA_INTS_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\d+(?:,\d+)*$"));

static SLUG_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$"));

static GTIN_RE: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{6,8}$|^[0-9]{10}$|^[0-9]{12}$|^[0-9]{13}$|^[0-9]{14,}$")
});

fn is_match(re: &LazyLock<std::result::Result<Regex, regex::Error>>, text: &str) -> bool {
    re.as_ref().is_ok_and(|re| re.is_match(text))
}

impl Validator {
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Validator requiring the value's text to match `pattern`
    pub fn regex(name: impl Into<String>, pattern: &str, message: impl Into<String>) -> Result<Self> {
        let re = Regex::new(pattern)
            .map_err(|err| Error::schema(format!("invalid validator pattern: {err}")))?;
        let message = message.into();
        Ok(Self::new(name, move |value| {
            if re.is_match(&value.to_text()) {
                Ok(())
            } else {
                Err(message.clone())
            }
        }))
    }

    fn from_static(
        name: &str,
        re: &'static LazyLock<std::result::Result<Regex, regex::Error>>,
        message: &'static str,
    ) -> Self {
        Self::new(name, move |value| {
            if is_match(re, &value.to_text()) {
                Ok(())
            } else {
                Err(message.to_string())
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        (self.check)(value)
    }

    pub fn email() -> Self {
        Self::from_static("email", &EMAIL_RE, "Enter a valid email address.")
    }

    pub fn url() -> Self {
        Self::from_static("url", &URL_RE, "Enter a valid URL.")
    }

    pub fn slug() -> Self {
        Self::from_static(
            "slug",
            &SLUG_RE,
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        )
    }

    pub fn gtin() -> Self {
        Self::from_static("gtin", &GTIN_RE, "Please enter a valid GTIN/ISBN/EAN/UPC code.")
    }

    pub fn comma_separated_integers() -> Self {
        Self::from_static(
            "comma_separated_integers",
            &COMMA_INTS_RE,
            "Enter only digits separated by commas.",
        )
    }

    pub fn ipv4() -> Self {
        Self::new("ipv4", |value| {
            Ipv4Addr::from_str(&value.to_text())
                .map(|_| ())
                .map_err(|_| "Enter a valid IPv4 address.".to_string())
        })
    }

    pub fn ipv6() -> Self {
        Self::new("ipv6", |value| {
            Ipv6Addr::from_str(&value.to_text())
                .map(|_| ())
                .map_err(|_| "Enter a valid IPv6 address.".to_string())
        })
    }

    /// Accepts either an IPv4 or an IPv6 address
    pub fn ip() -> Self {
        Self::new("ip", |value| {
            let text = value.to_text();
            if Ipv4Addr::from_str(&text).is_ok() || Ipv6Addr::from_str(&text).is_ok() {
                Ok(())
            } else {
                Err("Enter a valid IPv4 or IPv6 address.".to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(validator: &Validator, text: &str) -> bool {
        validator.check(&Value::from(text)).is_ok()
    }

    #[test]
    fn test_gtin_lengths() {
        let gtin = Validator::gtin();
        for len in [6, 7, 8, 10, 12, 13, 14, 18] {
            assert!(ok(&gtin, &"1".repeat(len)), "length {len} should pass");
        }
        for len in [1, 5, 9, 11] {
            assert!(!ok(&gtin, &"1".repeat(len)), "length {len} should fail");
        }
        assert!(!ok(&gtin, "12345a78"));
    }

    #[test]
    fn test_email() {
        let email = Validator::email();
        assert!(ok(&email, "someone@example.com"));
        assert!(ok(&email, "first.last+tag@mail.example.co.uk"));
        assert!(!ok(&email, "someone@"));
        assert!(!ok(&email, "no-at-sign.example.com"));
    }

    #[test]
    fn test_url() {
        let url = Validator::url();
        assert!(ok(&url, "http://example.com"));
        assert!(ok(&url, "https://user:pw@example.com:8080/path?q=1"));
        assert!(ok(&url, "http://localhost/x"));
        assert!(!ok(&url, "example.com"));
        assert!(!ok(&url, "gopher://example.com"));
    }

    #[test]
    fn test_ip_addresses() {
        assert!(ok(&Validator::ipv4(), "192.168.0.1"));
        assert!(!ok(&Validator::ipv4(), "::1"));
        assert!(ok(&Validator::ipv6(), "::1"));
        assert!(ok(&Validator::ip(), "10.0.0.1"));
        assert!(ok(&Validator::ip(), "fe80::1"));
        assert!(!ok(&Validator::ip(), "300.1.1.1"));
    }

    #[test]
    fn test_slug_and_comma_ints() {
        assert!(ok(&Validator::slug(), "a-valid_slug-1"));
        assert!(!ok(&Validator::slug(), "not a slug"));
        assert!(ok(&Validator::comma_separated_integers(), "1,22,333"));
        assert!(!ok(&Validator::comma_separated_integers(), "1,,2"));
        assert!(!ok(&Validator::comma_separated_integers(), "-1,2"));
    }

    #[test]
    fn test_custom_regex() -> Result<()> {
        let upper = Validator::regex("upper", "^[A-Z]+$", "must be upper case")?;
        assert_eq!(upper.name(), "upper");
        assert!(ok(&upper, "ABC"));
        assert_eq!(
            upper.check(&Value::from("abc")),
            Err("must be upper case".to_string())
        );
        assert!(Validator::regex("bad", "(", "x").is_err());
        Ok(())
    }
}
