//! Secret string handling with redacted display and serialization.
//!
//! Database passwords end up in definitions that are routinely logged with
//! `{:?}`; `RedactedString` keeps them out of that output.

use derive_more::From;
use getset::Getters;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Formatter};
use std::result;
use zeroize::Zeroize;

/// Placeholder text shown instead of the actual secret in logs/debug output
pub static REDACTED_SECRET: &str = "###REDACTED###";

/// A string that gets redacted in debug output and serialization
///
/// Memory is zeroed on drop.
#[derive(Clone, From, PartialEq, Eq, Getters, Default)]
#[getset(get = "pub")]
pub struct RedactedString {
    inner: String,
}

impl RedactedString {
    pub fn new<S: Into<String>>(inner: S) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<&str> for RedactedString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Debug for RedactedString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", REDACTED_SECRET)
    }
}

impl Serialize for RedactedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED_SECRET)
    }
}

impl<'de> Deserialize<'de> for RedactedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        deserializer.deserialize_any(RedactedStringVisitor)
    }
}

impl Zeroize for RedactedString {
    fn zeroize(&mut self) {
        self.inner.zeroize();
    }
}

impl Drop for RedactedString {
    fn drop(&mut self) {
        self.zeroize();
    }
}

pub struct RedactedStringVisitor;

impl Visitor<'_> for RedactedStringVisitor {
    type Value = RedactedString;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(RedactedString::new(v))
    }

    // YAML happily reads `password: 1234` as a number.
    fn visit_i64<E>(self, v: i64) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(RedactedString::new(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(RedactedString::new(v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_debug_hides_secret() {
        let secret = RedactedString::from("wordpress");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, REDACTED_SECRET);
        assert!(!debug_str.contains("wordpress"));
        assert_eq!(secret.inner(), "wordpress");
    }

    #[test]
    fn test_redacted_serialize_hides_secret() {
        let secret = RedactedString::from("wordpress");
        let serialized = serde_json::to_string(&secret).unwrap();
        assert_eq!(serialized, format!("\"{}\"", REDACTED_SECRET));
    }

    #[test]
    fn test_redacted_deserialize_number() {
        let secret: RedactedString = serde_yml::from_str("1234").unwrap();
        assert_eq!(secret.inner(), "1234");
    }

    #[test]
    fn test_redacted_zeroize() {
        let mut redacted = RedactedString::from("secret_password");
        redacted.zeroize();
        assert!(redacted.is_empty());
    }
}
