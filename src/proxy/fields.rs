//! Strict field lookup over provider JSON objects
//!
//! Every accessor fails with [`Error::MissingField`] when the key is absent
//! and [`Error::InvalidField`] when the value cannot be read as the requested
//! type, so a malformed response never turns into a half-filled record.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Read-only view over a decoded response body
pub struct Fields<'a> {
    body: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a Map<String, Value>) -> Self {
        Self { body }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.body.contains_key(key)
    }

    /// Raw value of `key`
    pub fn value(&self, key: &str) -> Result<&'a Value> {
        self.body
            .get(key)
            .ok_or_else(|| Error::MissingField(key.to_string()))
    }

    /// String value; numbers are accepted and rendered in decimal
    pub fn string(&self, key: &str) -> Result<String> {
        match self.value(key)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(invalid(key, "a string")),
        }
    }

    /// Integer value; floats are truncated and numeric strings parsed
    pub fn int(&self, key: &str) -> Result<i64> {
        match self.value(key)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|x| x.is_finite()).map(|x| x.trunc() as i64))
                .ok_or_else(|| invalid(key, "an integer")),
            Value::String(s) => parse_int(s).ok_or_else(|| invalid(key, "an integer")),
            _ => Err(invalid(key, "an integer")),
        }
    }

    /// Non-negative integer value
    pub fn uint(&self, key: &str) -> Result<u64> {
        u64::try_from(self.int(key)?).map_err(|_| invalid(key, "a non-negative integer"))
    }

    pub fn port(&self, key: &str) -> Result<u16> {
        u16::try_from(self.int(key)?).map_err(|_| invalid(key, "a port number"))
    }

    /// Bool value; the strings "true" and "false" are accepted
    pub fn bool(&self, key: &str) -> Result<bool> {
        match self.value(key)? {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(invalid(key, "a boolean")),
        }
    }

    /// JSON object value, copied into an ordered map
    pub fn object(&self, key: &str) -> Result<BTreeMap<String, Value>> {
        match self.value(key)? {
            Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            _ => Err(invalid(key, "an object")),
        }
    }
}

fn invalid(key: &str, expected: &'static str) -> Error {
    Error::InvalidField {
        field: key.to_string(),
        expected,
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(|x| x.trunc() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Map<String, Value> {
        match json!({
            "ip": "1.2.3.4",
            "port": "8080",
            "portNum": 3128,
            "speed": 37.8,
            "asn": 7922,
            "get": true,
            "post": "false",
            "websites": {"google": true, "amazon": false},
            "negative": -5,
            "garbage": [1, 2],
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_missing_field() {
        let body = body();
        let fields = Fields::new(&body);
        let err = fields.string("city").unwrap_err();
        assert!(matches!(err, Error::MissingField(ref key) if key == "city"));
        assert!(!fields.contains("city"));
    }

    #[test]
    fn test_string_accepts_numbers() {
        let body = body();
        let fields = Fields::new(&body);
        assert_eq!(fields.string("ip").unwrap(), "1.2.3.4");
        assert_eq!(fields.string("asn").unwrap(), "7922");
        assert!(matches!(fields.string("get"), Err(Error::InvalidField { .. })));
    }

    #[test]
    fn test_integers() {
        let body = body();
        let fields = Fields::new(&body);
        assert_eq!(fields.port("port").unwrap(), 8080);
        assert_eq!(fields.port("portNum").unwrap(), 3128);
        assert_eq!(fields.uint("speed").unwrap(), 37);
        assert_eq!(fields.int("negative").unwrap(), -5);
        assert!(matches!(fields.uint("negative"), Err(Error::InvalidField { .. })));
        assert!(matches!(fields.int("ip"), Err(Error::InvalidField { .. })));
        assert!(matches!(fields.int("garbage"), Err(Error::InvalidField { .. })));
    }

    #[test]
    fn test_booleans() {
        let body = body();
        let fields = Fields::new(&body);
        assert!(fields.bool("get").unwrap());
        assert!(!fields.bool("post").unwrap());
        assert!(matches!(fields.bool("ip"), Err(Error::InvalidField { .. })));
    }

    #[test]
    fn test_object() {
        let body = body();
        let fields = Fields::new(&body);
        let websites = fields.object("websites").unwrap();
        assert_eq!(websites.len(), 2);
        assert_eq!(websites["google"], Value::Bool(true));
        assert!(matches!(fields.object("garbage"), Err(Error::InvalidField { .. })));
    }
}
