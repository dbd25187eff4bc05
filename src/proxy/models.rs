//! Proxy data models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parses command-line style values: bools first, then integers, then
/// floats, falling back to text.
impl FromStr for ParamValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Ok(ParamValue::Bool(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Ok(ParamValue::Bool(false));
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(ParamValue::Int(i));
        }
        if let Ok(x) = trimmed.parse::<f64>() {
            if x.is_finite() {
                return Ok(ParamValue::Float(x));
            }
        }
        Ok(ParamValue::Text(s.to_string()))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u16> for ParamValue {
    fn from(value: u16) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Query parameters keyed by name
pub type Params = BTreeMap<String, ParamValue>;

/// Build a [`Params`] map from `(name, value)` pairs
///
/// ```
/// use proxygrab::proxy::{params, ParamValue};
///
/// let filter = params([("get", ParamValue::from(true)), ("city", "New York".into())]);
/// assert_eq!(filter["get"], ParamValue::Bool(true));
/// ```
pub fn params<I, K, V>(entries: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Normalized proxy server description shared by every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRecord {
    /// Service the proxy was obtained from
    pub source: String,
    /// Proxy server in `ip:port` form
    pub proxy_address: String,
    pub ip: String,
    pub port: u16,
    /// Proxy type as reported by the provider, or "unknown"
    pub proxy_type: String,
    /// Seconds since the provider last verified the proxy
    pub last_checked_seconds: i64,
    pub supports_get: bool,
    pub supports_post: bool,
    pub supports_cookies: bool,
    pub supports_referer: bool,
    pub supports_user_agent: bool,
    pub city: String,
    pub state: String,
    pub country: String,
    /// Remaining requests allowed by the provider, when it reports a quota
    pub requests_remaining: Option<u64>,
}

impl fmt::Display for ProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) via {}",
            self.proxy_address, self.proxy_type, self.country, self.source
        )
    }
}

/// Proxy returned by the GimmeProxy API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GimmeProxyRecord {
    #[serde(flatten)]
    pub base: ProxyRecord,
    pub supports_https: bool,
    pub protocol: String,
    /// 1 for anonymous proxies, 0 otherwise
    pub anonymity_level: i64,
    /// Per-site check results reported by the provider
    pub supported_websites: BTreeMap<String, Value>,
    /// Ready-made curl invocation using the proxy
    pub curl_command: String,
    pub speed_kbps: u64,
}

impl GimmeProxyRecord {
    pub fn into_base(self) -> ProxyRecord {
        self.base
    }
}

impl Deref for GimmeProxyRecord {
    type Target = ProxyRecord;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl fmt::Display for GimmeProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.fmt(f)
    }
}

/// Proxy returned by the ProxyRotator Rotating Proxy API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotatingProxyRecord {
    #[serde(flatten)]
    pub base: ProxyRecord,
    /// "Residential", "Mobile" or "Datacenter"
    pub connection_type: String,
    pub asn: String,
    pub isp: String,
    pub random_user_agent: String,
}

impl RotatingProxyRecord {
    pub fn into_base(self) -> ProxyRecord {
        self.base
    }
}

impl Deref for RotatingProxyRecord {
    type Target = ProxyRecord;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl fmt::Display for RotatingProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ProxyRecord {
        ProxyRecord {
            source: "Gimmeproxy API".to_string(),
            proxy_address: "1.2.3.4:80".to_string(),
            ip: "1.2.3.4".to_string(),
            port: 80,
            proxy_type: "unknown".to_string(),
            last_checked_seconds: 30,
            supports_get: true,
            supports_post: false,
            supports_cookies: true,
            supports_referer: false,
            supports_user_agent: true,
            city: "unknown".to_string(),
            state: "unknown".to_string(),
            country: "US".to_string(),
            requests_remaining: None,
        }
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Bool(true).to_string(), "true");
        assert_eq!(ParamValue::Int(8080).to_string(), "8080");
        assert_eq!(ParamValue::Float(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::Text("US,DE".to_string()).to_string(), "US,DE");
    }

    #[test]
    fn test_param_value_from_str() {
        assert_eq!("true".parse::<ParamValue>().unwrap(), ParamValue::Bool(true));
        assert_eq!("FALSE".parse::<ParamValue>().unwrap(), ParamValue::Bool(false));
        assert_eq!("3128".parse::<ParamValue>().unwrap(), ParamValue::Int(3128));
        assert_eq!("0.5".parse::<ParamValue>().unwrap(), ParamValue::Float(0.5));
        assert_eq!(
            "New York".parse::<ParamValue>().unwrap(),
            ParamValue::Text("New York".to_string())
        );
        assert_eq!(
            "nan".parse::<ParamValue>().unwrap(),
            ParamValue::Text("nan".to_string())
        );
    }

    #[test]
    fn test_params_builder() {
        let p = params([("get", ParamValue::from(true)), ("port", 8080.into())]);
        assert_eq!(p.len(), 2);
        assert_eq!(p["get"], ParamValue::Bool(true));
        assert_eq!(p["port"], ParamValue::Int(8080));
    }

    #[test]
    fn test_record_display() {
        let record = sample_record();
        assert_eq!(record.to_string(), "1.2.3.4:80 (unknown, US) via Gimmeproxy API");
    }

    #[test]
    fn test_extended_record_derefs_to_base() {
        let record = RotatingProxyRecord {
            base: sample_record(),
            connection_type: "Residential".to_string(),
            asn: "AS7922".to_string(),
            isp: "Comcast".to_string(),
            random_user_agent: "Mozilla/5.0".to_string(),
        };
        assert_eq!(record.proxy_address, "1.2.3.4:80");
        assert_eq!(record.to_string(), record.base.to_string());
        assert_eq!(record.into_base(), sample_record());
    }

    #[test]
    fn test_extended_record_serializes_flat() {
        let record = GimmeProxyRecord {
            base: sample_record(),
            supports_https: true,
            protocol: "http".to_string(),
            anonymity_level: 1,
            supported_websites: BTreeMap::from([("google".to_string(), Value::Bool(true))]),
            curl_command: "curl -x http://1.2.3.4:80 http://example.com".to_string(),
            speed_kbps: 100,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["proxy_address"], "1.2.3.4:80");
        assert_eq!(json["speed_kbps"], 100);
        assert!(json.get("base").is_none());

        let back: GimmeProxyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
