//! Client for the ProxyRotator Rotating Proxy API (<https://www.proxyrotator.com/>)

use crate::error::{Error, Result};
use crate::proxy::fetcher::{FetchBody, ParameterizedFetcher, ResponseFormat};
use crate::proxy::fields::Fields;
use crate::proxy::models::{Params, ProxyRecord, RotatingProxyRecord};
use crate::proxy::source::ProxySource;
use crate::proxy::transport::{HttpTransport, ReqwestTransport, TransportConfig};
use serde_json::Value;
use tracing::{debug, warn};

/// Rotating Proxy API endpoint
pub const ROTATOR_ENDPOINT: &str = "http://falcon.proxyrotator.com:51337/";

/// Value of [`ProxyRecord::source`] for rotating proxy records
pub const ROTATOR_SOURCE: &str = "RotatingProxyAPI";

/// Parameters accepted by the Rotating Proxy API
///
/// - `get`, `post`, `cookies`, `referer`, `userAgent` (bool): request capabilities
/// - `port` (int), `city`, `state`, `country` (string)
/// - `connectionType` (string): "Residential", "Mobile" or "Datacenter"
/// - `asn`, `isp` (string): restrict to a network
/// - `apiKey`: set by the client on every request
pub const ROTATOR_PARAMS: [&str; 14] = [
    "apiKey",
    "get",
    "post",
    "cookies",
    "referer",
    "userAgent",
    "port",
    "city",
    "state",
    "country",
    "connectionType",
    "asn",
    "isp",
    "xml",
];

const API_KEY_PARAM: &str = "apiKey";

/// Client for the Rotating Proxy API. Tracks the request quota reported by
/// the provider.
#[derive(Debug)]
pub struct RotatingProxyClient<T = ReqwestTransport> {
    fetcher: ParameterizedFetcher<T>,
    api_key: String,
    remaining_requests: Option<u64>,
}

impl RotatingProxyClient<ReqwestTransport> {
    /// Create a client using the default HTTP transport
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, TransportConfig::default())
    }

    /// Create a client with a custom transport configuration.
    ///
    /// The key is checked before the HTTP client is built, so a missing key
    /// never constructs a transport.
    pub fn with_config(api_key: impl Into<String>, config: TransportConfig) -> Result<Self> {
        let api_key = validate_api_key(api_key.into())?;
        Self::with_transport(api_key, ReqwestTransport::with_config(config)?)
    }
}

impl<T: HttpTransport> RotatingProxyClient<T> {
    /// Create a client on top of an existing transport.
    ///
    /// Fails with [`Error::Configuration`] when `api_key` is empty.
    pub fn with_transport(api_key: impl Into<String>, transport: T) -> Result<Self> {
        let api_key = validate_api_key(api_key.into())?;
        Ok(Self {
            fetcher: ParameterizedFetcher::new(ROTATOR_ENDPOINT, ROTATOR_PARAMS, transport),
            api_key,
            remaining_requests: None,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Quota reported by the last response, `None` before the first
    /// successful request and `Some(0)` once the provider reported an error.
    pub fn remaining_requests(&self) -> Option<u64> {
        self.remaining_requests
    }

    /// Parameters that the next request will send
    pub fn params(&self) -> &Params {
        self.fetcher.params()
    }

    pub fn clear_params(&mut self) {
        self.fetcher.clear_params();
    }

    /// Replace the current filters
    pub fn set_filter(&mut self, filter: Params, named: Params) -> &Params {
        self.fetcher.clear_params();
        self.fetcher.set_params(filter, named)
    }

    /// Fetch one proxy, optionally replacing the filters first.
    ///
    /// Returns `Ok(None)` when the request could not be completed at all or
    /// the provider answered with a JSON `null`.
    pub fn get_proxy(&mut self, filter: Option<Params>) -> Result<Option<RotatingProxyRecord>> {
        if let Some(filter) = filter {
            self.set_filter(filter, Params::new());
        }
        let key = self.api_key.clone();
        self.fetcher.set_credential(API_KEY_PARAM, key);

        let body = match self.fetcher.fetch(ResponseFormat::Json) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "rotating proxy request failed");
                return Ok(None);
            }
        };

        if matches!(body, FetchBody::Json(Value::Null)) {
            return Ok(None);
        }

        let Some(object) = body.as_object() else {
            return Err(Error::ProviderResponse(body.to_string()));
        };

        if let Some(error) = object.get("error") {
            self.remaining_requests = Some(0);
            return Err(Error::QuotaOrQuery(error_message(error)));
        }

        let fields = Fields::new(object);
        let remaining = fields.uint("requestsRemaining")?;
        self.remaining_requests = Some(remaining);
        debug!(remaining, "rotating proxy quota updated");

        Ok(Some(RotatingProxyRecord {
            base: ProxyRecord {
                source: ROTATOR_SOURCE.to_string(),
                proxy_address: fields.string("proxy")?,
                ip: fields.string("ip")?,
                port: fields.port("port")?,
                proxy_type: fields.string("type")?,
                last_checked_seconds: fields.int("lastChecked")?,
                supports_get: fields.bool("get")?,
                supports_post: fields.bool("post")?,
                supports_cookies: fields.bool("cookies")?,
                supports_referer: fields.bool("referer")?,
                supports_user_agent: fields.bool("userAgent")?,
                city: fields.string("city")?,
                state: fields.string("state")?,
                country: fields.string("country")?,
                requests_remaining: Some(remaining),
            },
            connection_type: fields.string("connectionType")?,
            asn: fields.string("asn")?,
            isp: fields.string("isp")?,
            random_user_agent: fields.string("randomUserAgent")?,
        }))
    }
}

impl<T: HttpTransport> ProxySource for RotatingProxyClient<T> {
    fn name(&self) -> &'static str {
        ROTATOR_SOURCE
    }

    fn next_proxy(&mut self) -> Result<Option<ProxyRecord>> {
        Ok(self.get_proxy(None)?.map(RotatingProxyRecord::into_base))
    }
}

fn validate_api_key(api_key: String) -> Result<String> {
    if api_key.trim().is_empty() {
        return Err(Error::Configuration(
            "the Rotating Proxy API requires an API key".to_string(),
        ));
    }
    Ok(api_key)
}

fn error_message(error: &Value) -> String {
    FetchBody::Json(error.clone()).to_string()
}
