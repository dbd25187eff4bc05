//! Client for the <https://gimmeproxy.com/> API

use crate::error::{Error, Result};
use crate::proxy::fetcher::{FetchBody, ParameterizedFetcher, ResponseFormat};
use crate::proxy::fields::Fields;
use crate::proxy::models::{GimmeProxyRecord, Params, ProxyRecord};
use crate::proxy::source::ProxySource;
use crate::proxy::transport::{HttpTransport, ReqwestTransport, TransportConfig};
use tracing::warn;

/// GimmeProxy endpoint
pub const GIMMEPROXY_ENDPOINT: &str = "https://gimmeproxy.com/api/getProxy";

/// Value of [`ProxyRecord::source`] for GimmeProxy records
pub const GIMMEPROXY_SOURCE: &str = "Gimmeproxy API";

/// Filters accepted by the GimmeProxy API
///
/// - `get`, `post`, `cookies`, `referer`, `user-agent` (bool): request capabilities
/// - `supportsHttps` (bool): only proxies with HTTPS support
/// - `anonymityLevel` (int): 1 anonymous, 0 not anonymous
/// - `protocol` (string): http, socks4 or socks5
/// - `port` (int), `country` / `notCountry` (string, comma separated)
/// - `minSpeed` (float, KB/s), `maxCheckPeriod` (int, seconds)
/// - `websites` (string), `ipPort` / `curl` (bool): response shaping
pub const GIMMEPROXY_PARAMS: [&str; 16] = [
    "get",
    "post",
    "cookies",
    "referer",
    "user-agent",
    "supportsHttps",
    "anonymityLevel",
    "protocol",
    "port",
    "country",
    "maxCheckPeriod",
    "websites",
    "minSpeed",
    "notCountry",
    "ipPort",
    "curl",
];

const API_KEY_PARAM: &str = "api_key";

/// Client for the GimmeProxy API. An API key is optional.
#[derive(Debug)]
pub struct GimmeProxyClient<T = ReqwestTransport> {
    fetcher: ParameterizedFetcher<T>,
    api_key: Option<String>,
}

impl GimmeProxyClient<ReqwestTransport> {
    /// Create a client using the default HTTP transport
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_config(api_key, TransportConfig::default())
    }

    /// Create a client with a custom transport configuration
    pub fn with_config(api_key: Option<String>, config: TransportConfig) -> Result<Self> {
        Ok(Self::with_transport(api_key, ReqwestTransport::with_config(config)?))
    }
}

impl<T: HttpTransport> GimmeProxyClient<T> {
    /// Create a client on top of an existing transport
    pub fn with_transport(api_key: Option<String>, transport: T) -> Self {
        let mut client = Self {
            fetcher: ParameterizedFetcher::new(GIMMEPROXY_ENDPOINT, GIMMEPROXY_PARAMS, transport),
            api_key,
        };
        client.inject_api_key();
        client
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Parameters that the next request will send
    pub fn params(&self) -> &Params {
        self.fetcher.params()
    }

    /// Remove every filter. The API key, when configured, is kept.
    pub fn clear_params(&mut self) {
        self.fetcher.clear_params();
        self.inject_api_key();
    }

    /// Replace the current filters.
    ///
    /// `user_agent` is accepted as an alias of the provider's `user-agent`
    /// key. The API key, when configured, is always kept.
    pub fn set_filter(&mut self, filter: Params, named: Params) -> &Params {
        self.fetcher.clear_params();
        let filter = rename_user_agent(filter);
        let named = rename_user_agent(named);
        self.fetcher.set_params(filter, named);
        self.inject_api_key();
        self.fetcher.params()
    }

    /// Fetch one proxy matching the current filters
    pub fn get_proxy(&self) -> Result<GimmeProxyRecord> {
        let body = self.fetcher.fetch(ResponseFormat::Json).unwrap_or_else(|e| {
            warn!(error = %e, "GimmeProxy request failed");
            FetchBody::Text(e.to_string())
        });

        let Some(object) = body.as_object() else {
            return Err(Error::ProviderResponse(body.to_string()));
        };

        let fields = Fields::new(object);
        Ok(GimmeProxyRecord {
            base: ProxyRecord {
                source: GIMMEPROXY_SOURCE.to_string(),
                proxy_address: fields.string("ipPort")?,
                ip: fields.string("ip")?,
                port: fields.port("port")?,
                proxy_type: "unknown".to_string(),
                last_checked_seconds: fields.int("verifiedSecondsAgo")?,
                supports_get: fields.bool("get")?,
                supports_post: fields.bool("post")?,
                supports_cookies: fields.bool("cookies")?,
                supports_referer: fields.bool("referer")?,
                supports_user_agent: fields.bool("user-agent")?,
                city: "unknown".to_string(),
                state: "unknown".to_string(),
                country: fields.string("country")?,
                requests_remaining: None,
            },
            supports_https: fields.bool("supportsHttps")?,
            protocol: fields.string("protocol")?,
            anonymity_level: fields.int("anonymityLevel")?,
            supported_websites: fields.object("websites")?,
            curl_command: fields.string("curl")?,
            speed_kbps: fields.uint("speed")?,
        })
    }

    fn inject_api_key(&mut self) {
        if let Some(key) = &self.api_key {
            self.fetcher.set_credential(API_KEY_PARAM, key.clone());
        }
    }
}

impl<T: HttpTransport> ProxySource for GimmeProxyClient<T> {
    fn name(&self) -> &'static str {
        GIMMEPROXY_SOURCE
    }

    fn next_proxy(&mut self) -> Result<Option<ProxyRecord>> {
        self.get_proxy().map(|record| Some(record.into_base()))
    }
}

fn rename_user_agent(mut params: Params) -> Params {
    if let Some(value) = params.remove("user_agent") {
        params.insert("user-agent".to_string(), value);
    }
    params
}
