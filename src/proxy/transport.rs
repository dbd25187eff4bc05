//! HTTP transport used by the proxy clients
//!
//! The clients only need a blocking GET with query parameters that hands back
//! the status code and the body text. [`ReqwestTransport`] provides that on
//! top of `reqwest::blocking`; tests plug in their own implementation.

use crate::error::{Error, Result, TransportError};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Default user agent sent to the providers
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET capability
pub trait HttpTransport {
    /// Send a GET request to `url` with `query` appended as query parameters.
    ///
    /// Non-2xx statuses are not errors at this level; only failures that
    /// prevent a response from being read are.
    fn get(&self, url: &str, query: &[(String, String)]) -> std::result::Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn get(&self, url: &str, query: &[(String, String)]) -> std::result::Result<HttpResponse, TransportError> {
        (**self).get(url, query)
    }
}

/// Configuration for the default HTTP transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout, `None` keeps reqwest's default
    pub timeout: Option<Duration>,
    /// User agent for HTTP requests
    pub user_agent: Option<String>,
    /// Upstream proxy URL (http, https or socks5) to route API calls through
    pub upstream_proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            upstream_proxy: None,
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    pub fn with_upstream_proxy(mut self, proxy: String) -> Self {
        self.upstream_proxy = Some(proxy);
        self
    }
}

/// [`HttpTransport`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        if let Some(upstream) = config.upstream_proxy.as_deref().filter(|p| !p.is_empty()) {
            let proxy = reqwest::Proxy::all(upstream).map_err(|e| {
                Error::Configuration(format!("invalid upstream proxy `{}`: {}", upstream, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(TransportError::from)?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> std::result::Result<HttpResponse, TransportError> {
        debug!(url, params = query.len(), "sending GET request");
        let response = self.client.get(url).query(query).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(url, status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, VecDeque};
    use std::rc::Rc;

    type Reply = std::result::Result<HttpResponse, TransportError>;

    #[derive(Debug, Default)]
    struct State {
        replies: VecDeque<Reply>,
        requests: Vec<(String, Vec<(String, String)>)>,
    }

    /// Serves queued replies in order and records every request.
    /// Clones share state, so a test can keep a handle after moving one
    /// into a client.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockTransport {
        state: Rc<RefCell<State>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply_json(&self, status: u16, body: Value) -> &Self {
            self.reply_text(status, &body.to_string())
        }

        pub(crate) fn reply_text(&self, status: u16, body: &str) -> &Self {
            self.state
                .borrow_mut()
                .replies
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        pub(crate) fn fail(&self, message: &str) -> &Self {
            self.state
                .borrow_mut()
                .replies
                .push_back(Err(TransportError::Io(message.to_string())));
            self
        }

        pub(crate) fn request_count(&self) -> usize {
            self.state.borrow().requests.len()
        }

        pub(crate) fn last_url(&self) -> Option<String> {
            self.state.borrow().requests.last().map(|(url, _)| url.clone())
        }

        pub(crate) fn last_query(&self) -> BTreeMap<String, String> {
            self.state
                .borrow()
                .requests
                .last()
                .map(|(_, query)| query.iter().cloned().collect())
                .unwrap_or_default()
        }
    }

    impl HttpTransport for MockTransport {
        fn get(&self, url: &str, query: &[(String, String)]) -> Reply {
            let mut state = self.state.borrow_mut();
            state.requests.push((url.to_string(), query.to_vec()));
            state
                .replies
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Io("no reply queued".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(503, "").is_success());
    }

    #[test]
    fn test_transport_config_default() {
        let config = TransportConfig::default();
        assert!(config.timeout.is_none());
        assert_eq!(config.user_agent.as_deref(), Some(DEFAULT_USER_AGENT));
        assert!(config.upstream_proxy.is_none());
    }

    #[test]
    fn test_transport_config_builder() {
        let config = TransportConfig::new()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("Custom Agent".to_string())
            .with_upstream_proxy("socks5://127.0.0.1:1080".to_string());

        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent.as_deref(), Some("Custom Agent"));
        assert_eq!(config.upstream_proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new().is_ok());

        let config = TransportConfig::new().with_upstream_proxy("http://127.0.0.1:3128".to_string());
        assert!(ReqwestTransport::with_config(config).is_ok());
    }

    #[test]
    fn test_reqwest_transport_rejects_bad_upstream() {
        let config = TransportConfig::new().with_upstream_proxy("not a url".to_string());
        let err = ReqwestTransport::with_config(config).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_reqwest_transport_connection_failure() {
        let transport = ReqwestTransport::with_config(
            TransportConfig::new().with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let result = transport.get("http://127.0.0.1:1/", &[]);
        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
