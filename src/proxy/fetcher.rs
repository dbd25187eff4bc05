//! Parameterized GET requests against a provider endpoint

use crate::error::TransportError;
use crate::proxy::models::{ParamValue, Params};
use crate::proxy::transport::HttpTransport;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// How the response body should be returned by [`ParameterizedFetcher::fetch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

/// Body returned by a fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchBody {
    /// Body decoded as JSON
    Json(Value),
    /// Raw body text, either requested or because JSON decoding failed
    Text(String),
}

impl FetchBody {
    /// The decoded JSON object, if the body is one
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            FetchBody::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for FetchBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchBody::Json(Value::String(s)) => write!(f, "{}", s),
            FetchBody::Json(value) => write!(f, "{}", value),
            FetchBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Owns an endpoint, the parameter names it accepts and the parameters of
/// the next request.
#[derive(Debug, Clone)]
pub struct ParameterizedFetcher<T> {
    endpoint: String,
    allowed: BTreeSet<String>,
    params: Params,
    transport: T,
}

impl<T: HttpTransport> ParameterizedFetcher<T> {
    /// Create a fetcher for `endpoint` accepting only the `allowed` parameter names
    pub fn new<I, S>(endpoint: impl Into<String>, allowed: I, transport: T) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoint: endpoint.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
            params: Params::new(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parameter names accepted by the endpoint
    pub fn allowed_params(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.contains(name)
    }

    /// Parameters that the next fetch will send
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn clear_params(&mut self) {
        self.params.clear();
    }

    /// Merge `params` and then `named` into the current parameters.
    ///
    /// Names the endpoint does not accept are dropped without error. Entries
    /// in `named` win over entries in `params` with the same name.
    pub fn set_params(&mut self, params: Params, named: Params) -> &Params {
        for (name, value) in params.into_iter().chain(named) {
            if self.allowed.contains(&name) {
                self.params.insert(name, value);
            } else {
                debug!(endpoint = %self.endpoint, param = %name, "ignoring unsupported parameter");
            }
        }
        &self.params
    }

    /// Insert a credential parameter; credentials bypass the whitelist.
    pub fn set_credential(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(name.into(), value.into());
    }

    /// GET the endpoint with the current parameters.
    ///
    /// A non-2xx status is logged and the body is handled like any other
    /// response. With [`ResponseFormat::Json`] an undecodable body comes back
    /// as [`FetchBody::Text`].
    pub fn fetch(&self, format: ResponseFormat) -> Result<FetchBody, TransportError> {
        let query: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        let response = self.transport.get(&self.endpoint, &query)?;
        if !response.is_success() {
            warn!(endpoint = %self.endpoint, status = response.status, "provider returned an error status");
        }

        Ok(match format {
            ResponseFormat::Json => match serde_json::from_str::<Value>(&response.body) {
                Ok(value) => FetchBody::Json(value),
                Err(_) => FetchBody::Text(response.body),
            },
            ResponseFormat::Text => FetchBody::Text(response.body),
        })
    }
}
