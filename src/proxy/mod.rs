//! Proxy module for fetching proxies from proxy-listing APIs
//!
//! This module provides:
//! - Normalized proxy records shared by every provider
//! - A parameterized fetcher that whitelists query parameters
//! - Clients for GimmeProxy and ProxyRotator's Rotating Proxy API

pub mod fetcher;
pub mod fields;
pub mod gimmeproxy;
pub mod models;
pub mod rotator;
pub mod source;
pub mod transport;

pub use fetcher::{FetchBody, ParameterizedFetcher, ResponseFormat};
pub use gimmeproxy::GimmeProxyClient;
pub use models::{params, GimmeProxyRecord, ParamValue, Params, ProxyRecord, RotatingProxyRecord};
pub use rotator::RotatingProxyClient;
pub use source::ProxySource;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportConfig};
