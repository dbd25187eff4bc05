//! proxygrab - clients for proxy-listing APIs
//!
//! Fetches proxy server descriptions from GimmeProxy and ProxyRotator and
//! normalizes them into [`ProxyRecord`]s.
//!
//! ```no_run
//! use proxygrab::proxy::{params, GimmeProxyClient, Params};
//!
//! let mut client = GimmeProxyClient::new(None)?;
//! client.set_filter(params([("get", true), ("supportsHttps", true)]), Params::new());
//! let proxy = client.get_proxy()?;
//! println!("{}", proxy);
//! # Ok::<(), proxygrab::Error>(())
//! ```

pub mod error;
pub mod proxy;

pub use error::{Error, Result, TransportError};
pub use proxy::*;
