//! Common interface over the proxy-listing clients

use crate::error::Result;
use crate::proxy::models::ProxyRecord;

/// A service that hands out one proxy per request
pub trait ProxySource {
    /// Human readable name of the service
    fn name(&self) -> &'static str;

    /// Fetch the next proxy using the source's current filters.
    ///
    /// `Ok(None)` means the source could not be reached and chose not to
    /// treat that as an error.
    fn next_proxy(&mut self) -> Result<Option<ProxyRecord>>;
}
