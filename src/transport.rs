//! Site-scoped request dispatch.
//!
//! Report fetching only needs one capability from the HTTP layer: send a
//! request against a site and hand back the decoded JSON body. Keeping that
//! behind [`SiteTransport`] lets the report logic run against any
//! implementation, including in-memory fakes in tests.

use async_trait::async_trait;
use http::Method;
use serde_json::Value;

use crate::{UniFiClient, UniFiResult};

/// Performs a request scoped to a single controller site.
#[async_trait]
pub trait SiteTransport: Send + Sync {
    /// Sends `body` to `path` under `site` and returns the decoded JSON
    /// response body.
    ///
    /// `path` is relative to the site root, e.g. `stat/report/hourly.site`.
    async fn site_request(
        &self,
        method: Method,
        site: &str,
        path: &str,
        body: Option<Value>,
    ) -> UniFiResult<Value>;
}

/// Builds the controller endpoint for a site-relative path.
pub(crate) fn site_endpoint(site: &str, path: &str) -> String {
    format!("/api/s/{}/{}", site, path.trim_start_matches('/'))
}

#[async_trait]
impl SiteTransport for UniFiClient {
    async fn site_request(
        &self,
        method: Method,
        site: &str,
        path: &str,
        body: Option<Value>,
    ) -> UniFiResult<Value> {
        let endpoint = site_endpoint(site, path);
        self.request_json(method, &endpoint, body).await
    }
}
