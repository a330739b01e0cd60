//! # unifi-reports
//!
//! A Rust client for the historical statistics reports of the Ubiquiti UniFi
//! Controller API.
//!
//! Reports are requested per site for a time window, a bucket interval, a
//! report subject and a set of metrics. Every request is validated before it
//! is sent: unknown intervals, report types or attributes and empty windows
//! are rejected without touching the network.
//!
//! ## Features
//!
//! - 🔐 Cookie and CSRF based session handling
//! - 📊 Site, client, access point and speed test reports
//! - 🕒 Default windows per interval and default metric sets per report type
//! - 🛡️ Typed validation errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use unifi_reports::{ReportInterval, ReportType, UniFiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = UniFiClient::builder()
//!         .controller_url("https://unifi.example.com:8443")
//!         .username("admin")
//!         .password_from_env("UNIFI_PASSWORD")
//!         .site("default")
//!         .accept_invalid_certs(true)
//!         .build()
//!         .await?;
//!
//!     // Last 24 hours of hourly site statistics with the default metrics.
//!     let report = client
//!         .reports()
//!         .site_report(ReportInterval::Hourly, ReportType::Site)
//!         .send()
//!         .await?;
//!
//!     for record in &report.data {
//!         println!("{:?} bytes at {:?}", record.get("bytes"), record.get("time"));
//!     }
//!
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod error;
mod models;
mod transport;

pub use api::report::{
    fetch_site_report, PreparedReport, ReportHandler, ReportQuery, SiteReportBuilder,
};
#[cfg(feature = "default-client")]
pub use client::{initialize, instance};
pub use client::{UniFiClient, UniFiClientBuilder};
pub use error::{UniFiError, UniFiResult, UrlParseError};
pub use models::api_response::ApiMeta;
pub use models::report::{
    ReportAttribute, ReportInterval, ReportType, SiteReport, SiteReportRequest,
    SiteReportsResponse,
};
pub use transport::SiteTransport;
