use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::api_response::ApiMeta;
use crate::UniFiError;

/// A single historical statistics record.
///
/// The field set varies by report type, interval and controller firmware, so
/// records are kept as raw JSON objects.
pub type SiteReport = Map<String, Value>;

/// Response envelope returned by the `stat/report` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteReportsResponse {
    /// Metadata about the response.
    pub meta: ApiMeta,

    /// Report records in the order the controller returned them.
    #[serde(default)]
    pub data: Vec<SiteReport>,
}

/// Granularity of the statistics buckets in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportInterval {
    /// Five minute buckets.
    #[serde(rename = "5minutes")]
    FiveMinutes,
    /// Hourly buckets.
    #[serde(rename = "hourly")]
    Hourly,
    /// Daily buckets.
    #[serde(rename = "daily")]
    Daily,
    /// Archived records; the only interval speed tests are stored under.
    #[serde(rename = "archive")]
    Archive,
}

impl ReportInterval {
    pub const ALL: [ReportInterval; 4] = [
        ReportInterval::FiveMinutes,
        ReportInterval::Hourly,
        ReportInterval::Daily,
        ReportInterval::Archive,
    ];

    /// The token used on the wire and in endpoint paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportInterval::FiveMinutes => "5minutes",
            ReportInterval::Hourly => "hourly",
            ReportInterval::Daily => "daily",
            ReportInterval::Archive => "archive",
        }
    }

    /// Returns `true` if `token` exactly matches a known interval.
    pub fn is_valid(token: &str) -> bool {
        Self::ALL.iter().any(|interval| interval.as_str() == token)
    }
}

impl fmt::Display for ReportInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportInterval {
    type Err = UniFiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| UniFiError::InvalidInterval(s.to_string()))
    }
}

impl From<ReportInterval> for String {
    fn from(interval: ReportInterval) -> Self {
        interval.as_str().to_string()
    }
}

/// Subject of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// Site-wide totals.
    #[serde(rename = "site")]
    Site,
    /// Per-client statistics.
    #[serde(rename = "user")]
    User,
    /// Per access point statistics.
    #[serde(rename = "ap")]
    AccessPoint,
    /// Gateway speed test results.
    #[serde(rename = "speedtest")]
    SpeedTest,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Site,
        ReportType::User,
        ReportType::AccessPoint,
        ReportType::SpeedTest,
    ];

    /// The token used on the wire and in endpoint paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Site => "site",
            ReportType::User => "user",
            ReportType::AccessPoint => "ap",
            ReportType::SpeedTest => "speedtest",
        }
    }

    /// Returns `true` if `token` exactly matches a known report type.
    pub fn is_valid(token: &str) -> bool {
        Self::ALL.iter().any(|report_type| report_type.as_str() == token)
    }

    /// Attributes requested when the caller does not name any.
    pub fn default_attributes(&self) -> &'static [ReportAttribute] {
        match self {
            ReportType::SpeedTest => &ReportAttribute::SPEED_TEST,
            _ => &ReportAttribute::DEFAULTS,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = UniFiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|report_type| report_type.as_str() == s)
            .ok_or_else(|| UniFiError::InvalidReportType(s.to_string()))
    }
}

impl From<ReportType> for String {
    fn from(report_type: ReportType) -> Self {
        report_type.as_str().to_string()
    }
}

/// A metric that can be requested from a report endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportAttribute {
    #[serde(rename = "bytes")]
    Bytes,
    #[serde(rename = "wan-tx_bytes")]
    WanTxBytes,
    #[serde(rename = "wan-rx_bytes")]
    WanRxBytes,
    #[serde(rename = "wlan_bytes")]
    WlanBytes,
    #[serde(rename = "num_sta")]
    NumSta,
    #[serde(rename = "lan-num_sta")]
    LanNumSta,
    #[serde(rename = "wlan-num_sta")]
    WlanNumSta,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "rx_bytes")]
    RxBytes,
    #[serde(rename = "tx_bytes")]
    TxBytes,
    /// Speed test download throughput.
    #[serde(rename = "xput_download")]
    SpeedTestDownload,
    /// Speed test upload throughput.
    #[serde(rename = "xput_upload")]
    SpeedTestUpload,
    /// Speed test latency.
    #[serde(rename = "latency")]
    SpeedTestLatency,
}

impl ReportAttribute {
    pub const ALL: [ReportAttribute; 13] = [
        ReportAttribute::Bytes,
        ReportAttribute::WanTxBytes,
        ReportAttribute::WanRxBytes,
        ReportAttribute::WlanBytes,
        ReportAttribute::NumSta,
        ReportAttribute::LanNumSta,
        ReportAttribute::WlanNumSta,
        ReportAttribute::Time,
        ReportAttribute::RxBytes,
        ReportAttribute::TxBytes,
        ReportAttribute::SpeedTestDownload,
        ReportAttribute::SpeedTestUpload,
        ReportAttribute::SpeedTestLatency,
    ];

    /// Byte counters, station counts and the record time.
    pub const DEFAULTS: [ReportAttribute; 8] = [
        ReportAttribute::Bytes,
        ReportAttribute::WanTxBytes,
        ReportAttribute::WanRxBytes,
        ReportAttribute::WlanBytes,
        ReportAttribute::NumSta,
        ReportAttribute::LanNumSta,
        ReportAttribute::WlanNumSta,
        ReportAttribute::Time,
    ];

    /// Throughput, latency and the record time.
    pub const SPEED_TEST: [ReportAttribute; 4] = [
        ReportAttribute::SpeedTestDownload,
        ReportAttribute::SpeedTestUpload,
        ReportAttribute::SpeedTestLatency,
        ReportAttribute::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportAttribute::Bytes => "bytes",
            ReportAttribute::WanTxBytes => "wan-tx_bytes",
            ReportAttribute::WanRxBytes => "wan-rx_bytes",
            ReportAttribute::WlanBytes => "wlan_bytes",
            ReportAttribute::NumSta => "num_sta",
            ReportAttribute::LanNumSta => "lan-num_sta",
            ReportAttribute::WlanNumSta => "wlan-num_sta",
            ReportAttribute::Time => "time",
            ReportAttribute::RxBytes => "rx_bytes",
            ReportAttribute::TxBytes => "tx_bytes",
            ReportAttribute::SpeedTestDownload => "xput_download",
            ReportAttribute::SpeedTestUpload => "xput_upload",
            ReportAttribute::SpeedTestLatency => "latency",
        }
    }

    /// Returns `true` if `token` exactly matches a known attribute.
    pub fn is_valid(token: &str) -> bool {
        Self::ALL.iter().any(|attribute| attribute.as_str() == token)
    }
}

impl fmt::Display for ReportAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportAttribute {
    type Err = UniFiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == s)
            .ok_or_else(|| UniFiError::InvalidAttribute(s.to_string()))
    }
}

impl From<ReportAttribute> for String {
    fn from(attribute: ReportAttribute) -> Self {
        attribute.as_str().to_string()
    }
}

/// Body sent to `stat/report/<interval>.<type>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReportRequest {
    /// Metrics to return for every record.
    pub attributes: Vec<ReportAttribute>,
    /// Window start in epoch milliseconds.
    pub start: i64,
    /// Window end in epoch milliseconds.
    pub end: i64,
    /// Restrict the report to these device MAC addresses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macs: Option<Vec<String>>,
}
