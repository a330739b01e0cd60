use chrono::{DateTime, Duration, Utc};
use http::Method;
use log::debug;

use crate::models::report::{
    ReportAttribute, ReportInterval, ReportType, SiteReportRequest, SiteReportsResponse,
};
use crate::transport::SiteTransport;
use crate::{UniFiClient, UniFiError, UniFiResult};

/// Caller intent for a single historical statistics report.
///
/// Interval, report type and attributes are kept as raw tokens so that any
/// input can be expressed; they are checked by [`ReportQuery::prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    /// Site the report is requested for.
    pub site: String,
    /// Start of the window. Leave both bounds unset to use the interval's
    /// default window.
    pub start: Option<DateTime<Utc>>,
    /// End of the window.
    pub end: Option<DateTime<Utc>>,
    /// Bucket granularity, e.g. `hourly`.
    pub interval: String,
    /// Report subject, e.g. `site`.
    pub report_type: String,
    /// Requested metrics. Empty selects the report type's default set.
    pub attributes: Vec<String>,
    /// Device MAC addresses to restrict the report to. Empty means no filter.
    pub filter_macs: Vec<String>,
}

/// A validated report request, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedReport {
    /// Effective interval, `archive` for speed test reports.
    pub interval: ReportInterval,
    pub report_type: ReportType,
    /// Site-relative endpoint path, `stat/report/<interval>.<type>`.
    pub path: String,
    pub body: SiteReportRequest,
}

impl ReportQuery {
    pub fn new(
        site: impl Into<String>,
        interval: impl Into<String>,
        report_type: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            start: None,
            end: None,
            interval: interval.into(),
            report_type: report_type.into(),
            attributes: Vec::new(),
            filter_macs: Vec::new(),
        }
    }

    /// Applies defaults and validates the query against the current time.
    ///
    /// Checks run in order and the first failure is returned:
    ///
    /// 1. the resolved start must be strictly before the resolved end
    /// 2. the report type must be known
    /// 3. the interval must be known, unless the report type is `speedtest`,
    ///    which always uses `archive`
    /// 4. every supplied attribute must be known
    pub fn prepare(&self) -> UniFiResult<PreparedReport> {
        self.prepare_at(Utc::now())
    }

    pub(crate) fn prepare_at(&self, now: DateTime<Utc>) -> UniFiResult<PreparedReport> {
        let (start, end) = match (self.start, self.end) {
            (None, None) => match default_window(&self.interval, now) {
                Some((start, end)) => (Some(start), Some(end)),
                None => (None, None),
            },
            bounds => bounds,
        };
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) if s < e => (s, e),
            _ => return Err(UniFiError::InvalidTimeRange { start, end }),
        };

        let report_type: ReportType = self.report_type.parse()?;

        // Speed tests are only recorded in the archive.
        let interval = if report_type == ReportType::SpeedTest {
            ReportInterval::Archive
        } else {
            self.interval.parse()?
        };

        let attributes = if self.attributes.is_empty() {
            report_type.default_attributes().to_vec()
        } else {
            self.attributes
                .iter()
                .map(|attribute| attribute.parse())
                .collect::<UniFiResult<Vec<ReportAttribute>>>()?
        };

        let macs = if self.filter_macs.is_empty() {
            None
        } else {
            Some(self.filter_macs.clone())
        };

        Ok(PreparedReport {
            interval,
            report_type,
            path: format!("stat/report/{}.{}", interval, report_type),
            body: SiteReportRequest {
                attributes,
                start: start.timestamp_millis(),
                end: end.timestamp_millis(),
                macs,
            },
        })
    }
}

/// Default window for `interval` ending at `now`.
///
/// `archive` and unknown intervals have no default.
fn default_window(interval: &str, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let length = match interval.parse::<ReportInterval>().ok()? {
        ReportInterval::FiveMinutes => Duration::hours(1),
        ReportInterval::Hourly => Duration::hours(24),
        ReportInterval::Daily => Duration::days(7),
        ReportInterval::Archive => return None,
    };
    Some((now - length, now))
}

/// Validates `query` and fetches the report through `transport`.
///
/// Nothing is sent when validation fails. Transport and decoding errors are
/// returned unchanged.
///
/// # Examples
///
/// ```no_run
/// # use unifi_reports::{fetch_site_report, ReportQuery, UniFiClient, UniFiResult};
/// # async fn example(client: &UniFiClient) -> UniFiResult<()> {
/// let mut query = ReportQuery::new("default", "hourly", "site");
/// query.attributes = vec!["bytes".into(), "num_sta".into(), "time".into()];
///
/// let report = fetch_site_report(client, &query).await?;
/// println!("{} records", report.data.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_site_report<T>(
    transport: &T,
    query: &ReportQuery,
) -> UniFiResult<SiteReportsResponse>
where
    T: SiteTransport + ?Sized,
{
    let prepared = query.prepare()?;
    debug!(
        "fetching {} report for site {} ({} attributes)",
        prepared.path,
        query.site,
        prepared.body.attributes.len()
    );

    let body = serde_json::to_value(&prepared.body)?;
    let response = transport
        .site_request(Method::GET, &query.site, &prepared.path, Some(body))
        .await?;

    Ok(serde_json::from_value(response)?)
}

/// Provides access to the controller's historical statistics reports.
#[derive(Debug)]
pub struct ReportHandler {
    client: UniFiClient,
}

impl ReportHandler {
    pub(crate) fn new(client: UniFiClient) -> Self {
        Self { client }
    }

    /// Starts a report request for the client's site.
    ///
    /// # Arguments
    ///
    /// * `interval` - Bucket granularity (`5minutes`, `hourly`, `daily`,
    ///   `archive`).
    /// * `report_type` - Report subject (`site`, `user`, `ap`, `speedtest`).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use unifi_reports::{ReportAttribute, ReportInterval, ReportType, UniFiClient};
    /// #
    /// # async fn example(client: &UniFiClient) -> Result<(), unifi_reports::UniFiError> {
    /// let report = client
    ///     .reports()
    ///     .site_report(ReportInterval::Hourly, ReportType::AccessPoint)
    ///     .attributes([ReportAttribute::Bytes, ReportAttribute::NumSta, ReportAttribute::Time])
    ///     .filter_mac("00:11:22:33:44:55")
    ///     .send()
    ///     .await?;
    ///
    /// for record in report.data {
    ///     println!("{:?}", record.get("bytes"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn site_report(
        &self,
        interval: impl Into<String>,
        report_type: impl Into<String>,
    ) -> SiteReportBuilder {
        SiteReportBuilder::new(self.client.clone(), interval.into(), report_type.into())
    }
}

#[derive(Debug, Clone)]
pub struct SiteReportBuilder {
    client: UniFiClient,
    query: ReportQuery,
}

impl SiteReportBuilder {
    pub(crate) fn new(client: UniFiClient, interval: String, report_type: String) -> Self {
        let query = ReportQuery::new(client.site(), interval, report_type);
        Self { client, query }
    }

    /// Overrides the client's default site.
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.query.site = site.into();
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.query.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.query.end = Some(end);
        self
    }

    /// Sets both window bounds.
    pub fn window(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start(start).end(end)
    }

    /// Replaces the requested attributes.
    pub fn attributes<I, A>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.query.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.query.attributes.push(attribute.into());
        self
    }

    /// Restricts the report to the given device MAC addresses.
    pub fn filter_macs<I, M>(mut self, macs: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.query.filter_macs.extend(macs.into_iter().map(Into::into));
        self
    }

    pub fn filter_mac(mut self, mac: impl Into<String>) -> Self {
        self.query.filter_macs.push(mac.into());
        self
    }

    /// The query assembled so far.
    pub fn query(&self) -> &ReportQuery {
        &self.query
    }

    pub async fn send(self) -> UniFiResult<SiteReportsResponse> {
        fetch_site_report(&self.client, &self.query).await
    }
}
